//! Ray picking against marker shapes.
//!
//! Uses manual ray/sphere and ray/billboard tests on the pickable nodes instead of
//! mesh picking, so the egui overlay keeps its own input.

use std::cmp::Ordering;

use bevy::prelude::*;
use bevy::render::camera::CameraProjection;

use crate::data::CityId;
use crate::scene::CityRegistry;

/// Pickable volume of a scene node, centered on its global translation.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum PickShape {
    Sphere { radius: f32 },
    /// Flat rectangle that always faces the viewer, like a sprite.
    Billboard { half_size: Vec2 },
}

impl PickShape {
    /// Distance along `ray` to this shape placed at `transform`, if hit.
    pub fn hit(&self, ray: Ray3d, transform: &GlobalTransform) -> Option<f32> {
        let center = transform.translation();
        match *self {
            PickShape::Sphere { radius } => {
                let scale = transform.compute_transform().scale.max_element();
                ray_sphere_distance(ray, center, radius * scale)
            }
            PickShape::Billboard { half_size } => ray_billboard_distance(ray, center, half_size),
        }
    }
}

/// Pointer position (logical pixels, origin top-left) to normalized device
/// coordinates of a surface of `size`.
pub fn pointer_to_ndc(pointer: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(
        (pointer.x / size.x) * 2.0 - 1.0,
        -(pointer.y / size.y) * 2.0 + 1.0,
    )
}

/// Ray through `ndc` for a camera with inverse view-projection `world_from_clip`.
///
/// Works with Bevy's reverse-z projections: depth 1 is the near plane.
pub fn ray_from_ndc(world_from_clip: Mat4, ndc: Vec2) -> Option<Ray3d> {
    let near = world_from_clip.project_point3(ndc.extend(1.0));
    let beyond = world_from_clip.project_point3(ndc.extend(0.5));
    let direction = Dir3::new(beyond - near).ok()?;
    Some(Ray3d::new(near, direction))
}

/// Ray from the camera through a pointer position on a surface of `size`.
pub fn camera_ray(
    projection: &Projection,
    camera_transform: &GlobalTransform,
    pointer: Vec2,
    size: Vec2,
) -> Option<Ray3d> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let mut projection = projection.clone();
    projection.update(size.x, size.y);
    let world_from_clip =
        camera_transform.compute_matrix() * projection.get_clip_from_view().inverse();
    ray_from_ndc(world_from_clip, pointer_to_ndc(pointer, size))
}

/// Nearest positive distance from the ray origin to the sphere surface.
pub fn ray_sphere_distance(ray: Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let dir = *ray.direction;
    let oc = ray.origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}

/// Distance along `ray` to a `2 * half_size` rectangle centered on `center`
/// and facing back along the ray, with its width kept horizontal.
pub fn ray_billboard_distance(ray: Ray3d, center: Vec3, half_size: Vec2) -> Option<f32> {
    let dir = *ray.direction;
    let distance = (center - ray.origin).dot(dir);
    if distance < 0.0 {
        return None;
    }
    let right = dir.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(dir);
    let offset = ray.origin + dir * distance - center;
    let inside = offset.dot(right).abs() <= half_size.x && offset.dot(up).abs() <= half_size.y;
    inside.then_some(distance)
}

/// All nodes hit by `ray`, nearest first.
pub fn intersect<'a>(
    ray: Ray3d,
    targets: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a PickShape)>,
) -> Vec<(Entity, f32)> {
    let mut hits: Vec<(Entity, f32)> = targets
        .into_iter()
        .filter_map(|(entity, transform, shape)| {
            shape.hit(ray, transform).map(|distance| (entity, distance))
        })
        .collect();
    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    hits
}

/// First hit (nearest first) that belongs to a city.
pub fn pick_city<'a>(
    ray: Ray3d,
    targets: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a PickShape)>,
    registry: &CityRegistry,
) -> Option<CityId> {
    intersect(ray, targets)
        .into_iter()
        .find_map(|(entity, _)| registry.city_for_node(entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CityRecord;

    fn ray(origin: Vec3, toward: Vec3) -> Ray3d {
        Ray3d::new(origin, Dir3::new(toward - origin).unwrap())
    }

    #[test]
    fn ndc_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(size / 2.0, size), Vec2::ZERO);
    }

    #[test]
    fn center_ray_looks_down_the_camera_axis() {
        let camera = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 300.0));
        let projection = Projection::Perspective(PerspectiveProjection::default());

        let ray = camera_ray(&projection, &camera, Vec2::new(640.0, 360.0), Vec2::new(1280.0, 720.0))
            .expect("center ray");

        assert!((ray.origin.truncate()).length() < 1e-3);
        assert!(ray.origin.z < 300.0 && ray.origin.z > 299.0);
        assert!((*ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn off_center_pointer_tilts_the_ray() {
        let camera = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 300.0));
        let projection = Projection::Perspective(PerspectiveProjection::default());
        let size = Vec2::new(1280.0, 720.0);

        let right = camera_ray(&projection, &camera, Vec2::new(1000.0, 360.0), size).unwrap();
        let top = camera_ray(&projection, &camera, Vec2::new(640.0, 50.0), size).unwrap();

        assert!(right.direction.x > 0.0);
        assert!(top.direction.y > 0.0);
        assert!(camera_ray(&projection, &camera, Vec2::ZERO, Vec2::ZERO).is_none());
    }

    #[test]
    fn sphere_hits_and_misses() {
        let r = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert_eq!(ray_sphere_distance(r, Vec3::ZERO, 2.0), Some(8.0));
        assert_eq!(ray_sphere_distance(r, Vec3::new(5.0, 0.0, 0.0), 2.0), None);

        // Sphere behind the origin.
        assert_eq!(ray_sphere_distance(r, Vec3::new(0.0, 0.0, 20.0), 2.0), None);
        // Origin inside the sphere.
        assert_eq!(ray_sphere_distance(r, Vec3::new(0.0, 0.0, 10.0), 2.0), Some(0.0));
    }

    #[test]
    fn billboard_uses_translation() {
        let r = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let shape = PickShape::Billboard {
            half_size: Vec2::new(6.0, 1.5),
        };
        let at_origin = GlobalTransform::IDENTITY;
        let aside = GlobalTransform::from(Transform::from_xyz(0.0, 5.0, 0.0));

        assert_eq!(shape.hit(r, &at_origin), Some(10.0));
        assert_eq!(shape.hit(r, &aside), None);
    }

    #[test]
    fn billboard_width_is_the_same_from_every_side() {
        // Label of the city at lng 0, lat 0 on a radius 100 globe.
        let label = GlobalTransform::from(Transform::from_xyz(105.0, 0.0, 0.0));
        let shape = PickShape::Billboard {
            half_size: Vec2::new(6.0, 1.5),
        };

        // Viewed head-on from +X, four units right of center.
        let from_x = ray(Vec3::new(300.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(shape.hit(from_x, &label), Some(195.0));
        // Same offset viewed from +Z.
        let from_z = ray(Vec3::new(109.0, 0.0, 300.0), Vec3::new(109.0, 0.0, 0.0));
        assert_eq!(shape.hit(from_z, &label), Some(300.0));

        // Past the half width, or above the half height, misses from both sides.
        let wide = ray(Vec3::new(300.0, 0.0, 7.0), Vec3::new(0.0, 0.0, 7.0));
        let high = ray(Vec3::new(109.0, 2.0, 300.0), Vec3::new(109.0, 2.0, 0.0));
        assert_eq!(shape.hit(wide, &label), None);
        assert_eq!(shape.hit(high, &label), None);
    }

    #[test]
    fn billboard_behind_the_ray_is_missed() {
        let r = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(ray_billboard_distance(r, Vec3::ZERO, Vec2::splat(5.0)), None);
        // Looking straight down still yields a usable rectangle.
        let down = ray(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert_eq!(ray_billboard_distance(down, Vec3::ZERO, Vec2::splat(1.0)), Some(10.0));
    }

    #[test]
    fn nearest_city_wins_and_non_city_hits_are_skipped() {
        let mut world = World::new();
        let globe = world.spawn_empty().id();
        let near_city = world.spawn_empty().id();
        let far_city = world.spawn_empty().id();

        let mut registry = CityRegistry::default();
        let near_id = registry.insert(CityRecord::new("Near", 0.0, 0.0, 0), near_city, Vec3::ZERO);
        registry.insert(CityRecord::new("Far", 0.0, 0.0, 0), far_city, Vec3::ZERO);

        let globe_tf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 5.0));
        let near_tf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 0.0));
        let far_tf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, -5.0));
        let sphere = PickShape::Sphere { radius: 1.0 };

        let r = ray(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        let targets = [
            (far_city, &far_tf, &sphere),
            (globe, &globe_tf, &sphere),
            (near_city, &near_tf, &sphere),
        ];

        let hits = intersect(r, targets);
        assert_eq!(hits.first().map(|h| h.0), Some(globe));
        assert_eq!(pick_city(r, targets, &registry), Some(near_id));

        let miss = ray(Vec3::new(50.0, 0.0, 20.0), Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(pick_city(miss, targets, &registry), None);
    }
}
