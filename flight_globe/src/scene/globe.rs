//! Scene bootstrap and the globe itself: base sphere, particle field sampled
//! from a world map image, and the halo disc.

use std::f32::consts::PI;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::TextureFormat;
use bevy::render::view::RenderLayers;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::camera::OrbitCamera;
use crate::config::GlobeConfig;
use crate::geo::spherical_to_vec3;
use crate::scene::materials::{self, GLOW_INNER_COLOR, GLOW_OUTER_COLOR};

/// Render layer shared by the halo disc layers.
pub const GLOW_LAYER: usize = 1;

const CAMERA_FOV_DEGREES: f32 = 45.0;
const GLOW_MARGIN: f32 = 1.5;

/// Parent of everything placed on the globe (surface, markers, arcs).
#[derive(Component)]
pub struct GlobeRoot;

#[derive(Component)]
pub struct GlobeCamera;

#[derive(Component)]
pub struct GlobeSurface;

/// Halo disc; kept facing the camera.
#[derive(Component)]
pub struct GlobeGlow;

/// Particle field waiting for its source image to finish loading.
#[derive(Component)]
pub struct PendingParticles {
    pub image: Handle<Image>,
}

/// Built particle field; `count` is zero when the image was unusable.
#[derive(Component, Debug)]
pub struct ParticleField {
    pub count: usize,
}

/// Size of the primary render surface in logical pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct RenderSurface {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

impl RenderSurface {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Entities making up the globe.
#[derive(Clone, Copy, Debug)]
pub struct GlobeHandle {
    pub root: Entity,
    pub surface: Entity,
    pub particles: Entity,
    pub glow: Entity,
}

impl GlobeHandle {
    /// Despawns the globe root and everything under it, markers and arcs included.
    pub fn destroy(self, commands: &mut Commands) {
        if let Some(root) = commands.get_entity(self.root) {
            root.despawn_recursive();
        }
    }
}

pub fn globe_plugin(app: &mut App) {
    app.init_resource::<RenderSurface>().add_systems(
        Update,
        (
            build_particles_system,
            billboard_glow_system,
            render_surface_system,
        ),
    );
}

/// Camera, lights and the globe root with its surface, particles and halo.
pub fn setup_scene(
    mut commands: Commands,
    config: Res<GlobeConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Option<Res<AssetServer>>,
) {
    commands.spawn((
        GlobeCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, config.radius * 3.0).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::new(&config),
        RenderLayers::from_layers(&[0, GLOW_LAYER]),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(100.0, 100.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 600.0,
    });

    let world_map = asset_server.map(|server| server.load::<Image>(config.world_map.clone()));
    let globe = spawn_globe(&mut commands, &mut meshes, &mut materials, &config, world_map);
    info!("skyroute: globe ready (radius {})", config.radius);
    debug!("skyroute: globe root {:?}", globe.root);
}

/// Spawns the globe root with its surface, halo and particle field.
///
/// Without `world_map` the particle field stays empty.
pub fn spawn_globe(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &GlobeConfig,
    world_map: Option<Handle<Image>>,
) -> GlobeHandle {
    let radius = config.radius;

    let surface = commands
        .spawn((
            GlobeSurface,
            Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(100, 100))),
            MeshMaterial3d(materials::globe_material(materials)),
            Transform::IDENTITY,
        ))
        .id();

    let glow_mesh = meshes.add(
        Circle::new(radius + GLOW_MARGIN)
            .mesh()
            .resolution(radius.round().max(3.0) as _),
    );
    let glow = commands
        .spawn((GlobeGlow, Transform::IDENTITY, Visibility::default()))
        .with_children(|parent| {
            for color in [GLOW_INNER_COLOR, GLOW_OUTER_COLOR] {
                parent.spawn((
                    Mesh3d(glow_mesh.clone()),
                    MeshMaterial3d(materials::glow_disc_material(materials, color)),
                    RenderLayers::layer(GLOW_LAYER),
                ));
            }
        })
        .id();

    let mut particles = commands.spawn((Transform::IDENTITY, Visibility::default()));
    match world_map {
        Some(image) => {
            particles.insert(PendingParticles { image });
        }
        None => {
            particles.insert(ParticleField { count: 0 });
        }
    }
    let particles = particles.id();

    let root = commands
        .spawn((GlobeRoot, Transform::IDENTITY, Visibility::default()))
        .add_children(&[surface, particles, glow])
        .id();

    GlobeHandle {
        root,
        surface,
        particles,
        glow,
    }
}

/// Samples a `samples × samples` UV grid of `image` and returns a point on the
/// sphere for every sample whose mean RGB brightness exceeds `threshold`.
///
/// Images that cannot be read as 8-bit RGBA yield no points.
pub fn sample_particles(image: &Image, radius: f32, samples: u32, threshold: f32) -> Vec<Vec3> {
    let converted;
    let image = match image.texture_descriptor.format {
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => image,
        other => match image.convert(TextureFormat::Rgba8UnormSrgb) {
            Some(rgba) => {
                converted = rgba;
                &converted
            }
            None => {
                warn!("skyroute: cannot sample world map in format {other:?}");
                return Vec::new();
            }
        },
    };

    let width = image.width() as usize;
    let height = image.height() as usize;
    let data = &image.data;
    if width == 0 || height == 0 || data.len() < width * height * 4 {
        return Vec::new();
    }

    let mut positions = Vec::new();
    for i in 0..samples {
        for j in 0..samples {
            let u = j as f32 / samples as f32;
            let v = i as f32 / samples as f32;

            let x = ((u * width as f32) as usize).min(width - 1);
            let y = ((v * height as f32) as usize).min(height - 1);
            let index = (y * width + x) * 4;

            let brightness =
                (data[index] as f32 + data[index + 1] as f32 + data[index + 2] as f32) / 3.0;
            if brightness > threshold {
                let theta = u * PI * 2.0 - PI / 2.0;
                let phi = v * PI;
                positions.push(spherical_to_vec3(radius, phi, theta));
            }
        }
    }
    positions
}

/// Turns [`PendingParticles`] into a point cloud once the image is available.
/// A failed load leaves the field empty for good.
pub fn build_particles_system(
    mut commands: Commands,
    pending: Query<(Entity, &PendingParticles)>,
    images: Res<Assets<Image>>,
    asset_server: Option<Res<AssetServer>>,
    config: Res<GlobeConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, pending) in &pending {
        if let Some(image) = images.get(&pending.image) {
            let positions = sample_particles(
                image,
                config.radius,
                config.particle_samples,
                config.particle_brightness_threshold,
            );
            info!("skyroute: particle field built with {} points", positions.len());

            let mut field = commands.entity(entity);
            field
                .remove::<PendingParticles>()
                .insert(ParticleField {
                    count: positions.len(),
                });
            if !positions.is_empty() {
                let vertices: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();
                let mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
                    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
                field.insert((
                    Mesh3d(meshes.add(mesh)),
                    MeshMaterial3d(materials::particle_material(&mut materials)),
                ));
            }
            continue;
        }

        let failed = asset_server.as_ref().is_some_and(|server| {
            matches!(
                server.get_load_state(pending.image.id()),
                Some(LoadState::Failed(_))
            )
        });
        if failed {
            warn!("skyroute: world map failed to load, particle field stays empty");
            commands
                .entity(entity)
                .remove::<PendingParticles>()
                .insert(ParticleField { count: 0 });
        }
    }
}

/// Keeps the halo disc facing the camera.
fn billboard_glow_system(
    camera_query: Query<&GlobalTransform, With<GlobeCamera>>,
    mut glows: Query<&mut Transform, (With<GlobeGlow>, Without<GlobeCamera>)>,
) {
    let Ok(cam_tf) = camera_query.get_single() else {
        return;
    };
    let cam_pos = cam_tf.translation();
    for mut tf in &mut glows {
        let away = tf.translation - cam_pos;
        tf.look_to(away, Vec3::Y);
    }
}

/// Mirrors the primary window size into [`RenderSurface`].
fn render_surface_system(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut surface: ResMut<RenderSurface>,
) {
    for event in resized.read() {
        debug!("skyroute: surface resized to {}x{}", event.width, event.height);
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    surface.set_if_neq(RenderSurface {
        width: window.width(),
        height: window.height(),
        scale_factor: window.scale_factor(),
    });
}
