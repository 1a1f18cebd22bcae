//! City markers: glow shell, point, label anchor and dashed connector under
//! one positioned root.

use bevy::prelude::*;

use crate::config::GlobeConfig;
use crate::data::{CityId, CityRecord};
use crate::geo::lng_lat_to_vec3;
use crate::interaction::PickShape;
use crate::scene::labels::{spawn_city_label, LabelConnector, LABEL_HALF_SIZE};
use crate::scene::materials::{self, color_from_hex};
use crate::scene::{CityRegistry, GlobeRoot};

const POINT_RADIUS: f32 = 1.0;
const GLOW_RADIUS: f32 = 1.8;
/// Labels float this far above the surface before the per-city offset.
const LABEL_ALTITUDE: f32 = 5.0;

/// Root of a marker subtree.
#[derive(Component, Debug)]
pub struct CityMarker {
    pub id: CityId,
}

#[derive(Component)]
pub struct CityPoint;

#[derive(Component)]
pub struct CityGlow;

/// Cities to place on the globe at startup.
#[derive(Resource, Clone, Debug, Default)]
pub struct GlobeCities(pub Vec<CityRecord>);

/// A spawned marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerHandle {
    pub id: CityId,
    pub root: Entity,
    position: Vec3,
}

impl MarkerHandle {
    /// Globe-local position of the city point.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn record<'a>(&self, registry: &'a CityRegistry) -> Option<&'a CityRecord> {
        registry.record(self.id)
    }

    /// Despawns the marker subtree and forgets its registry entries.
    pub fn destroy(self, commands: &mut Commands, registry: &mut CityRegistry) {
        if registry.remove(self.id).is_none() {
            return;
        }
        if let Some(root) = commands.get_entity(self.root) {
            root.despawn_recursive();
        }
    }
}

/// Label position relative to the marker root.
pub fn label_local_position(record: &CityRecord, radius: f32) -> Vec3 {
    let position = lng_lat_to_vec3(record.lng, record.lat, radius);
    let label = lng_lat_to_vec3(record.lng, record.lat, radius + LABEL_ALTITUDE);
    label + record.label_offset_vec() - position
}

/// Builds one marker under `parent` and registers every node of it.
pub fn spawn_city_marker(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    registry: &mut CityRegistry,
    parent: Entity,
    record: CityRecord,
    radius: f32,
) -> MarkerHandle {
    let position = lng_lat_to_vec3(record.lng, record.lat, radius);
    let label_position = label_local_position(&record, radius);
    let color = record.color;
    let name = record.name.clone();

    let root = commands
        .spawn((Transform::from_translation(position), Visibility::default()))
        .id();
    let id = registry.insert(record, root, position);

    let point_mesh = meshes.add(Sphere::new(POINT_RADIUS).mesh().uv(16, 16));
    let glow_mesh = meshes.add(Sphere::new(GLOW_RADIUS).mesh().uv(16, 16));
    let point_material = materials::city_point_material(materials, color);
    let glow_material = materials::city_glow_material(materials, color);

    let mut nodes = Vec::with_capacity(4);
    commands
        .entity(root)
        .insert(CityMarker { id })
        .with_children(|marker| {
            nodes.push(
                marker
                    .spawn((
                        CityGlow,
                        Mesh3d(glow_mesh),
                        MeshMaterial3d(glow_material),
                        PickShape::Sphere {
                            radius: GLOW_RADIUS,
                        },
                    ))
                    .id(),
            );
            nodes.push(
                marker
                    .spawn((
                        CityPoint,
                        Mesh3d(point_mesh),
                        MeshMaterial3d(point_material),
                        PickShape::Sphere {
                            radius: POINT_RADIUS,
                        },
                    ))
                    .id(),
            );
            nodes.push(spawn_city_label(
                marker,
                &name,
                color_from_hex(color),
                label_position,
                PickShape::Billboard {
                    half_size: LABEL_HALF_SIZE,
                },
            ));
            nodes.push(
                marker
                    .spawn((
                        LabelConnector {
                            end: label_position,
                            color: color_from_hex(color).with_alpha(0.6),
                        },
                        Transform::IDENTITY,
                    ))
                    .id(),
            );
        });
    for node in nodes {
        registry.attach_node(id, node);
    }
    commands.entity(parent).add_child(root);

    MarkerHandle { id, root, position }
}

/// Startup system placing every [`GlobeCities`] entry on the globe.
pub fn spawn_city_markers(
    mut commands: Commands,
    cities: Res<GlobeCities>,
    config: Res<GlobeConfig>,
    mut registry: ResMut<CityRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    globe: Query<Entity, With<GlobeRoot>>,
) {
    let Ok(root) = globe.get_single() else {
        warn!("skyroute: no globe root, skipping {} cities", cities.0.len());
        return;
    };
    for record in cities.0.iter().cloned() {
        spawn_city_marker(
            &mut commands,
            &mut meshes,
            &mut materials,
            &mut registry,
            root,
            record,
            config.radius,
        );
    }
    info!("skyroute: placed {} cities", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    use crate::data::LabelOffset;
    use crate::scene::labels::CityLabel;

    fn marker_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<CityRegistry>();
        app
    }

    fn spawn_one(app: &mut App, record: CityRecord) -> MarkerHandle {
        let world = app.world_mut();
        let parent = world.spawn((GlobeRoot, Transform::IDENTITY)).id();
        let handle = world.run_system_once(
            move |mut commands: Commands,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>,
                  mut registry: ResMut<CityRegistry>| {
                spawn_city_marker(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    &mut registry,
                    parent,
                    record.clone(),
                    100.0,
                )
            },
        );
        handle.expect("marker system should run")
    }

    #[test]
    fn label_sits_above_point_plus_offset() {
        let record = CityRecord::new("Quito", 0.0, 0.0, 0xffffff)
            .with_label_offset(LabelOffset::new(0.0, 5.0, 0.0));
        let local = label_local_position(&record, 100.0);
        assert!((local - Vec3::new(5.0, 5.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn marker_builds_children_and_registers_them() {
        let mut app = marker_app();
        let handle = spawn_one(&mut app, CityRecord::new("Quito", 0.0, 0.0, 0x00ff00));

        assert!((handle.position() - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-3);

        let world = app.world();
        let children = world.get::<Children>(handle.root).expect("marker has children");
        assert_eq!(children.len(), 4);
        assert_eq!(world.get::<CityMarker>(handle.root).map(|m| m.id), Some(handle.id));

        let registry = world.resource::<CityRegistry>();
        assert_eq!(handle.record(registry).map(|r| r.name.as_str()), Some("Quito"));
        for child in children.iter() {
            assert_eq!(registry.city_for_node(*child), Some(handle.id));
        }
        let labels = children
            .iter()
            .filter(|child| world.get::<CityLabel>(**child).is_some())
            .count();
        assert_eq!(labels, 1);
    }

    #[test]
    fn destroy_removes_subtree_and_registry_entries() {
        let mut app = marker_app();
        let handle = spawn_one(&mut app, CityRecord::new("Quito", 0.0, 0.0, 0x00ff00));
        let children: Vec<Entity> = app
            .world()
            .get::<Children>(handle.root)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default();

        let world = app.world_mut();
        world
            .run_system_once(move |mut commands: Commands, mut registry: ResMut<CityRegistry>| {
                handle.destroy(&mut commands, &mut registry);
                handle.destroy(&mut commands, &mut registry);
            })
            .expect("destroy system should run");

        let world = app.world();
        assert!(!world.entities().contains(handle.root));
        for child in children {
            assert!(!world.entities().contains(child));
        }
        assert!(world.resource::<CityRegistry>().is_empty());
    }
}
