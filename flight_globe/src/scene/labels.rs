//! City name labels and the dashed connectors tying them to their point.
//!
//! Labels are anchors in the scene; the text itself is painted by the egui
//! overlay at the projected anchor position.

use bevy::prelude::*;

use crate::interaction::{ray_sphere_distance, PickShape};
use crate::config::GlobeConfig;
use crate::scene::GlobeCamera;

/// Half size of the camera-facing pickable rectangle around a label anchor.
pub const LABEL_HALF_SIZE: Vec2 = Vec2::new(6.0, 1.5);

const DASH_SIZE: f32 = 0.5;
const GAP_SIZE: f32 = 0.3;
/// Beyond this many radii from the camera, labels are hidden.
const CULL_DISTANCE_RADII: f32 = 4.0;

/// Label anchor for a city name.
#[derive(Component, Debug)]
pub struct CityLabel {
    pub text: String,
    pub color: Color,
}

/// Dashed line from the marker origin to its label anchor.
#[derive(Component, Debug)]
pub struct LabelConnector {
    /// End point relative to the marker root.
    pub end: Vec3,
    pub color: Color,
}

/// Spawns a label anchor under a marker root.
pub fn spawn_city_label(
    parent: &mut ChildBuilder,
    text: &str,
    color: Color,
    local_position: Vec3,
    pick: PickShape,
) -> Entity {
    parent
        .spawn((
            CityLabel {
                text: text.to_string(),
                color,
            },
            pick,
            Transform::from_translation(local_position),
            Visibility::default(),
        ))
        .id()
}

pub fn label_plugin(app: &mut App) {
    app.add_systems(Update, (label_visibility_system, draw_connectors_system));
}

/// Splits `start..end` into dash segments of `dash` length separated by `gap`.
/// The last dash is cut short at `end`.
pub fn dash_segments(start: Vec3, end: Vec3, dash: f32, gap: f32) -> Vec<(Vec3, Vec3)> {
    let length = start.distance(end);
    if length <= f32::EPSILON || dash <= 0.0 {
        return Vec::new();
    }
    let dir = (end - start) / length;
    let step = dash + gap.max(0.0);

    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let stop = (offset + dash).min(length);
        segments.push((start + dir * offset, start + dir * stop));
        offset += step;
    }
    segments
}

/// True if the globe sits between `camera` and `point`.
pub fn occluded_by_globe(camera: Vec3, point: Vec3, radius: f32) -> bool {
    let to_point = point - camera;
    let distance = to_point.length();
    let Ok(direction) = Dir3::new(to_point) else {
        return false;
    };
    let ray = Ray3d::new(camera, direction);
    ray_sphere_distance(ray, Vec3::ZERO, radius).is_some_and(|hit| hit < distance - 1e-3)
}

/// Hides labels that are too far from the camera or behind the globe.
#[allow(clippy::type_complexity)]
pub fn label_visibility_system(
    camera_query: Query<&GlobalTransform, With<GlobeCamera>>,
    config: Res<GlobeConfig>,
    mut labels: Query<(&GlobalTransform, &mut Visibility), (With<CityLabel>, Without<GlobeCamera>)>,
) {
    let Ok(cam_tf) = camera_query.get_single() else {
        return;
    };
    let cam_pos = cam_tf.translation();
    let cull_distance = config.radius * CULL_DISTANCE_RADII;
    for (tf, mut vis) in &mut labels {
        let position = tf.translation();
        let hidden = position.distance(cam_pos) > cull_distance
            || occluded_by_globe(cam_pos, position, config.radius);
        vis.set_if_neq(if hidden {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        });
    }
}

fn draw_connectors_system(
    mut gizmos: Gizmos,
    connectors: Query<(&LabelConnector, &GlobalTransform)>,
) {
    for (connector, tf) in &connectors {
        let start = tf.translation();
        let end = tf.transform_point(connector.end);
        for (a, b) in dash_segments(start, end, DASH_SIZE, GAP_SIZE) {
            gizmos.line(a, b, connector.color);
        }
    }
}
