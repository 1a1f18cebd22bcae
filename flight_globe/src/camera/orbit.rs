//! Orbit camera: left-drag rotates around the origin, wheel zooms. No panning.

use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::config::GlobeConfig;
use crate::interaction::PointerCapture;

/// Pitch stays this far from the poles.
const POLE_MARGIN: f32 = 0.01;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 0.95;
/// Fraction of the pending rotation applied per 60 Hz frame.
const DAMPING: f32 = 0.1;
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    /// Rotation (yaw, pitch) still to be applied.
    pending: Vec2,
}

impl OrbitCamera {
    /// Starts on the +Z axis at three radii, matching the bootstrap camera.
    pub fn new(config: &GlobeConfig) -> Self {
        let min_distance = config.min_camera_distance();
        let max_distance = config.max_camera_distance();
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: (config.radius * 3.0).clamp(min_distance, max_distance),
            min_distance,
            max_distance,
            damping: DAMPING,
            pending: Vec2::ZERO,
        }
    }

    /// Queues rotation for a pointer drag of `delta` pixels.
    pub fn apply_drag(&mut self, delta: Vec2) {
        self.pending += Vec2::new(-delta.x, delta.y) * ROTATE_SPEED;
    }

    /// Zooms by `lines` wheel lines; positive zooms in.
    pub fn apply_zoom(&mut self, lines: f32) {
        self.distance =
            (self.distance * ZOOM_STEP.powf(lines)).clamp(self.min_distance, self.max_distance);
    }

    pub fn is_settled(&self) -> bool {
        self.pending.length_squared() < 1e-10
    }

    /// Applies the damped share of the pending rotation for a frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.pending = Vec2::ZERO;
            return;
        }
        let share = if self.damping >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - self.damping.max(0.0)).powf(dt * 60.0)
        };
        let applied = self.pending * share;
        self.pending -= applied;
        self.yaw += applied.x;
        let limit = FRAC_PI_2 - POLE_MARGIN;
        self.pitch = (self.pitch + applied.y).clamp(-limit, limit);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(Vec3::ZERO, Vec3::Y)
    }
}

pub fn orbit_camera_plugin(app: &mut App) {
    app.init_resource::<PointerCapture>()
        .add_systems(Update, (orbit_input_system, orbit_step_system).chain());
}

fn orbit_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    capture: Res<PointerCapture>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let lines: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_LINE,
        })
        .sum();
    if capture.over_ui {
        return;
    }

    for mut orbit in &mut cameras {
        if mouse.pressed(MouseButton::Left) && drag != Vec2::ZERO {
            orbit.apply_drag(drag);
        }
        if lines != 0.0 {
            orbit.apply_zoom(lines);
        }
    }
}

fn orbit_step_system(time: Res<Time>, mut cameras: Query<(&mut OrbitCamera, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut orbit, mut transform) in &mut cameras {
        orbit.step(dt);
        let next = orbit.transform();
        if *transform != next {
            *transform = next;
        }
    }
}
