//! Flight arcs: quadratic bezier arcs between two cities that draw in, hold,
//! and erase themselves, then despawn.
//!
//! The animation is a plain state machine ([`ArcAnimation`]) advanced by
//! [`advance_arcs_system`] once per frame from `Time`. Cancelling an arc is
//! the same transition as finishing it, so nothing can touch its buffer
//! after it is destroyed.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::{ArcTiming, GlobeConfig};
use crate::data::CityId;
use crate::scene::materials::color_from_hex;
use crate::scene::{CityRegistry, GlobeRoot, RenderSurface};

/// Number of bezier segments; the polyline holds one more point.
pub const CURVE_SEGMENTS: usize = 100;
/// Progress scalars run from 0 to this value.
pub const PROGRESS_MAX: f32 = 100.0;

/// Below this the source/target midpoint is treated as the globe center.
const MIDPOINT_EPSILON: f32 = 1e-4;

/// Easing curves used by the arc phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
}

impl Easing {
    /// Maps normalized time `t` (clamped to [0, 1]) to eased progress.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Control point that lifts the arc away from the globe.
///
/// The midpoint is pushed outwards along its own direction to
/// `|mid| + angle * height_scale`, so widely separated cities get taller arcs.
/// Antipodal endpoints have no midpoint direction; the arc then bends along
/// an axis orthogonal to the source.
pub fn arc_control_point(source: Vec3, target: Vec3, height_scale: f32) -> Vec3 {
    let angle = source.angle_between(target);
    let angle = if angle.is_finite() { angle } else { 0.0 };
    let mid = (source + target) * 0.5;
    let height = mid.length() + angle * height_scale;

    let normal = if mid.length() > MIDPOINT_EPSILON {
        mid.normalize()
    } else {
        source
            .try_normalize()
            .map_or(Vec3::Y, |dir| dir.any_orthonormal_vector())
    };
    normal * height
}

fn quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// Samples `segments + 1` evenly spaced points of the arc from `source` to `target`.
pub fn sample_arc(source: Vec3, target: Vec3, height_scale: f32, segments: usize) -> Vec<Vec3> {
    let control = arc_control_point(source, target, height_scale);
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| quadratic_bezier(source, control, target, i as f32 / segments as f32))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcPhase {
    Idle,
    Appearing,
    Holding,
    Disappearing,
    Destroyed,
}

/// Lifecycle of a single arc.
#[derive(Debug, Clone)]
pub struct ArcAnimation {
    points: Vec<Vec3>,
    timing: ArcTiming,
    phase: ArcPhase,
    /// Time spent in the current phase.
    elapsed: Duration,
    draw_progress: f32,
    erase_progress: f32,
}

impl ArcAnimation {
    /// Creates an idle animation over a precomputed polyline.
    pub fn new(points: Vec<Vec3>, timing: ArcTiming) -> Self {
        Self {
            points,
            timing,
            phase: ArcPhase::Idle,
            elapsed: Duration::ZERO,
            draw_progress: 0.0,
            erase_progress: 0.0,
        }
    }

    pub fn between(source: Vec3, target: Vec3, height_scale: f32, timing: ArcTiming) -> Self {
        Self::new(
            sample_arc(source, target, height_scale, CURVE_SEGMENTS),
            timing,
        )
    }

    pub fn phase(&self) -> ArcPhase {
        self.phase
    }

    pub fn draw_progress(&self) -> f32 {
        self.draw_progress
    }

    pub fn erase_progress(&self) -> f32 {
        self.erase_progress
    }

    /// The full precomputed polyline (empty once destroyed).
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_destroyed(&self) -> bool {
        self.phase == ArcPhase::Destroyed
    }

    /// Idle → Appearing. No effect in any other phase.
    pub fn start(&mut self) {
        if self.phase == ArcPhase::Idle {
            self.enter(ArcPhase::Appearing);
        }
    }

    /// Releases the polyline and moves to `Destroyed`.
    /// Returns `false` if the arc was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.phase == ArcPhase::Destroyed {
            return false;
        }
        self.phase = ArcPhase::Destroyed;
        self.points = Vec::new();
        true
    }

    /// Advances the animation by `dt`, carrying leftover time across phase
    /// boundaries. Returns the phase after the update.
    pub fn update(&mut self, dt: Duration) -> ArcPhase {
        let mut remaining = dt;
        loop {
            match self.phase {
                ArcPhase::Idle | ArcPhase::Destroyed => break,
                ArcPhase::Appearing => {
                    let duration = self.timing.appear;
                    let leftover = self.advance(remaining, duration);
                    self.draw_progress =
                        PROGRESS_MAX * Easing::QuadOut.apply(fraction(self.elapsed, duration));
                    let Some(leftover) = leftover else { break };
                    remaining = leftover;
                    self.enter(ArcPhase::Holding);
                }
                ArcPhase::Holding => {
                    let Some(leftover) = self.advance(remaining, self.timing.hold) else {
                        break;
                    };
                    remaining = leftover;
                    self.enter(ArcPhase::Disappearing);
                }
                ArcPhase::Disappearing => {
                    let duration = self.timing.disappear;
                    let leftover = self.advance(remaining, duration);
                    self.erase_progress =
                        PROGRESS_MAX * Easing::QuadIn.apply(fraction(self.elapsed, duration));
                    if leftover.is_none() {
                        break;
                    }
                    self.destroy();
                }
            }
        }
        self.phase
    }

    /// The part of the polyline currently drawn.
    pub fn visible_points(&self) -> &[Vec3] {
        match self.phase {
            ArcPhase::Idle | ArcPhase::Destroyed => &[],
            ArcPhase::Appearing | ArcPhase::Holding => {
                &self.points[..progress_index(self.draw_progress, self.points.len())]
            }
            ArcPhase::Disappearing => {
                &self.points[progress_index(self.erase_progress, self.points.len())..]
            }
        }
    }

    fn enter(&mut self, phase: ArcPhase) {
        self.phase = phase;
        self.elapsed = Duration::ZERO;
    }

    /// Adds `dt` to the phase clock. Returns the unused time once the phase
    /// is complete.
    fn advance(&mut self, dt: Duration, duration: Duration) -> Option<Duration> {
        self.elapsed += dt;
        if self.elapsed >= duration {
            let leftover = self.elapsed - duration;
            self.elapsed = duration;
            Some(leftover)
        } else {
            None
        }
    }
}

fn fraction(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// `floor(progress)` clamped to `0..=len`.
fn progress_index(progress: f32, len: usize) -> usize {
    if progress.is_nan() || progress <= 0.0 {
        return 0;
    }
    (progress.floor() as usize).min(len)
}

/// A live arc entity, parented to the globe root.
#[derive(Component)]
pub struct FlightArc {
    pub animation: ArcAnimation,
    pub source: CityId,
    pub target: CityId,
    pub color: Color,
}

/// Handle to a spawned arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArcHandle(pub Entity);

impl ArcHandle {
    pub fn entity(&self) -> Entity {
        self.0
    }

    /// True once the arc is destroyed or its entity is gone.
    pub fn is_destroyed(&self, world: &World) -> bool {
        world
            .get::<FlightArc>(self.0)
            .is_none_or(|arc| arc.animation.is_destroyed())
    }

    /// Requests destruction. Safe to call any number of times, including
    /// after the arc finished on its own.
    pub fn destroy(&self, commands: &mut Commands) {
        commands.send_event(DestroyArc(self.0));
    }
}

/// Request to animate an arc from `source` to `target`.
#[derive(Event, Clone, Copy, Debug)]
pub struct LaunchArc {
    pub source: CityId,
    pub target: CityId,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct ArcStarted {
    pub arc: ArcHandle,
    pub source: CityId,
    pub target: CityId,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct ArcFinished {
    pub arc: ArcHandle,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct DestroyArc(pub Entity);

/// Gizmo group for arc line strips, so their width is configured apart
/// from debug gizmos.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct ArcGizmos;

/// Arc lifecycle without drawing: events and the systems that advance,
/// cancel and despawn arcs.
pub fn arc_lifecycle_plugin(app: &mut App) {
    app.add_event::<LaunchArc>()
        .add_event::<ArcStarted>()
        .add_event::<ArcFinished>()
        .add_event::<DestroyArc>()
        .add_systems(
            Update,
            (
                launch_arcs_system,
                destroy_requests_system,
                advance_arcs_system,
                despawn_finished_arcs_system,
            )
                .chain(),
        );
}

/// Lifecycle plus gizmo rendering.
pub fn arc_plugin(app: &mut App) {
    arc_lifecycle_plugin(app);
    app.init_gizmo_group::<ArcGizmos>().add_systems(
        Update,
        (
            arc_line_width_system,
            draw_arcs_system.after(advance_arcs_system),
        ),
    );
}

/// Spawns an arc entity under `parent` and starts its animation.
pub fn spawn_flight_arc(
    commands: &mut Commands,
    parent: Entity,
    source: (CityId, Vec3),
    target: (CityId, Vec3),
    config: &GlobeConfig,
) -> ArcHandle {
    let mut animation = ArcAnimation::between(
        source.1,
        target.1,
        config.arc_height_scale,
        config.arc_timing,
    );
    animation.start();

    let entity = commands
        .spawn((
            FlightArc {
                animation,
                source: source.0,
                target: target.0,
                color: color_from_hex(config.arc_color),
            },
            Transform::IDENTITY,
            Visibility::default(),
        ))
        .id();
    commands.entity(parent).add_child(entity);
    ArcHandle(entity)
}

fn launch_arcs_system(
    mut commands: Commands,
    mut requests: EventReader<LaunchArc>,
    mut started: EventWriter<ArcStarted>,
    registry: Res<CityRegistry>,
    config: Res<GlobeConfig>,
    globe: Query<Entity, With<GlobeRoot>>,
) {
    if requests.is_empty() {
        return;
    }
    let Ok(root) = globe.get_single() else {
        warn!("skyroute: no globe root, dropping arc requests");
        requests.clear();
        return;
    };

    for request in requests.read() {
        let (Some(source_pos), Some(target_pos)) = (
            registry.position(request.source),
            registry.position(request.target),
        ) else {
            warn!(
                "skyroute: arc between unknown cities {:?} -> {:?}",
                request.source, request.target
            );
            continue;
        };

        let arc = spawn_flight_arc(
            &mut commands,
            root,
            (request.source, source_pos),
            (request.target, target_pos),
            &config,
        );
        debug!("skyroute: arc {:?} started", arc.entity());
        started.send(ArcStarted {
            arc,
            source: request.source,
            target: request.target,
        });
    }
}

fn destroy_requests_system(mut requests: EventReader<DestroyArc>, mut arcs: Query<&mut FlightArc>) {
    for DestroyArc(entity) in requests.read() {
        if let Ok(mut arc) = arcs.get_mut(*entity) {
            arc.animation.destroy();
        }
    }
}

/// Advances every arc by the frame delta.
pub fn advance_arcs_system(time: Res<Time>, mut arcs: Query<&mut FlightArc>) {
    let dt = time.delta();
    for mut arc in &mut arcs {
        arc.animation.update(dt);
    }
}

fn despawn_finished_arcs_system(
    mut commands: Commands,
    arcs: Query<(Entity, &FlightArc)>,
    mut finished: EventWriter<ArcFinished>,
) {
    for (entity, arc) in &arcs {
        if arc.animation.is_destroyed() {
            commands.entity(entity).despawn_recursive();
            finished.send(ArcFinished {
                arc: ArcHandle(entity),
            });
        }
    }
}

fn draw_arcs_system(mut gizmos: Gizmos<ArcGizmos>, arcs: Query<(&FlightArc, &GlobalTransform)>) {
    for (arc, transform) in &arcs {
        let points = arc.animation.visible_points();
        if points.len() < 2 {
            continue;
        }
        gizmos.linestrip(
            points.iter().map(|point| transform.transform_point(*point)),
            arc.color,
        );
    }
}

/// Keeps the arc line width in step with the window scale factor.
fn arc_line_width_system(
    surface: Res<RenderSurface>,
    config: Res<GlobeConfig>,
    mut store: ResMut<GizmoConfigStore>,
) {
    if !surface.is_changed() && !config.is_changed() {
        return;
    }
    let (gizmo_config, _) = store.config_mut::<ArcGizmos>();
    gizmo_config.line_width = config.arc_line_width * surface.scale_factor;
    gizmo_config.line_joints = GizmoLineJoint::Round(4);
}
