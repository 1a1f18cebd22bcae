//! Route popups: a short-lived card above the source city of every new arc.

use std::time::Duration;

use bevy::prelude::*;
use bevy::render::camera::CameraProjection;
use bevy_egui::{egui, EguiContexts};

use crate::config::GlobeConfig;
use crate::data::CityRecord;
use crate::scene::{ArcStarted, CityRegistry, GlobeCamera, GlobeRoot, RenderSurface};

/// Screen position of a projected world point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// In front of the camera and inside the depth range.
    pub visible: bool,
}

/// Projects `world` through `clip_from_world` onto a surface of `size` pixels.
pub fn project_to_screen(clip_from_world: Mat4, world: Vec3, size: Vec2) -> ScreenPoint {
    let clip = clip_from_world * world.extend(1.0);
    if clip.w <= 0.0 {
        return ScreenPoint {
            x: 0.0,
            y: 0.0,
            visible: false,
        };
    }
    let ndc = clip.truncate() / clip.w;
    ScreenPoint {
        x: (ndc.x + 1.0) / 2.0 * size.x,
        y: (1.0 - ndc.y) / 2.0 * size.y,
        visible: (0.0..=1.0).contains(&ndc.z),
    }
}

/// Camera view-projection paired with the surface it renders to.
#[derive(Clone, Copy, Debug)]
pub struct ScreenProjector {
    clip_from_world: Mat4,
    size: Vec2,
}

impl ScreenProjector {
    pub fn new(clip_from_world: Mat4, size: Vec2) -> Self {
        Self {
            clip_from_world,
            size,
        }
    }

    pub fn from_camera(projection: &Projection, camera: &GlobalTransform, size: Vec2) -> Self {
        let mut projection = projection.clone();
        projection.update(size.x.max(1.0), size.y.max(1.0));
        let clip_from_world = projection.get_clip_from_view() * camera.compute_matrix().inverse();
        Self::new(clip_from_world, size)
    }

    pub fn project(&self, world: Vec3) -> ScreenPoint {
        project_to_screen(self.clip_from_world, world, self.size)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopupEntry {
    pub id: String,
    pub position: Vec2,
    pub visible: bool,
    pub source: CityRecord,
    pub target: CityRecord,
    /// World position of the source city.
    pub source_position: Vec3,
    /// App clock time the popup was shown.
    pub created_at: Duration,
}

/// Live popups in the order they were shown.
#[derive(Resource, Debug)]
pub struct PopupTracker {
    entries: Vec<PopupEntry>,
    counter: u64,
    duration: Duration,
    offset_y: f32,
}

impl Default for PopupTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), -80.0)
    }
}

impl PopupTracker {
    pub fn new(duration: Duration, offset_y: f32) -> Self {
        Self {
            entries: Vec::new(),
            counter: 0,
            duration,
            offset_y,
        }
    }

    pub fn from_config(config: &GlobeConfig) -> Self {
        Self::new(config.popup_duration, config.popup_offset_y)
    }

    pub fn entries(&self) -> &[PopupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a popup above `source_position` after dropping expired ones.
    pub fn show(
        &mut self,
        source: CityRecord,
        target: CityRecord,
        source_position: Vec3,
        projector: &ScreenProjector,
        now: Duration,
    ) -> &PopupEntry {
        self.cleanup_expired(now);

        self.counter += 1;
        let screen = projector.project(source_position);
        self.entries.push(PopupEntry {
            id: format!("popup_{}", self.counter),
            position: Vec2::new(screen.x, screen.y + self.offset_y),
            visible: screen.visible,
            source,
            target,
            source_position,
            created_at: now,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Drops popups shown more than the popup duration ago. Returns how many went.
    pub fn cleanup_expired(&mut self, now: Duration) -> usize {
        let before = self.entries.len();
        let duration = self.duration;
        self.entries
            .retain(|entry| now.saturating_sub(entry.created_at) <= duration);
        before - self.entries.len()
    }

    pub fn hide_all(&mut self) {
        self.entries.clear();
    }

    /// Re-projects every popup; visibility follows the depth test.
    pub fn update_positions(&mut self, projector: &ScreenProjector) {
        for entry in &mut self.entries {
            let screen = projector.project(entry.source_position);
            entry.position = Vec2::new(screen.x, screen.y + self.offset_y);
            entry.visible = screen.visible;
        }
    }
}

pub fn popup_plugin(app: &mut App) {
    app.init_resource::<PopupTracker>()
        .add_systems(Startup, init_popup_tracker)
        .add_systems(
            Update,
            (
                show_route_popups_system,
                track_popups_system,
                draw_popups_system,
            )
                .chain(),
        );
}

fn init_popup_tracker(mut commands: Commands, config: Res<GlobeConfig>) {
    commands.insert_resource(PopupTracker::from_config(&config));
}

fn active_projector(
    cameras: &Query<(&Projection, &GlobalTransform), With<GlobeCamera>>,
    surface: &RenderSurface,
) -> Option<ScreenProjector> {
    let (projection, cam_tf) = cameras.get_single().ok()?;
    Some(ScreenProjector::from_camera(projection, cam_tf, surface.size()))
}

fn show_route_popups_system(
    mut started: EventReader<ArcStarted>,
    time: Res<Time>,
    registry: Res<CityRegistry>,
    surface: Res<RenderSurface>,
    cameras: Query<(&Projection, &GlobalTransform), With<GlobeCamera>>,
    globe: Query<&GlobalTransform, With<GlobeRoot>>,
    mut tracker: ResMut<PopupTracker>,
) {
    if started.is_empty() {
        return;
    }
    let Some(projector) = active_projector(&cameras, &surface) else {
        started.clear();
        return;
    };
    let globe_tf = globe.get_single().copied().unwrap_or_default();

    for event in started.read() {
        let (Some(source), Some(target), Some(local)) = (
            registry.record(event.source),
            registry.record(event.target),
            registry.position(event.source),
        ) else {
            continue;
        };
        let popup = tracker.show(
            source.clone(),
            target.clone(),
            globe_tf.transform_point(local),
            &projector,
            time.elapsed(),
        );
        debug!("skyroute: {} {} -> {}", popup.id, popup.source.name, popup.target.name);
    }
}

fn track_popups_system(
    time: Res<Time>,
    surface: Res<RenderSurface>,
    cameras: Query<(&Projection, &GlobalTransform), With<GlobeCamera>>,
    mut tracker: ResMut<PopupTracker>,
) {
    if tracker.is_empty() {
        return;
    }
    tracker.cleanup_expired(time.elapsed());
    if let Some(projector) = active_projector(&cameras, &surface) {
        tracker.update_positions(&projector);
    }
}

fn draw_popups_system(mut contexts: EguiContexts, tracker: Res<PopupTracker>) {
    let ctx = contexts.ctx_mut();
    for popup in tracker.entries().iter().filter(|p| p.visible) {
        egui::Area::new(egui::Id::new(&popup.id))
            .fixed_pos(egui::pos2(popup.position.x, popup.position.y))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::default()
                    .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 220))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 170, 255)))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(egui::CornerRadius::same(6))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} → {}",
                                popup.source.name, popup.target.name
                            ))
                            .color(egui::Color32::from_rgb(100, 220, 180))
                            .strong(),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "{} km",
                                great_circle_km(&popup.source, &popup.target).round()
                            ))
                            .monospace()
                            .color(egui::Color32::from_rgb(200, 220, 240)),
                        );
                    });
            });
    }
}

const EARTH_RADIUS_KM: f32 = 6371.0;

/// Great-circle distance between two cities.
pub fn great_circle_km(a: &CityRecord, b: &CityRecord) -> f32 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(0.0, 1.0).asin()
}
