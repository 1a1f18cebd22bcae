//! HUD overlay: cities, arcs in flight, hovered city, FPS counter.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::interaction::HoverState;
use crate::scene::{ArcFinished, ArcStarted, CityRegistry, FlightArc};

/// Live HUD counters, refreshed every frame.
#[derive(Resource, Debug, Default)]
pub struct HudState {
    pub cities: usize,
    pub arcs_in_flight: usize,
    pub arcs_launched: u64,
    pub arcs_finished: u64,
    pub last_route: Option<(String, String)>,
}

impl HudState {
    pub fn record_started(&mut self, source: &str, target: &str) {
        self.arcs_launched += 1;
        self.last_route = Some((source.to_string(), target.to_string()));
    }

    pub fn record_finished(&mut self) {
        self.arcs_finished += 1;
    }
}

pub fn hud_plugin(app: &mut App) {
    if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
        app.add_plugins(FrameTimeDiagnosticsPlugin);
    }
    app.init_resource::<HudState>()
        .add_systems(Update, (hud_stats_system, hud_overlay_system).chain());
}

fn hud_stats_system(
    mut hud: ResMut<HudState>,
    registry: Res<CityRegistry>,
    arcs: Query<&FlightArc>,
    mut started: EventReader<ArcStarted>,
    mut finished: EventReader<ArcFinished>,
) {
    for event in started.read() {
        let name = |id| registry.record(id).map_or("?", |r| r.name.as_str());
        hud.record_started(name(event.source), name(event.target));
    }
    for _ in finished.read() {
        hud.record_finished();
    }
    hud.cities = registry.len();
    hud.arcs_in_flight = arcs.iter().filter(|arc| !arc.animation.is_destroyed()).count();
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    hud: Res<HudState>,
    hover: Option<Res<HoverState>>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);

    egui::Window::new("Flight Globe")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 210))
                .inner_margin(egui::Margin::same(12))
                .corner_radius(egui::CornerRadius::same(6)),
        )
        .show(contexts.ctx_mut(), |ui| {
            ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));

            ui.label(
                egui::RichText::new(format!("{} cities", hud.cities))
                    .size(16.0)
                    .color(egui::Color32::from_rgb(100, 220, 180)),
            );
            ui.add_space(4.0);

            ui.label(format!("Arcs in flight  {}", hud.arcs_in_flight));
            ui.label(format!(
                "Launched {}  Finished {}",
                hud.arcs_launched, hud.arcs_finished
            ));
            if let Some((source, target)) = &hud.last_route {
                ui.label(format!("Last  {}", format_route(source, target)));
            }
            if let Some(city) = hover.as_ref().and_then(|h| h.city.as_ref()) {
                ui.label(format!("Hover {}", city.name));
            }
            ui.add_space(4.0);

            ui.separator();
            ui.label(format!("FPS  {fps:.0}"));
        });
}

fn format_route(source: &str, target: &str) -> String {
    format!("{source} → {target}")
}
