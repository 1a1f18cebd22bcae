//! Hover tooltip: city name and coordinates next to the pointer.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::interaction::HoverState;
use crate::scene::materials::color_from_hex;

const POINTER_OFFSET: egui::Vec2 = egui::vec2(14.0, 14.0);

pub fn tooltip_plugin(app: &mut App) {
    app.add_systems(Update, tooltip_system);
}

fn tooltip_system(mut contexts: EguiContexts, hover: Option<Res<HoverState>>) {
    let Some(hover) = hover else {
        return;
    };
    let (true, Some(city)) = (hover.visible, hover.city.as_ref()) else {
        return;
    };

    let accent = super::egui_color(color_from_hex(city.color));
    egui::Area::new(egui::Id::new("city_tooltip"))
        .fixed_pos(egui::pos2(hover.position.x, hover.position.y) + POINTER_OFFSET)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 230))
                .stroke(egui::Stroke::new(1.0, accent))
                .inner_margin(egui::Margin::same(8))
                .corner_radius(egui::CornerRadius::same(4))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&city.name).color(accent).strong());
                    ui.label(
                        egui::RichText::new(format_coordinates(city.lng, city.lat))
                            .monospace()
                            .color(egui::Color32::from_rgb(200, 220, 240)),
                    );
                });
        });
}

/// `lng, lat` in degrees as e.g. `22.54°N 114.06°E`.
pub fn format_coordinates(lng: f32, lat: f32) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lng < 0.0 { 'W' } else { 'E' };
    format!("{:.2}°{ns} {:.2}°{ew}", lat.abs(), lng.abs())
}
