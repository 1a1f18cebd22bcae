//! City name text, painted at each label anchor's screen position with a
//! dark outline so it reads over both the globe and space.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::scene::{CityLabel, GlobeCamera, RenderSurface};
use crate::ui::popups::ScreenProjector;

const FONT_SIZE: f32 = 13.0;
const OUTLINE: [egui::Vec2; 4] = [
    egui::vec2(-1.0, 0.0),
    egui::vec2(1.0, 0.0),
    egui::vec2(0.0, -1.0),
    egui::vec2(0.0, 1.0),
];

pub fn label_text_plugin(app: &mut App) {
    app.add_systems(Update, paint_labels_system);
}

fn paint_labels_system(
    mut contexts: EguiContexts,
    surface: Res<RenderSurface>,
    cameras: Query<(&Projection, &GlobalTransform), With<GlobeCamera>>,
    labels: Query<(&CityLabel, &GlobalTransform, &Visibility)>,
) {
    let Ok((projection, cam_tf)) = cameras.get_single() else {
        return;
    };
    let projector = ScreenProjector::from_camera(projection, cam_tf, surface.size());
    let painter = contexts.ctx_mut().layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("city_labels"),
    ));
    let font = egui::FontId::proportional(FONT_SIZE);

    for (label, tf, visibility) in &labels {
        if *visibility == Visibility::Hidden {
            continue;
        }
        let screen = projector.project(tf.translation());
        if !screen.visible {
            continue;
        }
        let at = egui::pos2(screen.x, screen.y);
        for offset in OUTLINE {
            painter.text(
                at + offset,
                egui::Align2::CENTER_CENTER,
                &label.text,
                font.clone(),
                egui::Color32::BLACK,
            );
        }
        painter.text(
            at,
            egui::Align2::CENTER_CENTER,
            &label.text,
            font.clone(),
            super::egui_color(label.color),
        );
    }
}
