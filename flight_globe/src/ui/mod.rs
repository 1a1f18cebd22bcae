mod hud;
mod labels;
mod popups;
mod tooltip;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPreUpdateSet};

use crate::interaction::PointerCapture;

pub use hud::{hud_plugin, HudState};
pub use labels::label_text_plugin;
pub use popups::{
    great_circle_km, popup_plugin, project_to_screen, PopupEntry, PopupTracker, ScreenPoint,
    ScreenProjector,
};
pub use tooltip::{format_coordinates, tooltip_plugin};

/// Adds the egui plugin once, whichever overlay asks first, and keeps
/// [`PointerCapture`] in sync with the overlay panels.
pub fn egui_overlay_plugin(app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
        app.add_plugins(EguiPlugin);
    }
    app.init_resource::<PointerCapture>().add_systems(
        PreUpdate,
        pointer_capture_system.after(EguiPreUpdateSet::BeginPass),
    );
}

fn pointer_capture_system(mut contexts: EguiContexts, mut capture: ResMut<PointerCapture>) {
    let over_ui = contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.is_pointer_over_area() || ctx.wants_pointer_input());
    capture.set_if_neq(PointerCapture { over_ui });
}

fn egui_color(color: Color) -> egui::Color32 {
    let [r, g, b, a] = color.to_srgba().to_u8_array();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}
