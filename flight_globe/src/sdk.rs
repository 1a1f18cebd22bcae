//! SDK entry points and builder for composing the flight globe app.

use bevy::prelude::*;

use crate::camera::orbit_camera_plugin;
use crate::config::{self, GlobeConfig};
use crate::data::{default_cities, CityRecord};
use crate::interaction::hover_plugin;
use crate::scene::{
    arc_plugin, globe_plugin, label_plugin, route_plugin, setup_scene, spawn_city_markers,
    CityRegistry, GlobeCities,
};
use crate::ui::{
    egui_overlay_plugin, hud_plugin, label_text_plugin, popup_plugin, tooltip_plugin,
};

/// Builder for constructing a flight globe app with customizable plugins.
pub struct GlobeAppBuilder {
    config: GlobeConfig,
    cities: Vec<CityRecord>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_orbit_camera: bool,
    enable_hover: bool,
    enable_popups: bool,
    enable_routes: bool,
    enable_hud: bool,
}

impl Default for GlobeAppBuilder {
    fn default() -> Self {
        Self {
            config: GlobeConfig::default(),
            cities: default_cities(),
            window_title: "Skyroute".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::BLACK,
            enable_orbit_camera: true,
            enable_hover: true,
            enable_popups: true,
            enable_routes: true,
            enable_hud: true,
        }
    }
}

impl GlobeAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GlobeConfig) -> Self {
        self.config = config;
        self
    }

    /// Cities to place on the globe; the first one is the route hub.
    pub fn cities(mut self, cities: Vec<CityRecord>) -> Self {
        self.cities = cities;
        self
    }

    /// Load `.env`, then globe settings and the city list from environment variables.
    pub fn from_env(mut self) -> Self {
        if let Err(err) = dotenvy::dotenv() {
            debug!("skyroute: no .env loaded: {err}");
        }
        self.config = config::globe_config();
        self.cities = config::city_records();
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_orbit_camera(mut self) -> Self {
        self.enable_orbit_camera = false;
        self
    }

    pub fn disable_hover(mut self) -> Self {
        self.enable_hover = false;
        self
    }

    pub fn disable_popups(mut self) -> Self {
        self.enable_popups = false;
        self
    }

    pub fn disable_routes(mut self) -> Self {
        self.enable_routes = false;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        info!(
            "skyroute: building globe (radius {}, {} cities)",
            self.config.radius,
            self.cities.len()
        );

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(self.config)
        .insert_resource(GlobeCities(self.cities))
        .init_resource::<CityRegistry>()
        .add_plugins((globe_plugin, label_plugin, arc_plugin, egui_overlay_plugin))
        .add_plugins(label_text_plugin)
        .add_systems(Startup, (setup_scene, spawn_city_markers).chain());

        if self.enable_orbit_camera {
            app.add_plugins(orbit_camera_plugin);
        }
        if self.enable_hover {
            app.add_plugins((hover_plugin, tooltip_plugin));
        }
        if self.enable_popups {
            app.add_plugins(popup_plugin);
        }
        if self.enable_routes {
            app.add_plugins(route_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }

        app
    }
}
