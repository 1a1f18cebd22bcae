//! Globe configuration, env parsing, and city list loading.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use bevy::log::warn;
use bevy::prelude::Resource;
use thiserror::Error;

use crate::data::{default_cities, CityRecord};

pub const DEFAULT_RADIUS: f32 = 100.0;
const DEFAULT_WORLD_MAP: &str = "textures/worldmap.png";

const RADIUS_ENV: &str = "GLOBE_RADIUS";
const APPEAR_ENV: &str = "GLOBE_ARC_APPEAR_MS";
const HOLD_ENV: &str = "GLOBE_ARC_HOLD_MS";
const DISAPPEAR_ENV: &str = "GLOBE_ARC_DISAPPEAR_MS";
const ROUTE_INTERVAL_ENV: &str = "GLOBE_ROUTE_INTERVAL_MS";
const WORLD_MAP_ENV: &str = "GLOBE_WORLD_MAP";
const CITIES_ENV: &str = "GLOBE_CITIES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error("failed to read city list {}: {source}", path.display())]
    ReadCities {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse city list {}: {source}", path.display())]
    ParseCities {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durations of the three arc phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArcTiming {
    pub appear: Duration,
    pub hold: Duration,
    pub disappear: Duration,
}

impl Default for ArcTiming {
    fn default() -> Self {
        Self {
            appear: Duration::from_millis(2000),
            hold: Duration::from_millis(3000),
            disappear: Duration::from_millis(2000),
        }
    }
}

impl ArcTiming {
    pub fn from_millis(appear: u64, hold: u64, disappear: u64) -> Self {
        Self {
            appear: Duration::from_millis(appear),
            hold: Duration::from_millis(hold),
            disappear: Duration::from_millis(disappear),
        }
    }

    pub fn total(&self) -> Duration {
        self.appear + self.hold + self.disappear
    }
}

/// Everything tunable about the globe scene.
#[derive(Resource, Clone, Debug)]
pub struct GlobeConfig {
    pub radius: f32,
    pub arc_timing: ArcTiming,
    pub arc_color: u32,
    /// Bulge added per radian of angular separation.
    pub arc_height_scale: f32,
    /// Arc line width in logical pixels.
    pub arc_line_width: f32,
    pub popup_duration: Duration,
    /// Vertical popup offset in pixels; negative is up.
    pub popup_offset_y: f32,
    pub particle_samples: u32,
    pub particle_brightness_threshold: f32,
    /// Asset path of the world map used for the particle field.
    pub world_map: String,
    pub route_interval: Duration,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            arc_timing: ArcTiming::default(),
            arc_color: 0x00aaff,
            arc_height_scale: 70.0,
            arc_line_width: 1.5,
            popup_duration: Duration::from_millis(5000),
            popup_offset_y: -80.0,
            particle_samples: 250,
            particle_brightness_threshold: 50.0,
            world_map: DEFAULT_WORLD_MAP.to_string(),
            route_interval: Duration::from_millis(1500),
        }
    }
}

impl GlobeConfig {
    /// Camera orbit limits derived from the radius.
    pub fn min_camera_distance(&self) -> f32 {
        self.radius * 1.2
    }

    pub fn max_camera_distance(&self) -> f32 {
        self.radius * 5.0
    }
}

/// Builds a [`GlobeConfig`] from `GLOBE_*` env vars.
/// Unset vars keep their defaults; invalid ones are logged and ignored.
pub fn globe_config() -> GlobeConfig {
    let mut config = GlobeConfig::default();

    apply_env(RADIUS_ENV, |radius: f32| {
        if radius > 0.0 {
            config.radius = radius;
        } else {
            warn!("skyroute: {RADIUS_ENV} must be positive, keeping {DEFAULT_RADIUS}");
        }
    });
    apply_env(APPEAR_ENV, |ms: u64| {
        config.arc_timing.appear = Duration::from_millis(ms)
    });
    apply_env(HOLD_ENV, |ms: u64| {
        config.arc_timing.hold = Duration::from_millis(ms)
    });
    apply_env(DISAPPEAR_ENV, |ms: u64| {
        config.arc_timing.disappear = Duration::from_millis(ms)
    });
    apply_env(ROUTE_INTERVAL_ENV, |ms: u64| {
        config.route_interval = Duration::from_millis(ms)
    });
    if let Ok(path) = std::env::var(WORLD_MAP_ENV) {
        config.world_map = path;
    }

    config
}

fn apply_env<T: FromStr>(var: &'static str, apply: impl FnOnce(T)) {
    match env_number(var) {
        Ok(Some(value)) => apply(value),
        Ok(None) => {}
        Err(err) => warn!("skyroute: {err}"),
    }
}

fn env_number<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { var, raw })
}

/// Reads a JSON array of [`CityRecord`]s.
pub fn load_cities(path: &Path) -> Result<Vec<CityRecord>, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadCities {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ConfigError::ParseCities {
        path: path.to_path_buf(),
        source,
    })
}

/// City list from `GLOBE_CITIES`, falling back to the built-in list.
pub fn city_records() -> Vec<CityRecord> {
    let Ok(raw) = std::env::var(CITIES_ENV) else {
        return default_cities();
    };
    match load_cities(Path::new(&raw)) {
        Ok(cities) => cities,
        Err(err) => {
            warn!("skyroute: {err}, using built-in cities");
            default_cities()
        }
    }
}
