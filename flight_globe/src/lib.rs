//! Flight globe: a 3D globe with city markers and animated flight arcs.
//!
//! Library root: scene builders, interaction, overlays and the SDK builder.

pub mod camera;
pub mod config;
pub mod data;
pub mod geo;
pub mod interaction;
pub mod scene;
pub mod ui;

pub mod prelude;
pub mod sdk;

pub use config::{ArcTiming, ConfigError, GlobeConfig};
pub use data::{CityId, CityRecord, LabelOffset};
pub use sdk::GlobeAppBuilder;
