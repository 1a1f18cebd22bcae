//! Minimal prelude for SDK consumers.

pub use crate::config::{city_records, globe_config, load_cities, ArcTiming, GlobeConfig};
pub use crate::data::{default_cities, CityId, CityRecord, LabelOffset};
pub use crate::interaction::{CityClicked, CityHover, HoverState};
pub use crate::scene::{
    ArcFinished, ArcHandle, ArcStarted, CityRegistry, DestroyArc, GlobeHandle, LaunchArc,
    MarkerHandle, RouteSchedule,
};
pub use crate::sdk::GlobeAppBuilder;
pub use crate::ui::PopupTracker;
