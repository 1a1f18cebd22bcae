pub(crate) mod arcs;
pub(crate) mod globe;
pub(crate) mod labels;
pub(crate) mod markers;
pub(crate) mod materials;
mod registry;
mod routes;

pub use arcs::{
    arc_lifecycle_plugin, arc_plugin, spawn_flight_arc, ArcAnimation, ArcFinished, ArcHandle,
    ArcPhase, ArcStarted, DestroyArc, Easing, FlightArc, LaunchArc, CURVE_SEGMENTS,
};
pub use globe::{
    globe_plugin, setup_scene, spawn_globe, GlobeCamera, GlobeHandle, GlobeRoot, ParticleField,
    RenderSurface,
};
pub use labels::{label_plugin, CityLabel};
pub use markers::{spawn_city_marker, spawn_city_markers, CityMarker, GlobeCities, MarkerHandle};
pub use registry::CityRegistry;
pub use routes::{hub_routes, route_plugin, RouteSchedule};
