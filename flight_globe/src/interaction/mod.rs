mod hover;
mod pick;

pub use hover::{
    hover_plugin, CityClicked, CityHover, HoverController, HoverState, PointerCapture,
};
pub use pick::{
    camera_ray, intersect, pick_city, pointer_to_ndc, ray_billboard_distance, ray_from_ndc,
    ray_sphere_distance, PickShape,
};
