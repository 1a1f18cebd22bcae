mod cities;
mod model;

pub use cities::default_cities;
pub use model::{CityId, CityRecord, LabelOffset};
