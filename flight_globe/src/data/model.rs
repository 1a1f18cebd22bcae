// City records as loaded from configuration or JSON.
// Everything Bevy-specific about a city lives in scene::markers.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// Offset applied to a city label relative to its default anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelOffset {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LabelOffset {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<LabelOffset> for Vec3 {
    fn from(offset: LabelOffset) -> Self {
        Vec3::new(offset.x, offset.y, offset.z)
    }
}

/// A single city: name, geographic position and display color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    /// Longitude in degrees, -180..=180.
    pub lng: f32,
    /// Latitude in degrees, -90..=90.
    pub lat: f32,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    #[serde(default, rename = "labelOffset", skip_serializing_if = "Option::is_none")]
    pub label_offset: Option<LabelOffset>,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, lng: f32, lat: f32, color: u32) -> Self {
        Self {
            name: name.into(),
            lng,
            lat,
            color,
            label_offset: None,
        }
    }

    pub fn with_label_offset(mut self, offset: LabelOffset) -> Self {
        self.label_offset = Some(offset);
        self
    }

    pub fn label_offset_vec(&self) -> Vec3 {
        self.label_offset.map(Vec3::from).unwrap_or(Vec3::ZERO)
    }
}

/// Index of a city inside the [`CityRegistry`](crate::scene::CityRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(pub usize);
