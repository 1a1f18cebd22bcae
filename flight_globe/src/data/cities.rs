//! Built-in city list used when no `GLOBE_CITIES` file is configured.

use crate::data::model::{CityRecord, LabelOffset};

const WHITE: u32 = 0xffffff;

/// Cities around the Pearl River and Yangtze deltas plus a few hubs, with
/// label offsets that keep neighbouring labels from overlapping.
pub fn default_cities() -> Vec<CityRecord> {
    vec![
        CityRecord::new("Shenzhen", 114.0579, 22.5431, WHITE),
        CityRecord::new("Beijing", 116.4, 39.9, WHITE)
            .with_label_offset(LabelOffset::new(5.0, 0.0, 0.0)),
        CityRecord::new("Shanghai", 121.4737, 31.2304, WHITE)
            .with_label_offset(LabelOffset::new(-5.0, 0.0, 0.0)),
        CityRecord::new("Xi'an", 108.9402, 34.3416, WHITE)
            .with_label_offset(LabelOffset::new(0.0, 5.0, 0.0)),
        CityRecord::new("Nanjing", 118.7969, 32.0603, WHITE)
            .with_label_offset(LabelOffset::new(8.0, 3.0, 0.0)),
        CityRecord::new("Hangzhou", 120.1551, 30.2741, WHITE)
            .with_label_offset(LabelOffset::new(0.0, -5.0, 0.0)),
        CityRecord::new("Dongguan", 113.7463, 23.0223, WHITE)
            .with_label_offset(LabelOffset::new(0.0, 0.0, 3.0)),
        CityRecord::new("Singapore", 103.8198, 1.3521, 0xffd166),
        CityRecord::new("London", -0.1276, 51.5072, 0x9be7ff),
        CityRecord::new("New York", -74.006, 40.7128, 0xff8fa3),
    ]
}
