//! Skyroute: flight routes on a 3D globe. Runs the flight_globe app.

use bevy::prelude::*;
use flight_globe::{config, GlobeAppBuilder};

fn main() {
    let _ = dotenvy::dotenv();

    GlobeAppBuilder::new()
        .config(config::globe_config())
        .cities(config::city_records())
        .window_title("Skyroute")
        .clear_color(Color::srgb(0.0, 0.0, 0.02))
        .build()
        .run();
}
