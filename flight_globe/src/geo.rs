//! Longitude/latitude and spherical coordinate conversion.

use std::f32::consts::PI;

use bevy::math::Vec3;

/// Converts a longitude/latitude pair (degrees) to a point on a sphere of `radius`.
///
/// Polar angle is measured from the north pole (`phi = 90° - lat`) and the
/// azimuth starts at the antimeridian (`theta = lng + 180°`). Out-of-range
/// input is not validated.
pub fn lng_lat_to_vec3(lng: f32, lat: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat) * (PI / 180.0);
    let theta = (lng + 180.0) * (PI / 180.0);

    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Standard spherical → Cartesian mapping (y up, theta around +y from +z).
pub fn spherical_to_vec3(radius: f32, phi: f32, theta: f32) -> Vec3 {
    let sin_phi_radius = phi.sin() * radius;
    Vec3::new(
        sin_phi_radius * theta.sin(),
        phi.cos() * radius,
        sin_phi_radius * theta.cos(),
    )
}
