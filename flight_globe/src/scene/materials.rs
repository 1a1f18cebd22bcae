//! Shared material and color helpers for the globe, markers and arcs.

use bevy::prelude::*;
use bevy::render::render_resource::Face;

pub const GLOBE_COLOR: u32 = 0x2266cc;
pub const PARTICLE_COLOR: u32 = 0x00ddff;
pub const GLOW_INNER_COLOR: u32 = 0xd7fcf6;
pub const GLOW_OUTER_COLOR: u32 = 0xd1bdff;

/// Unpacks `0xRRGGBB` into an sRGB color.
pub fn color_from_hex(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

pub fn color_from_hex_alpha(hex: u32, alpha: f32) -> Color {
    color_from_hex(hex).with_alpha(alpha)
}

/// Diffuse, non-shiny globe surface.
pub fn globe_material(materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color_from_hex(GLOBE_COLOR),
        perceptual_roughness: 1.0,
        reflectance: 0.0,
        ..default()
    })
}

pub fn particle_material(materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color_from_hex_alpha(PARTICLE_COLOR, 0.3),
        alpha_mode: AlphaMode::Add,
        unlit: true,
        ..default()
    })
}

/// One additive layer of the halo disc behind the globe.
pub fn glow_disc_material(
    materials: &mut Assets<StandardMaterial>,
    color: u32,
) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color_from_hex_alpha(color, 0.5),
        alpha_mode: AlphaMode::Add,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    })
}

pub fn city_point_material(
    materials: &mut Assets<StandardMaterial>,
    color: u32,
) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color_from_hex_alpha(color, 0.9),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    })
}

/// Translucent shell drawn from the inside, so it reads as a halo.
pub fn city_glow_material(
    materials: &mut Assets<StandardMaterial>,
    color: u32,
) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color_from_hex_alpha(color, 0.3),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: Some(Face::Front),
        ..default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        let color = color_from_hex(0x00aaff).to_srgba();
        assert_eq!(color.red, 0.0);
        assert!((color.green - 170.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.blue, 1.0);
        assert_eq!(color.alpha, 1.0);

        let translucent = color_from_hex_alpha(0xffffff, 0.3).to_srgba();
        assert!((translucent.alpha - 0.3).abs() < 1e-6);
    }
}
