//! Stable tag colors.
//!
//! A tag's color depends only on its text: FNV-1a over the UTF-8 bytes picks
//! one of [`PALETTE_SIZE`] evenly spaced hues.

use ratatui::style::Color;

pub const PALETTE_SIZE: u32 = 360;

const SATURATION: f32 = 0.6;
const LIGHTNESS: f32 = 0.55;

pub fn fnv1a(text: &str) -> u32 {
    let mut hash = 2166136261u32;
    for byte in text.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

pub fn palette_index(tag: &str) -> u32 {
    fnv1a(tag) % PALETTE_SIZE
}

pub fn color_for(tag: &str) -> Color {
    let hue = palette_index(tag) as f32 * (360.0 / PALETTE_SIZE as f32);
    hsl_to_rgb(hue, SATURATION, LIGHTNESS)
}

fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> Color {
    let hue = hue.rem_euclid(360.0);
    let c = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r1, g1, b1) = if h < 1.0 {
        (c, x, 0.0)
    } else if h < 2.0 {
        (x, c, 0.0)
    } else if h < 3.0 {
        (0.0, c, x)
    } else if h < 4.0 {
        (0.0, x, c)
    } else if h < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let m = light - c / 2.0;
    let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(channel(r1), channel(g1), channel(b1))
}
