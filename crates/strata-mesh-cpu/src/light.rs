//! Light level to vertex color conversion.

use strata_chunk::MAX_LIGHT;

use crate::constants::{LIGHT_FALLOFF, OPAQUE_ALPHA, VISUAL_LIGHT_MIN};
use crate::face::Face;

/// Brightness `0.8^(15 - l)` scaled to a byte, never below the visual floor.
#[inline]
pub fn brightness(level: u8) -> u8 {
    let l = level.min(MAX_LIGHT);
    let v = 255.0 * LIGHT_FALLOFF.powi(i32::from(MAX_LIGHT - l));
    (v.round() as u8).max(VISUAL_LIGHT_MIN)
}

#[inline]
fn scale(channel: u8, f: f32) -> u8 {
    (channel as f32 * f).round().clamp(0.0, 255.0) as u8
}

/// Vertex color for a face: brightness, directional shade and tint multiplied.
#[inline]
pub fn face_rgba(level: u8, face: Face, tint: [u8; 3]) -> [u8; 4] {
    let b = brightness(level) as f32 / 255.0 * face.shade();
    [
        scale(tint[0], b),
        scale(tint[1], b),
        scale(tint[2], b),
        OPAQUE_ALPHA,
    ]
}

/// Vertex color without directional shade, for fixed cutout shapes.
#[inline]
pub fn flat_rgba(level: u8, tint: [u8; 3]) -> [u8; 4] {
    let b = brightness(level) as f32 / 255.0;
    [
        scale(tint[0], b),
        scale(tint[1], b),
        scale(tint[2], b),
        OPAQUE_ALPHA,
    ]
}
