//! Shared constants for strata-mesh-cpu.

pub(crate) const OPAQUE_ALPHA: u8 = 255;
/// Visual-only lighting floor to avoid pitch-black faces in darkness.
pub(crate) const VISUAL_LIGHT_MIN: u8 = 18; // ~7% brightness floor
/// Per-level falloff of the brightness curve.
pub(crate) const LIGHT_FALLOFF: f32 = 0.8;

/// One sixteenth of a block, the unit most sub-cube shapes are laid out in.
pub(crate) const PX: f32 = 1.0 / 16.0;
