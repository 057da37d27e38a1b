//! Exposure-culled boxes: plain cubes, leaves, ice and snow layers.

use strata_blocks::{ShapeCategory, ids};
use strata_geom::Vec3;

use crate::emit::{BuildSink, LayerBatches, emit_box_faces};
use crate::input::BuildInput;
use crate::light::face_rgba;
use crate::tags::RenderState;
use crate::tint;

/// Cube blocks drawn with cutout transparency instead of as opaque.
const CUTOUT_CUBES: &[u16] = &[ids::GLASS, ids::STAINED_GLASS, ids::GLASS_PANE, ids::IRON_BARS];

/// Emits the exposed faces of a `[0,1]^3` box scaled to `top` in height, lit by
/// the cell each face looks into.
fn emit_exposed_cell(
    input: &BuildInput<'_>,
    sink: &mut impl BuildSink,
    state: RenderState,
    i: u32,
    top: f32,
) {
    let block = input.block_at(i);
    let (x, y, z) = input.coords(i);
    let cell = input.cell_origin(x, y, z);
    let max = cell + Vec3::new(1.0, top, 1.0);
    emit_box_faces(sink, state, cell, max, cell, |face| {
        if !input.exposed(face, i) {
            return None;
        }
        let (dx, dy, dz) = face.delta();
        let light = input.hood.light(x + dx, y + dy, z + dz);
        let rgba = face_rgba(light, face, tint::block(block, face));
        Some((input.textures.tile(block, face), rgba))
    });
}

pub(super) fn build_cubes(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Cube) {
        let state = if CUTOUT_CUBES.contains(&input.block_at(i).id) {
            RenderState::AlphaTest
        } else {
            RenderState::Opaque
        };
        emit_exposed_cell(input, sink, state, i, 1.0);
    }
}

pub(super) fn build_leaves(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Leaves) {
        emit_exposed_cell(input, sink, RenderState::AlphaTest, i, 1.0);
    }
}

pub(super) fn build_ice(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Ice) {
        emit_exposed_cell(input, sink, RenderState::Ice, i, 1.0);
    }
}

/// Snow layers rise in eighths of a block with the low three data bits.
pub(super) fn build_snow_layers(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::SnowLayer) {
        let layers = (input.block_at(i).data & 7) + 1;
        emit_exposed_cell(input, sink, RenderState::Opaque, i, f32::from(layers) / 8.0);
    }
}
