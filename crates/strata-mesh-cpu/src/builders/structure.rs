//! Fixed sub-cube solids: slabs, stairs and fences.

use strata_blocks::{Block, ShapeCategory};
use strata_geom::Vec3;

use crate::constants::PX;
use crate::emit::{LayerBatches, emit_box_faces};
use crate::face::{Face, SIDE_NEIGHBORS};
use crate::input::BuildInput;
use crate::light::face_rgba;
use crate::tags::RenderState;
use crate::tint;

/// Emits every face of each `(min, max)` box given in cell-local units.
fn emit_boxes(
    input: &BuildInput<'_>,
    sink: &mut LayerBatches,
    block: Block,
    light: u8,
    o: Vec3,
    boxes: &[(Vec3, Vec3)],
) {
    for &(lo, hi) in boxes {
        emit_box_faces(sink, RenderState::Opaque, o + lo, o + hi, o, |face| {
            Some((
                input.textures.tile(block, face),
                face_rgba(light, face, tint::WHITE),
            ))
        });
    }
}

/// Half-height box for a slab; the `8` data bit puts it in the upper half.
fn half_box(upper: bool) -> (Vec3, Vec3) {
    if upper {
        (Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0))
    } else {
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 1.0))
    }
}

pub(super) fn build_slabs(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Slab) {
        let block = input.block_at(i);
        let (x, y, z) = input.coords(i);
        let o = input.cell_origin(x, y, z);
        let light = input.hood.light(x, y, z);
        emit_boxes(input, sink, block, light, o, &[half_box(block.data & 8 != 0)]);
    }
}

/// Stair boxes: a half-height base plus a quarter step on the ascending side.
/// Data bits 0..2 pick the ascending direction (east, west, south, north); bit
/// 2 flips the stair upside down.
pub(crate) fn stair_boxes(data: u8) -> [(Vec3, Vec3); 2] {
    let upside_down = data & 4 != 0;
    let base = half_box(upside_down);
    let (y0, y1) = if upside_down { (0.0, 0.5) } else { (0.5, 1.0) };
    let (x0, x1, z0, z1) = match data & 3 {
        0 => (0.5, 1.0, 0.0, 1.0),
        1 => (0.0, 0.5, 0.0, 1.0),
        2 => (0.0, 1.0, 0.5, 1.0),
        _ => (0.0, 1.0, 0.0, 0.5),
    };
    [base, (Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))]
}

pub(super) fn build_stairs(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Stairs) {
        let block = input.block_at(i);
        let (x, y, z) = input.coords(i);
        let o = input.cell_origin(x, y, z);
        let light = input.hood.light(x, y, z);
        emit_boxes(input, sink, block, light, o, &stair_boxes(block.data));
    }
}

/// Whether a fence reaches toward `nb`: other fences and full cubes connect.
fn fence_connects(input: &BuildInput<'_>, nb: Block) -> bool {
    matches!(
        input.shapes.category(nb.id),
        ShapeCategory::Fence | ShapeCategory::Cube
    )
}

/// Center post and two rails per connected side.
pub(crate) fn fence_boxes(connected: [bool; 4]) -> Vec<(Vec3, Vec3)> {
    let mut boxes = vec![(
        Vec3::new(6.0 * PX, 0.0, 6.0 * PX),
        Vec3::new(10.0 * PX, 1.0, 10.0 * PX),
    )];
    for (k, &(_, _, face)) in SIDE_NEIGHBORS.iter().enumerate() {
        if !connected[k] {
            continue;
        }
        let (x0, x1, z0, z1) = match face {
            Face::NegX => (0.0, 6.0 * PX, 7.0 * PX, 9.0 * PX),
            Face::PosX => (10.0 * PX, 1.0, 7.0 * PX, 9.0 * PX),
            Face::NegZ => (7.0 * PX, 9.0 * PX, 0.0, 6.0 * PX),
            _ => (7.0 * PX, 9.0 * PX, 10.0 * PX, 1.0),
        };
        for (y0, y1) in [(6.0 * PX, 9.0 * PX), (12.0 * PX, 15.0 * PX)] {
            boxes.push((Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1)));
        }
    }
    boxes
}

pub(super) fn build_fences(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Fence) {
        let block = input.block_at(i);
        let (x, y, z) = input.coords(i);
        let o = input.cell_origin(x, y, z);
        let light = input.hood.light(x, y, z);
        let mut connected = [false; 4];
        for (k, &(dx, dz, _)) in SIDE_NEIGHBORS.iter().enumerate() {
            connected[k] = fence_connects(input, input.hood.block(x + dx, y, z + dz));
        }
        emit_boxes(input, sink, block, light, o, &fence_boxes(connected));
    }
}
