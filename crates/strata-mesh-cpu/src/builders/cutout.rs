//! Thin fixed shapes drawn regardless of exposure: plants, torches, rails,
//! ladders, vines and redstone wire. All take the light of their own cell.

use strata_blocks::{Block, ShapeCategory, ids};
use strata_geom::Vec3;

use crate::constants::PX;
use crate::emit::{LayerBatches, emit_box_faces, emit_quad};
use crate::face::Face;
use crate::input::BuildInput;
use crate::light::{face_rgba, flat_rgba};
use crate::tags::RenderState;
use crate::tint;

/// Cells of `cat` with their block, local coordinates and world origin.
fn cells_of<'a>(
    input: &'a BuildInput<'_>,
    cat: ShapeCategory,
) -> impl Iterator<Item = (Block, (i32, i32, i32), Vec3)> + 'a {
    input.cells.cells(cat).iter().map(move |&i| {
        let (x, y, z) = input.coords(i);
        (input.block_at(i), (x, y, z), input.cell_origin(x, y, z))
    })
}

/// Two crossed vertical planes through the cell diagonals.
pub(super) fn build_plants(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    let d = std::f32::consts::FRAC_1_SQRT_2;
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::Plant) {
        let rgba = flat_rgba(input.hood.light(x, y, z), tint::block(block, Face::PosY));
        let tile = input.textures.tile(block, Face::PosX);
        let top = o.y + 1.0;
        emit_quad(
            sink,
            RenderState::AlphaTest,
            [
                Vec3::new(o.x, top, o.z),
                Vec3::new(o.x + 1.0, top, o.z + 1.0),
                Vec3::new(o.x + 1.0, o.y, o.z + 1.0),
                Vec3::new(o.x, o.y, o.z),
            ],
            Vec3::new(d, 0.0, -d),
            &tile,
            rgba,
            true,
        );
        emit_quad(
            sink,
            RenderState::AlphaTest,
            [
                Vec3::new(o.x, top, o.z + 1.0),
                Vec3::new(o.x + 1.0, top, o.z),
                Vec3::new(o.x + 1.0, o.y, o.z),
                Vec3::new(o.x, o.y, o.z + 1.0),
            ],
            Vec3::new(d, 0.0, d),
            &tile,
            rgba,
            true,
        );
    }
}

/// A 2×10 pixel stick, leaning off the wall it is attached to.
pub(super) fn build_torches(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::Torch) {
        let light = input.hood.light(x, y, z);
        let (ox, oz, lift) = match block.data & 7 {
            1 => (-5.0 * PX, 0.0, 3.0 * PX),
            2 => (5.0 * PX, 0.0, 3.0 * PX),
            3 => (0.0, -5.0 * PX, 3.0 * PX),
            4 => (0.0, 5.0 * PX, 3.0 * PX),
            _ => (0.0, 0.0, 0.0),
        };
        let c = Vec3::new(o.x + 0.5 + ox, o.y + lift, o.z + 0.5 + oz);
        let min = Vec3::new(c.x - PX, c.y, c.z - PX);
        let max = Vec3::new(c.x + PX, c.y + 10.0 * PX, c.z + PX);
        emit_box_faces(sink, RenderState::AlphaTest, min, max, o, |face| {
            Some((input.textures.tile(block, face), face_rgba(light, face, tint::WHITE)))
        });
    }
}

/// Flat track one pixel above the floor; ascending shapes slope up one block.
pub(super) fn build_rails(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::Rail) {
        let rgba = flat_rgba(input.hood.light(x, y, z), tint::WHITE);
        let tile = input.textures.tile(block, Face::PosY);
        // Powered and detector rails keep a power flag in the high bit.
        let shape = if block.id == ids::RAIL {
            block.data
        } else {
            block.data & 7
        };
        let lo = o.y + PX;
        let hi = lo + 1.0;
        // Heights at the (-x,-z), (+x,-z), (+x,+z), (-x,+z) corners.
        let (h00, h10, h11, h01) = match shape {
            2 => (lo, hi, hi, lo),
            3 => (hi, lo, lo, hi),
            4 => (hi, hi, lo, lo),
            5 => (lo, lo, hi, hi),
            _ => (lo, lo, lo, lo),
        };
        let normal = match shape {
            2 => Vec3::new(-1.0, 1.0, 0.0),
            3 => Vec3::new(1.0, 1.0, 0.0),
            4 => Vec3::new(0.0, 1.0, 1.0),
            5 => Vec3::new(0.0, 1.0, -1.0),
            _ => Vec3::new(0.0, 1.0, 0.0),
        };
        emit_quad(
            sink,
            RenderState::AlphaTest,
            [
                Vec3::new(o.x, h00, o.z),
                Vec3::new(o.x + 1.0, h10, o.z),
                Vec3::new(o.x + 1.0, h11, o.z + 1.0),
                Vec3::new(o.x, h01, o.z + 1.0),
            ],
            normal,
            &tile,
            rgba,
            false,
        );
    }
}

/// Vertical quad one pixel off a cell wall, facing into the cell.
fn wall_quad(o: Vec3, facing: Face, inset: f32) -> ([Vec3; 4], Vec3) {
    let (x0, x1, y0, y1, z0, z1) = (o.x, o.x + 1.0, o.y, o.y + 1.0, o.z, o.z + 1.0);
    let corners = match facing {
        Face::NegZ => {
            let z = z1 - inset;
            [
                Vec3::new(x1, y1, z),
                Vec3::new(x0, y1, z),
                Vec3::new(x0, y0, z),
                Vec3::new(x1, y0, z),
            ]
        }
        Face::PosZ => {
            let z = z0 + inset;
            [
                Vec3::new(x0, y1, z),
                Vec3::new(x1, y1, z),
                Vec3::new(x1, y0, z),
                Vec3::new(x0, y0, z),
            ]
        }
        Face::NegX => {
            let x = x1 - inset;
            [
                Vec3::new(x, y1, z0),
                Vec3::new(x, y1, z1),
                Vec3::new(x, y0, z1),
                Vec3::new(x, y0, z0),
            ]
        }
        Face::PosX => {
            let x = x0 + inset;
            [
                Vec3::new(x, y1, z1),
                Vec3::new(x, y1, z0),
                Vec3::new(x, y0, z0),
                Vec3::new(x, y0, z1),
            ]
        }
        Face::NegY => {
            let y = y1 - inset;
            [
                Vec3::new(x0, y, z0),
                Vec3::new(x1, y, z0),
                Vec3::new(x1, y, z1),
                Vec3::new(x0, y, z1),
            ]
        }
        Face::PosY => {
            let y = y0 + inset;
            [
                Vec3::new(x0, y, z0),
                Vec3::new(x1, y, z0),
                Vec3::new(x1, y, z1),
                Vec3::new(x0, y, z1),
            ]
        }
    };
    (corners, facing.normal())
}

/// Ladders face away from the wall named by their data value (2..=5).
pub(super) fn build_ladders(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::Ladder) {
        let facing = match block.data {
            3 => Face::PosZ,
            4 => Face::NegX,
            5 => Face::PosX,
            _ => Face::NegZ,
        };
        let (corners, n) = wall_quad(o, facing, PX);
        let rgba = flat_rgba(input.hood.light(x, y, z), tint::WHITE);
        let tile = input.textures.tile(block, facing);
        emit_quad(sink, RenderState::AlphaTest, corners, n, &tile, rgba, false);
    }
}

/// One double-sided sheet per attached side bit; no bits hangs from the ceiling.
pub(super) fn build_vines(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    const SIDES: [(u8, Face); 4] = [
        (1, Face::NegZ),
        (2, Face::PosX),
        (4, Face::PosZ),
        (8, Face::NegX),
    ];
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::Vine) {
        let rgba = flat_rgba(input.hood.light(x, y, z), tint::block(block, Face::PosY));
        let tile = input.textures.tile(block, Face::PosX);
        let bits = block.data & 0x0f;
        if bits == 0 {
            let (corners, n) = wall_quad(o, Face::NegY, PX);
            emit_quad(sink, RenderState::Vine, corners, n, &tile, rgba, true);
            continue;
        }
        for (bit, facing) in SIDES {
            if bits & bit != 0 {
                let (corners, n) = wall_quad(o, facing, PX);
                emit_quad(sink, RenderState::Vine, corners, n, &tile, rgba, true);
            }
        }
    }
}

/// Flat dust just above the floor, tinted by power level.
pub(super) fn build_redstone(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for (block, (x, y, z), o) in cells_of(input, ShapeCategory::RedstoneWire) {
        let rgba = flat_rgba(input.hood.light(x, y, z), tint::redstone(block.data & 0x0f));
        let tile = input.textures.tile(block, Face::PosY);
        let (corners, n) = wall_quad(o, Face::PosY, PX / 4.0);
        emit_quad(sink, RenderState::AlphaTest, corners, n, &tile, rgba, false);
    }
}
