//! Flattened heightmap geometry for distant and overhead chunks: one top quad
//! per column, plus walls down to lower neighbor columns at `Low` detail.

use strata_blocks::Block;
use strata_chunk::CHUNK_SIZE;
use strata_geom::Vec3;

use crate::emit::{LayerBatches, emit_box_faces};
use crate::face::{Face, SIDE_NEIGHBORS};
use crate::input::BuildInput;
use crate::light::face_rgba;
use crate::tags::{DetailLevel, RenderState};
use crate::tint;

const HW: usize = CHUNK_SIZE + 2;

/// Height of the highest non-air cell of each column in the chunk and its
/// one-column border: `Some(-1)` for an empty column, `None` where the column
/// cannot be read.
fn column_heights(input: &BuildInput<'_>) -> Vec<Option<i32>> {
    let mut tops = vec![None; HW * HW];
    let n = CHUNK_SIZE as i32;
    let h = input.hood.height() as i32;
    for hz in 0..HW as i32 {
        for hx in 0..HW as i32 {
            let (x, z) = (hx - 1, hz - 1);
            if !(0..n).contains(&x) && !(0..n).contains(&z) {
                continue;
            }
            if input.hood.locate(x, 0, z).is_none() {
                continue;
            }
            let top = (0..h)
                .rev()
                .find(|&y| !input.hood.block(x, y, z).is_air())
                .unwrap_or(-1);
            tops[(hz as usize) * HW + hx as usize] = Some(top);
        }
    }
    tops
}

pub(super) fn build_low_detail(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    let tops = column_heights(input);
    let top_at = |x: i32, z: i32| tops[((z + 1) as usize) * HW + (x + 1) as usize];
    let walls = input.level == DetailLevel::Low;
    for z in 0..CHUNK_SIZE as i32 {
        for x in 0..CHUNK_SIZE as i32 {
            let y = match top_at(x, z) {
                Some(y) if y >= 0 => y,
                _ => continue,
            };
            let block: Block = input.hood.block(x, y, z);
            let cell = input.cell_origin(x, y, z);
            let top_light = input.hood.light(x, y + 1, z);
            emit_box_faces(
                sink,
                RenderState::LowDetail,
                cell,
                cell + Vec3::ONE,
                cell,
                |face| {
                    (face == Face::PosY).then(|| {
                        (
                            input.textures.tile(block, face),
                            face_rgba(top_light, face, tint::block(block, face)),
                        )
                    })
                },
            );
            if !walls {
                continue;
            }
            for &(dx, dz, side) in &SIDE_NEIGHBORS {
                // Unreadable neighbor columns get no wall.
                let Some(nb_top) = top_at(x + dx, z + dz) else {
                    continue;
                };
                if nb_top >= y {
                    continue;
                }
                let wall_min = Vec3::new(cell.x, (nb_top + 1) as f32, cell.z);
                let light = input.hood.light(x + dx, y, z + dz);
                emit_box_faces(
                    sink,
                    RenderState::LowDetail,
                    wall_min,
                    cell + Vec3::ONE,
                    cell,
                    |face| {
                        (face == side).then(|| {
                            (
                                input.textures.tile(block, face),
                                face_rgba(light, face, tint::block(block, face)),
                            )
                        })
                    },
                );
            }
        }
    }
}
