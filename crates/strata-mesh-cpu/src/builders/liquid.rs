use strata_blocks::{ShapeCategory, ids};
use strata_chunk::MAX_LIGHT;
use strata_geom::Vec3;

use crate::emit::{LayerBatches, emit_box_faces};
use crate::input::BuildInput;
use crate::light::face_rgba;
use crate::tags::RenderState;
use crate::tint;

/// Surface height of a liquid cell: full under more liquid or when falling,
/// otherwise lowered with the flow level.
fn surface_height(level_data: u8, covered: bool) -> f32 {
    if covered || level_data & 8 != 0 {
        1.0
    } else {
        1.0 - f32::from((level_data & 7) + 1) / 9.0
    }
}

/// Water lands in the blended water state; lava is self-lit and opaque.
pub(super) fn build_liquids(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for &i in input.cells.cells(ShapeCategory::Liquid) {
        let block = input.block_at(i);
        let (x, y, z) = input.coords(i);
        let is_lava = matches!(block.id, ids::LAVA | ids::LAVA_FLOWING);
        let above = input.hood.block(x, y + 1, z);
        let covered = input.shapes.category(above.id) == ShapeCategory::Liquid;
        let top = surface_height(block.data, covered);
        let state = if is_lava {
            RenderState::Opaque
        } else {
            RenderState::Water
        };
        let cell = input.cell_origin(x, y, z);
        emit_box_faces(sink, state, cell, cell + Vec3::new(1.0, top, 1.0), cell, |face| {
            if !input.exposed(face, i) {
                return None;
            }
            let light = if is_lava {
                MAX_LIGHT
            } else {
                let (dx, dy, dz) = face.delta();
                input.hood.light(x + dx, y + dy, z + dz)
            };
            Some((
                input.textures.tile(block, face),
                face_rgba(light, face, tint::WHITE),
            ))
        });
    }
}
