//! Marker geometry built from chunk metadata only.

use strata_chunk::EntityKind;
use strata_geom::Vec3;

use crate::emit::{LayerBatches, emit_box_faces};
use crate::input::BuildInput;
use crate::tags::RenderState;
use crate::texture::AtlasTile;

const ENTITY_COLOR: [u8; 4] = [200, 200, 255, 255];
const MONSTER_COLOR: [u8; 4] = [255, 64, 64, 255];
const ITEM_COLOR: [u8; 4] = [255, 220, 64, 255];
const TILE_ENTITY_COLOR: [u8; 4] = [64, 220, 255, 255];
const TILE_TICK_COLOR: [u8; 4] = [255, 64, 255, 255];
const UNPOPULATED_COLOR: [u8; 4] = [255, 0, 0, 64];

fn solid_box(sink: &mut LayerBatches, state: RenderState, min: Vec3, max: Vec3, rgba: [u8; 4]) {
    emit_box_faces(sink, state, min, max, min, |_| Some((AtlasTile::FULL, rgba)));
}

fn entity_markers(input: &BuildInput<'_>, sink: &mut LayerBatches, kind: EntityKind) {
    let (half, height, rgba) = match kind {
        EntityKind::Item => (0.125, 0.25, ITEM_COLOR),
        EntityKind::Monster => (0.3, 1.8, MONSTER_COLOR),
        EntityKind::Other => (0.3, 1.8, ENTITY_COLOR),
    };
    for e in input.meta.entities.iter().filter(|e| e.kind == kind) {
        let min = Vec3::new(e.pos.x - half, e.pos.y, e.pos.z - half);
        let max = Vec3::new(e.pos.x + half, e.pos.y + height, e.pos.z + half);
        solid_box(sink, RenderState::EntityOverlay, min, max, rgba);
    }
}

pub(super) fn build_entities(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    entity_markers(input, sink, EntityKind::Other);
}

pub(super) fn build_monsters(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    entity_markers(input, sink, EntityKind::Monster);
}

pub(super) fn build_items(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    entity_markers(input, sink, EntityKind::Item);
}

/// Slightly inflated box around each tile entity's block.
pub(super) fn build_tile_entities(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    const PAD: f32 = 1.0 / 32.0;
    for te in &input.meta.tile_entities {
        let o = Vec3::new(te.x as f32, te.y as f32, te.z as f32);
        let min = o - Vec3::new(PAD, PAD, PAD);
        let max = o + Vec3::new(1.0 + PAD, 1.0 + PAD, 1.0 + PAD);
        solid_box(sink, RenderState::EntityOverlay, min, max, TILE_ENTITY_COLOR);
    }
}

/// Small cube in the middle of each block with a pending tick.
pub(super) fn build_tile_ticks(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    for t in &input.meta.tile_ticks {
        let c = Vec3::new(t.x as f32 + 0.5, t.y as f32 + 0.5, t.z as f32 + 0.5);
        let h = Vec3::new(0.1, 0.1, 0.1);
        solid_box(sink, RenderState::EntityOverlay, c - h, c + h, TILE_TICK_COLOR);
    }
}

/// Translucent column over chunks whose terrain population has not run.
pub(super) fn build_unpopulated(input: &BuildInput<'_>, sink: &mut LayerBatches) {
    if input.meta.terrain_populated {
        return;
    }
    let pos = input.pos();
    let min = Vec3::new(pos.base_x() as f32, 0.0, pos.base_z() as f32);
    let max = Vec3::new(
        min.x + strata_chunk::CHUNK_SIZE as f32,
        input.hood.height() as f32,
        min.z + strata_chunk::CHUNK_SIZE as f32,
    );
    solid_box(sink, RenderState::AlphaBlend, min, max, UNPOPULATED_COLOR);
}
