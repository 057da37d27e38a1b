use std::sync::Arc;

use strata_blocks::{Block, MaterialClassifier, ShapeTable, VisibilityPolicy, ids};
use strata_chunk::{ChunkArrays, ChunkMeta, ChunkPos, EntityKind, EntityMarker, TileEntityMarker};
use strata_geom::Vec3;
use strata_mesh_cpu::{
    BuilderKind, BuilderOutput, DetailLevel, GridAtlas, Layer, LayerSet, MeshContext,
    Neighborhood, RenderState, build_chunk,
};

struct Fixture {
    shapes: ShapeTable,
    classifier: MaterialClassifier,
    atlas: GridAtlas,
}

impl Fixture {
    fn new() -> Self {
        let shapes = ShapeTable::new();
        let classifier = MaterialClassifier::new(&shapes);
        Self {
            shapes,
            classifier,
            atlas: GridAtlas::terrain(),
        }
    }

    fn ctx(&self) -> MeshContext<'_> {
        MeshContext {
            shapes: &self.shapes,
            classifier: &self.classifier,
            textures: &self.atlas,
            policy: VisibilityPolicy::Normal,
        }
    }

    fn build(&self, arrays: ChunkArrays, level: DetailLevel) -> Vec<BuilderOutput> {
        let hood = Neighborhood::new(Arc::new(arrays), true);
        let meta = ChunkMeta {
            terrain_populated: true,
            ..ChunkMeta::default()
        };
        build_chunk(&self.ctx(), &hood, &meta, level, LayerSet::ALL)
    }
}

fn quads_of(outs: &[BuilderOutput], kind: BuilderKind) -> usize {
    outs.iter()
        .filter(|o| o.kind == kind)
        .map(BuilderOutput::quad_count)
        .sum()
}

#[test]
fn single_isolated_block_has_six_faces() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 16);
    a.set_local(0, 0, 0, Block::plain(ids::STONE));
    let outs = f.build(a, DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Cube), 6);
    let cube = outs.iter().find(|o| o.kind == BuilderKind::Cube).unwrap();
    assert!(cube.batches.iter().all(|b| b.state == RenderState::Opaque));
    assert!(cube.batches.iter().all(|b| b.layer == Layer::Blocks));
}

#[test]
fn two_touching_stones_cull_shared_faces() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 16);
    a.set_local(0, 0, 0, Block::plain(ids::STONE));
    a.set_local(1, 0, 0, Block::plain(ids::STONE));
    let outs = f.build(a, DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Cube), 10);
}

#[test]
fn dirt_against_stone_is_culled_but_glass_is_not() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 8);
    a.set_local(4, 4, 4, Block::plain(ids::STONE));
    a.set_local(5, 4, 4, Block::plain(ids::DIRT));
    let outs = f.build(a.clone(), DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Cube), 10);

    a.set_local(5, 4, 4, Block::plain(ids::GLASS));
    let outs = f.build(a, DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Cube), 12);
    let cube = outs.iter().find(|o| o.kind == BuilderKind::Cube).unwrap();
    let states: Vec<_> = cube.batches.iter().map(|b| b.state).collect();
    assert_eq!(states, vec![RenderState::Opaque, RenderState::AlphaTest]);
}

#[test]
fn fixed_shapes_emit_even_when_enclosed() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 8);
    for y in 0..3 {
        for z in 3..6 {
            for x in 3..6 {
                a.set_local(x, y, z, Block::plain(ids::STONE));
            }
        }
    }
    a.set_local(4, 1, 4, Block::plain(ids::TORCH));
    let outs = f.build(a, DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Torch), 6);
}

#[test]
fn plants_are_double_sided_crosses() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 8);
    a.set_local(2, 1, 2, Block::new(ids::TALL_GRASS, 1));
    let outs = f.build(a, DetailLevel::High);
    assert_eq!(quads_of(&outs, BuilderKind::Plant), 4);
}

#[test]
fn rebuilding_is_idempotent() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(3, -2), 12);
    for (i, id) in [ids::STONE, ids::WATER, ids::LEAVES, ids::SLAB, ids::FENCE, ids::VINE]
        .into_iter()
        .enumerate()
    {
        a.set_local(i * 2, 3, 7, Block::new(id, 3));
    }
    let first = f.build(a.clone(), DetailLevel::High);
    let second = f.build(a, DetailLevel::High);
    assert_eq!(first, second);
}

#[test]
fn low_detail_replaces_shape_builders() {
    let f = Fixture::new();
    let mut a = ChunkArrays::new_air(ChunkPos::new(0, 0), 8);
    for z in 0..16 {
        for x in 0..16 {
            a.set_local(x, 2, z, Block::plain(ids::GRASS));
        }
    }
    a.set_local(7, 3, 7, Block::plain(ids::STONE));

    let low = f.build(a.clone(), DetailLevel::Low);
    assert!(low.iter().all(|o| o.kind != BuilderKind::Cube));
    let ld = low.iter().find(|o| o.kind == BuilderKind::LowDetail).unwrap();
    assert!(ld.batches.iter().all(|b| b.state == RenderState::LowDetail));
    // 256 tops plus one wall per side of the raised column.
    assert_eq!(ld.quad_count(), 256 + 4);

    let over = f.build(a, DetailLevel::Overhead);
    assert_eq!(quads_of(&over, BuilderKind::LowDetail), 256);
}

#[test]
fn overlays_read_metadata_only() {
    let f = Fixture::new();
    let hood = Neighborhood::new(Arc::new(ChunkArrays::new_air(ChunkPos::new(0, 0), 8)), true);
    let meta = ChunkMeta {
        entities: vec![
            EntityMarker {
                pos: Vec3::new(3.0, 1.0, 3.0),
                kind: EntityKind::Monster,
            },
            EntityMarker {
                pos: Vec3::new(5.0, 1.0, 5.0),
                kind: EntityKind::Item,
            },
        ],
        tile_entities: vec![TileEntityMarker {
            x: 1,
            y: 1,
            z: 1,
            id: "Chest".into(),
        }],
        tile_ticks: vec![],
        terrain_populated: false,
    };
    let outs = build_chunk(&f.ctx(), &hood, &meta, DetailLevel::Low, LayerSet::ALL);
    let kinds: Vec<_> = outs.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BuilderKind::Monsters,
            BuilderKind::Items,
            BuilderKind::TileEntities,
            BuilderKind::TerrainPopulated,
        ]
    );
    let unpop = outs.last().unwrap();
    assert_eq!(unpop.batches[0].state, RenderState::AlphaBlend);
    assert_eq!(unpop.layer, Layer::TerrainPopulated);
}

#[test]
fn empty_chunk_produces_no_outputs() {
    let f = Fixture::new();
    let outs = f.build(ChunkArrays::new_air(ChunkPos::new(0, 0), 8), DetailLevel::High);
    assert!(outs.is_empty());
}
