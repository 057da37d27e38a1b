//! The closed table of chunk builders.
//!
//! Each shape category has exactly one builder, and the overlay and low-detail
//! builders sit beside them. A build pass runs every entry whose layer is being
//! rebuilt and whose level set contains the chunk's detail level.

mod cutout;
mod liquid;
mod low_detail;
mod overlay;
mod solid;
mod structure;

use strata_blocks::ShapeCategory;

use crate::emit::LayerBatches;
use crate::input::BuildInput;
use crate::mesh_build::VertexBatch;
use crate::tags::{DetailLevel, Layer, LayerSet, RenderState};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuilderKind {
    Cube,
    Plant,
    Torch,
    Rail,
    Ladder,
    Stairs,
    Slab,
    Fence,
    Vine,
    SnowLayer,
    Liquid,
    Ice,
    RedstoneWire,
    Leaves,
    Entities,
    Monsters,
    Items,
    TileEntities,
    TileTicks,
    TerrainPopulated,
    LowDetail,
}

pub type BuildFn = fn(&BuildInput<'_>, &mut LayerBatches);

pub struct BuilderSpec {
    pub kind: BuilderKind,
    pub name: &'static str,
    pub layer: Layer,
    levels: u8,
    /// State most of the builder's geometry lands in.
    pub state: RenderState,
    /// Shape category whose cells this builder owns, if any.
    pub shape: Option<ShapeCategory>,
    build: BuildFn,
}

impl BuilderSpec {
    #[inline]
    pub fn applies_at(&self, level: DetailLevel) -> bool {
        self.levels & level.bit() != 0
    }

    /// Builders that draw only exposed faces.
    pub fn uses_exposure(&self) -> bool {
        self.shape.is_some_and(|s| !s.is_fixed_geometry())
    }
}

impl std::fmt::Debug for BuilderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderSpec")
            .field("kind", &self.kind)
            .field("layer", &self.layer)
            .field("levels", &self.levels)
            .field("state", &self.state)
            .finish()
    }
}

const HIGH: u8 = 1 << DetailLevel::High as u8;
const LOW: u8 = 1 << DetailLevel::Low as u8;
const OVERHEAD: u8 = 1 << DetailLevel::Overhead as u8;
const ALL_LEVELS: u8 = HIGH | LOW | OVERHEAD;

const fn shape(
    kind: BuilderKind,
    name: &'static str,
    cat: ShapeCategory,
    state: RenderState,
    build: BuildFn,
) -> BuilderSpec {
    BuilderSpec {
        kind,
        name,
        layer: Layer::Blocks,
        levels: HIGH,
        state,
        shape: Some(cat),
        build,
    }
}

const fn overlay(
    kind: BuilderKind,
    name: &'static str,
    layer: Layer,
    levels: u8,
    state: RenderState,
    build: BuildFn,
) -> BuilderSpec {
    BuilderSpec {
        kind,
        name,
        layer,
        levels,
        state,
        shape: None,
        build,
    }
}

pub static BUILDERS: [BuilderSpec; 21] = [
    shape(BuilderKind::Cube, "cube", ShapeCategory::Cube, RenderState::Opaque, solid::build_cubes),
    shape(BuilderKind::Plant, "plant", ShapeCategory::Plant, RenderState::AlphaTest, cutout::build_plants),
    shape(BuilderKind::Torch, "torch", ShapeCategory::Torch, RenderState::AlphaTest, cutout::build_torches),
    shape(BuilderKind::Rail, "rail", ShapeCategory::Rail, RenderState::AlphaTest, cutout::build_rails),
    shape(BuilderKind::Ladder, "ladder", ShapeCategory::Ladder, RenderState::AlphaTest, cutout::build_ladders),
    shape(BuilderKind::Stairs, "stairs", ShapeCategory::Stairs, RenderState::Opaque, structure::build_stairs),
    shape(BuilderKind::Slab, "slab", ShapeCategory::Slab, RenderState::Opaque, structure::build_slabs),
    shape(BuilderKind::Fence, "fence", ShapeCategory::Fence, RenderState::Opaque, structure::build_fences),
    shape(BuilderKind::Vine, "vine", ShapeCategory::Vine, RenderState::Vine, cutout::build_vines),
    shape(BuilderKind::SnowLayer, "snow_layer", ShapeCategory::SnowLayer, RenderState::Opaque, solid::build_snow_layers),
    shape(BuilderKind::Liquid, "liquid", ShapeCategory::Liquid, RenderState::Water, liquid::build_liquids),
    shape(BuilderKind::Ice, "ice", ShapeCategory::Ice, RenderState::Ice, solid::build_ice),
    shape(BuilderKind::RedstoneWire, "redstone_wire", ShapeCategory::RedstoneWire, RenderState::AlphaTest, cutout::build_redstone),
    shape(BuilderKind::Leaves, "leaves", ShapeCategory::Leaves, RenderState::AlphaTest, solid::build_leaves),
    overlay(BuilderKind::Entities, "entities", Layer::Entities, ALL_LEVELS, RenderState::EntityOverlay, overlay::build_entities),
    overlay(BuilderKind::Monsters, "monsters", Layer::Monsters, ALL_LEVELS, RenderState::EntityOverlay, overlay::build_monsters),
    overlay(BuilderKind::Items, "items", Layer::Items, ALL_LEVELS, RenderState::EntityOverlay, overlay::build_items),
    overlay(BuilderKind::TileEntities, "tile_entities", Layer::TileEntities, ALL_LEVELS, RenderState::EntityOverlay, overlay::build_tile_entities),
    overlay(BuilderKind::TileTicks, "tile_ticks", Layer::TileTicks, HIGH, RenderState::EntityOverlay, overlay::build_tile_ticks),
    overlay(BuilderKind::TerrainPopulated, "terrain_populated", Layer::TerrainPopulated, HIGH | LOW, RenderState::AlphaBlend, overlay::build_unpopulated),
    overlay(BuilderKind::LowDetail, "low_detail", Layer::Blocks, LOW | OVERHEAD, RenderState::LowDetail, low_detail::build_low_detail),
];

/// Table entry for a builder kind.
pub fn spec(kind: BuilderKind) -> &'static BuilderSpec {
    // The table is ordered like the enum.
    &BUILDERS[kind as usize]
}

/// Builders to run for `layers` at `level`, in table order.
pub fn builders_for(level: DetailLevel, layers: LayerSet) -> impl Iterator<Item = &'static BuilderSpec> {
    BUILDERS
        .iter()
        .filter(move |b| b.applies_at(level) && layers.contains(b.layer))
}

/// One builder's contribution to a chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct BuilderOutput {
    pub kind: BuilderKind,
    pub layer: Layer,
    pub level: DetailLevel,
    pub batches: Vec<VertexBatch>,
}

impl BuilderOutput {
    pub fn byte_size(&self) -> usize {
        self.batches.iter().map(VertexBatch::byte_size).sum()
    }

    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(VertexBatch::quad_count).sum()
    }
}

/// Runs one builder; `None` when it produced no geometry.
pub fn run_builder(spec: &BuilderSpec, input: &BuildInput<'_>) -> Option<BuilderOutput> {
    if let Some(cat) = spec.shape {
        if input.cells.cells(cat).is_empty() {
            return None;
        }
    }
    let mut sink = LayerBatches::new(spec.layer);
    (spec.build)(input, &mut sink);
    let batches = sink.into_batches();
    if batches.is_empty() {
        return None;
    }
    let out = BuilderOutput {
        kind: spec.kind,
        layer: spec.layer,
        level: input.level,
        batches,
    };
    log::trace!(
        target: "mesh",
        "builder {} chunk=({}, {}) quads={}",
        spec.name,
        input.pos().cx,
        input.pos().cz,
        out.quad_count()
    );
    Some(out)
}

/// Runs every applicable builder for `layers` in one go.
pub fn build_layers(input: &BuildInput<'_>, layers: LayerSet) -> Vec<BuilderOutput> {
    builders_for(input.level, layers)
        .filter_map(|spec| run_builder(spec, input))
        .collect()
}
