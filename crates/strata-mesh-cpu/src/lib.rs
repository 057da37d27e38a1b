//! CPU meshing crate: face exposure, per-shape builders and vertex batches.
#![forbid(unsafe_code)]

pub mod builders;
mod constants;
pub mod emit;
pub mod exposure;
pub mod face;
pub mod input;
pub mod light;
pub mod mesh_build;
pub mod neighbors;
pub mod tags;
pub mod texture;
pub mod tint;

use strata_blocks::{MaterialClassifier, ShapeTable, VisibilityPolicy};
use strata_chunk::ChunkMeta;

pub use builders::{BUILDERS, BuilderKind, BuilderOutput, BuilderSpec, builders_for, run_builder};
pub use emit::{BuildSink, LayerBatches};
pub use exposure::{ExposureMasks, compute_exposure};
pub use face::{Face, FaceRole};
pub use input::{BuildInput, ShapeCells};
pub use mesh_build::VertexBatch;
pub use neighbors::{NEIGHBOR_OFFSETS, NeighborsLoaded, Neighborhood};
pub use tags::{DetailLevel, Layer, LayerSet, RenderState};
pub use texture::{AtlasTile, FaceTiles, GridAtlas, TextureLookup};

/// Shared read-only inputs of every build pass.
pub struct MeshContext<'a> {
    pub shapes: &'a ShapeTable,
    pub classifier: &'a MaterialClassifier,
    pub textures: &'a dyn TextureLookup,
    pub policy: VisibilityPolicy,
}

/// Builds `layers` of one chunk in a single call. Exposure is computed only for
/// High-detail passes that include the Blocks layer.
pub fn build_chunk(
    ctx: &MeshContext<'_>,
    hood: &Neighborhood,
    meta: &ChunkMeta,
    level: DetailLevel,
    layers: LayerSet,
) -> Vec<BuilderOutput> {
    let cells = ShapeCells::scan(hood, ctx.shapes);
    let exposure = (level == DetailLevel::High && layers.contains(Layer::Blocks))
        .then(|| compute_exposure(hood, ctx.classifier, ctx.policy));
    let input = BuildInput {
        hood,
        meta,
        shapes: ctx.shapes,
        textures: ctx.textures,
        cells: &cells,
        exposure: exposure.as_ref(),
        level,
    };
    builders::build_layers(&input, layers)
}
