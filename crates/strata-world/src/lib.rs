//! World data access consumed by the mesh pipeline, plus an in-memory store and a
//! noise terrain generator used by the demo binary and tests.
#![forbid(unsafe_code)]

pub mod memory;
pub mod terrain;

use std::sync::Arc;

use strata_chunk::{ChunkArrays, ChunkMeta, ChunkPos, EntityMarker, TileEntityMarker, TileTick};

pub use memory::MemoryWorld;
pub use terrain::{TerrainGen, TerrainParams};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("chunk ({cx}, {cz}) is not generated or not loaded")]
    ChunkAbsent { cx: i32, cz: i32 },
    #[error("chunk ({cx}, {cz}) is corrupt: {reason}")]
    Corrupt { cx: i32, cz: i32, reason: String },
}

impl WorldError {
    pub fn absent(pos: ChunkPos) -> Self {
        WorldError::ChunkAbsent {
            cx: pos.cx,
            cz: pos.cz,
        }
    }

    pub fn corrupt(pos: ChunkPos, reason: impl Into<String>) -> Self {
        WorldError::Corrupt {
            cx: pos.cx,
            cz: pos.cz,
            reason: reason.into(),
        }
    }
}

/// Read access to chunk columns and their overlay metadata.
///
/// Neighbor access is positional: callers ask for `pos.offset(dx, dz)`.
pub trait WorldDataSource {
    /// Column height in blocks, shared by every chunk.
    fn height(&self) -> usize;

    /// Whether sky light contributes to brightness.
    fn has_sky(&self) -> bool {
        true
    }

    fn chunk_exists(&self, pos: ChunkPos) -> bool;

    fn chunk_arrays(&self, pos: ChunkPos) -> Result<Arc<ChunkArrays>, WorldError>;

    fn entities(&self, pos: ChunkPos) -> Vec<EntityMarker>;

    fn tile_entities(&self, pos: ChunkPos) -> Vec<TileEntityMarker>;

    fn tile_ticks(&self, pos: ChunkPos) -> Vec<TileTick>;

    fn is_terrain_populated(&self, pos: ChunkPos) -> bool;

    /// Chunks modified since the world was last loaded or marked clean.
    fn dirty_chunks(&self) -> Vec<ChunkPos>;

    fn chunk_meta(&self, pos: ChunkPos) -> ChunkMeta {
        ChunkMeta {
            entities: self.entities(pos),
            tile_entities: self.tile_entities(pos),
            tile_ticks: self.tile_ticks(pos),
            terrain_populated: self.is_terrain_populated(pos),
        }
    }
}
