//! Chunk column arrays and overlay metadata snapshots.
#![forbid(unsafe_code)]

use strata_blocks::{Block, BlockId};
use strata_geom::{CHUNK_WIDTH, Vec3};

/// Blocks per chunk side on the horizontal axes.
pub const CHUNK_SIZE: usize = CHUNK_WIDTH as usize;

pub const MAX_LIGHT: u8 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkPos {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    /// Max of the axis distances, the ring index around `other`.
    #[inline]
    pub fn chebyshev(self, other: ChunkPos) -> u32 {
        let dx = (self.cx - other.cx).unsigned_abs();
        let dz = (self.cz - other.cz).unsigned_abs();
        dx.max(dz)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkPos) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    /// Chunk containing world block column `(wx, wz)`.
    #[inline]
    pub fn containing(wx: i32, wz: i32) -> Self {
        Self {
            cx: wx.div_euclid(CHUNK_WIDTH),
            cz: wz.div_euclid(CHUNK_WIDTH),
        }
    }

    #[inline]
    pub fn base_x(self) -> i32 {
        self.cx * CHUNK_WIDTH
    }

    #[inline]
    pub fn base_z(self) -> i32 {
        self.cz * CHUNK_WIDTH
    }
}

impl From<(i32, i32)> for ChunkPos {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Per-column block, data and light arrays, indexed `(y * 16 + z) * 16 + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkArrays {
    pub pos: ChunkPos,
    pub height: usize,
    pub blocks: Vec<BlockId>,
    pub data: Vec<u8>,
    pub sky_light: Vec<u8>,
    pub block_light: Vec<u8>,
}

impl ChunkArrays {
    /// All-air column with full sky light.
    pub fn new_air(pos: ChunkPos, height: usize) -> Self {
        let n = CHUNK_SIZE * CHUNK_SIZE * height;
        Self {
            pos,
            height,
            blocks: vec![0; n],
            data: vec![0; n],
            sky_light: vec![MAX_LIGHT; n],
            block_light: vec![0; n],
        }
    }

    #[inline]
    pub fn volume(&self) -> usize {
        CHUNK_SIZE * CHUNK_SIZE * self.height
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
    }

    /// Inverse of [`ChunkArrays::idx`].
    #[inline]
    pub fn coords(&self, i: usize) -> (usize, usize, usize) {
        let x = i % CHUNK_SIZE;
        let z = (i / CHUNK_SIZE) % CHUNK_SIZE;
        let y = i / (CHUNK_SIZE * CHUNK_SIZE);
        (x, y, z)
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        let i = self.idx(x, y, z);
        Block::new(self.blocks[i], self.data[i])
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, b: Block) {
        let i = self.idx(x, y, z);
        self.blocks[i] = b.id;
        self.data[i] = b.data & 0x0f;
    }

    /// Effective light of a cell: the brighter of sky and block light, sky only
    /// counted in worlds that have one.
    #[inline]
    pub fn light_at(&self, i: usize, has_sky: bool) -> u8 {
        let block = self.block_light[i];
        if has_sky {
            block.max(self.sky_light[i])
        } else {
            block
        }
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|&b| b != 0)
    }

    /// Checks that every array matches the declared volume.
    pub fn is_consistent(&self) -> bool {
        let n = self.volume();
        self.blocks.len() == n
            && self.data.len() == n
            && self.sky_light.len() == n
            && self.block_light.len() == n
    }

    /// Highest non-air cell in column `(x, z)`.
    pub fn top_block(&self, x: usize, z: usize) -> Option<(usize, Block)> {
        (0..self.height)
            .rev()
            .map(|y| (y, self.get_local(x, y, z)))
            .find(|(_, b)| !b.is_air())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Monster,
    Item,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityMarker {
    pub pos: Vec3,
    pub kind: EntityKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileEntityMarker {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileTick {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block: BlockId,
    pub delay: i32,
}

/// Read-only overlay data for one chunk, all positions in world space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMeta {
    pub entities: Vec<EntityMarker>,
    pub tile_entities: Vec<TileEntityMarker>,
    pub tile_ticks: Vec<TileTick>,
    pub terrain_populated: bool,
}
