use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use strata_blocks::Block;
use strata_chunk::{
    CHUNK_SIZE, ChunkArrays, ChunkMeta, ChunkPos, EntityMarker, MAX_LIGHT, TileEntityMarker,
    TileTick,
};

use crate::{WorldDataSource, WorldError};

struct MemoryChunk {
    arrays: Arc<ChunkArrays>,
    meta: ChunkMeta,
}

/// Chunk store held entirely in memory.
pub struct MemoryWorld {
    height: usize,
    has_sky: bool,
    chunks: HashMap<ChunkPos, MemoryChunk>,
    corrupt: HashSet<ChunkPos>,
    dirty: BTreeSet<ChunkPos>,
}

impl MemoryWorld {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            has_sky: true,
            chunks: HashMap::new(),
            corrupt: HashSet::new(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn without_sky(mut self) -> Self {
        self.has_sky = false;
        self
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Adds an all-air chunk if none exists at `pos`.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) {
        let height = self.height;
        self.chunks.entry(pos).or_insert_with(|| MemoryChunk {
            arrays: Arc::new(ChunkArrays::new_air(pos, height)),
            meta: ChunkMeta {
                terrain_populated: true,
                ..ChunkMeta::default()
            },
        });
    }

    /// Replaces the arrays of `pos`; they are stored as given, consistent or not.
    pub fn insert_arrays(&mut self, arrays: ChunkArrays) {
        let pos = arrays.pos;
        match self.chunks.get_mut(&pos) {
            Some(chunk) => chunk.arrays = Arc::new(arrays),
            None => {
                self.chunks.insert(
                    pos,
                    MemoryChunk {
                        arrays: Arc::new(arrays),
                        meta: ChunkMeta {
                            terrain_populated: true,
                            ..ChunkMeta::default()
                        },
                    },
                );
            }
        }
        self.dirty.insert(pos);
    }

    pub fn remove_chunk(&mut self, pos: ChunkPos) -> bool {
        self.dirty.remove(&pos);
        self.chunks.remove(&pos).is_some()
    }

    /// Makes `chunk_arrays` report `pos` as corrupt until cleared.
    pub fn mark_corrupt(&mut self, pos: ChunkPos, corrupt: bool) {
        if corrupt {
            self.corrupt.insert(pos);
        } else {
            self.corrupt.remove(&pos);
        }
    }

    pub fn block(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if wy < 0 || wy as usize >= self.height {
            return None;
        }
        let pos = ChunkPos::containing(wx, wz);
        let chunk = self.chunks.get(&pos)?;
        let lx = (wx - pos.base_x()) as usize;
        let lz = (wz - pos.base_z()) as usize;
        Some(chunk.arrays.get_local(lx, wy as usize, lz))
    }

    /// Writes a block, creating the chunk if needed. Returns false when `wy` is
    /// outside the world.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, block: Block) -> bool {
        if wy < 0 || wy as usize >= self.height {
            return false;
        }
        let pos = ChunkPos::containing(wx, wz);
        self.ensure_chunk(pos);
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        let lx = (wx - pos.base_x()) as usize;
        let lz = (wz - pos.base_z()) as usize;
        Arc::make_mut(&mut chunk.arrays).set_local(lx, wy as usize, lz, block);
        self.dirty.insert(pos);
        true
    }

    pub fn set_block_light(&mut self, wx: i32, wy: i32, wz: i32, level: u8) {
        if wy < 0 || wy as usize >= self.height {
            return;
        }
        let pos = ChunkPos::containing(wx, wz);
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            let arrays = Arc::make_mut(&mut chunk.arrays);
            let i = arrays.idx(
                (wx - pos.base_x()) as usize,
                wy as usize,
                (wz - pos.base_z()) as usize,
            );
            arrays.block_light[i] = level.min(MAX_LIGHT);
            self.dirty.insert(pos);
        }
    }

    /// Column sky light: full above the highest non-air block, dark below it.
    pub fn recompute_sky_light(&mut self, pos: ChunkPos) {
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return;
        };
        let arrays = Arc::make_mut(&mut chunk.arrays);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let top = arrays.top_block(x, z).map(|(y, _)| y + 1).unwrap_or(0);
                for y in 0..arrays.height {
                    let i = arrays.idx(x, y, z);
                    arrays.sky_light[i] = if y >= top { MAX_LIGHT } else { 0 };
                }
            }
        }
    }

    pub fn meta_mut(&mut self, pos: ChunkPos) -> Option<&mut ChunkMeta> {
        self.chunks.get_mut(&pos).map(|c| &mut c.meta)
    }

    pub fn add_entity(&mut self, pos: ChunkPos, entity: EntityMarker) {
        if let Some(meta) = self.meta_mut(pos) {
            meta.entities.push(entity);
        }
    }

    pub fn add_tile_entity(&mut self, pos: ChunkPos, te: TileEntityMarker) {
        if let Some(meta) = self.meta_mut(pos) {
            meta.tile_entities.push(te);
        }
    }

    pub fn add_tile_tick(&mut self, pos: ChunkPos, tick: TileTick) {
        if let Some(meta) = self.meta_mut(pos) {
            meta.tile_ticks.push(tick);
        }
    }

    pub fn set_terrain_populated(&mut self, pos: ChunkPos, populated: bool) {
        if let Some(meta) = self.meta_mut(pos) {
            meta.terrain_populated = populated;
        }
    }

    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }
}

impl WorldDataSource for MemoryWorld {
    fn height(&self) -> usize {
        self.height
    }

    fn has_sky(&self) -> bool {
        self.has_sky
    }

    fn chunk_exists(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    fn chunk_arrays(&self, pos: ChunkPos) -> Result<Arc<ChunkArrays>, WorldError> {
        if self.corrupt.contains(&pos) {
            return Err(WorldError::corrupt(pos, "marked corrupt"));
        }
        let chunk = self.chunks.get(&pos).ok_or(WorldError::absent(pos))?;
        if !chunk.arrays.is_consistent() || chunk.arrays.height != self.height {
            return Err(WorldError::corrupt(pos, "array sizes do not match the column height"));
        }
        Ok(Arc::clone(&chunk.arrays))
    }

    fn entities(&self, pos: ChunkPos) -> Vec<EntityMarker> {
        self.chunks
            .get(&pos)
            .map(|c| c.meta.entities.clone())
            .unwrap_or_default()
    }

    fn tile_entities(&self, pos: ChunkPos) -> Vec<TileEntityMarker> {
        self.chunks
            .get(&pos)
            .map(|c| c.meta.tile_entities.clone())
            .unwrap_or_default()
    }

    fn tile_ticks(&self, pos: ChunkPos) -> Vec<TileTick> {
        self.chunks
            .get(&pos)
            .map(|c| c.meta.tile_ticks.clone())
            .unwrap_or_default()
    }

    fn is_terrain_populated(&self, pos: ChunkPos) -> bool {
        self.chunks
            .get(&pos)
            .map(|c| c.meta.terrain_populated)
            .unwrap_or(false)
    }

    fn dirty_chunks(&self) -> Vec<ChunkPos> {
        self.dirty.iter().copied().collect()
    }

    fn chunk_meta(&self, pos: ChunkPos) -> ChunkMeta {
        self.chunks
            .get(&pos)
            .map(|c| c.meta.clone())
            .unwrap_or_default()
    }
}
