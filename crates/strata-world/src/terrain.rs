//! Noise heightmap terrain used to populate a [`MemoryWorld`].

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;
use strata_blocks::{Block, BlockId, ids};
use strata_chunk::{CHUNK_SIZE, ChunkArrays, ChunkPos, MAX_LIGHT};

use crate::memory::MemoryWorld;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub height_frequency: f32,
    pub min_y_ratio: f32,
    pub max_y_ratio: f32,
    pub water_level_ratio: f32,
    pub water_enable: bool,
    pub snow_threshold: f32,
    pub dirt_depth: i32,
    /// Out of 1000 per buried stone cell.
    pub ore_per_mille: u32,
    /// Out of 1000 per grass column.
    pub plant_per_mille: u32,
    pub torch_per_mille: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            height_frequency: 0.02,
            min_y_ratio: 0.2,
            max_y_ratio: 0.7,
            water_level_ratio: 0.35,
            water_enable: true,
            snow_threshold: 0.62,
            dirt_depth: 3,
            ore_per_mille: 12,
            plant_per_mille: 60,
            torch_per_mille: 2,
        }
    }
}

impl TerrainParams {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

pub struct TerrainGen {
    seed: i32,
    height: usize,
    params: TerrainParams,
    terrain: FastNoiseLite,
}

const ORES: [BlockId; 5] = [
    ids::COAL_ORE,
    ids::IRON_ORE,
    ids::GOLD_ORE,
    ids::REDSTONE_ORE,
    ids::DIAMOND_ORE,
];

const PLANTS: [BlockId; 4] = [ids::TALL_GRASS, ids::DANDELION, ids::ROSE, ids::REEDS];

#[inline]
fn hash3(seed: i32, x: i32, y: i32, z: i32) -> u32 {
    let mut h = (seed as u32) ^ 0x9E37_79B9;
    for v in [x, y, z] {
        h ^= v as u32;
        h = h.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 13;
        h = h.wrapping_mul(0xC2B2_AE35);
        h ^= h >> 16;
    }
    h
}

impl TerrainGen {
    pub fn new(seed: i32, height: usize, params: TerrainParams) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(params.height_frequency));
        Self {
            seed,
            height,
            params,
            terrain,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn water_level(&self) -> Option<i32> {
        self.params
            .water_enable
            .then(|| (self.height as f32 * self.params.water_level_ratio).round() as i32)
    }

    /// Surface height of world column `(wx, wz)`, in `1..height`.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let world_height = self.height as i32;
        let hf = self.height as f32;
        let h = self.terrain.get_noise_2d(wx as f32, wz as f32);
        let min_h = (hf * self.params.min_y_ratio) as i32;
        let max_h = (hf * self.params.max_y_ratio) as i32;
        let hh = ((h + 1.0) * 0.5 * (max_h - min_h) as f32) as i32 + min_h;
        hh.clamp(1, (world_height - 1).max(1))
    }

    fn column_block(&self, wx: i32, wy: i32, wz: i32, surface: i32) -> Block {
        let water = self.water_level().unwrap_or(-1);
        if wy == 0 {
            return Block::plain(ids::BEDROCK);
        }
        if wy > surface {
            if wy <= water {
                return Block::plain(ids::WATER);
            }
            if wy == surface + 1 && surface >= water {
                let roll = hash3(self.seed, wx, 0, wz) % 1000;
                if surface as f32 >= self.height as f32 * self.params.snow_threshold {
                    return Block::new(ids::SNOW_LAYER, 1);
                }
                if roll < self.params.torch_per_mille {
                    return Block::new(ids::TORCH, 5);
                }
                if roll < self.params.torch_per_mille + self.params.plant_per_mille {
                    let kind = PLANTS[(roll as usize) % PLANTS.len()];
                    return Block::new(kind, if kind == ids::TALL_GRASS { 1 } else { 0 });
                }
            }
            return Block::AIR;
        }
        if wy == surface {
            if surface < water + 2 {
                return Block::plain(ids::SAND);
            }
            return Block::plain(ids::GRASS);
        }
        if wy > surface - self.params.dirt_depth {
            return Block::plain(ids::DIRT);
        }
        let roll = hash3(self.seed, wx, wy, wz) % 1000;
        if roll < self.params.ore_per_mille {
            return Block::plain(ORES[(roll as usize) % ORES.len()]);
        }
        Block::plain(ids::STONE)
    }

    /// Fills one chunk column with terrain and a matching sky light field.
    pub fn generate_chunk(&self, pos: ChunkPos) -> ChunkArrays {
        let mut arrays = ChunkArrays::new_air(pos, self.height);
        let water = self.water_level().unwrap_or(-1);
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let wx = pos.base_x() + lx as i32;
                let wz = pos.base_z() + lz as i32;
                let surface = self.surface_height(wx, wz);
                let top = (surface + 1).max(water).min(self.height as i32 - 1);
                for wy in 0..=top {
                    let b = self.column_block(wx, wy, wz, surface);
                    if !b.is_air() {
                        arrays.set_local(lx, wy as usize, lz, b);
                    }
                }
                for y in 0..self.height {
                    let i = arrays.idx(lx, y, lz);
                    arrays.sky_light[i] = if (y as i32) > surface { MAX_LIGHT } else { 0 };
                    if arrays.blocks[i] == ids::TORCH {
                        arrays.block_light[i] = 14;
                    }
                }
            }
        }
        arrays
    }

    /// Generates every chunk within `radius` rings of `center` into `world`.
    pub fn populate(&self, world: &mut MemoryWorld, center: ChunkPos, radius: i32) {
        let mut generated = 0usize;
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                world.insert_arrays(self.generate_chunk(center.offset(dx, dz)));
                generated += 1;
            }
        }
        world.mark_clean();
        log::info!(
            target: "perf",
            "terrain populate center=({}, {}) radius={} chunks={}",
            center.cx,
            center.cz,
            radius,
            generated
        );
    }
}
