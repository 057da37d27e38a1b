//! Atlas tile lookup. Atlas contents live outside the pipeline; builders only need
//! the uv rectangle a block face samples.

use std::collections::HashMap;

use strata_blocks::{Block, BlockId, ids};

use crate::face::{Face, FaceRole};

/// Normalized uv rectangle of one atlas tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasTile {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl AtlasTile {
    pub const FULL: AtlasTile = AtlasTile {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Maps a `[0,1]` position inside the tile to atlas coordinates.
    #[inline]
    pub fn at(&self, fu: f32, fv: f32) -> (f32, f32) {
        (
            self.u0 + (self.u1 - self.u0) * fu.clamp(0.0, 1.0),
            self.v0 + (self.v1 - self.v0) * fv.clamp(0.0, 1.0),
        )
    }
}

pub trait TextureLookup {
    fn tile(&self, block: Block, face: Face) -> AtlasTile;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceTiles {
    pub top: u16,
    pub side: u16,
    pub bottom: u16,
}

impl FaceTiles {
    pub const fn uniform(t: u16) -> Self {
        Self {
            top: t,
            side: t,
            bottom: t,
        }
    }

    pub fn for_role(&self, role: FaceRole) -> u16 {
        match role {
            FaceRole::Top => self.top,
            FaceRole::Side => self.side,
            FaceRole::Bottom => self.bottom,
        }
    }
}

/// Square grid atlas addressed by tile index, row-major from the top-left.
pub struct GridAtlas {
    tiles_per_row: u16,
    by_id: HashMap<BlockId, FaceTiles>,
    fallback: u16,
}

const TERRAIN_TILES: &[(BlockId, FaceTiles)] = &[
    (ids::STONE, FaceTiles::uniform(1)),
    (
        ids::GRASS,
        FaceTiles {
            top: 0,
            side: 3,
            bottom: 2,
        },
    ),
    (ids::DIRT, FaceTiles::uniform(2)),
    (ids::COBBLESTONE, FaceTiles::uniform(16)),
    (ids::PLANKS, FaceTiles::uniform(4)),
    (ids::SAPLING, FaceTiles::uniform(15)),
    (ids::BEDROCK, FaceTiles::uniform(17)),
    (ids::WATER, FaceTiles::uniform(205)),
    (ids::WATER_FLOWING, FaceTiles::uniform(205)),
    (ids::LAVA, FaceTiles::uniform(237)),
    (ids::LAVA_FLOWING, FaceTiles::uniform(237)),
    (ids::SAND, FaceTiles::uniform(18)),
    (ids::GRAVEL, FaceTiles::uniform(19)),
    (ids::GOLD_ORE, FaceTiles::uniform(32)),
    (ids::IRON_ORE, FaceTiles::uniform(33)),
    (ids::COAL_ORE, FaceTiles::uniform(34)),
    (
        ids::LOG,
        FaceTiles {
            top: 21,
            side: 20,
            bottom: 21,
        },
    ),
    (ids::LEAVES, FaceTiles::uniform(52)),
    (ids::LEAVES2, FaceTiles::uniform(52)),
    (ids::GLASS, FaceTiles::uniform(49)),
    (ids::LAPIS_ORE, FaceTiles::uniform(160)),
    (
        ids::SANDSTONE,
        FaceTiles {
            top: 176,
            side: 192,
            bottom: 208,
        },
    ),
    (ids::TALL_GRASS, FaceTiles::uniform(39)),
    (ids::DEAD_BUSH, FaceTiles::uniform(55)),
    (ids::DANDELION, FaceTiles::uniform(13)),
    (ids::ROSE, FaceTiles::uniform(12)),
    (ids::BROWN_MUSHROOM, FaceTiles::uniform(29)),
    (ids::RED_MUSHROOM, FaceTiles::uniform(28)),
    (ids::BRICK, FaceTiles::uniform(7)),
    (ids::TORCH, FaceTiles::uniform(80)),
    (ids::REDSTONE_TORCH_ON, FaceTiles::uniform(99)),
    (ids::REDSTONE_TORCH_OFF, FaceTiles::uniform(115)),
    (ids::REDSTONE_WIRE, FaceTiles::uniform(164)),
    (ids::DIAMOND_ORE, FaceTiles::uniform(50)),
    (ids::REDSTONE_ORE, FaceTiles::uniform(51)),
    (ids::REDSTONE_ORE_LIT, FaceTiles::uniform(51)),
    (ids::LADDER, FaceTiles::uniform(83)),
    (ids::RAIL, FaceTiles::uniform(128)),
    (ids::POWERED_RAIL, FaceTiles::uniform(163)),
    (ids::DETECTOR_RAIL, FaceTiles::uniform(195)),
    (ids::SNOW_LAYER, FaceTiles::uniform(66)),
    (ids::SNOW, FaceTiles::uniform(66)),
    (ids::ICE, FaceTiles::uniform(67)),
    (ids::REEDS, FaceTiles::uniform(73)),
    (ids::FENCE, FaceTiles::uniform(4)),
    (ids::FENCE_GATE, FaceTiles::uniform(4)),
    (ids::OAK_STAIRS, FaceTiles::uniform(4)),
    (ids::WOODEN_SLAB, FaceTiles::uniform(4)),
    (ids::COBBLESTONE_STAIRS, FaceTiles::uniform(16)),
    (
        ids::SLAB,
        FaceTiles {
            top: 6,
            side: 5,
            bottom: 6,
        },
    ),
    (
        ids::DOUBLE_SLAB,
        FaceTiles {
            top: 6,
            side: 5,
            bottom: 6,
        },
    ),
    (ids::IRON_BARS, FaceTiles::uniform(85)),
    (ids::GLASS_PANE, FaceTiles::uniform(49)),
    (ids::VINE, FaceTiles::uniform(143)),
    (ids::NETHERRACK, FaceTiles::uniform(103)),
    (ids::EMERALD_ORE, FaceTiles::uniform(175)),
    (ids::CROPS, FaceTiles::uniform(95)),
];

impl GridAtlas {
    /// Classic 16×16 terrain atlas layout.
    pub fn terrain() -> Self {
        Self {
            tiles_per_row: 16,
            by_id: TERRAIN_TILES.iter().copied().collect(),
            fallback: 1,
        }
    }

    pub fn with_grid(tiles_per_row: u16) -> Self {
        Self {
            tiles_per_row: tiles_per_row.max(1),
            by_id: HashMap::new(),
            fallback: 0,
        }
    }

    pub fn set(&mut self, id: BlockId, tiles: FaceTiles) {
        self.by_id.insert(id, tiles);
    }

    pub fn tile_index(&self, id: BlockId, face: Face) -> u16 {
        self.by_id
            .get(&id)
            .map(|t| t.for_role(face.role()))
            .unwrap_or(self.fallback)
    }

    pub fn tile_rect(&self, index: u16) -> AtlasTile {
        let n = self.tiles_per_row;
        let count = n as u32 * n as u32;
        let index = (index as u32 % count) as u16;
        let step = 1.0 / n as f32;
        let col = (index % n) as f32;
        let row = (index / n) as f32;
        AtlasTile {
            u0: col * step,
            v0: row * step,
            u1: (col + 1.0) * step,
            v1: (row + 1.0) * step,
        }
    }
}

impl Default for GridAtlas {
    fn default() -> Self {
        Self::terrain()
    }
}

impl TextureLookup for GridAtlas {
    fn tile(&self, block: Block, face: Face) -> AtlasTile {
        self.tile_rect(self.tile_index(block.id, face))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_uses_role_specific_tiles() {
        let atlas = GridAtlas::terrain();
        assert_eq!(atlas.tile_index(ids::GRASS, Face::PosY), 0);
        assert_eq!(atlas.tile_index(ids::GRASS, Face::NegX), 3);
        assert_eq!(atlas.tile_index(ids::GRASS, Face::NegY), 2);
        assert_eq!(atlas.tile_index(999, Face::PosY), 1);
    }

    #[test]
    fn tile_rects_partition_the_atlas() {
        let atlas = GridAtlas::with_grid(16);
        let t = atlas.tile_rect(17);
        assert!((t.u0 - 1.0 / 16.0).abs() < 1e-6);
        assert!((t.v0 - 1.0 / 16.0).abs() < 1e-6);
        assert!((t.u1 - 2.0 / 16.0).abs() < 1e-6);
        let (u, v) = t.at(0.5, 1.0);
        assert!((u - 1.5 / 16.0).abs() < 1e-6);
        assert!((v - 2.0 / 16.0).abs() < 1e-6);
    }
}
