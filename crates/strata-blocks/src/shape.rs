use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::ids;
use crate::types::{BlockId, ID_LIMIT};

/// Geometric category deciding which mesh builder owns a block id.
///
/// Every id belongs to exactly one category; `Cube` is the fallback for ids no
/// other category claims.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ShapeCategory {
    Air = 0,
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
}

impl ShapeCategory {
    pub const COUNT: usize = 15;

    pub const ALL: [ShapeCategory; Self::COUNT] = [
        ShapeCategory::Air,
        ShapeCategory::Cube,
        ShapeCategory::Plant,
        ShapeCategory::Torch,
        ShapeCategory::Rail,
        ShapeCategory::Ladder,
        ShapeCategory::Stairs,
        ShapeCategory::Slab,
        ShapeCategory::Fence,
        ShapeCategory::Vine,
        ShapeCategory::SnowLayer,
        ShapeCategory::Liquid,
        ShapeCategory::Ice,
        ShapeCategory::RedstoneWire,
        ShapeCategory::Leaves,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in shape override files.
    pub fn name(self) -> &'static str {
        match self {
            ShapeCategory::Air => "air",
            ShapeCategory::Cube => "cube",
            ShapeCategory::Plant => "plant",
            ShapeCategory::Torch => "torch",
            ShapeCategory::Rail => "rail",
            ShapeCategory::Ladder => "ladder",
            ShapeCategory::Stairs => "stairs",
            ShapeCategory::Slab => "slab",
            ShapeCategory::Fence => "fence",
            ShapeCategory::Vine => "vine",
            ShapeCategory::SnowLayer => "snow_layer",
            ShapeCategory::Liquid => "liquid",
            ShapeCategory::Ice => "ice",
            ShapeCategory::RedstoneWire => "redstone_wire",
            ShapeCategory::Leaves => "leaves",
        }
    }

    pub fn from_name(name: &str) -> Option<ShapeCategory> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Shapes whose silhouette never fills a whole cell; their builders ignore
    /// face exposure and always emit their fixed geometry.
    pub fn is_fixed_geometry(self) -> bool {
        matches!(
            self,
            ShapeCategory::Plant
                | ShapeCategory::Torch
                | ShapeCategory::Rail
                | ShapeCategory::Ladder
                | ShapeCategory::Stairs
                | ShapeCategory::Slab
                | ShapeCategory::Fence
                | ShapeCategory::Vine
                | ShapeCategory::RedstoneWire
        )
    }
}

const DEFAULT_CLAIMS: &[(ShapeCategory, &[BlockId])] = &[
    (
        ShapeCategory::Plant,
        &[
            ids::SAPLING,
            ids::TALL_GRASS,
            ids::DEAD_BUSH,
            ids::DANDELION,
            ids::ROSE,
            ids::BROWN_MUSHROOM,
            ids::RED_MUSHROOM,
            ids::CROPS,
            ids::REEDS,
            ids::NETHER_WART,
        ],
    ),
    (
        ShapeCategory::Torch,
        &[ids::TORCH, ids::REDSTONE_TORCH_OFF, ids::REDSTONE_TORCH_ON],
    ),
    (
        ShapeCategory::Rail,
        &[ids::RAIL, ids::POWERED_RAIL, ids::DETECTOR_RAIL],
    ),
    (ShapeCategory::Ladder, &[ids::LADDER]),
    (
        ShapeCategory::Stairs,
        &[
            ids::OAK_STAIRS,
            ids::COBBLESTONE_STAIRS,
            ids::BRICK_STAIRS,
            ids::STONE_BRICK_STAIRS,
            ids::NETHER_BRICK_STAIRS,
            ids::SANDSTONE_STAIRS,
        ],
    ),
    (ShapeCategory::Slab, &[ids::SLAB, ids::WOODEN_SLAB]),
    (
        ShapeCategory::Fence,
        &[ids::FENCE, ids::NETHER_FENCE, ids::FENCE_GATE],
    ),
    (ShapeCategory::Vine, &[ids::VINE]),
    (ShapeCategory::SnowLayer, &[ids::SNOW_LAYER]),
    (
        ShapeCategory::Liquid,
        &[ids::WATER_FLOWING, ids::WATER, ids::LAVA_FLOWING, ids::LAVA],
    ),
    (ShapeCategory::Ice, &[ids::ICE]),
    (ShapeCategory::RedstoneWire, &[ids::REDSTONE_WIRE]),
    (ShapeCategory::Leaves, &[ids::LEAVES, ids::LEAVES2]),
];

#[derive(Debug, thiserror::Error)]
pub enum ShapeConfigError {
    #[error("failed to read shape table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse shape table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown shape category `{0}`")]
    UnknownShape(String),
    #[error("block id {0} is outside the id limit")]
    IdOutOfRange(u32),
    #[error("air (id 0) cannot be reassigned")]
    AirReassigned,
}

#[derive(Deserialize, Default)]
pub struct ShapesConfig {
    #[serde(default)]
    pub shapes: HashMap<String, Vec<u32>>,
}

/// Dense id → shape category lookup.
#[derive(Clone, Debug)]
pub struct ShapeTable {
    by_id: Vec<ShapeCategory>,
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTable {
    pub fn new() -> Self {
        let mut by_id = vec![ShapeCategory::Cube; ID_LIMIT];
        by_id[ids::AIR as usize] = ShapeCategory::Air;
        for (cat, claimed) in DEFAULT_CLAIMS {
            for &id in claimed.iter() {
                by_id[id as usize] = *cat;
            }
        }
        Self { by_id }
    }

    /// Category for `id`; ids past the table map to `Cube`.
    #[inline]
    pub fn category(&self, id: BlockId) -> ShapeCategory {
        self.by_id
            .get(id as usize)
            .copied()
            .unwrap_or(ShapeCategory::Cube)
    }

    /// All ids currently claimed by `cat`.
    pub fn ids_for(&self, cat: ShapeCategory) -> Vec<BlockId> {
        self.by_id
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == cat)
            .map(|(i, _)| i as BlockId)
            .collect()
    }

    /// Applies overrides from a TOML document of the form
    /// `[shapes]\nplant = [6, 31]`.
    pub fn apply_toml_str(&mut self, toml_str: &str) -> Result<(), ShapeConfigError> {
        let cfg: ShapesConfig = toml::from_str(toml_str)?;
        let mut entries: Vec<(String, Vec<u32>)> = cfg.shapes.into_iter().collect();
        // HashMap order is unstable; later entries win, so sort for determinism.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, claimed) in entries {
            let cat = ShapeCategory::from_name(&name)
                .ok_or_else(|| ShapeConfigError::UnknownShape(name.clone()))?;
            for id in claimed {
                if id as usize >= ID_LIMIT {
                    return Err(ShapeConfigError::IdOutOfRange(id));
                }
                if id == 0 {
                    return Err(ShapeConfigError::AirReassigned);
                }
                self.by_id[id as usize] = cat;
            }
        }
        Ok(())
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ShapeConfigError> {
        let mut table = Self::new();
        table.apply_toml_str(toml_str)?;
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ShapeConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
