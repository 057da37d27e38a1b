//! Face-visibility classification. Two touching cells draw a face between them
//! only when their material indices differ.

use crate::ids;
use crate::shape::{ShapeCategory, ShapeTable};
use crate::types::{BlockId, ID_LIMIT};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialIndex(pub u16);

impl MaterialIndex {
    pub const AIR: MaterialIndex = MaterialIndex(0);
    /// Shared bucket of plain opaque cubes, also the fallback for unknown ids.
    pub const OPAQUE: MaterialIndex = MaterialIndex(1);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityPolicy {
    #[default]
    Normal,
    /// Air versus everything else.
    Rough,
    /// Common terrain shares one bucket so ores show through stone.
    RevealOres,
}

impl VisibilityPolicy {
    /// Host-facing flags; revealing ores takes precedence over rough mode.
    pub fn from_flags(rough: bool, reveal_hidden_ores: bool) -> Self {
        if reveal_hidden_ores {
            VisibilityPolicy::RevealOres
        } else if rough {
            VisibilityPolicy::Rough
        } else {
            VisibilityPolicy::Normal
        }
    }
}

/// Cube blocks that must not merge faces with plain opaque cubes.
const DISTINCT_GROUPS: &[&[BlockId]] = &[
    &[ids::GLASS],
    &[ids::STAINED_GLASS],
    &[ids::GLASS_PANE],
    &[ids::IRON_BARS],
    &[ids::LAVA_FLOWING, ids::LAVA],
];

const REVEAL_TERRAIN: &[BlockId] = &[ids::STONE, ids::GRASS, ids::DIRT, ids::SAND, ids::GRAVEL];

const FULL_SNOW_DATA: u8 = 7;

#[derive(Clone, Debug)]
pub struct MaterialClassifier {
    normal: Vec<MaterialIndex>,
    reveal: Vec<MaterialIndex>,
    snow_layer: Vec<bool>,
}

impl MaterialClassifier {
    pub fn new(shapes: &ShapeTable) -> Self {
        let first_distinct = 1 + ShapeCategory::COUNT as u16;
        let mut normal = Vec::with_capacity(ID_LIMIT);
        let mut snow_layer = Vec::with_capacity(ID_LIMIT);
        for id in 0..ID_LIMIT {
            let cat = shapes.category(id as BlockId);
            normal.push(match cat {
                ShapeCategory::Air => MaterialIndex::AIR,
                ShapeCategory::Cube => MaterialIndex::OPAQUE,
                other => MaterialIndex(1 + other.index() as u16),
            });
            snow_layer.push(cat == ShapeCategory::SnowLayer);
        }
        for (i, group) in DISTINCT_GROUPS.iter().enumerate() {
            for &id in group.iter() {
                normal[id as usize] = MaterialIndex(first_distinct + i as u16);
            }
        }

        let mut reveal: Vec<MaterialIndex> =
            (0..ID_LIMIT).map(|id| MaterialIndex(id as u16)).collect();
        for &id in REVEAL_TERRAIN {
            reveal[id as usize] = MaterialIndex::OPAQUE;
        }

        Self {
            normal,
            reveal,
            snow_layer,
        }
    }

    pub fn classify(&self, id: BlockId, data: u8, policy: VisibilityPolicy) -> MaterialIndex {
        let ix = id as usize;
        if ix >= ID_LIMIT {
            return MaterialIndex::OPAQUE;
        }
        match policy {
            VisibilityPolicy::Rough => {
                if id == ids::AIR {
                    MaterialIndex::AIR
                } else {
                    MaterialIndex::OPAQUE
                }
            }
            VisibilityPolicy::RevealOres => self.reveal[ix],
            VisibilityPolicy::Normal => {
                // A snow layer at full height is indistinguishable from a cube.
                if self.snow_layer[ix] && data & 7 == FULL_SNOW_DATA {
                    MaterialIndex::OPAQUE
                } else {
                    self.normal[ix]
                }
            }
        }
    }

    /// Classifies parallel id/data slices into `out`.
    pub fn classify_into(
        &self,
        ids: &[BlockId],
        data: &[u8],
        policy: VisibilityPolicy,
        out: &mut [MaterialIndex],
    ) {
        for ((o, &id), &d) in out.iter_mut().zip(ids).zip(data) {
            *o = self.classify(id, d, policy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> MaterialClassifier {
        MaterialClassifier::new(&ShapeTable::new())
    }

    #[test]
    fn plain_cubes_share_a_bucket() {
        let c = classifier();
        let p = VisibilityPolicy::Normal;
        assert_eq!(c.classify(ids::STONE, 0, p), c.classify(ids::DIRT, 0, p));
        assert_eq!(c.classify(ids::GRASS, 0, p), MaterialIndex::OPAQUE);
        assert_eq!(c.classify(ids::AIR, 0, p), MaterialIndex::AIR);
    }

    #[test]
    fn shapes_and_transparent_cubes_are_distinct() {
        let c = classifier();
        let p = VisibilityPolicy::Normal;
        let stone = c.classify(ids::STONE, 0, p);
        assert_ne!(stone, c.classify(ids::TORCH, 0, p));
        assert_ne!(stone, c.classify(ids::GLASS, 0, p));
        assert_ne!(c.classify(ids::GLASS, 0, p), c.classify(ids::STAINED_GLASS, 0, p));
        assert_ne!(c.classify(ids::WATER, 0, p), c.classify(ids::LAVA, 0, p));
        assert_eq!(c.classify(ids::WATER, 0, p), c.classify(ids::WATER_FLOWING, 3, p));
    }

    #[test]
    fn full_snow_layer_acts_as_cube() {
        let c = classifier();
        let p = VisibilityPolicy::Normal;
        assert_eq!(c.classify(ids::SNOW_LAYER, 7, p), MaterialIndex::OPAQUE);
        assert_ne!(c.classify(ids::SNOW_LAYER, 2, p), MaterialIndex::OPAQUE);
    }

    #[test]
    fn rough_collapses_to_two_buckets() {
        let c = classifier();
        let p = VisibilityPolicy::Rough;
        assert_eq!(c.classify(ids::AIR, 0, p), MaterialIndex::AIR);
        for id in [ids::STONE, ids::TORCH, ids::WATER, ids::GLASS, 4000] {
            assert_eq!(c.classify(id, 0, p), MaterialIndex::OPAQUE);
        }
    }

    #[test]
    fn reveal_ores_separates_ores_from_terrain() {
        let c = classifier();
        let p = VisibilityPolicy::RevealOres;
        assert_eq!(c.classify(ids::STONE, 0, p), c.classify(ids::GRAVEL, 0, p));
        assert_eq!(c.classify(ids::DIRT, 0, p), c.classify(ids::SAND, 0, p));
        assert_ne!(c.classify(ids::STONE, 0, p), c.classify(ids::DIAMOND_ORE, 0, p));
        assert_ne!(c.classify(ids::GOLD_ORE, 0, p), c.classify(ids::IRON_ORE, 0, p));
    }

    #[test]
    fn unknown_ids_fall_back_to_opaque() {
        let c = classifier();
        assert_eq!(
            c.classify(u16::MAX, 0, VisibilityPolicy::Normal),
            MaterialIndex::OPAQUE
        );
        assert_eq!(
            c.classify(5000, 0, VisibilityPolicy::RevealOres),
            MaterialIndex::OPAQUE
        );
    }

    #[test]
    fn policy_flags_prefer_reveal() {
        assert_eq!(
            VisibilityPolicy::from_flags(true, true),
            VisibilityPolicy::RevealOres
        );
        assert_eq!(VisibilityPolicy::from_flags(true, false), VisibilityPolicy::Rough);
        assert_eq!(
            VisibilityPolicy::from_flags(false, false),
            VisibilityPolicy::Normal
        );
    }
}
