//! Fixed color multipliers for foliage and powered wire.

use strata_blocks::{Block, ids};

use crate::face::Face;

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const GRASS: [u8; 3] = [0x79, 0xC0, 0x5A];
pub const FOLIAGE: [u8; 3] = [0x59, 0xAE, 0x30];
pub const SPRUCE: [u8; 3] = [0x61, 0x99, 0x61];
pub const BIRCH: [u8; 3] = [0x80, 0xA7, 0x55];

/// Leaves tint by species in the low two data bits.
pub fn leaves(block: Block) -> [u8; 3] {
    if block.id != ids::LEAVES {
        return FOLIAGE;
    }
    match block.data & 3 {
        1 => SPRUCE,
        2 => BIRCH,
        _ => FOLIAGE,
    }
}

/// Redstone wire darkens from bright red at power 15 to dull red unpowered.
pub fn redstone(power: u8) -> [u8; 3] {
    let p = f32::from(power.min(15)) / 15.0;
    let r = 0.3 + 0.7 * p;
    let gb = (p * p * 0.7 - 0.5).max(0.0);
    [
        (r * 255.0).round() as u8,
        (gb * 255.0).round() as u8,
        (gb * 0.6 * 255.0).round() as u8,
    ]
}

/// Tint for terrain faces: grass tops, tall grass and vines take the biome color.
pub fn block(block: Block, face: Face) -> [u8; 3] {
    match block.id {
        ids::GRASS if face == Face::PosY => GRASS,
        ids::TALL_GRASS => GRASS,
        ids::VINE => FOLIAGE,
        ids::LEAVES | ids::LEAVES2 => leaves(block),
        _ => WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redstone_power_brightens_red() {
        assert!(redstone(15)[0] > redstone(0)[0]);
        assert_eq!(redstone(0)[1], 0);
        assert_eq!(redstone(15), redstone(200));
    }

    #[test]
    fn grass_only_tints_top() {
        let g = Block::plain(ids::GRASS);
        assert_eq!(block(g, Face::PosY), GRASS);
        assert_eq!(block(g, Face::PosX), WHITE);
        assert_eq!(leaves(Block::new(ids::LEAVES, 6)), BIRCH);
    }
}
