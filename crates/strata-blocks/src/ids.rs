//! Well-known block ids used by the default shape table, tints, and atlas.

use crate::types::BlockId;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const GRASS: BlockId = 2;
pub const DIRT: BlockId = 3;
pub const COBBLESTONE: BlockId = 4;
pub const PLANKS: BlockId = 5;
pub const SAPLING: BlockId = 6;
pub const BEDROCK: BlockId = 7;
pub const WATER_FLOWING: BlockId = 8;
pub const WATER: BlockId = 9;
pub const LAVA_FLOWING: BlockId = 10;
pub const LAVA: BlockId = 11;
pub const SAND: BlockId = 12;
pub const GRAVEL: BlockId = 13;
pub const GOLD_ORE: BlockId = 14;
pub const IRON_ORE: BlockId = 15;
pub const COAL_ORE: BlockId = 16;
pub const LOG: BlockId = 17;
pub const LEAVES: BlockId = 18;
pub const GLASS: BlockId = 20;
pub const LAPIS_ORE: BlockId = 21;
pub const SANDSTONE: BlockId = 24;
pub const POWERED_RAIL: BlockId = 27;
pub const DETECTOR_RAIL: BlockId = 28;
pub const TALL_GRASS: BlockId = 31;
pub const DEAD_BUSH: BlockId = 32;
pub const WOOL: BlockId = 35;
pub const DANDELION: BlockId = 37;
pub const ROSE: BlockId = 38;
pub const BROWN_MUSHROOM: BlockId = 39;
pub const RED_MUSHROOM: BlockId = 40;
pub const DOUBLE_SLAB: BlockId = 43;
pub const SLAB: BlockId = 44;
pub const BRICK: BlockId = 45;
pub const TORCH: BlockId = 50;
pub const OAK_STAIRS: BlockId = 53;
pub const CHEST: BlockId = 54;
pub const REDSTONE_WIRE: BlockId = 55;
pub const DIAMOND_ORE: BlockId = 56;
pub const CROPS: BlockId = 59;
pub const FARMLAND: BlockId = 60;
pub const FURNACE: BlockId = 61;
pub const LADDER: BlockId = 65;
pub const RAIL: BlockId = 66;
pub const COBBLESTONE_STAIRS: BlockId = 67;
pub const REDSTONE_ORE: BlockId = 73;
pub const REDSTONE_ORE_LIT: BlockId = 74;
pub const REDSTONE_TORCH_OFF: BlockId = 75;
pub const REDSTONE_TORCH_ON: BlockId = 76;
pub const SNOW_LAYER: BlockId = 78;
pub const ICE: BlockId = 79;
pub const SNOW: BlockId = 80;
pub const CACTUS: BlockId = 81;
pub const CLAY: BlockId = 82;
pub const REEDS: BlockId = 83;
pub const FENCE: BlockId = 85;
pub const NETHERRACK: BlockId = 87;
pub const STAINED_GLASS: BlockId = 95;
pub const IRON_BARS: BlockId = 101;
pub const GLASS_PANE: BlockId = 102;
pub const VINE: BlockId = 106;
pub const FENCE_GATE: BlockId = 107;
pub const BRICK_STAIRS: BlockId = 108;
pub const STONE_BRICK_STAIRS: BlockId = 109;
pub const NETHER_FENCE: BlockId = 113;
pub const NETHER_BRICK_STAIRS: BlockId = 114;
pub const NETHER_WART: BlockId = 115;
pub const WOODEN_SLAB: BlockId = 126;
pub const SANDSTONE_STAIRS: BlockId = 128;
pub const EMERALD_ORE: BlockId = 129;
pub const LEAVES2: BlockId = 161;
