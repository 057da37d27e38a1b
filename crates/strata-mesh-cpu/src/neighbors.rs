use std::sync::Arc;

use strata_blocks::Block;
use strata_chunk::{CHUNK_SIZE, ChunkArrays, ChunkPos, MAX_LIGHT};

/// Which horizontal neighbors were available when a chunk was fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborsLoaded {
    pub neg_x: bool,
    pub pos_x: bool,
    pub neg_z: bool,
    pub pos_z: bool,
}

impl NeighborsLoaded {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            neg_x: false,
            pos_x: false,
            neg_z: false,
            pos_z: false,
        }
    }

    #[inline]
    pub const fn horizontal(neg_x: bool, pos_x: bool, neg_z: bool, pos_z: bool) -> Self {
        Self {
            neg_x,
            pos_x,
            neg_z,
            pos_z,
        }
    }
}

/// Neighbor slot order used throughout: -X, +X, -Z, +Z.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A chunk plus whichever horizontal neighbors exist, addressed in chunk-local
/// coordinates that may step one cell past each horizontal edge.
#[derive(Clone, Debug)]
pub struct Neighborhood {
    pub center: Arc<ChunkArrays>,
    /// Indexed like [`NEIGHBOR_OFFSETS`].
    pub sides: [Option<Arc<ChunkArrays>>; 4],
    pub has_sky: bool,
}

impl Neighborhood {
    pub fn new(center: Arc<ChunkArrays>, has_sky: bool) -> Self {
        Self {
            center,
            sides: [None, None, None, None],
            has_sky,
        }
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.center.pos
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.center.height
    }

    pub fn loaded(&self) -> NeighborsLoaded {
        NeighborsLoaded::horizontal(
            self.sides[0].is_some(),
            self.sides[1].is_some(),
            self.sides[2].is_some(),
            self.sides[3].is_some(),
        )
    }

    /// Resolves a possibly out-of-chunk local coordinate to an array and index.
    /// `None` for diagonal cells, cells above or below the world, and missing
    /// neighbors.
    #[inline]
    pub fn locate(&self, x: i32, y: i32, z: i32) -> Option<(&ChunkArrays, usize)> {
        let n = CHUNK_SIZE as i32;
        if y < 0 || y >= self.height() as i32 {
            return None;
        }
        let in_x = (0..n).contains(&x);
        let in_z = (0..n).contains(&z);
        let (arrays, lx, lz): (&ChunkArrays, i32, i32) = match (in_x, in_z) {
            (true, true) => (&self.center, x, z),
            (false, true) if x == -1 => (self.sides[0].as_deref()?, n - 1, z),
            (false, true) if x == n => (self.sides[1].as_deref()?, 0, z),
            (true, false) if z == -1 => (self.sides[2].as_deref()?, x, n - 1),
            (true, false) if z == n => (self.sides[3].as_deref()?, x, 0),
            _ => return None,
        };
        if arrays.height != self.height() {
            return None;
        }
        Some((arrays, arrays.idx(lx as usize, y as usize, lz as usize)))
    }

    /// Block at a local coordinate; air when it cannot be resolved.
    #[inline]
    pub fn block(&self, x: i32, y: i32, z: i32) -> Block {
        self.locate(x, y, z)
            .map(|(a, i)| Block::new(a.blocks[i], a.data[i]))
            .unwrap_or(Block::AIR)
    }

    /// Light level at a local coordinate; full bright when it cannot be resolved.
    #[inline]
    pub fn light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.locate(x, y, z)
            .map(|(a, i)| a.light_at(i, self.has_sky))
            .unwrap_or(MAX_LIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_crosses_into_neighbors() {
        let center = ChunkArrays::new_air(ChunkPos::new(0, 0), 4);
        let mut east = ChunkArrays::new_air(ChunkPos::new(1, 0), 4);
        east.set_local(0, 2, 5, Block::plain(1));
        let mut hood = Neighborhood::new(Arc::new(center), true);
        hood.sides[1] = Some(Arc::new(east));
        assert_eq!(hood.block(16, 2, 5), Block::plain(1));
        assert_eq!(hood.block(-1, 2, 5), Block::AIR);
        assert_eq!(hood.block(16, 2, 16), Block::AIR);
        assert_eq!(hood.light(3, 9, 3), MAX_LIGHT);
        assert_eq!(hood.loaded(), NeighborsLoaded::horizontal(false, true, false, false));
    }
}
