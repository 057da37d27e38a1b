//! Ring-by-ring enumeration of chunk positions around a seed chunk.

use strata_chunk::ChunkPos;

/// Yields `center`, then every position of Chebyshev ring 1, ring 2 and so on
/// up to `radius`. Each ring is walked clockwise starting at its `(-r, -r)`
/// corner.
#[derive(Clone, Debug)]
pub struct Spiral {
    center: ChunkPos,
    radius: u32,
    ring: u32,
    k: u32,
}

impl Spiral {
    pub fn new(center: ChunkPos, radius: u32) -> Self {
        Self {
            center,
            radius,
            ring: 0,
            k: 0,
        }
    }

    pub fn center(&self) -> ChunkPos {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Ring the next position will come from.
    pub fn ring(&self) -> u32 {
        self.ring
    }

    pub fn is_exhausted(&self) -> bool {
        self.ring > self.radius
    }

    /// Positions not yet yielded.
    pub fn remaining(&self) -> usize {
        if self.is_exhausted() {
            return 0;
        }
        let side = 2 * self.radius as usize + 1;
        side * side - Self::yielded_before(self.ring) - self.k as usize
    }

    fn yielded_before(ring: u32) -> usize {
        if ring == 0 {
            0
        } else {
            let side = 2 * (ring as usize - 1) + 1;
            side * side
        }
    }
}

impl Iterator for Spiral {
    type Item = ChunkPos;

    fn next(&mut self) -> Option<ChunkPos> {
        if self.is_exhausted() {
            return None;
        }
        let r = self.ring as i32;
        if r == 0 {
            self.ring = 1;
            self.k = 0;
            return Some(self.center);
        }
        let edge = 2 * r;
        let k = self.k as i32;
        let t = k % edge;
        let (dx, dz) = match k / edge {
            0 => (-r + t, -r),
            1 => (r, -r + t),
            2 => (r - t, r),
            _ => (-r, r - t),
        };
        self.k += 1;
        if self.k as i32 == 4 * edge {
            self.ring += 1;
            self.k = 0;
        }
        Some(self.center.offset(dx, dz))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
