//! Face exposure: a face is drawn where a cell's material differs from the
//! material of the cell it faces.
//!
//! The chunk is embedded in an `(16+2) × (H+2) × (16+2)` halo whose border comes
//! from the four horizontal neighbors. Cells above and below the world, diagonal
//! cells and cells of missing neighbors stay air, so faces at those boundaries
//! are exposed.

use strata_blocks::{MaterialClassifier, MaterialIndex, VisibilityPolicy};
use strata_chunk::CHUNK_SIZE;

use crate::face::Face;
use crate::neighbors::Neighborhood;

const HW: usize = CHUNK_SIZE + 2;

/// Six boolean masks in chunk-local layout `(y * 16 + z) * 16 + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposureMasks {
    height: usize,
    faces: [Vec<bool>; 6],
}

impl ExposureMasks {
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn exposed(&self, face: Face, i: usize) -> bool {
        self.faces[face.index()][i]
    }

    #[inline]
    pub fn exposed_at(&self, face: Face, x: usize, y: usize, z: usize) -> bool {
        self.exposed(face, (y * CHUNK_SIZE + z) * CHUNK_SIZE + x)
    }

    pub fn mask(&self, face: Face) -> &[bool] {
        &self.faces[face.index()]
    }

    pub fn count(&self, face: Face) -> usize {
        self.faces[face.index()].iter().filter(|&&b| b).count()
    }
}

#[inline]
fn hidx(x: usize, y: usize, z: usize) -> usize {
    (y * HW + z) * HW + x
}

/// Material halo around the center chunk, in halo coordinates.
fn material_halo(
    hood: &Neighborhood,
    classifier: &MaterialClassifier,
    policy: VisibilityPolicy,
) -> Vec<MaterialIndex> {
    let h = hood.height();
    let center = &hood.center;
    let mut mat = vec![MaterialIndex::AIR; HW * HW * (h + 2)];
    for y in 0..h {
        for z in 0..CHUNK_SIZE {
            let src = center.idx(0, y, z);
            let dst = hidx(1, y + 1, z + 1);
            classifier.classify_into(
                &center.blocks[src..src + CHUNK_SIZE],
                &center.data[src..src + CHUNK_SIZE],
                policy,
                &mut mat[dst..dst + CHUNK_SIZE],
            );
        }
    }
    let last = CHUNK_SIZE - 1;
    for (slot, side) in hood.sides.iter().enumerate() {
        let Some(arrays) = side.as_deref() else {
            continue;
        };
        if arrays.height != h || !arrays.is_consistent() {
            continue;
        }
        for y in 0..h {
            for t in 0..CHUNK_SIZE {
                // (source x, source z, halo x, halo z)
                let (sx, sz, hx, hz) = match slot {
                    0 => (last, t, 0, t + 1),
                    1 => (0, t, HW - 1, t + 1),
                    2 => (t, last, t + 1, 0),
                    _ => (t, 0, t + 1, HW - 1),
                };
                let i = arrays.idx(sx, y, sz);
                mat[hidx(hx, y + 1, hz)] = classifier.classify(arrays.blocks[i], arrays.data[i], policy);
            }
        }
    }
    mat
}

/// Computes the six exposure masks of `hood.center` by shifted row comparison.
pub fn compute_exposure(
    hood: &Neighborhood,
    classifier: &MaterialClassifier,
    policy: VisibilityPolicy,
) -> ExposureMasks {
    let h = hood.height();
    let mat = material_halo(hood, classifier, policy);
    let volume = CHUNK_SIZE * CHUNK_SIZE * h;
    let mut faces: [Vec<bool>; 6] = std::array::from_fn(|_| vec![false; volume]);
    for face in Face::ALL {
        let (dx, dy, dz) = face.delta();
        let off = dy as isize * (HW * HW) as isize + dz as isize * HW as isize + dx as isize;
        let mask = &mut faces[face.index()];
        for y in 0..h {
            for z in 0..CHUNK_SIZE {
                let here = hidx(1, y + 1, z + 1);
                let there = (here as isize + off) as usize;
                let out = (y * CHUNK_SIZE + z) * CHUNK_SIZE;
                let a = &mat[here..here + CHUNK_SIZE];
                let b = &mat[there..there + CHUNK_SIZE];
                for ((o, m0), m1) in mask[out..out + CHUNK_SIZE].iter_mut().zip(a).zip(b) {
                    *o = m0 != m1;
                }
            }
        }
    }
    ExposureMasks { height: h, faces }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_blocks::{Block, ShapeTable, ids};
    use strata_chunk::{ChunkArrays, ChunkPos};

    fn classifier() -> MaterialClassifier {
        MaterialClassifier::new(&ShapeTable::new())
    }

    #[test]
    fn lone_block_exposes_all_six_faces() {
        let mut c = ChunkArrays::new_air(ChunkPos::new(0, 0), 8);
        c.set_local(0, 0, 0, Block::plain(ids::STONE));
        let hood = Neighborhood::new(Arc::new(c), true);
        let m = compute_exposure(&hood, &classifier(), VisibilityPolicy::Normal);
        for f in Face::ALL {
            assert!(m.exposed_at(f, 0, 0, 0), "{f:?}");
        }
    }

    #[test]
    fn neighbor_border_culls_boundary_face() {
        let mut c = ChunkArrays::new_air(ChunkPos::new(0, 0), 4);
        c.set_local(15, 1, 7, Block::plain(ids::STONE));
        let mut east = ChunkArrays::new_air(ChunkPos::new(1, 0), 4);
        east.set_local(0, 1, 7, Block::plain(ids::DIRT));
        let mut hood = Neighborhood::new(Arc::new(c), true);
        let m = compute_exposure(&hood, &classifier(), VisibilityPolicy::Normal);
        assert!(m.exposed_at(Face::PosX, 15, 1, 7));
        hood.sides[1] = Some(Arc::new(east));
        let m = compute_exposure(&hood, &classifier(), VisibilityPolicy::Normal);
        assert!(!m.exposed_at(Face::PosX, 15, 1, 7));
        assert!(m.exposed_at(Face::NegX, 15, 1, 7));
    }

    #[test]
    fn reveal_policy_exposes_ore_in_stone() {
        let mut c = ChunkArrays::new_air(ChunkPos::new(0, 0), 3);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for y in 0..3 {
                    c.set_local(x, y, z, Block::plain(ids::STONE));
                }
            }
        }
        c.set_local(5, 1, 5, Block::plain(ids::DIAMOND_ORE));
        let hood = Neighborhood::new(Arc::new(c), true);
        let normal = compute_exposure(&hood, &classifier(), VisibilityPolicy::Normal);
        assert!(!normal.exposed_at(Face::PosX, 5, 1, 5));
        let reveal = compute_exposure(&hood, &classifier(), VisibilityPolicy::RevealOres);
        assert!(reveal.exposed_at(Face::PosX, 5, 1, 5));
        assert!(reveal.exposed_at(Face::NegX, 6, 1, 5));
    }
}
