use strata_geom::Vec3;

use crate::face::Face;
use crate::mesh_build::VertexBatch;
use crate::tags::{Layer, RenderState};
use crate::texture::AtlasTile;

/// Destination for builder geometry, one batch per render state.
pub trait BuildSink {
    fn batch_mut(&mut self, state: RenderState) -> &mut VertexBatch;
}

/// Batches of one builder, all tagged with the builder's layer.
#[derive(Clone, Debug)]
pub struct LayerBatches {
    layer: Layer,
    batches: Vec<VertexBatch>,
}

impl LayerBatches {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            batches: Vec::new(),
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(VertexBatch::quad_count).sum()
    }

    /// Non-empty batches ordered by render state.
    pub fn into_batches(self) -> Vec<VertexBatch> {
        let mut out: Vec<VertexBatch> = self.batches.into_iter().filter(|b| !b.is_empty()).collect();
        out.sort_by_key(|b| b.state);
        out
    }
}

impl BuildSink for LayerBatches {
    #[inline]
    fn batch_mut(&mut self, state: RenderState) -> &mut VertexBatch {
        let ix = match self.batches.iter().position(|b| b.state == state) {
            Some(ix) => ix,
            None => {
                let mut b = VertexBatch::new(state, self.layer);
                // Small reserve to reduce early reallocs when a state is first used
                const INITIAL_QUAD_CAP: usize = 64;
                b.reserve_quads(INITIAL_QUAD_CAP);
                self.batches.push(b);
                self.batches.len() - 1
            }
        };
        &mut self.batches[ix]
    }
}

/// Tile-space position of a corner within its cell for the given face.
#[inline]
fn face_uv(face: Face, p: Vec3, cell: Vec3, tile: &AtlasTile) -> (f32, f32) {
    let l = p - cell;
    let (fu, fv) = match face {
        Face::PosY | Face::NegY => (l.x, l.z),
        Face::PosX | Face::NegX => (l.z, 1.0 - l.y),
        Face::PosZ | Face::NegZ => (l.x, 1.0 - l.y),
    };
    tile.at(fu, fv)
}

/// Emits up to six faces of an axis-aligned box; `choose` returns the tile and
/// color of each face to draw. UVs are taken relative to `cell` so partial boxes
/// sample the matching part of the tile.
pub(crate) fn emit_box_faces(
    sink: &mut impl BuildSink,
    state: RenderState,
    min: Vec3,
    max: Vec3,
    cell: Vec3,
    mut choose: impl FnMut(Face) -> Option<(AtlasTile, [u8; 4])>,
) {
    const FACE_DATA: [(Face, [usize; 4]); 6] = [
        (Face::PosY, [0, 2, 6, 4]),
        (Face::NegY, [5, 7, 3, 1]),
        (Face::PosX, [6, 2, 3, 7]),
        (Face::NegX, [0, 4, 5, 1]),
        (Face::PosZ, [4, 6, 7, 5]),
        (Face::NegZ, [2, 0, 1, 3]),
    ];

    let corners = [
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(max.x, min.y, max.z),
    ];

    for &(face, indices) in &FACE_DATA {
        if let Some((tile, rgba)) = choose(face) {
            let a = corners[indices[0]];
            let b = corners[indices[1]];
            let c = corners[indices[2]];
            let d = corners[indices[3]];
            let uv = |p| face_uv(face, p, cell, &tile);
            let uvs = [uv(a), uv(d), uv(c), uv(b)];
            sink.batch_mut(state)
                .add_quad_uv(a, b, c, d, face.normal(), uvs, rgba);
        }
    }
}

/// Emits a free-standing quad with the full tile stretched over it. Corners go
/// around the perimeter starting at the tile's top-left.
pub(crate) fn emit_quad(
    sink: &mut impl BuildSink,
    state: RenderState,
    corners: [Vec3; 4],
    normal: Vec3,
    tile: &AtlasTile,
    rgba: [u8; 4],
    double_sided: bool,
) {
    let [a, b, c, d] = corners;
    let uvs = [tile.at(0.0, 0.0), tile.at(0.0, 1.0), tile.at(1.0, 1.0), tile.at(1.0, 0.0)];
    let batch = sink.batch_mut(state);
    if double_sided {
        batch.add_quad_double(a, b, c, d, normal, uvs, rgba);
    } else {
        batch.add_quad_uv(a, b, c, d, normal, uvs, rgba);
    }
}
