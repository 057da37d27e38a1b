use strata_geom::Vec3;

use crate::tags::{Layer, RenderState};

/// Quads with parallel attribute arrays, tagged with the state they draw under
/// and the layer that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBatch {
    pub state: RenderState,
    pub layer: Layer,
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub col: Vec<u8>,
    pub idx: Vec<u32>,
}

impl VertexBatch {
    pub fn new(state: RenderState, layer: Layer) -> Self {
        Self {
            state,
            layer,
            pos: Vec::new(),
            norm: Vec::new(),
            uv: Vec::new(),
            col: Vec::new(),
            idx: Vec::new(),
        }
    }

    /// Clears all arrays but retains capacity for reuse.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.col.clear();
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        // 4 vertices per quad
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Bytes the batch occupies once uploaded.
    pub fn byte_size(&self) -> usize {
        (self.pos.len() + self.norm.len() + self.uv.len() + self.idx.len()) * 4 + self.col.len()
    }

    /// Appends another batch's quads, rebasing its indices.
    pub fn append(&mut self, other: &VertexBatch) {
        let base = self.vertex_count() as u32;
        self.pos.extend_from_slice(&other.pos);
        self.norm.extend_from_slice(&other.norm);
        self.uv.extend_from_slice(&other.uv);
        self.col.extend_from_slice(&other.col);
        self.idx.extend(other.idx.iter().map(|i| i + base));
    }

    /// Appends a quad with explicit per-vertex UVs. Corners are given in
    /// perimeter order; winding is corrected so the front face matches `n`.
    pub fn add_quad_uv(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
        n: Vec3,
        mut uvs: [(f32, f32); 4],
        rgba: [u8; 4],
    ) {
        let base = self.vertex_count() as u32;
        let mut vs = [a, d, c, b];
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        if e1.cross(e2).dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        for i in 0..4 {
            self.pos.extend_from_slice(&[vs[i].x, vs[i].y, vs[i].z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Same quad emitted facing both ways, for thin cutout shapes.
    pub fn add_quad_double(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
        n: Vec3,
        uvs: [(f32, f32); 4],
        rgba: [u8; 4],
    ) {
        self.add_quad_uv(a, b, c, d, n, uvs, rgba);
        self.add_quad_uv(a, b, c, d, n * -1.0, uvs, rgba);
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
}
