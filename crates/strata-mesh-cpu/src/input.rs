use strata_blocks::{Block, ShapeCategory, ShapeTable};
use strata_chunk::{ChunkMeta, ChunkPos};
use strata_geom::Vec3;

use crate::exposure::ExposureMasks;
use crate::face::Face;
use crate::neighbors::Neighborhood;
use crate::tags::DetailLevel;
use crate::texture::TextureLookup;

/// Cell indices of the center chunk grouped by shape category.
#[derive(Clone, Debug, Default)]
pub struct ShapeCells {
    by_category: Vec<Vec<u32>>,
}

impl ShapeCells {
    pub fn scan(hood: &Neighborhood, shapes: &ShapeTable) -> Self {
        let mut by_category = vec![Vec::new(); ShapeCategory::COUNT];
        for (i, &id) in hood.center.blocks.iter().enumerate() {
            if id == 0 {
                continue;
            }
            by_category[shapes.category(id).index()].push(i as u32);
        }
        Self { by_category }
    }

    pub fn cells(&self, cat: ShapeCategory) -> &[u32] {
        self.by_category
            .get(cat.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.by_category.iter().map(Vec::len).sum()
    }
}

/// Everything a builder reads during one build pass.
pub struct BuildInput<'a> {
    pub hood: &'a Neighborhood,
    pub meta: &'a ChunkMeta,
    pub shapes: &'a ShapeTable,
    pub textures: &'a dyn TextureLookup,
    pub cells: &'a ShapeCells,
    /// Present for High-detail block passes.
    pub exposure: Option<&'a ExposureMasks>,
    pub level: DetailLevel,
}

impl BuildInput<'_> {
    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.hood.pos()
    }

    /// Local `(x, y, z)` of a center cell index.
    #[inline]
    pub fn coords(&self, i: u32) -> (i32, i32, i32) {
        let (x, y, z) = self.hood.center.coords(i as usize);
        (x as i32, y as i32, z as i32)
    }

    #[inline]
    pub fn block_at(&self, i: u32) -> Block {
        let i = i as usize;
        Block::new(self.hood.center.blocks[i], self.hood.center.data[i])
    }

    /// World-space minimum corner of a local cell.
    #[inline]
    pub fn cell_origin(&self, x: i32, y: i32, z: i32) -> Vec3 {
        let pos = self.pos();
        Vec3::new(
            (pos.base_x() + x) as f32,
            y as f32,
            (pos.base_z() + z) as f32,
        )
    }

    /// Whether `face` of cell `i` is exposed; every face counts as exposed when no
    /// masks were computed.
    #[inline]
    pub fn exposed(&self, face: Face, i: u32) -> bool {
        self.exposure.is_none_or(|m| m.exposed(face, i as usize))
    }
}
