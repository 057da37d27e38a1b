//! Grouping tags carried by every vertex batch.

/// Semantic partition of a chunk's content; the unit of invalidation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Blocks = 0,
    Entities = 1,
    Monsters = 2,
    Items = 3,
    TileEntities = 4,
    TileTicks = 5,
    TerrainPopulated = 6,
}

impl Layer {
    pub const COUNT: usize = 7;
    pub const ALL: [Layer; Self::COUNT] = [
        Layer::Blocks,
        Layer::Entities,
        Layer::Monsters,
        Layer::Items,
        Layer::TileEntities,
        Layer::TileTicks,
        Layer::TerrainPopulated,
    ];

    #[inline]
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Blocks => "blocks",
            Layer::Entities => "entities",
            Layer::Monsters => "monsters",
            Layer::Items => "items",
            Layer::TileEntities => "tile_entities",
            Layer::TileTicks => "tile_ticks",
            Layer::TerrainPopulated => "terrain_populated",
        }
    }

    pub fn from_name(name: &str) -> Option<Layer> {
        Layer::ALL.into_iter().find(|l| l.name() == name)
    }
}

/// Small bitset over [`Layer`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerSet(u8);

impl LayerSet {
    pub const EMPTY: LayerSet = LayerSet(0);
    pub const ALL: LayerSet = LayerSet((1 << Layer::COUNT) - 1);

    #[inline]
    pub fn only(layer: Layer) -> Self {
        LayerSet(layer.bit())
    }

    #[inline]
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, layer: Layer) {
        self.0 |= layer.bit();
    }

    #[inline]
    pub fn remove(&mut self, layer: Layer) {
        self.0 &= !layer.bit();
    }

    #[inline]
    pub fn union(self, other: LayerSet) -> LayerSet {
        LayerSet(self.0 | other.0)
    }

    #[inline]
    pub fn intersect(self, other: LayerSet) -> LayerSet {
        LayerSet(self.0 & other.0)
    }

    #[inline]
    pub fn difference(self, other: LayerSet) -> LayerSet {
        LayerSet(self.0 & !other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl FromIterator<Layer> for LayerSet {
    fn from_iter<T: IntoIterator<Item = Layer>>(iter: T) -> Self {
        let mut set = LayerSet::EMPTY;
        for l in iter {
            set.insert(l);
        }
        set
    }
}

impl From<Layer> for LayerSet {
    fn from(layer: Layer) -> Self {
        LayerSet::only(layer)
    }
}

/// Geometry fidelity tier, chosen per chunk from camera distance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetailLevel {
    #[default]
    High = 0,
    Low = 1,
    Overhead = 2,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::High, DetailLevel::Low, DetailLevel::Overhead];

    #[inline]
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Pipeline configuration a batch is drawn under; a pure grouping key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderState {
    Opaque = 0,
    Vine = 1,
    LowDetail = 2,
    AlphaTest = 3,
    Ice = 4,
    Water = 5,
    AlphaBlend = 6,
    EntityOverlay = 7,
}

impl RenderState {
    pub const COUNT: usize = 8;
    /// Draw order: opaque geometry first, blended liquids later, overlays last.
    pub const ORDER: [RenderState; Self::COUNT] = [
        RenderState::Opaque,
        RenderState::Vine,
        RenderState::LowDetail,
        RenderState::AlphaTest,
        RenderState::Ice,
        RenderState::Water,
        RenderState::AlphaBlend,
        RenderState::EntityOverlay,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderState::Opaque => "opaque",
            RenderState::Vine => "vine",
            RenderState::LowDetail => "low_detail",
            RenderState::AlphaTest => "alpha_test",
            RenderState::Ice => "ice",
            RenderState::Water => "water",
            RenderState::AlphaBlend => "alpha_blend",
            RenderState::EntityOverlay => "entity_overlay",
        }
    }
}
