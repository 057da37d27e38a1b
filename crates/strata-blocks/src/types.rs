/// Numeric block id as stored in chunk arrays.
pub type BlockId = u16;

/// Number of addressable block ids; lookup tables are sized to this.
pub const ID_LIMIT: usize = 4096;

/// A block id paired with its 4-bit data value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub data: u8,
}

impl Block {
    pub const AIR: Block = Block { id: 0, data: 0 };

    #[inline]
    pub const fn new(id: BlockId, data: u8) -> Self {
        Self { id, data }
    }

    #[inline]
    pub const fn plain(id: BlockId) -> Self {
        Self { id, data: 0 }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.id == 0
    }
}
