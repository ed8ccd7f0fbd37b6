use parity_scale_codec::{Decode, Encode};
use std::fmt;

type HeightIntType = u64;

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Encode, Decode)]
pub struct BlockHeight(HeightIntType);

// Display should be defined for thiserr crate
impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<BlockHeight> for HeightIntType {
    fn from(block_height: BlockHeight) -> HeightIntType {
        block_height.0
    }
}

impl From<HeightIntType> for BlockHeight {
    fn from(w: HeightIntType) -> BlockHeight {
        BlockHeight(w)
    }
}

const ZERO: BlockHeight = BlockHeight(0);
const ONE: BlockHeight = BlockHeight(1);
const MAX: BlockHeight = BlockHeight(HeightIntType::MAX);

impl BlockHeight {
    pub const fn new(height: HeightIntType) -> Self {
        Self(height)
    }

    pub const fn zero() -> BlockHeight {
        ZERO
    }

    pub const fn one() -> BlockHeight {
        ONE
    }

    pub const fn max() -> BlockHeight {
        MAX
    }

    pub const fn inner(&self) -> HeightIntType {
        self.0
    }

    pub fn checked_add(&self, rhs: HeightIntType) -> Option<Self> {
        self.0.checked_add(rhs).map(Self::new)
    }

    pub fn next_height(&self) -> BlockHeight {
        BlockHeight(self.0.checked_add(1).expect("Block height overflow"))
    }
}
