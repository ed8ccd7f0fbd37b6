use std::sync::Arc;

use crate::chain::block::timestamp::BlockTimestamp;
use crate::primitives::{BlockHeight, Compact};

/// A node of the in-memory chain index, singly linked from tip towards
/// genesis. Consensus code only ever reads these; the caller owns the storage
/// and the links.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    height: BlockHeight,
    bits: Compact,
    time: BlockTimestamp,
    prev: Option<Arc<BlockIndex>>,
}

impl Drop for BlockIndex {
    // The derived drop would recurse one stack frame per ancestor; for long
    // chains that overflows the stack. Unlink iteratively instead.
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(arc) = next {
            match Arc::try_unwrap(arc) {
                Ok(mut owned) => next = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl BlockIndex {
    pub fn new(
        height: BlockHeight,
        bits: Compact,
        time: BlockTimestamp,
        prev: Option<Arc<BlockIndex>>,
    ) -> Self {
        Self {
            height,
            bits,
            time,
            prev,
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn bits(&self) -> Compact {
        self.bits
    }

    pub fn block_time(&self) -> BlockTimestamp {
        self.time
    }

    pub fn prev(&self) -> Option<&BlockIndex> {
        self.prev.as_deref()
    }

    pub fn is_genesis(&self) -> bool {
        self.prev.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_follows_the_back_links() {
        let genesis = Arc::new(BlockIndex::new(
            BlockHeight::zero(),
            Compact(0x1e0ffff0),
            BlockTimestamp::from_int_seconds(1000),
            None,
        ));
        let tip = BlockIndex::new(
            BlockHeight::one(),
            Compact(0x1e0ffff0),
            BlockTimestamp::from_int_seconds(1060),
            Some(Arc::clone(&genesis)),
        );

        assert!(genesis.is_genesis());
        assert!(!tip.is_genesis());
        let reached = tip.prev().expect("tip has a parent");
        assert_eq!(reached.height(), BlockHeight::zero());
        assert!(reached.prev().is_none());
    }
}
