// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod block_index;
pub mod timestamp;

pub use block_index::BlockIndex;
pub use timestamp::BlockTimestamp;

use thiserror::Error;

use crate::chain::transaction::Transaction;
use crate::chain::wire;
use crate::primitives::compact::Compact;
use crate::primitives::id::{double_sha256, H256};
use crate::primitives::merkle::{merkle_root, MerkleTreeFormError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    version: i32,
    prev_block_hash: H256,
    merkle_root: H256,
    timestamp: BlockTimestamp,
    bits: Compact,
    nonce: u32,
}

impl BlockHeader {
    pub fn new(
        version: i32,
        prev_block_hash: H256,
        merkle_root: H256,
        timestamp: BlockTimestamp,
        bits: Compact,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn prev_block_hash(&self) -> &H256 {
        &self.prev_block_hash
    }

    pub fn merkle_root(&self) -> &H256 {
        &self.merkle_root
    }

    pub fn timestamp(&self) -> BlockTimestamp {
        self.timestamp
    }

    pub fn bits(&self) -> Compact {
        self.bits
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// The 80-byte wire encoding the block id is computed over.
    pub fn serialized(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(80);
        wire::write_i32_le(&mut out, self.version);
        out.extend_from_slice(self.prev_block_hash.as_bytes());
        out.extend_from_slice(self.merkle_root.as_bytes());
        wire::write_u32_le(&mut out, self.timestamp.as_int_seconds());
        wire::write_u32_le(&mut out, self.bits.0);
        wire::write_u32_le(&mut out, self.nonce);
        out
    }

    pub fn block_hash(&self) -> H256 {
        double_sha256(self.serialized())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCreationError {
    #[error("Failed to compute the merkle root: {0}")]
    MerkleTreeError(#[from] MerkleTreeFormError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        version: i32,
        prev_block_hash: H256,
        timestamp: BlockTimestamp,
        bits: Compact,
        nonce: u32,
        transactions: Vec<Transaction>,
    ) -> Result<Self, BlockCreationError> {
        let tx_ids = transactions.iter().map(|tx| tx.txid()).collect::<Vec<_>>();
        let merkle_root = merkle_root(&tx_ids)?;
        let header = BlockHeader::new(version, prev_block_hash, merkle_root, timestamp, bits, nonce);
        Ok(Self {
            header,
            transactions,
        })
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn merkle_root(&self) -> &H256 {
        self.header.merkle_root()
    }

    pub fn timestamp(&self) -> BlockTimestamp {
        self.header.timestamp()
    }

    pub fn block_hash(&self) -> H256 {
        self.header.block_hash()
    }
}
