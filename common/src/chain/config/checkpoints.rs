// Copyright (c) 2023 RBB S.r.l
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

use std::collections::BTreeMap;

use utils::ensure;

use crate::primitives::{BlockHeight, H256};

/// Known-good block hashes at fixed heights, plus the bookkeeping statistics
/// the node reports about the last one. Chains diverging below a checkpoint
/// are rejected unconditionally by the consumers of this table.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoints {
    checkpoints: BTreeMap<BlockHeight, H256>,
    last_checkpoint_time: u32,
    tx_count_at_last_checkpoint: u64,
    tx_per_day_estimate: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointsError {
    #[error("A checkpoint table must anchor the chain at height zero")]
    GenesisMissing,
}

impl Checkpoints {
    pub fn new(
        checkpoints: BTreeMap<BlockHeight, H256>,
        last_checkpoint_time: u32,
        tx_count_at_last_checkpoint: u64,
        tx_per_day_estimate: f64,
    ) -> Result<Self, CheckpointsError> {
        ensure!(
            checkpoints.contains_key(&BlockHeight::zero()),
            CheckpointsError::GenesisMissing
        );

        Ok(Self {
            checkpoints,
            last_checkpoint_time,
            tx_count_at_last_checkpoint,
            tx_per_day_estimate,
        })
    }

    pub fn checkpoint_at_height(&self, height: &BlockHeight) -> Option<&H256> {
        self.checkpoints.get(height)
    }

    /// The closest checkpoint at or below the given height.
    pub fn parent_checkpoint_to_height(&self, height: BlockHeight) -> (BlockHeight, H256) {
        let cp = self
            .checkpoints
            .range(..=height)
            .next_back()
            .expect("Genesis must be there, at least");
        (*cp.0, *cp.1)
    }

    pub fn last_checkpoint(&self) -> (BlockHeight, H256) {
        let (height, cp) = self
            .checkpoints
            .last_key_value()
            .expect("Genesis must be there, at least");
        (*height, *cp)
    }

    pub fn last_checkpoint_time(&self) -> u32 {
        self.last_checkpoint_time
    }

    pub fn tx_count_at_last_checkpoint(&self) -> u64 {
        self.tx_count_at_last_checkpoint
    }

    pub fn tx_per_day_estimate(&self) -> f64 {
        self.tx_per_day_estimate
    }

    pub fn checkpoints_map(&self) -> &BTreeMap<BlockHeight, H256> {
        &self.checkpoints
    }
}
