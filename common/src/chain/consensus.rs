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

use crate::primitives::{BlockHeight, H256};
use crate::Uint256;

/// Version-bit soft-fork deployments. Each is scheduled independently; the
/// order here fixes the layout of [ConsensusParams::deployments].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Deployment {
    TestDummy,
    Csv,
    Segwit,
}

impl Deployment {
    pub const COUNT: usize = 3;

    pub const ALL: [Deployment; Self::COUNT] =
        [Deployment::TestDummy, Deployment::Csv, Deployment::Segwit];
}

/// Activation window of one deployment: the version bit it signals on and the
/// UNIX-time span in which miners may lock it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentSchedule {
    bit: u8,
    start_time: i64,
    timeout: i64,
}

impl DeploymentSchedule {
    pub const fn new(bit: u8, start_time: i64, timeout: i64) -> Self {
        Self {
            bit,
            start_time,
            timeout,
        }
    }

    pub fn bit(&self) -> u8 {
        self.bit
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn timeout(&self) -> i64 {
        self.timeout
    }
}

/// The consensus-critical constants of one chain. Values are fixed at
/// construction; everything the difficulty engine and the verifier need is
/// read from here.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusParams {
    pub(crate) subsidy_halving_interval: u64,
    pub(crate) majority_enforce_block_upgrade: u32,
    pub(crate) majority_reject_block_outdated: u32,
    pub(crate) majority_window: u32,
    // negative means the fork was never assigned a height on this chain
    pub(crate) bip34_height: i64,
    pub(crate) bip34_hash: H256,
    pub(crate) pow_limit: Uint256,
    pub(crate) charity_pub_key: String,
    pub(crate) pow_target_timespan: i64,
    pub(crate) pow_target_spacing: i64,
    pub(crate) allow_min_difficulty_blocks: bool,
    pub(crate) no_retargeting: bool,
    pub(crate) rule_change_activation_threshold: u32,
    pub(crate) miner_confirmation_window: u32,
    pub(crate) deployments: [DeploymentSchedule; Deployment::COUNT],
    pub(crate) minimum_chain_work: Uint256,
    pub(crate) hash_genesis_block: H256,
}

impl ConsensusParams {
    pub fn subsidy_halving_interval(&self) -> u64 {
        self.subsidy_halving_interval
    }

    pub fn majority_enforce_block_upgrade(&self) -> u32 {
        self.majority_enforce_block_upgrade
    }

    pub fn majority_reject_block_outdated(&self) -> u32 {
        self.majority_reject_block_outdated
    }

    pub fn majority_window(&self) -> u32 {
        self.majority_window
    }

    /// The height BIP34 activated at, or `None` where the sentinel says it
    /// never did. The raw value is signed in the parameter tables; consumers
    /// must not reinterpret the negative sentinel as a huge height.
    pub fn bip34_height(&self) -> Option<BlockHeight> {
        u64::try_from(self.bip34_height).ok().map(BlockHeight::new)
    }

    pub fn bip34_hash(&self) -> &H256 {
        &self.bip34_hash
    }

    /// The largest (easiest) target a block of this chain may carry.
    pub fn pow_limit(&self) -> Uint256 {
        self.pow_limit
    }

    pub fn charity_pub_key(&self) -> &str {
        &self.charity_pub_key
    }

    pub fn pow_target_timespan(&self) -> i64 {
        self.pow_target_timespan
    }

    pub fn pow_target_spacing(&self) -> i64 {
        self.pow_target_spacing
    }

    pub fn allow_min_difficulty_blocks(&self) -> bool {
        self.allow_min_difficulty_blocks
    }

    pub fn no_retargeting(&self) -> bool {
        self.no_retargeting
    }

    pub fn rule_change_activation_threshold(&self) -> u32 {
        self.rule_change_activation_threshold
    }

    pub fn miner_confirmation_window(&self) -> u32 {
        self.miner_confirmation_window
    }

    pub fn deployment(&self, deployment: Deployment) -> &DeploymentSchedule {
        &self.deployments[deployment as usize]
    }

    pub(crate) fn set_deployment_schedule(
        &mut self,
        deployment: Deployment,
        start_time: i64,
        timeout: i64,
    ) {
        let bit = self.deployments[deployment as usize].bit;
        self.deployments[deployment as usize] = DeploymentSchedule::new(bit, start_time, timeout);
    }

    pub fn minimum_chain_work(&self) -> Uint256 {
        self.minimum_chain_work
    }

    pub fn hash_genesis_block(&self) -> &H256 {
        &self.hash_genesis_block
    }

    /// Number of blocks between retarget boundaries.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        (self.pow_target_timespan / self.pow_target_spacing) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_layout_matches_the_enum() {
        assert_eq!(Deployment::ALL.len(), Deployment::COUNT);
        assert_eq!(Deployment::TestDummy as usize, 0);
        assert_eq!(Deployment::Csv as usize, 1);
        assert_eq!(Deployment::Segwit as usize, 2);
    }

    #[test]
    fn schedule_accessors() {
        let schedule = DeploymentSchedule::new(28, 1199145601, 1230767999);
        assert_eq!(schedule.bit(), 28);
        assert_eq!(schedule.start_time(), 1199145601);
        assert_eq!(schedule.timeout(), 1230767999);
    }
}
