// Copyright (c) 2021 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;
use utils::ensure;

use crate::primitives::id::{double_sha256, H256};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerkleTreeFormError {
    #[error("Merkle tree requires at least one leaf")]
    NoLeaves,
}

/// Compute the merkle root the way the bitcoin lineage does for block bodies:
/// pairwise double-SHA256, duplicating the last node of every odd level.
///
/// The known CVE-2012-2459 mutation (duplicated last transaction producing the
/// same root) is deliberately kept; rejecting it belongs to block validation,
/// not to the root computation.
pub fn merkle_root(leaves: &[H256]) -> Result<H256, MerkleTreeFormError> {
    ensure!(!leaves.is_empty(), MerkleTreeFormError::NoLeaves);

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut concat = [0u8; 64];
                concat[..32].copy_from_slice(pair[0].as_bytes());
                concat[32..].copy_from_slice(pair[1].as_bytes());
                double_sha256(concat)
            })
            .collect();
    }

    Ok(level[0])
}
