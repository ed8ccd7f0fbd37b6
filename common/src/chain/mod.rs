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

pub mod block;
pub mod config;
mod consensus;
pub mod script;
pub mod transaction;
mod wire;

pub use block::{Block, BlockHeader, BlockIndex, BlockTimestamp};
pub use config::{
    create_mainnet, create_regtest, create_testnet, create_unit_test_params, Base58Prefix,
    ChainParams, ChainType, SeedSpec,
};
pub use consensus::{ConsensusParams, Deployment, DeploymentSchedule};
pub use transaction::{OutPoint, Transaction, TxInput, TxOutput, COIN};
