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

mod checkpoints;
pub mod registry;

pub use checkpoints::{Checkpoints, CheckpointsError};
pub use registry::{params, select_params, update_regtest_deployment, ParamsError};

use std::collections::BTreeMap;
use std::sync::Arc;

use hex::FromHex;

use crate::chain::block::{Block, BlockTimestamp};
use crate::chain::consensus::{ConsensusParams, Deployment, DeploymentSchedule};
use crate::chain::script::{ScriptBuilder, OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use crate::chain::transaction::{OutPoint, Transaction, TxInput, TxOutput, COIN, SEQUENCE_FINAL};
use crate::primitives::{BlockHeight, Compact, H256};
use crate::Uint256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChainType {
    Mainnet,
    Testnet,
    Regtest,
}

impl ChainType {
    /// The canonical network id, as used by the parameter selector and the
    /// data directory layout.
    pub const fn name(&self) -> &'static str {
        match self {
            ChainType::Mainnet => "main",
            ChainType::Testnet => "test",
            ChainType::Regtest => "regtest",
        }
    }

    const fn default_magic_bytes(&self) -> [u8; 4] {
        match self {
            ChainType::Mainnet => [0xee, 0xcb, 0x4c, 0xca],
            ChainType::Testnet => [0xaf, 0x2a, 0x0f, 0x1c],
            ChainType::Regtest => [0xaf, 0xfb, 0x5b, 0xad],
        }
    }

    const fn default_p2p_port(&self) -> u16 {
        match self {
            ChainType::Mainnet => 41826,
            ChainType::Testnet | ChainType::Regtest => 31826,
        }
    }
}

/// The base58 prefix table is keyed by what the byte sequence prefixes.
/// Interpreting the sequences is the address codec's business, not ours.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Base58Prefix {
    PubkeyAddress,
    ScriptAddress,
    /// The second, chain-specific script-hash version byte.
    ScriptAddress2,
    SecretKey,
    ExtPublicKey,
    ExtSecretKey,
}

/// A hard-coded peer: an IPv6-mapped address and a port. Carried as data; the
/// p2p layer decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSpec {
    pub addr: [u8; 16],
    pub port: u16,
}

/// Everything that distinguishes one network of this coin from another:
/// the consensus constants plus the p2p/identity data around them.
///
/// Instances are built once per process by the `create_*` constructors and are
/// immutable afterwards, so one `Arc` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct ChainParams {
    chain_type: ChainType,
    message_start: [u8; 4],
    default_port: u16,
    prune_after_height: u64,
    base58_prefixes: BTreeMap<Base58Prefix, Vec<u8>>,
    checkpoint_data: Checkpoints,
    fixed_seeds: Vec<SeedSpec>,
    mining_requires_peers: bool,
    default_consistency_checks: bool,
    require_standard: bool,
    mine_blocks_on_demand: bool,
    testnet_to_be_deprecated_field_rpc: bool,
    genesis_block: Arc<Block>,
    consensus: ConsensusParams,
}

impl ChainParams {
    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn network_id(&self) -> &'static str {
        self.chain_type.name()
    }

    pub fn message_start(&self) -> &[u8; 4] {
        &self.message_start
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    pub fn prune_after_height(&self) -> u64 {
        self.prune_after_height
    }

    pub fn base58_prefix(&self, kind: Base58Prefix) -> &[u8] {
        self.base58_prefixes
            .get(&kind)
            .map(Vec::as_slice)
            .expect("all prefix kinds are populated at construction")
    }

    pub fn checkpoint_data(&self) -> &Checkpoints {
        &self.checkpoint_data
    }

    pub fn fixed_seeds(&self) -> &[SeedSpec] {
        &self.fixed_seeds
    }

    pub fn mining_requires_peers(&self) -> bool {
        self.mining_requires_peers
    }

    pub fn default_consistency_checks(&self) -> bool {
        self.default_consistency_checks
    }

    pub fn require_standard(&self) -> bool {
        self.require_standard
    }

    pub fn mine_blocks_on_demand(&self) -> bool {
        self.mine_blocks_on_demand
    }

    pub fn testnet_to_be_deprecated_field_rpc(&self) -> bool {
        self.testnet_to_be_deprecated_field_rpc
    }

    pub fn genesis_block(&self) -> &Arc<Block> {
        &self.genesis_block
    }

    pub fn genesis_block_id(&self) -> H256 {
        *self.consensus.hash_genesis_block()
    }

    pub fn consensus(&self) -> &ConsensusParams {
        &self.consensus
    }

    /// Test-harness escape hatch: reschedule one deployment. Only the regtest
    /// instance is ever touched through this, via the parameter registry.
    pub(crate) fn update_deployment_schedule(
        &mut self,
        deployment: Deployment,
        start_time: i64,
        timeout: i64,
    ) {
        self.consensus.set_deployment_schedule(deployment, start_time, timeout);
    }
}

const fn pow_limit(chain_type: ChainType) -> Uint256 {
    match chain_type {
        ChainType::Mainnet | ChainType::Testnet => Uint256([
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x00000FFFFFFFFFFF,
        ]),
        ChainType::Regtest => Uint256([
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x7FFFFFFFFFFFFFFF,
        ]),
    }
}

// 0x00000000000000000000000000000000000000000000000000c77bc63bfadbd1
const MAINNET_MINIMUM_CHAIN_WORK: Uint256 =
    Uint256([0x00C77BC63BFADBD1, 0x0, 0x0, 0x0]);

const GENESIS_COINBASE_TEXT: &str =
    "NY Times 19/Feb/2014 North Korea Arrests Christian Missionary From Australia";

// Regtest simulates the Litecoin genesis so all its validation data stays
// reusable for automated testing.
const REGTEST_GENESIS_COINBASE_TEXT: &str =
    "NY Times 05/Oct/2011 Steve Jobs, Apple’s Visionary, Dies at 56";

const GENESIS_OUTPUT_KEY_HASH: &str = "1cec44c9f9b769ae08ebf9d694c7611a16edf615";

const REGTEST_GENESIS_OUTPUT_PUBKEY: &str =
    "040184710fa689ad5023690c80f3a49c8f13f8d45b8c857fbcbc8bc4a8e4d3eb4b10f4d4604fa08dce601aaf0f470216fe1b51850b4acf21b179c45070ac7b03a9";

fn hash_literal(hex: &str) -> H256 {
    H256::from_bitcoin_uint256_hex(hex).expect("hard-coded hash literal is valid hex")
}

/// Build the genesis block. The output of its generation transaction cannot be
/// spent since it did not originally exist in the database.
fn create_genesis_block(
    coinbase_text: &str,
    genesis_output_script: Vec<u8>,
    time: u32,
    nonce: u32,
    bits: Compact,
    version: i32,
    genesis_reward: i64,
) -> Block {
    let script_sig = ScriptBuilder::new()
        .push_number(486604799)
        .push_number(4)
        .push_slice(coinbase_text.as_bytes())
        .build();

    let coinbase = Transaction::new(
        1,
        vec![TxInput::new(OutPoint::null(), script_sig, SEQUENCE_FINAL)],
        vec![TxOutput::new(genesis_reward, genesis_output_script)],
        0,
    );

    Block::new(
        version,
        H256::zero(),
        BlockTimestamp::from_int_seconds(time),
        bits,
        nonce,
        vec![coinbase],
    )
    .expect("genesis block construction cannot fail")
}

fn genesis_output_script() -> Vec<u8> {
    let key_hash =
        Vec::from_hex(GENESIS_OUTPUT_KEY_HASH).expect("hex decoding of pubkey hash shouldn't fail");
    ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(&key_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .build()
}

fn regtest_genesis_output_script() -> Vec<u8> {
    let pubkey =
        Vec::from_hex(REGTEST_GENESIS_OUTPUT_PUBKEY).expect("hex decoding of pubkey shouldn't fail");
    ScriptBuilder::new().push_slice(&pubkey).push_opcode(OP_CHECKSIG).build()
}

pub fn create_mainnet() -> ChainParams {
    let chain_type = ChainType::Mainnet;

    let genesis = create_genesis_block(
        GENESIS_COINBASE_TEXT,
        genesis_output_script(),
        1392841423,
        3236648,
        Compact(0x1e0ffff0),
        1,
        50 * COIN,
    );
    let genesis_hash = genesis.block_hash();
    assert_eq!(
        genesis_hash,
        hash_literal("4e56204bb7b8ac06f860ff1c845f03f984303b5b97eb7b42868f714611aed94b"),
        "mainnet genesis hash diverged from the declared constant"
    );
    assert_eq!(
        genesis.merkle_root(),
        &hash_literal("b3e47e8776012ee4352acf603e6b9df005445dcba85c606697f422be3cc26f9b"),
        "mainnet genesis merkle root diverged from the declared constant"
    );

    let consensus = ConsensusParams {
        subsidy_halving_interval: 840000,
        majority_enforce_block_upgrade: 1875,
        majority_reject_block_outdated: 2375,
        majority_window: 2500,
        bip34_height: 1,
        bip34_hash: hash_literal(
            "d1c175570320d4d6388a4525385b8f20460d340f621cfeebb9824712b9e593c5",
        ),
        pow_limit: pow_limit(chain_type),
        charity_pub_key: GENESIS_OUTPUT_KEY_HASH.to_owned(),
        pow_target_timespan: 60,
        pow_target_spacing: 60,
        allow_min_difficulty_blocks: false,
        no_retargeting: false,
        rule_change_activation_threshold: 15120, // 75% of 20160
        miner_confirmation_window: 20160,
        deployments: [
            // TESTDUMMY
            DeploymentSchedule::new(28, 1199145601, 1230767999),
            // CSV: BIP68, BIP112, and BIP113
            DeploymentSchedule::new(0, 1485561600, 1517356801),
            // SEGWIT: BIP141, BIP143, and BIP147
            DeploymentSchedule::new(1, 1485561600, 1517356801),
        ],
        minimum_chain_work: MAINNET_MINIMUM_CHAIN_WORK,
        hash_genesis_block: genesis_hash,
    };

    ChainParams {
        chain_type,
        // rarely used upper ASCII, not valid as UTF-8, and a large 32-bit
        // integer with any alignment
        message_start: chain_type.default_magic_bytes(),
        default_port: chain_type.default_p2p_port(),
        prune_after_height: 100000,
        base58_prefixes: BTreeMap::from([
            (Base58Prefix::PubkeyAddress, vec![33]),
            (Base58Prefix::ScriptAddress, vec![5]),
            (Base58Prefix::ScriptAddress2, vec![55]),
            (Base58Prefix::SecretKey, vec![176]),
            (Base58Prefix::ExtPublicKey, vec![0x04, 0x88, 0xB2, 0x1E]),
            (Base58Prefix::ExtSecretKey, vec![0x04, 0x88, 0xAD, 0xE4]),
        ]),
        checkpoint_data: Checkpoints::new(
            BTreeMap::from([
                (
                    BlockHeight::new(0),
                    hash_literal(
                        "4e56204bb7b8ac06f860ff1c845f03f984303b5b97eb7b42868f714611aed94b",
                    ),
                ),
                (
                    BlockHeight::new(14871),
                    hash_literal(
                        "5dedc3dd860f008c717d69b8b00f0476de8bc6bdac8d543fb58c946f32f982fa",
                    ),
                ),
                (
                    BlockHeight::new(36032),
                    hash_literal(
                        "ff37468190b2801f2e72eb1762ca4e53cda6c075af48343f28a32b649512e9a8",
                    ),
                ),
                (
                    BlockHeight::new(51365),
                    hash_literal(
                        "702b407c68091f3c97a587a8d92684666bb622f6821944424b850964b366e42c",
                    ),
                ),
                (
                    BlockHeight::new(621000),
                    hash_literal(
                        "e2bf6d219cff9d6d7661b7964a05bfea3128265275c3673616ae71fed7072981",
                    ),
                ),
                (
                    BlockHeight::new(1410100),
                    hash_literal(
                        "f6736ff2a7743014ab1902e442328f5c9928ce7f4edb2b4fd0130010cb4cebc4",
                    ),
                ),
            ]),
            1494147472, // UNIX timestamp of last checkpoint block
            2147811,    // total number of transactions up to that block
            2000.0,     // estimated number of transactions per day after it
        )
        .expect("mainnet checkpoint table is well-formed"),
        // the seeder array is maintained out of band
        fixed_seeds: Vec::new(),
        mining_requires_peers: true,
        default_consistency_checks: false,
        require_standard: true,
        mine_blocks_on_demand: false,
        testnet_to_be_deprecated_field_rpc: false,
        genesis_block: Arc::new(genesis),
        consensus,
    }
}

pub fn create_testnet() -> ChainParams {
    let chain_type = ChainType::Testnet;

    let genesis = create_genesis_block(
        GENESIS_COINBASE_TEXT,
        genesis_output_script(),
        1494757042,
        2231829,
        Compact(0x1e0ffff0),
        1,
        50 * COIN,
    );
    let genesis_hash = genesis.block_hash();
    assert_eq!(
        genesis_hash,
        hash_literal("a4271888b5e60092c3e7183a76d454741e9a7a55f2b4afbe574615829e406bee"),
        "testnet genesis hash diverged from the declared constant"
    );
    assert_eq!(
        genesis.merkle_root(),
        &hash_literal("b3e47e8776012ee4352acf603e6b9df005445dcba85c606697f422be3cc26f9b"),
        "testnet genesis merkle root diverged from the declared constant"
    );

    let consensus = ConsensusParams {
        subsidy_halving_interval: 840000,
        majority_enforce_block_upgrade: 180,
        majority_reject_block_outdated: 228,
        majority_window: 240,
        // BIP34 has not activated on testnet
        bip34_height: -1,
        bip34_hash: H256::zero(),
        pow_limit: pow_limit(chain_type),
        charity_pub_key: "02bde17927d1340113fa6f795cac7ffee4c9364ba55f7e7b97413b48e69817baa6"
            .to_owned(),
        pow_target_timespan: 60,
        pow_target_spacing: 60,
        allow_min_difficulty_blocks: true,
        no_retargeting: false,
        rule_change_activation_threshold: 1512, // 75% for testchains
        miner_confirmation_window: 2016,
        deployments: [
            DeploymentSchedule::new(28, 1199145601, 1230767999),
            DeploymentSchedule::new(0, 1483228800, 1517356801),
            DeploymentSchedule::new(1, 1483228800, 1517356801),
        ],
        minimum_chain_work: Uint256::ZERO,
        hash_genesis_block: genesis_hash,
    };

    ChainParams {
        chain_type,
        message_start: chain_type.default_magic_bytes(),
        default_port: chain_type.default_p2p_port(),
        prune_after_height: 1000,
        base58_prefixes: BTreeMap::from([
            (Base58Prefix::PubkeyAddress, vec![111]),
            (Base58Prefix::ScriptAddress, vec![196]),
            (Base58Prefix::ScriptAddress2, vec![58]),
            (Base58Prefix::SecretKey, vec![239]),
            (Base58Prefix::ExtPublicKey, vec![0x04, 0x35, 0x87, 0xCF]),
            (Base58Prefix::ExtSecretKey, vec![0x04, 0x35, 0x83, 0x94]),
        ]),
        checkpoint_data: Checkpoints::new(
            BTreeMap::from([
                (
                    BlockHeight::new(0),
                    hash_literal(
                        "a4271888b5e60092c3e7183a76d454741e9a7a55f2b4afbe574615829e406bee",
                    ),
                ),
                (
                    BlockHeight::new(6),
                    hash_literal(
                        "8618a815ad94f918a7d3d4df7ebc4df5f14da1ea25d0eb156b6a32f9621c2ce4",
                    ),
                ),
            ]),
            1494590578,
            7,
            1500.0,
        )
        .expect("testnet checkpoint table is well-formed"),
        fixed_seeds: Vec::new(),
        mining_requires_peers: true,
        default_consistency_checks: false,
        require_standard: false,
        mine_blocks_on_demand: false,
        testnet_to_be_deprecated_field_rpc: true,
        genesis_block: Arc::new(genesis),
        consensus,
    }
}

pub fn create_regtest() -> ChainParams {
    let chain_type = ChainType::Regtest;

    let genesis = create_genesis_block(
        REGTEST_GENESIS_COINBASE_TEXT,
        regtest_genesis_output_script(),
        1296688602,
        0,
        Compact(0x207fffff),
        1,
        50 * COIN,
    );
    let genesis_hash = genesis.block_hash();
    assert_eq!(
        genesis_hash,
        hash_literal("530827f38f93b43ed12af0b3ad25a288dc02ed74d6d7857862df51fc56c416f9"),
        "regtest genesis hash diverged from the declared constant"
    );
    assert_eq!(
        genesis.merkle_root(),
        &hash_literal("97ddfbbae6be97fd6cdf3e7ca13232a3afff2353e29badfab7f73011edd4ced9"),
        "regtest genesis merkle root diverged from the declared constant"
    );

    let consensus = ConsensusParams {
        subsidy_halving_interval: 150,
        majority_enforce_block_upgrade: 750,
        majority_reject_block_outdated: 950,
        majority_window: 1000,
        // BIP34 has not necessarily activated on regtest
        bip34_height: -1,
        bip34_hash: H256::zero(),
        pow_limit: pow_limit(chain_type),
        charity_pub_key: "0377ba3117d776b40b49a910e869cd32adee4d33578f7bf52e1879ea739c9796ca"
            .to_owned(),
        pow_target_timespan: 302400, // three and a half days
        pow_target_spacing: 150,
        allow_min_difficulty_blocks: true,
        no_retargeting: true,
        rule_change_activation_threshold: 108, // 75% for testchains
        miner_confirmation_window: 144,
        deployments: [
            DeploymentSchedule::new(28, 0, 999999999999),
            DeploymentSchedule::new(0, 0, 999999999999),
            DeploymentSchedule::new(1, 0, 999999999999),
        ],
        minimum_chain_work: Uint256::ZERO,
        hash_genesis_block: genesis_hash,
    };

    ChainParams {
        chain_type,
        message_start: chain_type.default_magic_bytes(),
        default_port: chain_type.default_p2p_port(),
        prune_after_height: 1000,
        base58_prefixes: BTreeMap::from([
            (Base58Prefix::PubkeyAddress, vec![111]),
            (Base58Prefix::ScriptAddress, vec![196]),
            (Base58Prefix::ScriptAddress2, vec![58]),
            (Base58Prefix::SecretKey, vec![239]),
            (Base58Prefix::ExtPublicKey, vec![0x04, 0x35, 0x87, 0xCF]),
            (Base58Prefix::ExtSecretKey, vec![0x04, 0x35, 0x83, 0x94]),
        ]),
        checkpoint_data: Checkpoints::new(
            BTreeMap::from([(
                BlockHeight::new(0),
                hash_literal("0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206"),
            )]),
            0,
            0,
            0.0,
        )
        .expect("regtest checkpoint table is well-formed"),
        // regtest mode doesn't have any fixed seeds
        fixed_seeds: Vec::new(),
        mining_requires_peers: false,
        default_consistency_checks: true,
        require_standard: false,
        mine_blocks_on_demand: true,
        testnet_to_be_deprecated_field_rpc: false,
        genesis_block: Arc::new(genesis),
        consensus,
    }
}

/// Parameters for unit tests: the regtest chain with retargeting switched
/// back on and the min-difficulty escape switched off, so the plain boundary
/// rules are reachable at a non-trivial adjustment interval.
pub fn create_unit_test_params() -> ChainParams {
    let mut params = create_regtest();
    params.consensus.allow_min_difficulty_blocks = false;
    params.consensus.no_retargeting = false;
    params
}
