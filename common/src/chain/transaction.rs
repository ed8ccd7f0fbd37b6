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

use crate::chain::wire;
use crate::primitives::id::{double_sha256, H256};

/// One coin in the smallest unit this chain accounts in.
pub const COIN: i64 = 100_000_000;

/// The sequence number coinbase inputs carry.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    hash: H256,
    index: u32,
}

impl OutPoint {
    pub fn new(hash: H256, index: u32) -> Self {
        Self { hash, index }
    }

    /// The null previous output that marks a coinbase input.
    pub fn null() -> Self {
        Self {
            hash: H256::zero(),
            index: u32::MAX,
        }
    }

    pub fn hash(&self) -> &H256 {
        &self.hash
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    outpoint: OutPoint,
    script_sig: Vec<u8>,
    sequence: u32,
}

impl TxInput {
    pub fn new(outpoint: OutPoint, script_sig: Vec<u8>, sequence: u32) -> Self {
        Self {
            outpoint,
            script_sig,
            sequence,
        }
    }

    pub fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    pub fn script_sig(&self) -> &[u8] {
        &self.script_sig
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    value: i64,
    script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: i64, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn script_pubkey(&self) -> &[u8] {
        &self.script_pubkey
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: i32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
}

impl Transaction {
    pub fn new(version: i32, inputs: Vec<TxInput>, outputs: Vec<TxOutput>, lock_time: u32) -> Self {
        Self {
            version,
            inputs,
            outputs,
            lock_time,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// The pre-segwit wire encoding the transaction id is computed over.
    pub fn serialized(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::write_i32_le(&mut out, self.version);
        wire::write_var_int(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(input.outpoint.hash.as_bytes());
            wire::write_u32_le(&mut out, input.outpoint.index);
            wire::write_bytes(&mut out, &input.script_sig);
            wire::write_u32_le(&mut out, input.sequence);
        }
        wire::write_var_int(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            wire::write_i64_le(&mut out, output.value);
            wire::write_bytes(&mut out, &output.script_pubkey);
        }
        wire::write_u32_le(&mut out, self.lock_time);
        out
    }

    pub fn txid(&self) -> H256 {
        double_sha256(self.serialized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_coinbase() -> Transaction {
        Transaction::new(
            1,
            vec![TxInput::new(OutPoint::null(), vec![0x01, 0x04], SEQUENCE_FINAL)],
            vec![TxOutput::new(50 * COIN, vec![0xac])],
            0,
        )
    }

    #[test]
    fn coinbase_wire_layout() {
        let tx = sample_coinbase();
        let bytes = tx.serialized();

        // version | vin count | null outpoint | script | sequence |
        // vout count | value | script | lock time
        assert_eq!(&bytes[..4], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(bytes[4], 0x01);
        assert_eq!(&bytes[5..37], &[0u8; 32]);
        assert_eq!(&bytes[37..41], &[0xff; 4]);
        assert_eq!(&bytes[41..44], &[0x02, 0x01, 0x04]);
        assert_eq!(&bytes[44..48], &[0xff; 4]);
        assert_eq!(bytes[48], 0x01);
        assert_eq!(
            &bytes[49..57],
            &[0x00, 0xf2, 0x05, 0x2a, 0x01, 0x00, 0x00, 0x00]
        );
        assert_eq!(&bytes[57..59], &[0x01, 0xac]);
        assert_eq!(&bytes[59..], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), 63);
    }

    #[test]
    fn txid_commits_to_the_encoding() {
        let tx = sample_coinbase();
        assert_eq!(tx.txid(), double_sha256(tx.serialized()));

        let other = Transaction::new(
            1,
            vec![TxInput::new(OutPoint::null(), vec![0x01, 0x05], SEQUENCE_FINAL)],
            vec![TxOutput::new(50 * COIN, vec![0xac])],
            0,
        );
        assert_ne!(tx.txid(), other.txid());
    }
}
