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

//! Just enough script assembly to lay down the genesis coinbase. Script
//! execution lives elsewhere; here only the byte layout matters, because the
//! scripts feed the transaction id and, through it, the genesis block hash.

pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.bytes.push(opcode);
        self
    }

    /// A raw data push with its length prefix. Everything pushed here is well
    /// under the OP_PUSHDATA2 threshold, so only the direct and OP_PUSHDATA1
    /// encodings exist.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        if data.len() < OP_PUSHDATA1 as usize {
            self.bytes.push(data.len() as u8);
        } else {
            assert!(
                data.len() <= u8::MAX as usize,
                "script push of {} bytes not supported",
                data.len()
            );
            self.bytes.push(OP_PUSHDATA1);
            self.bytes.push(data.len() as u8);
        }
        self.bytes.extend_from_slice(data);
        self
    }

    /// A number pushed as data in its minimal little-endian ("scriptnum")
    /// form. Note that small integers are pushed this way too, not as OP_N;
    /// the genesis coinbase encodes `4` as `0x01 0x04`.
    pub fn push_number(self, value: i64) -> Self {
        let bytes = serialize_script_num(value);
        self.push_slice(&bytes)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn serialize_script_num(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut absolute = value.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while absolute > 0 {
        result.push((absolute & 0xff) as u8);
        absolute >>= 8;
    }

    // the most significant byte carries the sign bit; grow by one byte when
    // the magnitude already occupies it
    let last = *result.last().expect("value is non-zero");
    if last & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *result.last_mut().expect("value is non-zero") |= 0x80;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_num_encodings() {
        assert_eq!(serialize_script_num(0), Vec::<u8>::new());
        assert_eq!(serialize_script_num(4), vec![0x04]);
        assert_eq!(serialize_script_num(127), vec![0x7f]);
        assert_eq!(serialize_script_num(128), vec![0x80, 0x00]);
        assert_eq!(serialize_script_num(-4), vec![0x84]);
        assert_eq!(serialize_script_num(-128), vec![0x80, 0x80]);
        // the nBits constant pushed into every coinbase of this lineage
        assert_eq!(
            serialize_script_num(486604799),
            vec![0xff, 0xff, 0x00, 0x1d]
        );
    }

    #[test]
    fn genesis_style_pushes() {
        let script = ScriptBuilder::new().push_number(486604799).push_number(4).build();
        assert_eq!(script, vec![0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04]);
    }

    #[test]
    fn long_pushes_use_pushdata1() {
        let data = [0u8; 76];
        let script = ScriptBuilder::new().push_slice(&data).build();
        assert_eq!(script[0], OP_PUSHDATA1);
        assert_eq!(script[1], 76);
        assert_eq!(script.len(), 78);

        let short = [0u8; 75];
        let script = ScriptBuilder::new().push_slice(&short).build();
        assert_eq!(script[0], 75);
        assert_eq!(script.len(), 76);
    }

    #[test]
    fn pay_to_pubkey_hash_layout() {
        let hash = [0x11u8; 20];
        let script = ScriptBuilder::new()
            .push_opcode(OP_DUP)
            .push_opcode(OP_HASH160)
            .push_slice(&hash)
            .push_opcode(OP_EQUALVERIFY)
            .push_opcode(OP_CHECKSIG)
            .build();
        assert_eq!(script.len(), 25);
        assert_eq!(script[0], OP_DUP);
        assert_eq!(script[1], OP_HASH160);
        assert_eq!(script[2], 20);
        assert_eq!(script[23], OP_EQUALVERIFY);
        assert_eq!(script[24], OP_CHECKSIG);
    }
}
