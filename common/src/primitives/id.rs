// Copyright (c) 2021-2022 RBB S.r.l
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

use hex::FromHex;
use parity_scale_codec::{Decode, Encode};
use sha2::{Digest, Sha256};

use crate::Uint256;

fixed_hash::construct_fixed_hash! {
    #[derive(Encode, Decode)]
    pub struct H256(32);
}

impl H256 {
    /// Encoding H256 will result in big-endian encoding of the bytes. Bitcoin uses little-endian for displaying hashes.
    /// This method fills that gap, where we make it possible to print the hash in little-endian to conform to how bitcoin
    /// does it.
    ///
    /// Notice that the internal representation does not really matter in this. What matters is how we view the contents.
    /// If the content is viewed as a number, then serializing the number will result in little-endian encoding because
    /// bitcoin uses little-endian encoding/serialization by default. On the other hand, if the contents are viewed as a
    /// byte-array (as is the case with H256), then serializing the type will result in whatever that byte-array is with
    /// no regard to endianness, which is done as big-endian in H256 if seen as a number.
    pub fn as_bitcoin_uint256_hex(&self) -> String {
        let hex_length = self.0.len() * 2;
        self.as_bytes()
            .iter()
            .rev()
            .fold(String::with_capacity(hex_length), |mut current, b| {
                use std::fmt::Write;
                let _ = write!(current, "{b:02x}");
                current
            })
    }

    /// The inverse of [H256::as_bitcoin_uint256_hex]: parse a hash written the
    /// way bitcoin displays uint256 values (most significant byte first).
    pub fn from_bitcoin_uint256_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = <[u8; 32]>::from_hex(hex)?;
        bytes.reverse();
        Ok(H256(bytes))
    }

    pub fn into_arith_uint256(self) -> Uint256 {
        Uint256::from(self)
    }
}

impl From<H256> for Uint256 {
    fn from(hash: H256) -> Self {
        Uint256::from(hash.0)
    }
}

impl From<Uint256> for H256 {
    fn from(val: Uint256) -> Self {
        H256(val.to_bytes())
    }
}

/// Double SHA256, the block and transaction id function of the bitcoin lineage.
pub fn double_sha256<T: AsRef<[u8]>>(data: T) -> H256 {
    let first = Sha256::digest(data.as_ref());
    let second = Sha256::digest(first);
    H256(second.into())
}
