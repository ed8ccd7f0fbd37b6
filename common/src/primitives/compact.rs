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

use crate::uint::Uint256;
use parity_scale_codec::{Decode, Encode};
use std::ops::Shl;
use thiserror::Error;

/// The 32-bit "nBits" encoding of a 256-bit proof-of-work threshold: the high
/// byte is a base-256 exponent, the low 24 bits a signed mantissa.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Encode, Decode)]
pub struct Compact(pub u32);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactTargetError {
    #[error("Compact target {0:?} has the sign bit set")]
    Negative(Compact),
    #[error("Compact target {0:?} overflows 256 bits")]
    Overflow(Compact),
}

impl TryFrom<Compact> for Uint256 {
    type Error = CompactTargetError;

    // https://github.com/bitcoin/bitcoin/blob/7fcf53f7b4524572d1d0c9a5fdc388e87eb02416/src/arith_uint256.cpp#L203
    fn try_from(value: Compact) -> Result<Self, Self::Error> {
        let compact = value.0;
        let size = compact >> 24;
        let mut word = compact & 0x007FFFFF;

        let result = if size <= 3 {
            word >>= 8 * (3 - size);

            Uint256::from_u64(word as u64)
        } else {
            let result = Uint256::from_u64(word as u64);
            let shift = 8 * (size - 3);
            result.shl(shift as usize)
        };

        if word != 0 && (compact & 0x00800000) != 0 {
            return Err(CompactTargetError::Negative(value));
        }

        if word != 0 && ((size > 34) || (word > 0xFF && size > 33) || (word > 0xFFFF && size > 32))
        {
            return Err(CompactTargetError::Overflow(value));
        }

        Ok(result)
    }
}

// https://github.com/bitcoin/bitcoin/blob/7fcf53f7b4524572d1d0c9a5fdc388e87eb02416/src/arith_uint256.cpp#L223
impl From<Uint256> for Compact {
    fn from(value: Uint256) -> Self {
        let mut size = (value.bits() + 7) / 8;

        let mut compact = if size <= 3 {
            value.low_u64() << (8 * (3 - size))
        } else {
            let bn = value >> (8 * (size - 3));
            bn.low_u64()
        };

        if (compact & 0x00800000) != 0 {
            compact >>= 8;
            size += 1;
        }

        let x = compact as u32 | (size << 24) as u32;

        Compact(x)
    }
}
