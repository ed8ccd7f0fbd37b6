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

pub mod random;

/// Assert that the given expression matches the pattern, in the spirit of `matches!`.
#[macro_export]
macro_rules! assert_matches {
    ($value:expr, $pattern:pat) => {
        match &$value {
            $pattern => {}
            _ => panic!(
                "assertion failed: `{:?}` does not match `{}`",
                $value,
                stringify!($pattern)
            ),
        }
    };
}
