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

//! The Kimoto Gravity Well, the retarget the chain launched with. The window
//! of sampled ancestors grows until the observed block rate leaves the "event
//! horizon" around the target rate, then the averaged target is rescaled by
//! the observed rate.

use common::chain::BlockIndex;
use common::primitives::{BlockHeight, Compact};
use common::Uint256;
use logging::log;

use crate::pow::error::ConsensusPoWError;

pub(crate) fn kimoto_gravity_well(
    last_solved: &BlockIndex,
    target_spacing_secs: u64,
    past_blocks_min: u64,
    past_blocks_max: u64,
    pow_limit: Uint256,
) -> Result<Compact, ConsensusPoWError> {
    if last_solved.height() == BlockHeight::zero()
        || u64::from(last_solved.height()) < past_blocks_min
    {
        return Ok(Compact::from(pow_limit));
    }

    let mut reading = last_solved;
    let mut mass: u64 = 0;
    let mut actual_seconds: i64 = 0;
    let mut target_seconds: i64 = 0;
    let mut avg = Uint256::ZERO;
    let mut avg_prev = Uint256::ZERO;

    let mut i: u64 = 1;
    loop {
        if u64::from(reading.height()) == 0 {
            break;
        }
        if past_blocks_max > 0 && i > past_blocks_max {
            break;
        }
        mass += 1;

        let current = Uint256::try_from(reading.bits())
            .map_err(|_| ConsensusPoWError::DecodingBitsFailed(reading.bits()))?;
        avg = if i == 1 {
            current
        } else if current >= avg_prev {
            // difference-first form, so the unsigned running average never
            // underflows
            let step = current
                .checked_sub(&avg_prev)
                .expect("current >= avg_prev")
                .checked_div(&Uint256::from_u64(i))
                .expect("the loop index is non-zero");
            avg_prev.checked_add(&step).expect("an average of targets fits 256 bits")
        } else {
            let step = avg_prev
                .checked_sub(&current)
                .expect("avg_prev > current")
                .checked_div(&Uint256::from_u64(i))
                .expect("the loop index is non-zero");
            avg_prev.checked_sub(&step).expect("the step never exceeds the average")
        };
        avg_prev = avg;

        actual_seconds = last_solved.block_time().as_int_seconds() as i64
            - reading.block_time().as_int_seconds() as i64;
        target_seconds = (target_spacing_secs * mass) as i64;
        if actual_seconds < 0 {
            actual_seconds = 0;
        }
        let mut adjustment_ratio = 1.0;
        if actual_seconds != 0 && target_seconds != 0 {
            adjustment_ratio = target_seconds as f64 / actual_seconds as f64;
        }

        // Consensus requires IEEE-754 binary64 and the libm pow here; any
        // substitution changes where the window stops on real chains.
        let event_horizon_deviation = 1.0 + 0.7084 * (mass as f64 / 144.0).powf(-1.228);
        let event_horizon_deviation_fast = event_horizon_deviation;
        let event_horizon_deviation_slow = 1.0 / event_horizon_deviation;

        if mass >= past_blocks_min
            && (adjustment_ratio <= event_horizon_deviation_slow
                || adjustment_ratio >= event_horizon_deviation_fast)
        {
            break;
        }
        match reading.prev() {
            Some(previous) => reading = previous,
            None => break,
        }
        i += 1;
    }

    let mut new_target = avg;
    if actual_seconds != 0 && target_seconds != 0 {
        log::debug!(
            "gravity well retarget over {mass} blocks: actual {actual_seconds}s, target {target_seconds}s"
        );
        new_target = new_target.mul_u64(actual_seconds as u64);
        new_target = new_target
            .checked_div(&Uint256::from_u64(target_seconds as u64))
            .expect("target seconds is non-zero in this branch");
    }
    if new_target > pow_limit {
        new_target = pow_limit;
    }

    Ok(Compact::from(new_target))
}
