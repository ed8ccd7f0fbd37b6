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

//! The process-wide selector of the active chain parameters.
//!
//! Selection happens once at startup (tests may reselect); afterwards the
//! published `Arc` is immutable and can be read from any thread. The regtest
//! deployment override is the single mutation path and is restricted to
//! single-threaded test setup by contract.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::chain::config::{create_mainnet, create_regtest, create_testnet, ChainParams, ChainType};
use crate::chain::consensus::Deployment;

static ACTIVE_PARAMS: Lazy<RwLock<Option<Arc<ChainParams>>>> = Lazy::new(|| RwLock::new(None));

// Overrides survive reselection, like the mutable static instances of the
// original parameter tables did.
static REGTEST_DEPLOYMENT_OVERRIDES: Lazy<RwLock<BTreeMap<Deployment, (i64, i64)>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("Unknown chain `{0}`")]
    UnknownChain(String),
    #[error("Chain parameters were not selected yet")]
    NotInitialized,
}

impl FromStr for ChainType {
    type Err = ParamsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "main" => Ok(ChainType::Mainnet),
            "test" => Ok(ChainType::Testnet),
            "regtest" => Ok(ChainType::Regtest),
            _ => Err(ParamsError::UnknownChain(name.to_owned())),
        }
    }
}

fn build_params(chain_type: ChainType) -> ChainParams {
    match chain_type {
        ChainType::Mainnet => create_mainnet(),
        ChainType::Testnet => create_testnet(),
        ChainType::Regtest => {
            let mut params = create_regtest();
            let overrides = REGTEST_DEPLOYMENT_OVERRIDES
                .read()
                .expect("regtest override table lock poisoned");
            for (deployment, (start_time, timeout)) in overrides.iter() {
                params.update_deployment_schedule(*deployment, *start_time, *timeout);
            }
            params
        }
    }
}

/// Select the active parameter set by network id.
pub fn select_params(network: &str) -> Result<Arc<ChainParams>, ParamsError> {
    let chain_type = network.parse::<ChainType>()?;
    let params = Arc::new(build_params(chain_type));

    let mut active = ACTIVE_PARAMS.write().expect("active params lock poisoned");
    *active = Some(Arc::clone(&params));

    Ok(params)
}

/// The active parameter set. Fails until [select_params] has been called.
pub fn params() -> Result<Arc<ChainParams>, ParamsError> {
    ACTIVE_PARAMS
        .read()
        .expect("active params lock poisoned")
        .clone()
        .ok_or(ParamsError::NotInitialized)
}

/// Reschedule one soft-fork deployment on the regtest chain. A no-op for the
/// other chains; an active regtest selection is republished immediately, and
/// later regtest selections observe the override as well. Test-only.
pub fn update_regtest_deployment(deployment: Deployment, start_time: i64, timeout: i64) {
    REGTEST_DEPLOYMENT_OVERRIDES
        .write()
        .expect("regtest override table lock poisoned")
        .insert(deployment, (start_time, timeout));

    let mut active = ACTIVE_PARAMS.write().expect("active params lock poisoned");
    if active.as_ref().is_some_and(|p| p.chain_type() == ChainType::Regtest) {
        *active = Some(Arc::new(build_params(ChainType::Regtest)));
    }
}
