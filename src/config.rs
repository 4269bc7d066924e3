//! Environment driven configuration: the two inputs of a run, and the knobs
//! that decide how they are handled.

use std::env::VarError;
use std::str::FromStr;

use crate::error::ErrorKind;
use crate::network::NetworkProfile;
use crate::{Error, Result};

/// Account whose state gets listed.
pub const CONTRACT_NAME_ENV: &str = "CONTRACT_NAME";
/// Owner label copied verbatim into the report.
pub const OWNER_ID_ENV: &str = "OWNER_ID";
/// `strict` (default) or `forward`, see [`InputPolicy`].
pub const INPUT_POLICY_ENV: &str = "STATE_KEYS_INPUT_POLICY";
/// When set, split the report into batches of at most this many storage bytes.
pub const MAX_BATCH_BYTES_ENV: &str = "STATE_KEYS_MAX_BATCH_BYTES";

/// How missing or malformed inputs are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputPolicy {
    /// Missing inputs and malformed account ids fail locally, before any request.
    #[default]
    Strict,
    /// Inputs are sent as they are, missing ones as empty strings; the RPC
    /// service decides whether they are acceptable.
    Forward,
}

impl FromStr for InputPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "forward" => Ok(Self::Forward),
            other => Err(ErrorKind::Config.message(format!(
                "unknown {INPUT_POLICY_ENV} value {other:?}, expected `strict` or `forward`"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub profile: NetworkProfile,
    pub input_policy: InputPolicy,
    /// Storage bytes budget of a single report. `None` prints everything at once.
    pub max_batch_bytes: Option<u64>,
}

impl Config {
    pub fn new(profile: NetworkProfile) -> Self {
        Self {
            profile,
            input_policy: InputPolicy::default(),
            max_batch_bytes: None,
        }
    }

    pub fn input_policy(mut self, policy: InputPolicy) -> Self {
        self.input_policy = policy;
        self
    }

    pub fn max_batch_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_batch_bytes = max_bytes;
        self
    }

    /// Testnet configuration, with the knobs read from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(NetworkProfile::testnet())
            .input_policy(input_policy(std::env::var(INPUT_POLICY_ENV).ok())?)
            .max_batch_bytes(max_batch_bytes(std::env::var(MAX_BATCH_BYTES_ENV).ok())?))
    }
}

fn input_policy(value: Option<String>) -> Result<InputPolicy> {
    match value {
        Some(val) => val.parse(),
        None => Ok(InputPolicy::default()),
    }
}

fn max_batch_bytes(value: Option<String>) -> Result<Option<u64>> {
    let Some(val) = value else {
        return Ok(None);
    };

    let max_bytes = val
        .trim()
        .parse::<u64>()
        .map_err(|err| ErrorKind::Config.full(format!("{MAX_BATCH_BYTES_ENV}={val:?}"), err))?;
    if max_bytes == 0 {
        return Err(ErrorKind::Config.message(format!("{MAX_BATCH_BYTES_ENV} must be positive")));
    }

    Ok(Some(max_bytes))
}

/// Inputs of a single run, exactly as they were found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inputs {
    pub contract_name: Option<String>,
    pub owner_id: Option<String>,
}

impl Inputs {
    pub fn new(contract_name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            contract_name: Some(contract_name.into()),
            owner_id: Some(owner_id.into()),
        }
    }

    /// Read both inputs. An unset variable is `None`; one that is set but not
    /// valid unicode is an [`ErrorKind::InvalidInput`] under either policy.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            contract_name: input(CONTRACT_NAME_ENV, std::env::var(CONTRACT_NAME_ENV))?,
            owner_id: input(OWNER_ID_ENV, std::env::var(OWNER_ID_ENV))?,
        })
    }
}

fn input(name: &str, value: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match value {
        Ok(val) => Ok(Some(val)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err @ VarError::NotUnicode(_)) => {
            Err(ErrorKind::InvalidInput.full(format!("{name} is not valid unicode"), err))
        }
    }
}
