//! Network profiles: which chain to talk to, and where its services live.

use std::path::PathBuf;

use url::Url;

use crate::error::ErrorKind;
use crate::keystore::KeyStore;
use crate::Result;

/// Identifier of the testnet network.
pub const TESTNET_NETWORK_ID: &str = "testnet";

/// URL to the testnet RPC node provided by near.org.
pub const TESTNET_RPC_URL: &str = "https://rpc.testnet.near.org";

/// URL to the testnet wallet provided by near.org.
pub const TESTNET_WALLET_URL: &str = "https://wallet.testnet.near.org";

/// URL to the helper contract used to create named accounts provided by near.org.
pub const TESTNET_HELPER_URL: &str = "https://helper.testnet.near.org";

/// URL to the testnet explorer provided by near.org.
pub const TESTNET_EXPLORER_URL: &str = "https://explorer.testnet.near.org";

/// A named bundle of endpoints plus the credential source used alongside them.
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct NetworkProfile {
    /// Name of the network itself
    pub network_id: String,
    /// Rpc endpoint to point our client to
    pub rpc_url: Url,
    pub wallet_url: Option<Url>,
    pub helper_url: Option<Url>,
    pub explorer_url: Option<Url>,
    /// Local store that credentials are read from
    pub key_store: KeyStore,
}

impl NetworkProfile {
    /// Testnet profile, with the key store rooted at the current working directory.
    pub fn testnet() -> Self {
        let parse = |url: &str| Url::parse(url).expect("url is hardcoded");

        Self {
            network_id: TESTNET_NETWORK_ID.into(),
            rpc_url: parse(TESTNET_RPC_URL),
            wallet_url: Some(parse(TESTNET_WALLET_URL)),
            helper_url: Some(parse(TESTNET_HELPER_URL)),
            explorer_url: Some(parse(TESTNET_EXPLORER_URL)),
            key_store: KeyStore::open(PathBuf::from(".")),
        }
    }

    /// Profile pointing at an arbitrary RPC endpoint, such as a local node or a mock.
    /// Only the RPC service is known for such networks.
    pub fn custom(network_id: &str, rpc_url: &str) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url).map_err(|err| {
            ErrorKind::DataConversion.full(format!("invalid rpc url {rpc_url:?}"), err)
        })?;

        Ok(Self {
            network_id: network_id.into(),
            rpc_url,
            wallet_url: None,
            helper_url: None,
            explorer_url: None,
            key_store: KeyStore::open(PathBuf::from(".")),
        })
    }

    /// Read credentials from `key_store` instead of the current directory.
    pub fn with_key_store(mut self, key_store: KeyStore) -> Self {
        self.key_store = key_store;
        self
    }
}

impl std::fmt::Debug for NetworkProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkProfile")
            .field("network_id", &self.network_id)
            .field("rpc_url", &self.rpc_url)
            .field("key_store", &self.key_store.root())
            .finish()
    }
}
