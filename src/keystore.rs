//! Read-only access to an unencrypted, file-backed credential store.
//!
//! The layout is the one used by `near-cli` and `near-api-js`:
//! `<root>/<network_id>/<account_id>.json`, where each file holds an
//! `account_id`, a `public_key` and a `private_key`. Nothing in here ever
//! writes to the store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use near_account_id::AccountId;

use crate::error::ErrorKind;
use crate::Result;

/// Credentials of a single account as found in a key file.
#[derive(Debug, serde::Deserialize)]
pub struct AccountKeyPair {
    pub account_id: AccountId,
    pub public_key: near_crypto::PublicKey,
    #[serde(alias = "secret_key")]
    pub private_key: near_crypto::SecretKey,
}

/// Unencrypted key store rooted at a local directory.
#[derive(Clone, Debug)]
pub struct KeyStore {
    root: PathBuf,
}

impl KeyStore {
    /// Open the store rooted at `root`. The directory does not need to exist; a
    /// missing directory behaves like an empty store.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn network_dir(&self, network_id: &str) -> PathBuf {
        self.root.join(network_id)
    }

    fn key_path(&self, network_id: &str, account_id: &str) -> PathBuf {
        self.network_dir(network_id)
            .join(format!("{}.json", account_id))
    }

    /// Look up the credentials of `account_id` on `network_id`. Returns `None` when
    /// the store holds no key file for that account.
    pub fn get_key(&self, network_id: &str, account_id: &str) -> Result<Option<AccountKeyPair>> {
        let path = self.key_path(network_id, account_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ErrorKind::Io.custom(err)),
        };

        let key_pair = serde_json::from_slice::<AccountKeyPair>(&bytes).map_err(|err| {
            ErrorKind::DataConversion.full(format!("malformed key file {}", path.display()), err)
        })?;
        Ok(Some(key_pair))
    }

    /// Names of all accounts holding a key file for `network_id`, sorted.
    pub fn accounts(&self, network_id: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.network_dir(network_id)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(ErrorKind::Io.custom(err)),
        };

        let mut accounts = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| ErrorKind::Io.custom(err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                accounts.push(stem.to_string());
            }
        }
        accounts.sort();

        Ok(accounts)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use near_crypto::{KeyType, SecretKey};

    fn write_key_file(root: &Path, network_id: &str, account_id: &str, field: &str) -> SecretKey {
        let sk = SecretKey::from_seed(KeyType::ED25519, account_id);
        let dir = root.join(network_id);
        fs::create_dir_all(&dir).unwrap();
        let mut content = serde_json::json!({
            "account_id": account_id,
            "public_key": sk.public_key(),
        });
        content[field] = serde_json::json!(sk);
        fs::write(
            dir.join(format!("{}.json", account_id)),
            content.to_string(),
        )
        .unwrap();
        sk
    }

    #[test]
    fn test_get_key() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let sk = write_key_file(dir.path(), "testnet", "alice.testnet", "private_key");
        let store = KeyStore::open(dir.path());

        let key_pair = store
            .get_key("testnet", "alice.testnet")?
            .expect("key file was written");
        assert_eq!(key_pair.account_id.as_str(), "alice.testnet");
        assert_eq!(key_pair.public_key, sk.public_key());
        assert_eq!(key_pair.private_key, sk);

        assert!(store.get_key("testnet", "bob.testnet")?.is_none());
        assert!(store.get_key("mainnet", "alice.testnet")?.is_none());
        Ok(())
    }

    #[test]
    fn test_secret_key_alias() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let sk = write_key_file(dir.path(), "testnet", "carol.testnet", "secret_key");
        let key_pair = KeyStore::open(dir.path())
            .get_key("testnet", "carol.testnet")?
            .expect("key file was written");
        assert_eq!(key_pair.private_key, sk);
        Ok(())
    }

    #[test]
    fn test_malformed_key_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("testnet"))?;
        fs::write(dir.path().join("testnet/broken.testnet.json"), "{ not json")?;

        let err = KeyStore::open(dir.path())
            .get_key("testnet", "broken.testnet")
            .expect_err("malformed key file should not parse");
        assert!(matches!(err.kind(), ErrorKind::DataConversion));
        Ok(())
    }

    #[test]
    fn test_accounts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = KeyStore::open(dir.path().join("missing"));
        assert!(store.accounts("testnet")?.is_empty());

        write_key_file(dir.path(), "testnet", "zed.testnet", "private_key");
        write_key_file(dir.path(), "testnet", "amy.testnet", "private_key");
        fs::write(dir.path().join("testnet/notes.txt"), "ignored")?;

        let store = KeyStore::open(dir.path());
        assert_eq!(store.accounts("testnet")?, vec!["amy.testnet", "zed.testnet"]);
        Ok(())
    }
}
