use near_account_id::AccountId;
use near_primitives::types::Finality;

use crate::config::{Config, InputPolicy, Inputs, CONTRACT_NAME_ENV, OWNER_ID_ENV};
use crate::error::ErrorKind;
use crate::network::NetworkProfile;
use crate::report::{self, Report};
use crate::rpc::client::Client;
use crate::rpc::query::{Query, StateEntry};
use crate::Result;

/// List the storage keys of the contract named in `inputs`.
///
/// Sends a single `view_state` query over final state to the profile's RPC
/// endpoint and returns the report built from it: one report, or its batches
/// in order when [`Config::max_batch_bytes`] is set.
pub async fn run(config: &Config, inputs: Inputs) -> Result<Vec<Report>> {
    let (account_id, owner_id) = resolve_inputs(config.input_policy, inputs)?;
    check_credentials(&config.profile, &account_id);

    let entries = view_state(&config.profile, &account_id).await?;
    tracing::info!(
        target: "near-state-keys",
        account_id = %account_id,
        keys = entries.len(),
        "listed contract state"
    );

    Ok(match config.max_batch_bytes {
        Some(max_bytes) => report::batched(&entries, &owner_id, max_bytes),
        None => vec![Report::new(&entries, &owner_id)],
    })
}

/// Fetch every storage entry of `account_id`, in the order the RPC returns them.
pub async fn view_state(profile: &NetworkProfile, account_id: &str) -> Result<Vec<StateEntry>> {
    let client = Client::new(profile.rpc_url.as_str());
    tracing::debug!(
        target: "near-state-keys",
        network_id = %profile.network_id,
        rpc_addr = client.rpc_addr(),
        explorer_url = ?profile.explorer_url.as_ref().map(url::Url::as_str),
        "connecting"
    );

    Query::view_state(&client, account_id)
        .finality(Finality::Final)
        .await
}

fn resolve_inputs(policy: InputPolicy, inputs: Inputs) -> Result<(String, String)> {
    match policy {
        InputPolicy::Forward => Ok((
            inputs.contract_name.unwrap_or_default(),
            inputs.owner_id.unwrap_or_default(),
        )),
        InputPolicy::Strict => {
            let contract_name = required(CONTRACT_NAME_ENV, inputs.contract_name)?;
            let owner_id = required(OWNER_ID_ENV, inputs.owner_id)?;
            contract_name.parse::<AccountId>().map_err(|err| {
                ErrorKind::InvalidInput.full(format!("{CONTRACT_NAME_ENV}={contract_name:?}"), err)
            })?;

            Ok((contract_name, owner_id))
        }
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ErrorKind::MissingInput.message(format!("{name} is not set"))),
    }
}

// The query itself needs no key, but the `clean` call fed by this report has to
// be signed by the contract account.
fn check_credentials(profile: &NetworkProfile, account_id: &str) {
    match profile.key_store.get_key(&profile.network_id, account_id) {
        Ok(Some(key_pair)) => tracing::debug!(
            target: "near-state-keys",
            public_key = %key_pair.public_key,
            "found credentials for {account_id}"
        ),
        Ok(None) => {
            tracing::warn!(
                target: "near-state-keys",
                "no credentials for {account_id} on {} under {}",
                profile.network_id,
                profile.key_store.root().display()
            );
            if let Ok(known) = profile.key_store.accounts(&profile.network_id) {
                tracing::debug!(target: "near-state-keys", ?known, "accounts with credentials");
            }
        }
        Err(err) => tracing::warn!(target: "near-state-keys", %err, "unable to read key store"),
    }
}
