//! Queries into the RPC service to get info about what's stored on chain.
//!
//! A [`Query`] is a transitory builder: it only exists until it is awaited, at
//! which point exactly one request goes out and the response is converted into
//! the query's output type.
//!
//! ```ignore
//! let client = Client::new("https://rpc.testnet.near.org");
//! let entries = Query::view_state(&client, "some-contract.testnet")
//!     .finality(Finality::Final)
//!     .await?;
//! ```

use base64::Engine as _;
use near_jsonrpc_client::methods::{self, RpcAnyRequest, RpcMethod};
use near_jsonrpc_primitives::types::query::RpcQueryError;
use near_primitives::hash::CryptoHash;
use near_primitives::types::{BlockHeight, Finality};

use crate::error::RpcErrorCode;
use crate::rpc::client::{self, Client};
use crate::rpc::BoxFuture;
use crate::Result;

/// `Query` object allows creating queries into the network of our choice.
pub struct Query<'a, T> {
    pub(crate) method: T,
    pub(crate) client: &'a Client,
    pub(crate) finality: Finality,
}

impl<'a, T> Query<'a, T> {
    pub(crate) fn new(client: &'a Client, method: T) -> Self {
        Self {
            method,
            client,
            finality: Finality::Final,
        }
    }

    /// Specify at which block [`Finality`] to query from. Defaults to [`Finality::Final`].
    pub fn finality(mut self, value: Finality) -> Self {
        self.finality = value;
        self
    }
}

impl<'a, T, R> std::future::IntoFuture for Query<'a, T>
where
    T: ProcessQuery<Output = R> + Send + Sync + 'static,
    <T as ProcessQuery>::Method: RpcMethod<Error = RpcQueryError> + Send + Sync,
    <<T as ProcessQuery>::Method as RpcMethod>::Response: Send + Sync,
{
    type Output = Result<R>;

    // TODO: boxed future required due to impl Trait as type alias being unstable. So once
    // https://github.com/rust-lang/rust/issues/63063 is resolved, we can move to that instead.
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let resp = self
                .client
                .query(self.method.into_request(self.finality)?)
                .await
                .map_err(client::classify)?;

            T::from_response(resp)
        })
    }
}

/// Trait used as a converter from a query to an RPC request, and from the RPC
/// response back to the output of the query.
pub trait ProcessQuery {
    /// Method for doing the internal RPC request to the network of our choosing.
    type Method: RpcMethod;

    /// Expected output after performing a query.
    type Output;

    /// Convert into the Request object that is required to perform the RPC request.
    fn into_request(self, finality: Finality) -> Result<Self::Method>;

    /// Convert the response from the RPC request to a type of our choosing.
    fn from_response(resp: <Self::Method as RpcMethod>::Response) -> Result<Self::Output>;
}

/// Parameters of a `view_state` query, as they go out on the wire.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ViewStateRequest {
    pub request_type: &'static str,
    pub finality: Finality,
    pub account_id: String,
    pub prefix_base64: String,
}

/// Raw `view_state` result. Every field is optional so that a response of the
/// wrong shape is reported as invalid data rather than a transport failure.
#[derive(Debug, serde::Deserialize)]
pub struct ViewStateResponse {
    /// Older nodes report some failures inside the result rather than as a
    /// JSON-RPC error.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    values: Option<Vec<RawStateItem>>,
    #[serde(default)]
    block_height: Option<BlockHeight>,
    #[serde(default)]
    block_hash: Option<CryptoHash>,
}

impl methods::RpcHandlerResponse for ViewStateResponse {}

#[derive(Debug, serde::Deserialize)]
struct RawStateItem {
    key: String,
    value: String,
}

/// A single storage entry of a contract, decoded from base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl StateEntry {
    /// Bytes this entry occupies in contract storage.
    pub fn size(&self) -> u64 {
        (self.key.len() + self.value.len()) as u64
    }
}

/// Query the storage of an account. The account id is sent as given, without
/// checking it is a well formed account id.
pub struct ViewState {
    account_id: String,
    prefix: Vec<u8>,
}

impl ViewState {
    fn request(self, finality: Finality) -> ViewStateRequest {
        ViewStateRequest {
            request_type: "view_state",
            finality,
            account_id: self.account_id,
            prefix_base64: base64::engine::general_purpose::STANDARD.encode(self.prefix),
        }
    }
}

impl ProcessQuery for ViewState {
    type Method = RpcAnyRequest<ViewStateResponse, RpcQueryError>;
    type Output = Vec<StateEntry>;

    fn into_request(self, finality: Finality) -> Result<Self::Method> {
        let request = self.request(finality);
        tracing::debug!(target: "near-state-keys", ?request, "view_state request");

        let params = serde_json::to_value(&request)
            .map_err(|err| crate::error::ErrorKind::DataConversion.custom(err))?;
        Ok(methods::any::<Result<ViewStateResponse, RpcQueryError>>(
            "query", params,
        ))
    }

    fn from_response(resp: ViewStateResponse) -> Result<Self::Output> {
        if let Some(error) = resp.error {
            return Err(RpcErrorCode::RemoteRejection.message(error));
        }
        let Some(values) = resp.values else {
            return Err(RpcErrorCode::QueryReturnedInvalidData.message("while querying state"));
        };
        tracing::debug!(
            target: "near-state-keys",
            block_height = ?resp.block_height,
            block_hash = ?resp.block_hash,
            items = values.len(),
            "view_state response"
        );

        values.iter().map(decode_item).collect()
    }
}

/// Both key and value arrive base64 encoded.
fn decode_item(item: &RawStateItem) -> Result<StateEntry> {
    let decode = |field: &str| {
        base64::engine::general_purpose::STANDARD
            .decode(field)
            .map_err(|err| RpcErrorCode::QueryReturnedInvalidData.custom(err))
    };

    Ok(StateEntry {
        key: decode(&item.key)?,
        value: decode(&item.value)?,
    })
}

impl<'a> Query<'a, ViewState> {
    /// View every key of `account_id`, using an empty prefix.
    pub(crate) fn view_state(client: &'a Client, account_id: &str) -> Self {
        Self::new(
            client,
            ViewState {
                account_id: account_id.into(),
                prefix: Vec::new(),
            },
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    fn view_state(account_id: &str) -> ViewState {
        ViewState {
            account_id: account_id.into(),
            prefix: Vec::new(),
        }
    }

    #[test]
    fn test_request_shape() {
        let request = view_state("lis.testnet").request(Finality::Final);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "request_type": "view_state",
                "finality": "final",
                "account_id": "lis.testnet",
                "prefix_base64": "",
            })
        );
    }

    #[test]
    fn test_request_forwards_account_unchecked() {
        let request = view_state("").request(Finality::Final);
        assert_eq!(request.account_id, "");

        let mut state = view_state("NOT A VALID ID");
        state.prefix = b"STATE".to_vec();
        let request = state.request(Finality::Final);
        assert_eq!(request.account_id, "NOT A VALID ID");
        assert_eq!(request.prefix_base64, "U1RBVEU=");
    }

    #[test]
    fn test_response_keeps_order() -> anyhow::Result<()> {
        let resp: ViewStateResponse = serde_json::from_value(serde_json::json!({
            "values": [
                { "key": "Yg==", "value": "AQ==" },
                { "key": "YQ==", "value": "" },
                { "key": "Yg==", "value": "AgM=" },
            ],
            "block_height": 42,
            "block_hash": "11111111111111111111111111111111",
        }))?;

        let entries = ViewState::from_response(resp)?;
        let keys: Vec<_> = entries.iter().map(|e| e.key.clone()).collect();
        assert_eq!(keys, vec![b"b".to_vec(), b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(entries[2].value, vec![2, 3]);
        assert_eq!(entries[2].size(), 3);
        Ok(())
    }

    #[test]
    fn test_response_of_wrong_shape() {
        let resp: ViewStateResponse = serde_json::from_value(serde_json::json!({
            "code_base64": "",
            "hash": "11111111111111111111111111111111",
        }))
        .unwrap();

        let err = ViewState::from_response(resp).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Rpc(RpcErrorCode::QueryReturnedInvalidData)
        ));
    }

    #[test]
    fn test_error_inside_result() {
        let resp: ViewStateResponse = serde_json::from_value(serde_json::json!({
            "error": "wasm execution failed with error: CompilationError(CodeDoesNotExist)",
            "logs": [],
            "block_height": 1,
            "block_hash": "11111111111111111111111111111111",
        }))
        .unwrap();

        let err = ViewState::from_response(resp).unwrap_err();
        assert_eq!(err.rpc_code(), Some(RpcErrorCode::RemoteRejection));
        assert!(err.to_string().contains("CodeDoesNotExist"));
    }

    #[test]
    fn test_response_with_bad_base64() {
        let resp: ViewStateResponse = serde_json::from_value(serde_json::json!({
            "values": [{ "key": "%%%", "value": "" }],
        }))
        .unwrap();

        let err = ViewState::from_response(resp).unwrap_err();
        assert_eq!(err.rpc_code(), Some(RpcErrorCode::QueryReturnedInvalidData));
    }
}
