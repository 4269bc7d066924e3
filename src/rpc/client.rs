use std::fmt::Debug;

use near_jsonrpc_client::errors::{JsonRpcError, RpcTransportError};
use near_jsonrpc_client::{methods, JsonRpcClient};

use crate::error::{Error, RpcErrorCode};

/// A client over a single RPC endpoint. Every call is sent exactly once: failures
/// are reported back to the caller and never retried here.
pub(crate) struct Client {
    rpc_addr: String,
    rpc_client: JsonRpcClient,
}

impl Client {
    pub(crate) fn new(rpc_addr: &str) -> Self {
        Self {
            rpc_addr: rpc_addr.into(),
            rpc_client: JsonRpcClient::connect(rpc_addr),
        }
    }

    pub(crate) async fn query<M>(&self, method: M) -> Result<M::Response, JsonRpcError<M::Error>>
    where
        M: methods::RpcMethod,
    {
        tracing::debug!(target: "near-state-keys", rpc_addr = %self.rpc_addr, "querying rpc");
        self.rpc_client.call(method).await
    }

    pub(crate) fn rpc_addr(&self) -> &str {
        &self.rpc_addr
    }
}

/// Sort an RPC failure by whether the request never made it to the service, the
/// service refused it, or it answered with something we could not read.
pub(crate) fn classify<E>(err: JsonRpcError<E>) -> Error
where
    E: std::fmt::Display + Debug,
{
    match err {
        JsonRpcError::TransportError(err @ RpcTransportError::SendError(_)) => {
            RpcErrorCode::ConnectionFailure.custom(err)
        }
        JsonRpcError::TransportError(err) => RpcErrorCode::QueryReturnedInvalidData.custom(err),
        JsonRpcError::ServerError(err) => RpcErrorCode::RemoteRejection.message(err.to_string()),
    }
}
