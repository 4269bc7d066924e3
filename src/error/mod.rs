//! All errors that can occur while listing state keys, including but not limited
//! to the following: input validation, RPC, key store IO and data conversion errors.

mod impls;

use std::borrow::Cow;

/// Error type that near-state-keys will make use of for all the errors
/// returned from this library.
#[derive(Debug)]
pub struct Error {
    repr: ErrorRepr,
}

/// Classification of an [`Error`], so callers can tell apart why a run failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An error occurred while talking to the RPC service.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcErrorCode),
    /// A required input was not provided.
    #[error("missing input")]
    MissingInput,
    /// An input was provided but is not well formed.
    #[error("invalid input")]
    InvalidInput,
    /// A configuration knob holds an unusable value.
    #[error("invalid configuration")]
    Config,
    /// An error occurred while performing IO.
    #[error("IO error")]
    Io,
    /// An error occurred while converting data from one type to another.
    #[error("data conversion error")]
    DataConversion,
}

/// RPC specific error codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RpcErrorCode {
    #[error("failed to connect to rpc service")]
    ConnectionFailure,
    #[error("rpc service rejected the query")]
    RemoteRejection,
    #[error("incorrect variant retrieved while querying (maybe a bug in RPC code?)")]
    QueryReturnedInvalidData,
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("{0}")]
    Simple(ErrorKind),
    #[error("{kind}: {message}")]
    Message {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    #[error("{kind}: {error}")]
    Custom {
        kind: ErrorKind,
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{kind}: {message}: {error}")]
    Full {
        kind: ErrorKind,
        message: Cow<'static, str>,
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}
