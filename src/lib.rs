//! List every storage key of a NEAR contract account.
//!
//! A single `view_state` query is sent over final state, and the keys it returns
//! are reported, base64 encoded and in order, next to an owner label:
//!
//! ```no_run
//! use near_state_keys::{Config, Inputs, NetworkProfile};
//!
//! # async fn example() -> near_state_keys::Result<()> {
//! let config = Config::new(NetworkProfile::testnet());
//! let reports = near_state_keys::run(&config, Inputs::new("lis.testnet", "owner.testnet")).await?;
//! for report in reports {
//!     println!("{}", report.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod lister;

pub mod config;
pub mod keystore;
pub mod network;
pub mod report;
pub mod rpc;

pub use crate::config::{Config, InputPolicy, Inputs};
pub use crate::error::{Error, ErrorKind, RpcErrorCode};
pub use crate::lister::{run, view_state};
pub use crate::network::NetworkProfile;
pub use crate::report::Report;

pub type Result<T, E = Error> = core::result::Result<T, E>;
