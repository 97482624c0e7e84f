//! Upstream REST API boundary.
//!
//! Raw JSON never leaves this module: [`NetworkProvider`] decodes every
//! response into the records of [`types`], and every transport reports a
//! missing resource as [`ApiError::NotFound`](crate::error::ApiError::NotFound).

mod http;
mod mock;
mod provider;
mod transport;
pub mod types;

pub use http::{DEFAULT_TIMEOUT_SECS, HttpTransport, USER_AGENT};
pub use mock::{MockTransport, RecordedRequest};
pub use provider::{AGENT_TYPES, NetworkProvider, NftQuery, PRODUCT_TYPES};
pub use transport::{ApiTransport, Method};
pub use types::{
    AccountOnNetwork, NftItem, SimulationOutcome, TransactionOnNetwork, TransactionOperation,
    TransactionSummary, VmQueryOutput,
};
