//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use mvxkit::prelude::*;
//! ```

pub use crate::address::Address;
pub use crate::api::{ApiTransport, HttpTransport, MockTransport, NetworkProvider};
pub use crate::config::{Settings, SigningMode};
pub use crate::error::{ApiError, Error, Result, ToolError};
pub use crate::network::{Network, NetworkConfig};
pub use crate::relay::{RelayService, RelayerSource};
pub use crate::tool::{BoxedTool, DynTool, Tool, ToolBox, ToolDefinition, ToolResponse};
pub use crate::tools::{ToolContext, create_tools, toolbox};
pub use crate::transaction::{Transaction, TransactionBuilder};
pub use crate::wallet::{Signer, Wallet, WalletDirectory};
pub use crate::whitelist::Whitelist;
