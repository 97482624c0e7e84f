//! mvxkit - MultiversX tools for agents and services
//!
//! This crate builds MultiversX transactions, encodes smart-contract
//! arguments, co-signs relayed and guarded transactions, normalizes public
//! API data into product and status records, and exposes all of it as named
//! tools behind one dispatcher.
//!
//! Every network call goes through [`api::ApiTransport`], so the whole stack
//! runs against [`api::MockTransport`] in tests.

pub mod account;
pub mod address;
pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod feed;
pub mod marketplace;
pub mod network;
pub mod prelude;
pub mod registry;
pub mod relay;
pub mod search;
pub mod sender;
pub mod tool;
pub mod tools;
pub mod tracking;
pub mod transaction;
pub mod wallet;
pub mod whitelist;

pub use error::{ApiError, Error, Result, ToolError};
