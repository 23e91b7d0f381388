//! Bookie Core Library
//!
//! Shared types for the bookie-sync system: the local entity tree (sport,
//! event group, event, market group, market, rule), localized descriptions,
//! remote ledger records, and canonical naming for dynamic markets.

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use error::{Error, Result};
