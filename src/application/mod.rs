//! Application layer containing the settlement orchestration.
//!
//! This module defines the `SettlementEngine`, the single entry point that a
//! scheduler or HTTP trigger calls to run a settlement pass over the invoice
//! store.

pub mod settlement;
