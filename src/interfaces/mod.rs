//! Inbound and outbound edges of the service: CSV ledgers and the HTTP trigger.

pub mod csv;
pub mod http;
