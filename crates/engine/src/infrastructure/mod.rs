//! Infrastructure implementations.
//!
//! Contains the outbound port, its channel adapter, the TCP transport and
//! startup configuration.

pub mod config;
pub mod outbound;
pub mod ports;
pub mod transport;
