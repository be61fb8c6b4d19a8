//! Nusa gateway: fixed-point conversion, position/loan aggregation and the
//! JSON routes that reshape Ponder indexer data for the lending dashboard.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod indexer;
pub mod model;
pub mod numeric;
pub mod telemetry;
