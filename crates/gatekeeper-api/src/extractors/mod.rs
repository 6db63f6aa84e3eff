//! Custom Axum extractors.

pub mod gateway;

pub use gateway::GatewayRequest;
