// HTTP server modules
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

// Outbound calls to the external agent
pub mod gateway;

// Connected push channels
pub mod relay;

// Client side of the protocol: session store, composer, push subscriber
pub mod client;

pub use config::RelayConfig;
pub use error::RelayError;
