//! RVM Client Library
//!
//! Session and command orchestration for a vehicle telematics backend spoken
//! to over HTTP with a versioned binary application protocol. The client
//! authenticates a user, tracks the access token's expiry with lazy
//! re-authentication, dispatches commands through per-version wire codecs,
//! and retries vehicle-actuation commands using the server-issued event
//! correlation id.
//!
//! The byte-level wire codecs are external: they plug in through the
//! [`rvm_core::MessageCoder`] contract as a [`CoderSet`] at construction.
//!
//! # Example
//!
//! ```rust,no_run
//! use rvm_client::{ClientConfig, RvmClient, VinInfo};
//!
//! # async fn run() -> rvm_client::Result<()> {
//! let config = ClientConfig::new("https://tap.example.com", "user", "secret");
//! // production wire codecs go here; the testing module ships a JSON stand-in
//! let coders = rvm_client::testing::json_coders();
//! let mut client = RvmClient::new(&config, coders)?;
//!
//! client.login().await?;
//!
//! let vin = VinInfo::new("LSJW00000XX000000");
//! let status = client.vehicle_status(&vin, None).await?;
//! let lock_result = client.lock_vehicle(&vin).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod retry;
mod session;
pub mod telemetry;
pub mod testing;
mod transport;

pub use client::{CoderSet, RvmClient};
pub use config::{ClientConfig, ConnectionConfig, RetryConfig, TelemetryConfig, TimeoutsConfig};
pub use error::{Result, RvmClientError};
pub use retry::RetryPolicy;
pub use session::{derive_login_id, Session};
pub use telemetry::{TelemetryForwarder, TelemetryRecord};
pub use transport::HttpTransport;

// Re-export the core types callers handle directly
pub use rvm_core::{
    ApplicationData, ChargingStatus, ControlCommand, Message, VehicleStatus, VinInfo,
};
