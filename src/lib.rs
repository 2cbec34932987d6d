//! ficha-bootstrap - Deployment Library
//!
//! Startup sequencer that takes a cold container to a serving ficha_medica
//! application: filesystem fixup, database init and readiness, schema
//! migration, account seeding, and the final exec handoff.

#[macro_use]
mod macros;

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod services;
pub mod telemetry;
pub mod unix;

pub use config::{LocalConfig, RemoteConfig};
pub use error::{BootError, Result};
