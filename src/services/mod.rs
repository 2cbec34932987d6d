//! Startup sequence services.

pub mod mariadb;
pub mod migrator;
pub mod provision;
pub mod readiness;
pub mod server;
