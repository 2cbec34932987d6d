//! Database models.

pub mod account;
