//! Command-line interface for the bootstrap binary.
//!
//! The image's entrypoint picks the subcommand; database coordinates come
//! from the environment, not from flags, so compose files stay the single
//! source of connection truth.

use clap::{Args, Parser, Subcommand};

use crate::config::HTTP_PORT;

/// Container entrypoint for the ficha_medica stack
#[derive(Parser, Debug)]
#[command(name = "ficha-bootstrap")]
#[command(about = "Bring the containerized application from cold start to serving", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the self-contained variant: bring up the co-located MariaDB
    /// instance, then migrate, seed accounts, and exec the server
    Local,

    /// Run against a managed database, then migrate, seed accounts, and
    /// exec the server
    Remote,

    /// Check whether the application answers on its HTTP port
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Port the application server listens on
    #[arg(long, default_value_t = HTTP_PORT)]
    pub port: u16,
}
