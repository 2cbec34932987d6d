//! ficha-bootstrap - Container Entry Point

use std::path::Path;

use clap::Parser;

use ficha_bootstrap::{
    cli::{Cli, Command},
    config::{self, LocalConfig, RemoteConfig},
    db,
    error::Result,
    services::{mariadb, migrator::Migrator, provision, readiness, server},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    telemetry::init_tracing();

    let result = match Cli::parse().command {
        Command::Local => run_local(LocalConfig::from_env()).await,
        Command::Remote => match RemoteConfig::from_env() {
            Ok(config) => run_remote(config).await,
            Err(e) => Err(e),
        },
        Command::Probe(args) => server::probe_http(args.port).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "startup sequence aborted");
    }
    result
}

/// Local-mode sequence: own the database lifecycle end to end, then hand
/// off to the application server.
async fn run_local(config: LocalConfig) -> Result<()> {
    tracing::info!(?config, "starting local-mode sequence");

    // Repair ownership before anything touches the volume mounts
    mariadb::fix_ownership()?;
    server::prepare_app_dirs()?;

    // First boot initializes the data directory
    mariadb::initialize(Path::new(config::DATA_DIR)).await?;

    // Launch the server and wait until the socket answers. The child handle
    // is parked, not awaited: the instance must outlive this process.
    let _db_server = mariadb::spawn_server()?;
    readiness::wait_for(
        "local database",
        mariadb::ping,
        config::LOCAL_POLL_INTERVAL,
        None,
    )
    .await?;

    // Root credential, application schema, application account
    mariadb::run_setup(&config).await?;

    let migrator = Migrator::new("python3", config::APP_DIR);
    migrator.migrate().await?;
    provision::provision_accounts(db::local_options(&config)).await?;
    migrator.collect_static().await;

    server::exec_app_server()
}

/// Remote-mode sequence: same tail as local mode, against a database someone
/// else operates. Unreachable coordinates abort the deployment instead of
/// hanging it.
async fn run_remote(config: RemoteConfig) -> Result<()> {
    tracing::info!(?config, "starting remote-mode sequence");

    server::prepare_app_dirs()?;

    let options = db::remote_options(&config);
    readiness::wait_for(
        "remote database",
        || db::ping(options.clone()),
        config::REMOTE_POLL_INTERVAL,
        Some(config::REMOTE_MAX_ATTEMPTS),
    )
    .await?;

    let migrator = Migrator::new("python3", config::APP_DIR);
    migrator.migrate().await?;
    provision::provision_accounts(options).await?;
    migrator.collect_static().await;

    server::exec_app_server()
}
