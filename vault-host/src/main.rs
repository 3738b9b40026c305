//! # vault-host
//!
//! Development host for the vault service contracts.
//!
//! The host is responsible for:
//! - Loading configuration and seed data
//! - Building the in-memory permission, chat and economy backends
//! - Publishing them through the service registry
//! - Reporting which implementations are active
//!
//! ## Configuration
//!
//! The host reads configuration from the path given as the first argument,
//! or from `$XDG_CONFIG_HOME/vault-host/config.toml`.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin vault-host
//!
//! # With debug logging
//! RUST_LOG=debug cargo run --bin vault-host -- ./config.toml
//! ```

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vault_api::prelude::*;

use vault_host::bootstrap::bootstrap;
use vault_host::config::Config;

fn main() -> Result<()> {
    let explicit_path = std::env::args().nth(1);

    // Parse before logging exists so the configured level can apply.
    let loaded = match &explicit_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    let (config, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.host.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting vault-host v{}", env!("CARGO_PKG_VERSION"));

    match load_error {
        None => info!(
            "Loaded configuration from {}",
            explicit_path.as_deref().unwrap_or("default path")
        ),
        Some(e) => warn!("Failed to load config, using defaults: {:#}", e),
    }

    let services = bootstrap(&config)?;
    info!("Known services: {:?}", services.known_services());

    let permission = services.require::<dyn Permission>()?;
    info!(
        "Permission: {} (enabled: {}, groups: {})",
        permission.name(),
        permission.is_enabled(),
        permission.has_group_support()
    );
    info!("Groups: {:?}", permission.groups());

    let chat = services.require::<dyn Chat>()?;
    info!("Chat: {} (enabled: {})", chat.name(), chat.is_enabled());
    for group in chat.groups() {
        if let Some(prefix) = chat.group_prefix(None, &group) {
            info!("Group {} prefix: {:?}", group, prefix);
        }
    }

    let economy = services.require::<dyn Economy>()?;
    info!(
        "Economy: {} (enabled: {}, banks: {})",
        economy.name(),
        economy.is_enabled(),
        economy.has_bank_support()
    );
    for player in config.economy.accounts.keys() {
        info!(
            "Account {}: {}",
            player,
            economy.format(economy.balance(player, None))
        );
    }

    info!("Host startup complete");
    Ok(())
}
