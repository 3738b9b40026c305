//! Wires the memory backends into a [`ServicesManager`] from configuration.

use crate::config::Config;
use crate::registry::{ServicePriority, ServicesManager};
use anyhow::Result;
use provider_memory::{MemoryChat, MemoryEconomy, MemoryPermission, PLUGIN_ID};
use std::sync::Arc;
use tracing::info;
use vault_api::prelude::*;

/// Concrete handles on the backends, for callers that need more than the contracts.
pub struct Backends {
    pub permission: Arc<MemoryPermission>,
    pub chat: Arc<MemoryChat>,
    pub economy: Arc<MemoryEconomy>,
}

/// Build the backends and apply the configured seed data.
pub fn build_backends(config: &Config) -> Backends {
    let mut permission = MemoryPermission::new();
    if let Some(group) = &config.permission.default_group {
        permission = permission.with_default_group(group.clone());
    }
    let permission = Arc::new(permission);

    let chat = Arc::new(MemoryChat::new(permission.clone()));
    let economy = Arc::new(MemoryEconomy::new(config.economy.settings()));

    for (name, group) in &config.permission.groups {
        permission.create_group(name);
        for node in &group.permissions {
            permission.group_add(None, name, node);
        }
        if let Some(prefix) = &group.prefix {
            chat.set_group_prefix(None, name, prefix);
        }
        if let Some(suffix) = &group.suffix {
            chat.set_group_suffix(None, name, suffix);
        }
    }

    for (player, balance) in &config.economy.accounts {
        economy.set_balance(player, None, *balance);
    }

    info!(
        "Seeded {} group(s) and {} account(s)",
        config.permission.groups.len(),
        config.economy.accounts.len()
    );

    Backends {
        permission,
        chat,
        economy,
    }
}

/// Register every contract the backends implement under the memory plugin id.
pub fn register_backends(
    services: &mut ServicesManager,
    backends: &Backends,
    priority: ServicePriority,
) {
    let owner = PluginId::new(PLUGIN_ID);
    services.register::<dyn Permission>(backends.permission.clone(), owner.clone(), priority);
    services.register::<dyn Chat>(backends.chat.clone(), owner.clone(), priority);
    services.register::<dyn Economy>(backends.economy.clone(), owner, priority);
}

/// Validate `config`, build the backends and publish them at normal priority.
pub fn bootstrap(config: &Config) -> Result<ServicesManager> {
    config.validate()?;

    let backends = build_backends(config);
    let mut services = ServicesManager::new();
    register_backends(&mut services, &backends, ServicePriority::Normal);

    info!("Registered {} service(s)", services.count());
    Ok(services)
}
