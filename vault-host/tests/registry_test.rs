//! Integration tests for the service registry.
//!
//! These tests verify that backends published through the registry are
//! reachable by contract, and that priority and unregistration decide which
//! implementation consumers see.

use provider_memory::{EconomySettings, MemoryEconomy, MemoryPermission, PLUGIN_ID};
use std::sync::Arc;
use vault_api::prelude::*;
use vault_host::bootstrap::{build_backends, register_backends};
use vault_host::config::Config;
use vault_host::registry::{ServicePriority, ServicesManager};

struct DenyAll;

impl Permission for DenyAll {
    fn name(&self) -> &str {
        "Deny All"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn has_super_perms_compat(&self) -> bool {
        false
    }

    fn has_group_support(&self) -> bool {
        false
    }

    fn player_has(&self, _world: Option<&str>, _player: &str, _permission: &str) -> bool {
        false
    }

    fn player_add(&self, _world: Option<&str>, _player: &str, _permission: &str) -> bool {
        false
    }

    fn player_remove(&self, _world: Option<&str>, _player: &str, _permission: &str) -> bool {
        false
    }

    fn group_has(&self, _world: Option<&str>, _group: &str, _permission: &str) -> bool {
        false
    }

    fn group_add(&self, _world: Option<&str>, _group: &str, _permission: &str) -> bool {
        false
    }

    fn group_remove(&self, _world: Option<&str>, _group: &str, _permission: &str) -> bool {
        false
    }

    fn player_in_group(&self, _world: Option<&str>, _player: &str, _group: &str) -> bool {
        false
    }

    fn player_add_group(&self, _world: Option<&str>, _player: &str, _group: &str) -> bool {
        false
    }

    fn player_remove_group(&self, _world: Option<&str>, _player: &str, _group: &str) -> bool {
        false
    }

    fn player_groups(&self, _world: Option<&str>, _player: &str) -> Vec<String> {
        Vec::new()
    }

    fn primary_group(&self, _world: Option<&str>, _player: &str) -> Option<String> {
        None
    }

    fn groups(&self) -> Vec<String> {
        Vec::new()
    }
}

#[test]
fn test_registry_discovery() {
    let mut services = ServicesManager::new();

    // Initially empty
    assert_eq!(services.count(), 0);
    assert!(services.known_services().is_empty());

    let backends = build_backends(&Config::default());
    register_backends(&mut services, &backends, ServicePriority::Normal);

    assert_eq!(services.count(), 3);
    assert_eq!(services.known_services().len(), 3);
    assert!(services.is_provided_for::<dyn Permission>());
    assert!(services.is_provided_for::<dyn Chat>());
    assert!(services.is_provided_for::<dyn Economy>());
}

#[test]
fn test_registry_service_access() {
    let mut services = ServicesManager::new();
    services.register::<dyn Economy>(
        Arc::new(MemoryEconomy::new(EconomySettings::default())),
        PluginId::new(PLUGIN_ID),
        ServicePriority::Normal,
    );

    let economy = services.get::<dyn Economy>().unwrap();
    assert_eq!(economy.name(), "Memory Economy");
    assert!(economy.is_enabled());
    assert_eq!(economy.currency_name_plural(), "Dollars");
}

#[test]
fn test_state_is_shared_between_handles() {
    let mut services = ServicesManager::new();
    let backends = build_backends(&Config::default());
    register_backends(&mut services, &backends, ServicePriority::Normal);

    let first = services.require::<dyn Permission>().unwrap();
    let second = services.require::<dyn Permission>().unwrap();
    first.player_add(None, "Alice", "vault.fly");

    assert!(second.player_has(None, "Alice", "vault.fly"));
    assert!(backends.permission.player_has(None, "Alice", "vault.fly"));
}

#[test]
fn test_higher_priority_overrides() {
    let mut services = ServicesManager::new();
    let memory = Arc::new(MemoryPermission::new());
    memory.player_add(None, "Alice", "vault.fly");

    services.register::<dyn Permission>(memory, PluginId::new(PLUGIN_ID), ServicePriority::Normal);
    assert!(services
        .require::<dyn Permission>()
        .unwrap()
        .player_has(None, "Alice", "vault.fly"));

    services.register::<dyn Permission>(
        Arc::new(DenyAll),
        PluginId::new("deny-all"),
        ServicePriority::High,
    );
    let active = services.require::<dyn Permission>().unwrap();
    assert_eq!(active.name(), "Deny All");
    assert!(!active.player_has(None, "Alice", "vault.fly"));
    assert_eq!(services.registrations::<dyn Permission>().len(), 2);
}

#[test]
fn test_unregister_restores_previous_provider() {
    let mut services = ServicesManager::new();
    services.register::<dyn Permission>(
        Arc::new(MemoryPermission::new()),
        PluginId::new(PLUGIN_ID),
        ServicePriority::Low,
    );
    services.register::<dyn Permission>(
        Arc::new(DenyAll),
        PluginId::new("deny-all"),
        ServicePriority::Highest,
    );

    assert_eq!(services.unregister_all(&PluginId::new("deny-all")), 1);
    assert_eq!(
        services.require::<dyn Permission>().unwrap().name(),
        "Memory Permissions"
    );
}

#[test]
fn test_missing_contract_is_unavailable() {
    let mut services = ServicesManager::new();
    services.register::<dyn Permission>(
        Arc::new(DenyAll),
        PluginId::new("deny-all"),
        ServicePriority::Normal,
    );

    assert!(services.get::<dyn Economy>().is_none());
    match services.require::<dyn Chat>() {
        Err(VaultError::ServiceUnavailable(name)) => assert!(name.contains("Chat")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("chat should not be provided"),
    }
}
