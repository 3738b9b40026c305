//! # Service Registry
//!
//! Holds the implementations backend plugins publish for each service
//! contract and hands the active one to consumers.
//!
//! Services are keyed by contract type, usually a trait object such as
//! `dyn Permission`. Several backends may register the same contract; the
//! active one is the highest priority registration, and among equal
//! priorities the one registered first.

use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use vault_api::{PluginId, Result, VaultError};

/// Priority a backend registers at. Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServicePriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
}

/// One published implementation of contract `S`.
pub struct Registration<S: ?Sized> {
    pub service: Arc<S>,
    pub owner: PluginId,
    pub priority: ServicePriority,
}

impl<S: ?Sized> Clone for Registration<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            owner: self.owner.clone(),
            priority: self.priority,
        }
    }
}

struct Entry {
    owner: PluginId,
    priority: ServicePriority,
    /// Always an `Arc<S>` for the contract this entry is filed under.
    service: Box<dyn Any + Send + Sync>,
}

struct ServiceSlot {
    name: &'static str,
    /// Sorted by descending priority, insertion order within a priority.
    entries: Vec<Entry>,
}

/// Registry for published service implementations.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use provider_memory::MemoryPermission;
/// use vault_api::{Permission, PluginId};
/// use vault_host::registry::{ServicePriority, ServicesManager};
///
/// let mut services = ServicesManager::new();
/// services.register::<dyn Permission>(
///     Arc::new(MemoryPermission::new()),
///     PluginId::new("vault-memory"),
///     ServicePriority::Normal,
/// );
///
/// let perms = services.get::<dyn Permission>().unwrap();
/// println!("Active permissions: {}", perms.name());
/// ```
#[derive(Default)]
pub struct ServicesManager {
    services: HashMap<TypeId, ServiceSlot>,
}

impl ServicesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an implementation of contract `S` on behalf of `owner`.
    pub fn register<S>(&mut self, service: Arc<S>, owner: PluginId, priority: ServicePriority)
    where
        S: ?Sized + Send + Sync + 'static,
    {
        info!(
            "Registered {} provided by {} at {:?} priority",
            type_name::<S>(),
            owner,
            priority
        );

        let slot = self
            .services
            .entry(TypeId::of::<S>())
            .or_insert_with(|| ServiceSlot {
                name: type_name::<S>(),
                entries: Vec::new(),
            });

        let index = slot
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(slot.entries.len());
        slot.entries.insert(
            index,
            Entry {
                owner,
                priority,
                service: Box::new(service),
            },
        );
    }

    /// The active implementation of contract `S`.
    pub fn get<S: ?Sized + 'static>(&self) -> Option<Arc<S>> {
        self.registration::<S>().map(|r| r.service)
    }

    /// Like [`ServicesManager::get`], failing with [`VaultError::ServiceUnavailable`].
    pub fn require<S: ?Sized + 'static>(&self) -> Result<Arc<S>> {
        self.get::<S>()
            .ok_or_else(|| VaultError::ServiceUnavailable(type_name::<S>().to_string()))
    }

    pub fn registration<S: ?Sized + 'static>(&self) -> Option<Registration<S>> {
        self.registrations::<S>().into_iter().next()
    }

    /// Every registration for `S`, active one first.
    pub fn registrations<S: ?Sized + 'static>(&self) -> Vec<Registration<S>> {
        let Some(slot) = self.services.get(&TypeId::of::<S>()) else {
            return Vec::new();
        };

        slot.entries
            .iter()
            .filter_map(|e| {
                e.service.downcast_ref::<Arc<S>>().map(|service| Registration {
                    service: Arc::clone(service),
                    owner: e.owner.clone(),
                    priority: e.priority,
                })
            })
            .collect()
    }

    pub fn is_provided_for<S: ?Sized + 'static>(&self) -> bool {
        self.services
            .get(&TypeId::of::<S>())
            .is_some_and(|slot| !slot.entries.is_empty())
    }

    /// Withdraw `owner`'s registrations of contract `S`. Returns how many were removed.
    pub fn unregister<S: ?Sized + 'static>(&mut self, owner: &PluginId) -> usize {
        let Some(slot) = self.services.get_mut(&TypeId::of::<S>()) else {
            return 0;
        };

        let before = slot.entries.len();
        slot.entries.retain(|e| &e.owner != owner);
        let removed = before - slot.entries.len();
        if removed > 0 {
            info!("Unregistered {} provided by {}", slot.name, owner);
        }
        removed
    }

    /// Withdraw every registration `owner` made, e.g. when its plugin is disabled.
    pub fn unregister_all(&mut self, owner: &PluginId) -> usize {
        let mut removed = 0;
        for slot in self.services.values_mut() {
            let before = slot.entries.len();
            slot.entries.retain(|e| &e.owner != owner);
            removed += before - slot.entries.len();
        }
        info!("Unregistered {} service(s) provided by {}", removed, owner);
        removed
    }

    /// Names of the contracts with at least one registration.
    pub fn known_services(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .services
            .values()
            .filter(|slot| !slot.entries.is_empty())
            .map(|slot| slot.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Total number of registrations across all contracts.
    pub fn count(&self) -> usize {
        self.services.values().map(|slot| slot.entries.len()).sum()
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Fixed(&'static str);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.to_string()
        }
    }

    fn greeter(text: &'static str) -> Arc<dyn Greeter> {
        Arc::new(Fixed(text))
    }

    fn owner(id: &str) -> PluginId {
        PluginId::new(id)
    }

    #[test]
    fn test_new_registry() {
        let services = ServicesManager::new();
        assert_eq!(services.count(), 0);
        assert!(services.get::<dyn Greeter>().is_none());
        assert!(!services.is_provided_for::<dyn Greeter>());
    }

    #[test]
    fn test_register_and_get() {
        let mut services = ServicesManager::new();
        services.register(greeter("hi"), owner("a"), ServicePriority::Normal);

        assert_eq!(services.count(), 1);
        assert!(services.is_provided_for::<dyn Greeter>());
        assert_eq!(services.get::<dyn Greeter>().unwrap().greet(), "hi");
    }

    #[test]
    fn test_highest_priority_is_active() {
        let mut services = ServicesManager::new();
        services.register(greeter("low"), owner("a"), ServicePriority::Low);
        services.register(greeter("high"), owner("b"), ServicePriority::High);
        services.register(greeter("normal"), owner("c"), ServicePriority::Normal);

        assert_eq!(services.get::<dyn Greeter>().unwrap().greet(), "high");

        let order: Vec<_> = services
            .registrations::<dyn Greeter>()
            .iter()
            .map(|r| r.service.greet())
            .collect();
        assert_eq!(order, vec!["high", "normal", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_first() {
        let mut services = ServicesManager::new();
        services.register(greeter("first"), owner("a"), ServicePriority::Normal);
        services.register(greeter("second"), owner("b"), ServicePriority::Normal);

        let active = services.registration::<dyn Greeter>().unwrap();
        assert_eq!(active.service.greet(), "first");
        assert_eq!(active.owner, owner("a"));
    }

    #[test]
    fn test_contracts_are_separate() {
        let mut services = ServicesManager::new();
        services.register(greeter("hi"), owner("a"), ServicePriority::Normal);
        services.register(Arc::new(Fixed("concrete")), owner("a"), ServicePriority::Normal);

        assert_eq!(services.get::<dyn Greeter>().unwrap().greet(), "hi");
        assert_eq!(services.get::<Fixed>().unwrap().greet(), "concrete");
        assert_eq!(services.known_services().len(), 2);
    }

    #[test]
    fn test_unregister_falls_back() {
        let mut services = ServicesManager::new();
        services.register(greeter("backup"), owner("a"), ServicePriority::Low);
        services.register(greeter("main"), owner("b"), ServicePriority::High);

        assert_eq!(services.unregister::<dyn Greeter>(&owner("b")), 1);
        assert_eq!(services.get::<dyn Greeter>().unwrap().greet(), "backup");
        assert_eq!(services.unregister::<dyn Greeter>(&owner("b")), 0);
    }

    #[test]
    fn test_unregister_all() {
        let mut services = ServicesManager::new();
        services.register(greeter("hi"), owner("a"), ServicePriority::Normal);
        services.register(Arc::new(Fixed("hi")), owner("a"), ServicePriority::Normal);
        services.register(Arc::new(Fixed("other")), owner("b"), ServicePriority::Normal);

        assert_eq!(services.unregister_all(&owner("a")), 2);
        assert_eq!(services.count(), 1);
        assert!(!services.is_provided_for::<dyn Greeter>());
        assert_eq!(services.known_services().len(), 1);
    }

    #[test]
    fn test_require_missing_service() {
        let services = ServicesManager::new();
        let err = services.require::<dyn Greeter>().err().unwrap();
        assert!(matches!(err, VaultError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_clear_registry() {
        let mut services = ServicesManager::new();
        services.register(greeter("hi"), owner("a"), ServicePriority::Normal);
        services.clear();
        assert_eq!(services.count(), 0);
    }
}
