//! Stand-in host objects for development servers and tests.

use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;
use vault_api::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWorld(pub String);

impl MemoryWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl World for MemoryWorld {
    fn name(&self) -> &str {
        &self.0
    }
}

/// A player known to the server but not connected.
#[derive(Debug, Clone)]
pub struct OfflineProfile {
    unique_id: Uuid,
    name: Option<String>,
}

impl OfflineProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            name: Some(name.into()),
        }
    }

    /// A profile the server has never seen a name for.
    pub fn unnamed() -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            name: None,
        }
    }
}

impl OfflinePlayer for OfflineProfile {
    fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A connected player with a live attachment list.
///
/// Effective permissions are read from attachments in the order they were
/// added; a later attachment overrides an earlier one for the same node.
#[derive(Debug)]
pub struct MemoryPlayer {
    unique_id: Uuid,
    name: Option<String>,
    world: Option<MemoryWorld>,
    attachments: RwLock<Vec<Arc<PermissionAttachment>>>,
}

impl MemoryPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            name: Some(name.into()),
            world: None,
            attachments: RwLock::new(Vec::new()),
        }
    }

    pub fn unnamed() -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            name: None,
            world: None,
            attachments: RwLock::new(Vec::new()),
        }
    }

    pub fn in_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(MemoryWorld::new(world));
        self
    }
}

impl OfflinePlayer for MemoryPlayer {
    fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn as_online(&self) -> Option<&dyn Player> {
        Some(self)
    }
}

impl CommandSender for MemoryPlayer {
    fn has_permission(&self, permission: &str) -> bool {
        self.attachments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|a| a.value(permission))
            .last()
            .unwrap_or(false)
    }
}

impl Player for MemoryPlayer {
    fn world(&self) -> Option<&dyn World> {
        self.world.as_ref().map(|w| w as &dyn World)
    }

    fn attachments(&self) -> Vec<Arc<PermissionAttachment>> {
        self.attachments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn add_attachment(&self, owner: &PluginId) -> Arc<PermissionAttachment> {
        let attachment = Arc::new(PermissionAttachment::new(owner.clone()));
        self.attachments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&attachment));
        attachment
    }
}

/// The server console, which holds every permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn has_permission(&self, _permission: &str) -> bool {
        true
    }
}
