//! Host platform collaborators.
//!
//! The server platform owns worlds, players and their live permission
//! sessions. These traits describe only what the service contracts need from
//! them; the host provides the implementations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Identifies a plugin that owns a service registration or a permission attachment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A game world. Its name is the world scope used by every contract.
pub trait World: Send + Sync {
    fn name(&self) -> &str;
}

/// Anything that can issue commands (console, player, command block).
pub trait CommandSender: Send + Sync {
    /// The host's own permission check, independent of any backend.
    fn has_permission(&self, permission: &str) -> bool;
}

/// A player the platform knows about, whether or not they are connected.
pub trait OfflinePlayer: Send + Sync {
    fn unique_id(&self) -> Uuid;

    /// Last known name. `None` when the platform has never seen the player.
    fn name(&self) -> Option<&str>;

    /// Canonical identifier passed to the contracts.
    ///
    /// Defaults to the last known name. Hosts that key backends by something
    /// more stable override this.
    fn identifier(&self) -> Option<String> {
        self.name().map(str::to_owned)
    }

    /// The connected form of this player, if they are online.
    fn as_online(&self) -> Option<&dyn Player> {
        None
    }
}

/// A connected player with a live permission session.
pub trait Player: OfflinePlayer + CommandSender {
    /// The world the player currently stands in.
    fn world(&self) -> Option<&dyn World>;

    /// Attachments currently contributing to the player's effective permissions.
    fn attachments(&self) -> Vec<Arc<PermissionAttachment>>;

    /// Create a new empty attachment owned by `owner` and attach it to the session.
    fn add_attachment(&self, owner: &PluginId) -> Arc<PermissionAttachment>;
}

/// A set of session permissions owned by one plugin.
///
/// Attachments are never persisted; they disappear with the session.
#[derive(Debug)]
pub struct PermissionAttachment {
    owner: PluginId,
    permissions: RwLock<BTreeMap<String, bool>>,
}

impl PermissionAttachment {
    pub fn new(owner: PluginId) -> Self {
        Self {
            owner,
            permissions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn owner(&self) -> &PluginId {
        &self.owner
    }

    pub fn set_permission(&self, permission: &str, value: bool) {
        self.permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(permission.to_string(), value);
    }

    /// Returns whether the node was present.
    pub fn unset_permission(&self, permission: &str) -> bool {
        self.permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(permission)
            .is_some()
    }

    pub fn value(&self, permission: &str) -> Option<bool> {
        self.permissions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(permission)
            .copied()
    }

    pub fn permissions(&self) -> BTreeMap<String, bool> {
        self.permissions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
