//! In-memory permission backend.

use crate::{ScopedKey, PLUGIN_ID};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use vault_api::prelude::*;

#[derive(Debug, Default)]
struct PermissionState {
    player_nodes: HashMap<ScopedKey, BTreeSet<String>>,
    group_nodes: HashMap<ScopedKey, BTreeSet<String>>,
    /// Membership in join order; the first entry is the primary group.
    memberships: HashMap<ScopedKey, Vec<String>>,
    known_groups: BTreeSet<String>,
}

/// Permission backend holding node sets and memberships in memory.
///
/// World scopes are exact: a node granted globally is not visible when
/// querying a named world, and the other way round. Player and group nodes
/// are separate stores; `player_has` answers for direct grants only, so a
/// removed player node is gone even if one of the player's groups holds it.
#[derive(Debug, Default)]
pub struct MemoryPermission {
    default_group: Option<String>,
    state: RwLock<PermissionState>,
}

impl MemoryPermission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group reported as primary for players who joined none.
    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.state_mut().known_groups.insert(group.clone());
        self.default_group = Some(group);
        self
    }

    /// Make a group known without granting it anything. Returns false if it already was.
    pub fn create_group(&self, group: &str) -> bool {
        self.state_mut().known_groups.insert(group.to_string())
    }

    fn state(&self) -> RwLockReadGuard<'_, PermissionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, PermissionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Permission for MemoryPermission {
    fn name(&self) -> &str {
        "Memory Permissions"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn has_super_perms_compat(&self) -> bool {
        true
    }

    fn has_group_support(&self) -> bool {
        true
    }

    fn owner(&self) -> PluginId {
        PluginId::new(PLUGIN_ID)
    }

    fn player_has(&self, world: Option<&str>, player: &str, permission: &str) -> bool {
        self.state()
            .player_nodes
            .get(&ScopedKey::new(world, player))
            .is_some_and(|nodes| nodes.contains(permission))
    }

    fn player_add(&self, world: Option<&str>, player: &str, permission: &str) -> bool {
        self.state_mut()
            .player_nodes
            .entry(ScopedKey::new(world, player))
            .or_default()
            .insert(permission.to_string());
        debug!("Granted '{}' to player {} in {:?}", permission, player, world);
        true
    }

    fn player_remove(&self, world: Option<&str>, player: &str, permission: &str) -> bool {
        let removed = self
            .state_mut()
            .player_nodes
            .get_mut(&ScopedKey::new(world, player))
            .is_some_and(|nodes| nodes.remove(permission));
        if removed {
            debug!("Revoked '{}' from player {} in {:?}", permission, player, world);
        }
        removed
    }

    fn group_has(&self, world: Option<&str>, group: &str, permission: &str) -> bool {
        self.state()
            .group_nodes
            .get(&ScopedKey::new(world, group))
            .is_some_and(|nodes| nodes.contains(permission))
    }

    fn group_add(&self, world: Option<&str>, group: &str, permission: &str) -> bool {
        let mut state = self.state_mut();
        state.known_groups.insert(group.to_string());
        state
            .group_nodes
            .entry(ScopedKey::new(world, group))
            .or_default()
            .insert(permission.to_string());
        debug!("Granted '{}' to group {} in {:?}", permission, group, world);
        true
    }

    fn group_remove(&self, world: Option<&str>, group: &str, permission: &str) -> bool {
        self.state_mut()
            .group_nodes
            .get_mut(&ScopedKey::new(world, group))
            .is_some_and(|nodes| nodes.remove(permission))
    }

    fn player_in_group(&self, world: Option<&str>, player: &str, group: &str) -> bool {
        self.state()
            .memberships
            .get(&ScopedKey::new(world, player))
            .is_some_and(|groups| groups.iter().any(|g| g == group))
    }

    fn player_add_group(&self, world: Option<&str>, player: &str, group: &str) -> bool {
        let mut state = self.state_mut();
        state.known_groups.insert(group.to_string());

        let groups = state
            .memberships
            .entry(ScopedKey::new(world, player))
            .or_default();
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
            debug!("Added player {} to group {} in {:?}", player, group, world);
        }
        true
    }

    fn player_remove_group(&self, world: Option<&str>, player: &str, group: &str) -> bool {
        let mut state = self.state_mut();
        let Some(groups) = state.memberships.get_mut(&ScopedKey::new(world, player)) else {
            return false;
        };

        let before = groups.len();
        groups.retain(|g| g != group);
        groups.len() < before
    }

    fn player_groups(&self, world: Option<&str>, player: &str) -> Vec<String> {
        self.state()
            .memberships
            .get(&ScopedKey::new(world, player))
            .cloned()
            .unwrap_or_default()
    }

    fn primary_group(&self, world: Option<&str>, player: &str) -> Option<String> {
        self.state()
            .memberships
            .get(&ScopedKey::new(world, player))
            .and_then(|groups| groups.first().cloned())
            .or_else(|| self.default_group.clone())
    }

    fn groups(&self) -> Vec<String> {
        self.state().known_groups.iter().cloned().collect()
    }
}
