//! The permission service contract.

use crate::host::{CommandSender, OfflinePlayer, Player, PluginId, World};
use crate::resolve::{current_world, player_identifier, world_name};
use tracing::debug;

/// A permission backend.
///
/// Every world-scoped method takes `world: Option<&str>`; `None` addresses the
/// global namespace. Players are addressed by canonical identifier.
///
/// Mutations report success as `bool`. Removing something that is not there
/// returns `false` and is never an error.
pub trait Permission: Send + Sync {
    /// Backend name for display and diagnostics.
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    /// Whether the backend feeds the host's own permission checks.
    fn has_super_perms_compat(&self) -> bool;

    fn has_group_support(&self) -> bool;

    fn player_has(&self, world: Option<&str>, player: &str, permission: &str) -> bool;

    /// Grant a persistent permission. Granting one already held succeeds.
    fn player_add(&self, world: Option<&str>, player: &str, permission: &str) -> bool;

    fn player_remove(&self, world: Option<&str>, player: &str, permission: &str) -> bool;

    fn group_has(&self, world: Option<&str>, group: &str, permission: &str) -> bool;

    fn group_add(&self, world: Option<&str>, group: &str, permission: &str) -> bool;

    fn group_remove(&self, world: Option<&str>, group: &str, permission: &str) -> bool;

    fn player_in_group(&self, world: Option<&str>, player: &str, group: &str) -> bool;

    fn player_add_group(&self, world: Option<&str>, player: &str, group: &str) -> bool;

    fn player_remove_group(&self, world: Option<&str>, player: &str, group: &str) -> bool;

    fn player_groups(&self, world: Option<&str>, player: &str) -> Vec<String>;

    /// The group a player counts as when a feature needs exactly one.
    fn primary_group(&self, world: Option<&str>, player: &str) -> Option<String>;

    /// Every group the backend knows, regardless of world.
    fn groups(&self) -> Vec<String>;

    /// Plugin that owns this backend's session attachments.
    fn owner(&self) -> PluginId {
        PluginId::new(self.name())
    }

    /// Grant a permission for the current session only.
    ///
    /// Reuses the attachment this backend already holds on the player and
    /// only creates one when none exists, so there is at most one attachment
    /// per backend and player.
    fn player_add_transient(&self, player: &dyn Player, permission: &str) -> bool {
        let owner = self.owner();
        let attachment = player
            .attachments()
            .into_iter()
            .find(|a| a.owner() == &owner)
            .unwrap_or_else(|| player.add_attachment(&owner));

        attachment.set_permission(permission, true);
        debug!("{}: added transient '{}' via {}", self.name(), permission, owner);
        true
    }

    /// Revoke a session permission. Returns `false` when this backend holds
    /// no attachment on the player.
    fn player_remove_transient(&self, player: &dyn Player, permission: &str) -> bool {
        let owner = self.owner();
        match player.attachments().into_iter().find(|a| a.owner() == &owner) {
            Some(attachment) => {
                attachment.unset_permission(permission);
                debug!("{}: removed transient '{}' via {}", self.name(), permission, owner);
                true
            }
            None => false,
        }
    }
}

/// Host-object forms of the [`Permission`] operations.
///
/// Each method resolves its arguments and forwards to the canonical method
/// with no logic of its own. Unresolvable players fail closed.
pub trait PermissionExt: Permission {
    /// The host's own check for any command sender, bypassing the backend.
    fn has<S: CommandSender + ?Sized>(&self, sender: &S, permission: &str) -> bool {
        sender.has_permission(permission)
    }

    fn player_has_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        permission: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_has(world, &id, permission))
    }

    fn player_add_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        permission: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_add(world, &id, permission))
    }

    fn player_remove_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        permission: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_remove(world, &id, permission))
    }

    fn player_in_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        group: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_in_group(world, &id, group))
    }

    fn player_add_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        group: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_add_group(world, &id, group))
    }

    fn player_remove_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        group: &str,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.player_remove_group(world, &id, group))
    }

    fn player_groups_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Vec<String> {
        player_identifier(player)
            .map(|id| self.player_groups(world, &id))
            .unwrap_or_default()
    }

    fn primary_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Option<String> {
        player_identifier(player).and_then(|id| self.primary_group(world, &id))
    }

    /// Session check through the host, like [`PermissionExt::has`].
    fn player_has_online<P: Player + ?Sized>(&self, player: &P, permission: &str) -> bool {
        player.has_permission(permission)
    }

    fn player_add_online<P: Player + ?Sized>(&self, player: &P, permission: &str) -> bool {
        self.player_add_for(current_world(player).as_deref(), player, permission)
    }

    fn player_remove_online<P: Player + ?Sized>(&self, player: &P, permission: &str) -> bool {
        self.player_remove_for(current_world(player).as_deref(), player, permission)
    }

    fn player_in_group_online<P: Player + ?Sized>(&self, player: &P, group: &str) -> bool {
        self.player_in_group_for(current_world(player).as_deref(), player, group)
    }

    fn player_add_group_online<P: Player + ?Sized>(&self, player: &P, group: &str) -> bool {
        self.player_add_group_for(current_world(player).as_deref(), player, group)
    }

    fn player_remove_group_online<P: Player + ?Sized>(&self, player: &P, group: &str) -> bool {
        self.player_remove_group_for(current_world(player).as_deref(), player, group)
    }

    fn player_groups_online<P: Player + ?Sized>(&self, player: &P) -> Vec<String> {
        self.player_groups_for(current_world(player).as_deref(), player)
    }

    fn primary_group_online<P: Player + ?Sized>(&self, player: &P) -> Option<String> {
        self.primary_group_for(current_world(player).as_deref(), player)
    }

    fn group_has_in<W: World + ?Sized>(
        &self,
        world: Option<&W>,
        group: &str,
        permission: &str,
    ) -> bool {
        self.group_has(world_name(world), group, permission)
    }

    fn group_add_in<W: World + ?Sized>(
        &self,
        world: Option<&W>,
        group: &str,
        permission: &str,
    ) -> bool {
        self.group_add(world_name(world), group, permission)
    }

    fn group_remove_in<W: World + ?Sized>(
        &self,
        world: Option<&W>,
        group: &str,
        permission: &str,
    ) -> bool {
        self.group_remove(world_name(world), group, permission)
    }

    /// Transient grant for a player who may be offline; offline players fail.
    fn player_add_transient_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        permission: &str,
    ) -> bool {
        player
            .as_online()
            .is_some_and(|online| self.player_add_transient(online, permission))
    }

    fn player_remove_transient_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        permission: &str,
    ) -> bool {
        player
            .as_online()
            .is_some_and(|online| self.player_remove_transient(online, permission))
    }
}

impl<T: Permission + ?Sized> PermissionExt for T {}
