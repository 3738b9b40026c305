//! Conversions from host objects to the canonical arguments the contracts take.
//!
//! World objects reduce to `Option<&str>` names and players reduce to their
//! canonical identifier string. A player without a resolvable identifier is
//! reported as `None`; callers fail closed instead of forwarding it.

use crate::error::{Result, VaultError};
use crate::host::{OfflinePlayer, Player, World};
use tracing::warn;

/// World scope for an optional world object. No world means global.
pub fn world_name<W: World + ?Sized>(world: Option<&W>) -> Option<&str> {
    world.map(|w| w.name())
}

/// World scope of the world the player is standing in.
pub fn current_world<P: Player + ?Sized>(player: &P) -> Option<String> {
    player.world().map(|w| w.name().to_string())
}

/// Canonical identifier for a player, treating blank identifiers as unresolved.
pub fn player_identifier<P: OfflinePlayer + ?Sized>(player: &P) -> Option<String> {
    match player.identifier() {
        Some(id) if !id.trim().is_empty() => Some(id),
        _ => {
            warn!(
                "Player {} has no resolvable identifier; failing closed",
                player.unique_id()
            );
            None
        }
    }
}

pub fn require_identifier<P: OfflinePlayer + ?Sized>(player: &P) -> Result<String> {
    player_identifier(player)
        .ok_or_else(|| VaultError::UnresolvedPlayer(player.unique_id().to_string()))
}
