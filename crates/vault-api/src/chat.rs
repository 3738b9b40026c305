//! The chat metadata service contract.

use crate::host::{OfflinePlayer, Player, World};
use crate::permission::{Permission, PermissionExt};
use crate::resolve::{current_world, player_identifier, world_name};
use serde::{Deserialize, Serialize};

/// The four typed info families. Backends store each family separately, so
/// the same node name can hold one value per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    Integer,
    Double,
    Boolean,
    String,
}

/// A typed info node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl InfoValue {
    pub fn kind(&self) -> InfoKind {
        match self {
            InfoValue::Integer(_) => InfoKind::Integer,
            InfoValue::Double(_) => InfoKind::Double,
            InfoValue::Boolean(_) => InfoKind::Boolean,
            InfoValue::String(_) => InfoKind::String,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            InfoValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            InfoValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            InfoValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            InfoValue::String(v) => Some(v),
            _ => None,
        }
    }
}

/// A chat metadata backend.
///
/// Group queries are not part of this trait: a chat backend is constructed
/// with a [`Permission`] service and [`ChatExt`] forwards group questions to it.
pub trait Chat: Send + Sync {
    /// The permission service this backend was built with.
    fn permission(&self) -> &dyn Permission;

    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn player_prefix(&self, world: Option<&str>, player: &str) -> Option<String>;

    fn set_player_prefix(&self, world: Option<&str>, player: &str, prefix: &str);

    fn player_suffix(&self, world: Option<&str>, player: &str) -> Option<String>;

    fn set_player_suffix(&self, world: Option<&str>, player: &str, suffix: &str);

    fn group_prefix(&self, world: Option<&str>, group: &str) -> Option<String>;

    fn set_group_prefix(&self, world: Option<&str>, group: &str, prefix: &str);

    fn group_suffix(&self, world: Option<&str>, group: &str) -> Option<String>;

    fn set_group_suffix(&self, world: Option<&str>, group: &str, suffix: &str);

    /// Stored value of `kind` for the node, if any.
    ///
    /// Backends without support for a family return `None`.
    fn player_info(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        kind: InfoKind,
    ) -> Option<InfoValue>;

    fn set_player_info(&self, world: Option<&str>, player: &str, node: &str, value: InfoValue);

    fn group_info(
        &self,
        world: Option<&str>,
        group: &str,
        node: &str,
        kind: InfoKind,
    ) -> Option<InfoValue>;

    fn set_group_info(&self, world: Option<&str>, group: &str, node: &str, value: InfoValue);
}

/// Typed accessors, group delegation and host-object forms for [`Chat`].
///
/// Getters return the caller's default when the node is absent; values are
/// never coerced between families.
pub trait ChatExt: Chat {
    fn player_info_integer(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        default: i64,
    ) -> i64 {
        self.player_info(world, player, node, InfoKind::Integer)
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    }

    fn set_player_info_integer(&self, world: Option<&str>, player: &str, node: &str, value: i64) {
        self.set_player_info(world, player, node, InfoValue::Integer(value));
    }

    fn group_info_integer(
        &self,
        world: Option<&str>,
        group: &str,
        node: &str,
        default: i64,
    ) -> i64 {
        self.group_info(world, group, node, InfoKind::Integer)
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    }

    fn set_group_info_integer(&self, world: Option<&str>, group: &str, node: &str, value: i64) {
        self.set_group_info(world, group, node, InfoValue::Integer(value));
    }

    fn player_info_double(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        default: f64,
    ) -> f64 {
        self.player_info(world, player, node, InfoKind::Double)
            .and_then(|v| v.as_double())
            .unwrap_or(default)
    }

    fn set_player_info_double(&self, world: Option<&str>, player: &str, node: &str, value: f64) {
        self.set_player_info(world, player, node, InfoValue::Double(value));
    }

    fn group_info_double(&self, world: Option<&str>, group: &str, node: &str, default: f64) -> f64 {
        self.group_info(world, group, node, InfoKind::Double)
            .and_then(|v| v.as_double())
            .unwrap_or(default)
    }

    fn set_group_info_double(&self, world: Option<&str>, group: &str, node: &str, value: f64) {
        self.set_group_info(world, group, node, InfoValue::Double(value));
    }

    fn player_info_boolean(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        default: bool,
    ) -> bool {
        self.player_info(world, player, node, InfoKind::Boolean)
            .and_then(|v| v.as_boolean())
            .unwrap_or(default)
    }

    fn set_player_info_boolean(&self, world: Option<&str>, player: &str, node: &str, value: bool) {
        self.set_player_info(world, player, node, InfoValue::Boolean(value));
    }

    fn group_info_boolean(
        &self,
        world: Option<&str>,
        group: &str,
        node: &str,
        default: bool,
    ) -> bool {
        self.group_info(world, group, node, InfoKind::Boolean)
            .and_then(|v| v.as_boolean())
            .unwrap_or(default)
    }

    fn set_group_info_boolean(&self, world: Option<&str>, group: &str, node: &str, value: bool) {
        self.set_group_info(world, group, node, InfoValue::Boolean(value));
    }

    fn player_info_string(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        default: &str,
    ) -> String {
        self.player_info(world, player, node, InfoKind::String)
            .and_then(InfoValue::into_string)
            .unwrap_or_else(|| default.to_string())
    }

    fn set_player_info_string(&self, world: Option<&str>, player: &str, node: &str, value: &str) {
        self.set_player_info(world, player, node, InfoValue::String(value.to_string()));
    }

    fn group_info_string(
        &self,
        world: Option<&str>,
        group: &str,
        node: &str,
        default: &str,
    ) -> String {
        self.group_info(world, group, node, InfoKind::String)
            .and_then(InfoValue::into_string)
            .unwrap_or_else(|| default.to_string())
    }

    fn set_group_info_string(&self, world: Option<&str>, group: &str, node: &str, value: &str) {
        self.set_group_info(world, group, node, InfoValue::String(value.to_string()));
    }

    fn player_in_group(&self, world: Option<&str>, player: &str, group: &str) -> bool {
        self.permission().player_in_group(world, player, group)
    }

    fn player_groups(&self, world: Option<&str>, player: &str) -> Vec<String> {
        self.permission().player_groups(world, player)
    }

    fn primary_group(&self, world: Option<&str>, player: &str) -> Option<String> {
        self.permission().primary_group(world, player)
    }

    fn groups(&self) -> Vec<String> {
        self.permission().groups()
    }

    fn player_prefix_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Option<String> {
        player_identifier(player).and_then(|id| self.player_prefix(world, &id))
    }

    fn player_suffix_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Option<String> {
        player_identifier(player).and_then(|id| self.player_suffix(world, &id))
    }

    /// Returns `false` without touching the backend when the player does not resolve.
    fn set_player_prefix_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        prefix: &str,
    ) -> bool {
        apply_to(player, |id| self.set_player_prefix(world, id, prefix))
    }

    fn set_player_suffix_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        suffix: &str,
    ) -> bool {
        apply_to(player, |id| self.set_player_suffix(world, id, suffix))
    }

    fn player_prefix_online<P: Player + ?Sized>(&self, player: &P) -> Option<String> {
        self.player_prefix_for(current_world(player).as_deref(), player)
    }

    fn player_suffix_online<P: Player + ?Sized>(&self, player: &P) -> Option<String> {
        self.player_suffix_for(current_world(player).as_deref(), player)
    }

    fn set_player_prefix_online<P: Player + ?Sized>(&self, player: &P, prefix: &str) -> bool {
        self.set_player_prefix_for(current_world(player).as_deref(), player, prefix)
    }

    fn set_player_suffix_online<P: Player + ?Sized>(&self, player: &P, suffix: &str) -> bool {
        self.set_player_suffix_for(current_world(player).as_deref(), player, suffix)
    }

    fn player_info_integer_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        default: i64,
    ) -> i64 {
        match player_identifier(player) {
            Some(id) => self.player_info_integer(world, &id, node, default),
            None => default,
        }
    }

    fn set_player_info_integer_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        value: i64,
    ) -> bool {
        apply_to(player, |id| self.set_player_info_integer(world, id, node, value))
    }

    fn player_info_integer_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        default: i64,
    ) -> i64 {
        self.player_info_integer_for(current_world(player).as_deref(), player, node, default)
    }

    fn set_player_info_integer_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        value: i64,
    ) -> bool {
        self.set_player_info_integer_for(current_world(player).as_deref(), player, node, value)
    }

    fn player_info_double_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        default: f64,
    ) -> f64 {
        match player_identifier(player) {
            Some(id) => self.player_info_double(world, &id, node, default),
            None => default,
        }
    }

    fn set_player_info_double_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        value: f64,
    ) -> bool {
        apply_to(player, |id| self.set_player_info_double(world, id, node, value))
    }

    fn player_info_double_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        default: f64,
    ) -> f64 {
        self.player_info_double_for(current_world(player).as_deref(), player, node, default)
    }

    fn set_player_info_double_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        value: f64,
    ) -> bool {
        self.set_player_info_double_for(current_world(player).as_deref(), player, node, value)
    }

    fn player_info_boolean_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        default: bool,
    ) -> bool {
        match player_identifier(player) {
            Some(id) => self.player_info_boolean(world, &id, node, default),
            None => default,
        }
    }

    fn set_player_info_boolean_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        value: bool,
    ) -> bool {
        apply_to(player, |id| self.set_player_info_boolean(world, id, node, value))
    }

    fn player_info_boolean_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        default: bool,
    ) -> bool {
        self.player_info_boolean_for(current_world(player).as_deref(), player, node, default)
    }

    fn set_player_info_boolean_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        value: bool,
    ) -> bool {
        self.set_player_info_boolean_for(current_world(player).as_deref(), player, node, value)
    }

    fn player_info_string_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        default: &str,
    ) -> String {
        match player_identifier(player) {
            Some(id) => self.player_info_string(world, &id, node, default),
            None => default.to_string(),
        }
    }

    fn set_player_info_string_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        node: &str,
        value: &str,
    ) -> bool {
        apply_to(player, |id| self.set_player_info_string(world, id, node, value))
    }

    fn player_info_string_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        default: &str,
    ) -> String {
        self.player_info_string_for(current_world(player).as_deref(), player, node, default)
    }

    fn set_player_info_string_online<P: Player + ?Sized>(
        &self,
        player: &P,
        node: &str,
        value: &str,
    ) -> bool {
        self.set_player_info_string_for(current_world(player).as_deref(), player, node, value)
    }

    fn player_in_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
        group: &str,
    ) -> bool {
        self.permission().player_in_group_for(world, player, group)
    }

    fn player_groups_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Vec<String> {
        self.permission().player_groups_for(world, player)
    }

    fn primary_group_for<P: OfflinePlayer + ?Sized>(
        &self,
        world: Option<&str>,
        player: &P,
    ) -> Option<String> {
        self.permission().primary_group_for(world, player)
    }

    fn player_in_group_online<P: Player + ?Sized>(&self, player: &P, group: &str) -> bool {
        self.permission().player_in_group_online(player, group)
    }

    fn player_groups_online<P: Player + ?Sized>(&self, player: &P) -> Vec<String> {
        self.permission().player_groups_online(player)
    }

    fn primary_group_online<P: Player + ?Sized>(&self, player: &P) -> Option<String> {
        self.permission().primary_group_online(player)
    }

    fn group_prefix_in<W: World + ?Sized>(&self, world: Option<&W>, group: &str) -> Option<String> {
        self.group_prefix(world_name(world), group)
    }

    fn group_suffix_in<W: World + ?Sized>(&self, world: Option<&W>, group: &str) -> Option<String> {
        self.group_suffix(world_name(world), group)
    }

    fn set_group_prefix_in<W: World + ?Sized>(&self, world: Option<&W>, group: &str, prefix: &str) {
        self.set_group_prefix(world_name(world), group, prefix);
    }

    fn set_group_suffix_in<W: World + ?Sized>(&self, world: Option<&W>, group: &str, suffix: &str) {
        self.set_group_suffix(world_name(world), group, suffix);
    }
}

impl<T: Chat + ?Sized> ChatExt for T {}

/// Runs `f` with the player's identifier. Returns `false` without running it
/// when the player does not resolve.
fn apply_to<P: OfflinePlayer + ?Sized>(player: &P, f: impl FnOnce(&str)) -> bool {
    player_identifier(player).map(|id| f(&id)).is_some()
}
