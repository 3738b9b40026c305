//! In-memory chat metadata backend.

use crate::ScopedKey;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use vault_api::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Subject {
    Player,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Meta {
    Prefix,
    Suffix,
}

type MetaKey = (Subject, Meta, ScopedKey);
type InfoKey = (Subject, ScopedKey, InfoKind, String);

#[derive(Debug, Default)]
struct ChatState {
    meta: HashMap<MetaKey, String>,
    info: HashMap<InfoKey, InfoValue>,
}

/// Chat backend storing prefixes, suffixes and info nodes in memory.
///
/// Player and group metadata are stored independently; a player's prefix
/// does not fall back to their group's.
pub struct MemoryChat {
    permission: Arc<dyn Permission>,
    state: RwLock<ChatState>,
}

impl MemoryChat {
    pub fn new(permission: Arc<dyn Permission>) -> Self {
        Self {
            permission,
            state: RwLock::new(ChatState::default()),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, ChatState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_meta(
        &self,
        subject: Subject,
        meta: Meta,
        world: Option<&str>,
        name: &str,
    ) -> Option<String> {
        self.state()
            .meta
            .get(&(subject, meta, ScopedKey::new(world, name)))
            .cloned()
    }

    fn set_meta(&self, subject: Subject, meta: Meta, world: Option<&str>, name: &str, value: &str) {
        debug!("Set {:?} {:?} of {} in {:?} to '{}'", subject, meta, name, world, value);
        self.state_mut()
            .meta
            .insert((subject, meta, ScopedKey::new(world, name)), value.to_string());
    }

    fn get_info(
        &self,
        subject: Subject,
        world: Option<&str>,
        name: &str,
        node: &str,
        kind: InfoKind,
    ) -> Option<InfoValue> {
        self.state()
            .info
            .get(&(subject, ScopedKey::new(world, name), kind, node.to_string()))
            .cloned()
    }

    fn set_info(
        &self,
        subject: Subject,
        world: Option<&str>,
        name: &str,
        node: &str,
        value: InfoValue,
    ) {
        let key = (subject, ScopedKey::new(world, name), value.kind(), node.to_string());
        self.state_mut().info.insert(key, value);
    }
}

impl Chat for MemoryChat {
    fn permission(&self) -> &dyn Permission {
        self.permission.as_ref()
    }

    fn name(&self) -> &str {
        "Memory Chat"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn player_prefix(&self, world: Option<&str>, player: &str) -> Option<String> {
        self.get_meta(Subject::Player, Meta::Prefix, world, player)
    }

    fn set_player_prefix(&self, world: Option<&str>, player: &str, prefix: &str) {
        self.set_meta(Subject::Player, Meta::Prefix, world, player, prefix);
    }

    fn player_suffix(&self, world: Option<&str>, player: &str) -> Option<String> {
        self.get_meta(Subject::Player, Meta::Suffix, world, player)
    }

    fn set_player_suffix(&self, world: Option<&str>, player: &str, suffix: &str) {
        self.set_meta(Subject::Player, Meta::Suffix, world, player, suffix);
    }

    fn group_prefix(&self, world: Option<&str>, group: &str) -> Option<String> {
        self.get_meta(Subject::Group, Meta::Prefix, world, group)
    }

    fn set_group_prefix(&self, world: Option<&str>, group: &str, prefix: &str) {
        self.set_meta(Subject::Group, Meta::Prefix, world, group, prefix);
    }

    fn group_suffix(&self, world: Option<&str>, group: &str) -> Option<String> {
        self.get_meta(Subject::Group, Meta::Suffix, world, group)
    }

    fn set_group_suffix(&self, world: Option<&str>, group: &str, suffix: &str) {
        self.set_meta(Subject::Group, Meta::Suffix, world, group, suffix);
    }

    fn player_info(
        &self,
        world: Option<&str>,
        player: &str,
        node: &str,
        kind: InfoKind,
    ) -> Option<InfoValue> {
        self.get_info(Subject::Player, world, player, node, kind)
    }

    fn set_player_info(&self, world: Option<&str>, player: &str, node: &str, value: InfoValue) {
        self.set_info(Subject::Player, world, player, node, value);
    }

    fn group_info(
        &self,
        world: Option<&str>,
        group: &str,
        node: &str,
        kind: InfoKind,
    ) -> Option<InfoValue> {
        self.get_info(Subject::Group, world, group, node, kind)
    }

    fn set_group_info(&self, world: Option<&str>, group: &str, node: &str, value: InfoValue) {
        self.set_info(Subject::Group, world, group, node, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{MemoryPlayer, MemoryWorld, OfflineProfile};
    use crate::MemoryPermission;

    fn chat() -> (Arc<MemoryPermission>, MemoryChat) {
        let perms = Arc::new(MemoryPermission::new());
        let chat = MemoryChat::new(perms.clone());
        (perms, chat)
    }

    #[test]
    fn test_prefix_and_suffix() {
        let (_, chat) = chat();
        assert_eq!(chat.player_prefix(None, "Alice"), None);

        chat.set_player_prefix(None, "Alice", "[VIP] ");
        chat.set_player_suffix(Some("nether"), "Alice", " *");
        chat.set_group_prefix(None, "admin", "[Admin] ");

        assert_eq!(chat.player_prefix(None, "Alice").as_deref(), Some("[VIP] "));
        assert_eq!(chat.player_suffix(Some("nether"), "Alice").as_deref(), Some(" *"));
        assert_eq!(chat.player_suffix(None, "Alice"), None);
        assert_eq!(chat.group_prefix(None, "admin").as_deref(), Some("[Admin] "));
        // Player and group namespaces are separate.
        assert_eq!(chat.player_prefix(None, "admin"), None);
    }

    #[test]
    fn test_info_default_until_set() {
        let (_, chat) = chat();
        assert_eq!(chat.player_info_integer(None, "Alice", "homes", 3), 3);

        chat.set_player_info_integer(None, "Alice", "homes", 5);
        assert_eq!(chat.player_info_integer(None, "Alice", "homes", 3), 5);

        chat.set_player_info_integer(None, "Alice", "homes", 7);
        assert_eq!(chat.player_info_integer(None, "Alice", "homes", 3), 7);
        assert_eq!(chat.player_info_integer(Some("nether"), "Alice", "homes", 3), 3);
    }

    #[test]
    fn test_info_families_are_independent() {
        let (_, chat) = chat();
        chat.set_player_info_integer(None, "Alice", "rank", 10);

        assert_eq!(chat.player_info_double(None, "Alice", "rank", 1.5), 1.5);
        assert!(!chat.player_info_boolean(None, "Alice", "rank", false));
        assert_eq!(chat.player_info_string(None, "Alice", "rank", "none"), "none");

        chat.set_player_info_string(None, "Alice", "rank", "gold");
        chat.set_player_info_double(None, "Alice", "rank", 2.5);
        chat.set_player_info_boolean(None, "Alice", "rank", true);

        assert_eq!(chat.player_info_integer(None, "Alice", "rank", 0), 10);
        assert_eq!(chat.player_info_string(None, "Alice", "rank", "none"), "gold");
        assert_eq!(chat.player_info_double(None, "Alice", "rank", 0.0), 2.5);
        assert!(chat.player_info_boolean(None, "Alice", "rank", false));
    }

    #[test]
    fn test_group_info() {
        let (_, chat) = chat();
        chat.set_group_info_double(None, "admin", "multiplier", 2.0);
        chat.set_group_info_string(Some("nether"), "admin", "title", "Overlord");

        assert_eq!(chat.group_info_double(None, "admin", "multiplier", 1.0), 2.0);
        assert_eq!(chat.group_info_string(None, "admin", "title", "-"), "-");
        assert_eq!(chat.group_info_string(Some("nether"), "admin", "title", "-"), "Overlord");
        assert_eq!(chat.player_info_double(None, "admin", "multiplier", 1.0), 1.0);
    }

    #[test]
    fn test_group_queries_delegate_to_permission() {
        let (perms, chat) = chat();
        perms.player_add_group(None, "Bob", "admin");

        assert!(chat.player_in_group(None, "Bob", "admin"));
        assert_eq!(chat.player_groups(None, "Bob"), perms.player_groups(None, "Bob"));
        assert_eq!(chat.primary_group(None, "Bob").as_deref(), Some("admin"));
        assert_eq!(chat.groups(), vec!["admin"]);
    }

    #[test]
    fn test_host_object_forms() {
        let (_, chat) = chat();
        let alice = OfflineProfile::new("Alice");
        let nobody = OfflineProfile::unnamed();
        let steve = MemoryPlayer::new("Steve").in_world("world");

        assert!(chat.set_player_prefix_for(None, &alice, "[A] "));
        assert_eq!(chat.player_prefix_for(None, &alice), chat.player_prefix(None, "Alice"));

        assert!(!chat.set_player_prefix_for(None, &nobody, "[?] "));
        assert_eq!(chat.player_prefix_for(None, &nobody), None);

        chat.set_player_suffix(Some("world"), "Steve", " (builder)");
        assert_eq!(chat.player_suffix_online(&steve).as_deref(), Some(" (builder)"));

        let nether = MemoryWorld::new("nether");
        chat.set_group_suffix_in(Some(&nether), "admin", "!");
        assert_eq!(chat.group_suffix_in(Some(&nether), "admin").as_deref(), Some("!"));
        assert_eq!(chat.group_suffix_in::<MemoryWorld>(None, "admin"), None);
    }

    #[test]
    fn test_player_info_host_forms() {
        let (_, chat) = chat();
        let alice = OfflineProfile::new("Alice");
        let steve = MemoryPlayer::new("Steve").in_world("world");

        assert!(chat.set_player_info_integer_for(None, &alice, "homes", 4));
        assert_eq!(
            chat.player_info_integer_for(None, &alice, "homes", 1),
            chat.player_info_integer(None, "Alice", "homes", 1)
        );
        assert!(chat.set_player_info_string_for(None, &alice, "title", "Sir"));
        assert_eq!(chat.player_info_string_for(None, &alice, "title", "-"), "Sir");

        assert!(chat.set_player_info_double_online(&steve, "speed", 1.5));
        assert!(chat.set_player_info_boolean_online(&steve, "muted", true));
        assert_eq!(chat.player_info_double(Some("world"), "Steve", "speed", 0.0), 1.5);
        assert_eq!(chat.player_info_double_online(&steve, "speed", 0.0), 1.5);
        assert!(chat.player_info_boolean_online(&steve, "muted", false));
        assert!(!chat.player_info_boolean(None, "Steve", "muted", false));

        assert!(chat.set_player_prefix_online(&steve, "~"));
        assert!(chat.set_player_suffix_online(&steve, "!"));
        assert_eq!(chat.player_prefix(Some("world"), "Steve").as_deref(), Some("~"));
        assert_eq!(chat.player_suffix_online(&steve).as_deref(), Some("!"));
    }

    #[test]
    fn test_group_queries_for_host_objects() {
        let (perms, chat) = chat();
        let bob = OfflineProfile::new("Bob");
        let steve = MemoryPlayer::new("Steve").in_world("world");
        perms.player_add_group(None, "Bob", "admin");
        perms.player_add_group(Some("world"), "Steve", "builder");

        assert!(chat.player_in_group_for(None, &bob, "admin"));
        assert_eq!(chat.player_groups_for(None, &bob), vec!["admin"]);
        assert_eq!(chat.primary_group_for(None, &bob).as_deref(), Some("admin"));

        assert!(chat.player_in_group_online(&steve, "builder"));
        assert_eq!(chat.player_groups_online(&steve), vec!["builder"]);
        assert_eq!(chat.primary_group_online(&steve).as_deref(), Some("builder"));
    }

    #[test]
    fn test_unresolved_player_forms_fail_closed() {
        let (perms, chat) = chat();
        let nobody = OfflineProfile::unnamed();
        let ghost = MemoryPlayer::unnamed().in_world("world");
        perms.player_add_group(None, "Bob", "admin");

        assert!(!chat.set_player_info_integer_for(None, &nobody, "homes", 9));
        assert_eq!(chat.player_info_integer_for(None, &nobody, "homes", 2), 2);
        assert_eq!(chat.player_info_string_for(None, &nobody, "title", "-"), "-");
        assert!(!chat.set_player_info_boolean_online(&ghost, "muted", true));
        assert_eq!(chat.player_info_double_online(&ghost, "speed", 0.5), 0.5);
        assert!(!chat.set_player_prefix_online(&ghost, "?"));

        assert!(!chat.player_in_group_for(None, &nobody, "admin"));
        assert!(chat.player_groups_for(None, &nobody).is_empty());
        assert_eq!(chat.primary_group_online(&ghost), None);
    }
}
