//! # provider-memory
//!
//! In-memory backends for all three service contracts.
//!
//! Nothing is persisted; state lives for as long as the backend value does.
//! The backends are meant for development servers and for testing consumer
//! plugins against real contract behavior. The [`fixtures`] module provides
//! stand-in host objects (worlds, players, console) for the same purpose.

pub mod chat;
pub mod economy;
pub mod fixtures;
pub mod permission;

pub use chat::MemoryChat;
pub use economy::{EconomySettings, MemoryEconomy};
pub use fixtures::{ConsoleSender, MemoryPlayer, MemoryWorld, OfflineProfile};
pub use permission::MemoryPermission;

/// Plugin id the memory backends register and attach permissions under.
pub const PLUGIN_ID: &str = "vault-memory";

/// Backend-side key for anything stored per world scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ScopedKey {
    pub world: Option<String>,
    pub subject: String,
}

impl ScopedKey {
    pub(crate) fn new(world: Option<&str>, subject: &str) -> Self {
        Self {
            world: world.map(str::to_owned),
            subject: subject.to_string(),
        }
    }
}
