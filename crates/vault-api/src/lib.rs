//! # vault-api
//!
//! Service contracts that let server plugins share permission, chat and
//! economy backends without depending on each other directly.
//!
//! A backend plugin implements one of the contracts and publishes it through
//! the host's service registry. A consumer plugin fetches whichever
//! implementation is currently active and calls it synchronously.
//!
//! - [`Permission`] - player/group permission nodes, group membership, transient grants
//! - [`Chat`] - prefixes, suffixes and typed info nodes; group queries go
//!   through a held [`Permission`]
//! - [`Economy`] - balances, withdrawals, deposits and banks
//!
//! Each contract has exactly one trait method per logical operation, keyed by
//! an optional world name and a canonical player identifier. Richer host
//! objects ([`host::OfflinePlayer`], [`host::Player`], [`host::World`]) are
//! projected onto those methods by the extension traits ([`PermissionExt`],
//! [`ChatExt`], [`EconomyExt`]) and the helpers in [`resolve`].

pub mod chat;
pub mod economy;
pub mod error;
pub mod host;
pub mod permission;
pub mod resolve;

pub use chat::{Chat, ChatExt, InfoKind, InfoValue};
pub use economy::{Economy, EconomyExt, EconomyResponse, ResponseType};
pub use error::{Result, VaultError};
pub use host::{CommandSender, OfflinePlayer, PermissionAttachment, Player, PluginId, World};
pub use permission::{Permission, PermissionExt};

pub mod prelude {
    pub use crate::{
        Chat, ChatExt, CommandSender, Economy, EconomyExt, EconomyResponse, InfoKind, InfoValue,
        OfflinePlayer, Permission, PermissionAttachment, PermissionExt, Player, PluginId,
        ResponseType, Result, VaultError, World,
    };
}
