//! The economy service contract.

use crate::host::OfflinePlayer;
use crate::error::VaultError;
use crate::resolve::{player_identifier, require_identifier};
use serde::{Deserialize, Serialize};

/// Outcome tag of an economy transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Success,
    InsufficientFunds,
    NotImplemented,
    Failure,
}

/// Result of a balance-changing or bank operation.
///
/// `balance` is the balance after the transaction, which equals
/// `starting_balance` whenever the transaction did not succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyResponse {
    pub amount: f64,
    pub starting_balance: f64,
    pub balance: f64,
    pub kind: ResponseType,
    pub error_message: Option<String>,
}

impl EconomyResponse {
    pub fn success(amount: f64, starting_balance: f64, balance: f64) -> Self {
        Self {
            amount,
            starting_balance,
            balance,
            kind: ResponseType::Success,
            error_message: None,
        }
    }

    pub fn insufficient_funds(amount: f64, balance: f64) -> Self {
        Self {
            amount,
            starting_balance: balance,
            balance,
            kind: ResponseType::InsufficientFunds,
            error_message: Some("Insufficient funds".to_string()),
        }
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            amount: 0.0,
            starting_balance: 0.0,
            balance: 0.0,
            kind: ResponseType::NotImplemented,
            error_message: Some(message.into()),
        }
    }

    pub fn failure(amount: f64, balance: f64, message: impl Into<String>) -> Self {
        Self {
            amount,
            starting_balance: balance,
            balance,
            kind: ResponseType::Failure,
            error_message: Some(message.into()),
        }
    }

    pub fn transaction_success(&self) -> bool {
        self.kind == ResponseType::Success
    }
}

const NO_BANKS: &str = "Banks are not supported by this economy";

/// An economy backend.
///
/// Accounts are keyed by canonical player identifier with an optional world
/// scope. Rounding and overdraft rules belong to the backend, except that
/// [`Economy::withdraw_player`] must check funds itself.
pub trait Economy: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn has_bank_support(&self) -> bool {
        false
    }

    /// Digits after the decimal point the currency supports, `None` if unrestricted.
    fn fractional_digits(&self) -> Option<u32>;

    /// Human-readable amount, e.g. `"10.50 Dollars"`.
    fn format(&self, amount: f64) -> String;

    fn currency_name_singular(&self) -> &str;

    fn currency_name_plural(&self) -> &str;

    fn has_account(&self, player: &str, world: Option<&str>) -> bool;

    fn balance(&self, player: &str, world: Option<&str>) -> f64;

    fn has(&self, player: &str, world: Option<&str>, amount: f64) -> bool {
        self.balance(player, world) >= amount
    }

    fn withdraw_player(&self, player: &str, world: Option<&str>, amount: f64) -> EconomyResponse;

    fn deposit_player(&self, player: &str, world: Option<&str>, amount: f64) -> EconomyResponse;

    fn create_player_account(&self, player: &str, world: Option<&str>) -> bool;

    fn create_bank(&self, _name: &str, _owner: &str) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn delete_bank(&self, _name: &str) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn bank_balance(&self, _name: &str) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn bank_has(&self, _name: &str, _amount: f64) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn bank_withdraw(&self, _name: &str, _amount: f64) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn bank_deposit(&self, _name: &str, _amount: f64) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn is_bank_owner(&self, _name: &str, _player: &str) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn is_bank_member(&self, _name: &str, _player: &str) -> EconomyResponse {
        EconomyResponse::not_implemented(NO_BANKS)
    }

    fn banks(&self) -> Vec<String> {
        Vec::new()
    }
}

fn unresolved(amount: f64, err: VaultError) -> EconomyResponse {
    EconomyResponse::failure(amount, 0.0, err.to_string())
}

/// Offline-player forms of the [`Economy`] operations. Players without a
/// resolvable identifier are reported as failures, never forwarded.
pub trait EconomyExt: Economy {
    fn has_account_for<P: OfflinePlayer + ?Sized>(&self, player: &P, world: Option<&str>) -> bool {
        player_identifier(player).is_some_and(|id| self.has_account(&id, world))
    }

    fn balance_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        world: Option<&str>,
    ) -> Option<f64> {
        player_identifier(player).map(|id| self.balance(&id, world))
    }

    fn has_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        world: Option<&str>,
        amount: f64,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.has(&id, world, amount))
    }

    fn withdraw_player_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        world: Option<&str>,
        amount: f64,
    ) -> EconomyResponse {
        match require_identifier(player) {
            Ok(id) => self.withdraw_player(&id, world, amount),
            Err(e) => unresolved(amount, e),
        }
    }

    fn deposit_player_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        world: Option<&str>,
        amount: f64,
    ) -> EconomyResponse {
        match require_identifier(player) {
            Ok(id) => self.deposit_player(&id, world, amount),
            Err(e) => unresolved(amount, e),
        }
    }

    fn create_player_account_for<P: OfflinePlayer + ?Sized>(
        &self,
        player: &P,
        world: Option<&str>,
    ) -> bool {
        player_identifier(player).is_some_and(|id| self.create_player_account(&id, world))
    }

    fn create_bank_for<P: OfflinePlayer + ?Sized>(&self, name: &str, owner: &P) -> EconomyResponse {
        match require_identifier(owner) {
            Ok(id) => self.create_bank(name, &id),
            Err(e) => unresolved(0.0, e),
        }
    }

    fn is_bank_owner_for<P: OfflinePlayer + ?Sized>(
        &self,
        name: &str,
        player: &P,
    ) -> EconomyResponse {
        match require_identifier(player) {
            Ok(id) => self.is_bank_owner(name, &id),
            Err(e) => unresolved(0.0, e),
        }
    }

    fn is_bank_member_for<P: OfflinePlayer + ?Sized>(
        &self,
        name: &str,
        player: &P,
    ) -> EconomyResponse {
        match require_identifier(player) {
            Ok(id) => self.is_bank_member(name, &id),
            Err(e) => unresolved(0.0, e),
        }
    }
}

impl<T: Economy + ?Sized> EconomyExt for T {}
