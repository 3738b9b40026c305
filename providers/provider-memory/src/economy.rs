//! In-memory economy backend.
//!
//! Balances are held as integer minor units (cents for two fractional
//! digits), so a withdrawal followed by a deposit of the same amount restores
//! the balance exactly. Amounts are rounded to the currency's precision
//! before they are applied.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use vault_api::prelude::*;

use crate::ScopedKey;

const BALANCE_OVERFLOW: &str = "Balance would exceed the largest representable amount";

/// Currency and account settings for [`MemoryEconomy`].
#[derive(Debug, Clone, PartialEq)]
pub struct EconomySettings {
    pub currency_singular: String,
    pub currency_plural: String,
    pub fractional_digits: u32,
    /// Balance given to accounts created through `create_player_account`.
    pub starting_balance: f64,
    /// When false the world argument is ignored and every player has one account.
    pub per_world_accounts: bool,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            currency_singular: "Dollar".to_string(),
            currency_plural: "Dollars".to_string(),
            fractional_digits: 2,
            starting_balance: 0.0,
            per_world_accounts: false,
        }
    }
}

#[derive(Debug)]
struct Bank {
    owner: String,
    members: BTreeSet<String>,
    balance: i64,
}

#[derive(Debug, Default)]
struct EconomyState {
    accounts: HashMap<ScopedKey, i64>,
    banks: BTreeMap<String, Bank>,
}

pub struct MemoryEconomy {
    settings: EconomySettings,
    scale: f64,
    state: RwLock<EconomyState>,
}

impl MemoryEconomy {
    pub fn new(settings: EconomySettings) -> Self {
        let scale = 10f64.powi(settings.fractional_digits as i32);
        Self {
            settings,
            scale,
            state: RwLock::new(EconomyState::default()),
        }
    }

    pub fn settings(&self) -> &EconomySettings {
        &self.settings
    }

    /// Create or overwrite an account with an exact balance.
    pub fn set_balance(&self, player: &str, world: Option<&str>, balance: f64) {
        let key = self.account_key(player, world);
        let units = self.to_units(balance);
        self.state_mut().accounts.insert(key, units);
    }

    /// Add a member to an existing bank. Returns false if the bank does not exist.
    pub fn add_bank_member(&self, name: &str, player: &str) -> bool {
        match self.state_mut().banks.get_mut(name) {
            Some(bank) => {
                bank.members.insert(player.to_string());
                true
            }
            None => false,
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, EconomyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, EconomyState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn account_key(&self, player: &str, world: Option<&str>) -> ScopedKey {
        let world = if self.settings.per_world_accounts {
            world
        } else {
            None
        };
        ScopedKey::new(world, player)
    }

    fn to_units(&self, amount: f64) -> i64 {
        (amount * self.scale).round() as i64
    }

    fn from_units(&self, units: i64) -> f64 {
        units as f64 / self.scale
    }

    /// Rejects negative, non-finite and unrepresentable amounts before
    /// anything is touched.
    fn check_amount(&self, amount: f64, verb: &str) -> Result<i64> {
        if !amount.is_finite() {
            return Err(VaultError::InvalidArgument(format!(
                "Cannot {verb} a non-finite amount"
            )));
        }
        if amount < 0.0 {
            return Err(VaultError::InvalidArgument(format!(
                "Cannot {verb} negative funds"
            )));
        }
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        if (amount * self.scale).round() >= i64::MAX as f64 {
            return Err(VaultError::InvalidArgument(format!(
                "Cannot {verb} more than the largest representable balance"
            )));
        }
        Ok(self.to_units(amount))
    }
}

impl Economy for MemoryEconomy {
    fn name(&self) -> &str {
        "Memory Economy"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn has_bank_support(&self) -> bool {
        true
    }

    fn fractional_digits(&self) -> Option<u32> {
        Some(self.settings.fractional_digits)
    }

    fn format(&self, amount: f64) -> String {
        let currency = if amount == 1.0 {
            &self.settings.currency_singular
        } else {
            &self.settings.currency_plural
        };
        let digits = self.settings.fractional_digits as usize;
        format!("{amount:.digits$} {currency}")
    }

    fn currency_name_singular(&self) -> &str {
        &self.settings.currency_singular
    }

    fn currency_name_plural(&self) -> &str {
        &self.settings.currency_plural
    }

    fn has_account(&self, player: &str, world: Option<&str>) -> bool {
        self.state()
            .accounts
            .contains_key(&self.account_key(player, world))
    }

    fn balance(&self, player: &str, world: Option<&str>) -> f64 {
        let units = self
            .state()
            .accounts
            .get(&self.account_key(player, world))
            .copied()
            .unwrap_or(0);
        self.from_units(units)
    }

    fn withdraw_player(&self, player: &str, world: Option<&str>, amount: f64) -> EconomyResponse {
        let units = match self.check_amount(amount, "withdraw") {
            Ok(units) => units,
            Err(e) => {
                return EconomyResponse::failure(amount, self.balance(player, world), e.to_string())
            }
        };

        let key = self.account_key(player, world);
        let mut state = self.state_mut();
        let Some(balance) = state.accounts.get_mut(&key) else {
            return EconomyResponse::failure(amount, 0.0, "Account does not exist");
        };

        let start = *balance;
        if units > start {
            return EconomyResponse::insufficient_funds(amount, self.from_units(start));
        }

        *balance -= units;
        debug!("Withdrew {} from {} (balance {})", units, player, *balance);
        EconomyResponse::success(
            self.from_units(units),
            self.from_units(start),
            self.from_units(*balance),
        )
    }

    fn deposit_player(&self, player: &str, world: Option<&str>, amount: f64) -> EconomyResponse {
        let units = match self.check_amount(amount, "deposit") {
            Ok(units) => units,
            Err(e) => {
                return EconomyResponse::failure(amount, self.balance(player, world), e.to_string())
            }
        };

        let key = self.account_key(player, world);
        let mut state = self.state_mut();
        let Some(balance) = state.accounts.get_mut(&key) else {
            return EconomyResponse::failure(amount, 0.0, "Account does not exist");
        };

        let start = *balance;
        let Some(updated) = start.checked_add(units) else {
            return EconomyResponse::failure(amount, self.from_units(start), BALANCE_OVERFLOW);
        };
        *balance = updated;
        debug!("Deposited {} to {} (balance {})", units, player, *balance);
        EconomyResponse::success(
            self.from_units(units),
            self.from_units(start),
            self.from_units(*balance),
        )
    }

    fn create_player_account(&self, player: &str, world: Option<&str>) -> bool {
        let key = self.account_key(player, world);
        let starting = self.to_units(self.settings.starting_balance);
        let mut state = self.state_mut();
        if state.accounts.contains_key(&key) {
            return false;
        }
        state.accounts.insert(key, starting);
        debug!("Created account for {} in {:?}", player, world);
        true
    }

    fn create_bank(&self, name: &str, owner: &str) -> EconomyResponse {
        let mut state = self.state_mut();
        if state.banks.contains_key(name) {
            return EconomyResponse::failure(0.0, 0.0, format!("Bank '{name}' already exists"));
        }
        state.banks.insert(
            name.to_string(),
            Bank {
                owner: owner.to_string(),
                members: BTreeSet::new(),
                balance: 0,
            },
        );
        debug!("Created bank {} owned by {}", name, owner);
        EconomyResponse::success(0.0, 0.0, 0.0)
    }

    fn delete_bank(&self, name: &str) -> EconomyResponse {
        match self.state_mut().banks.remove(name) {
            Some(bank) => {
                let balance = self.from_units(bank.balance);
                EconomyResponse::success(0.0, balance, 0.0)
            }
            None => EconomyResponse::failure(0.0, 0.0, format!("Bank '{name}' does not exist")),
        }
    }

    fn bank_balance(&self, name: &str) -> EconomyResponse {
        match self.state().banks.get(name) {
            Some(bank) => {
                let balance = self.from_units(bank.balance);
                EconomyResponse::success(0.0, balance, balance)
            }
            None => EconomyResponse::failure(0.0, 0.0, format!("Bank '{name}' does not exist")),
        }
    }

    fn bank_has(&self, name: &str, amount: f64) -> EconomyResponse {
        let units = match self.check_amount(amount, "check") {
            Ok(units) => units,
            Err(e) => return EconomyResponse::failure(amount, 0.0, e.to_string()),
        };

        let state = self.state();
        let Some(bank) = state.banks.get(name) else {
            return EconomyResponse::failure(amount, 0.0, format!("Bank '{name}' does not exist"));
        };

        let balance = self.from_units(bank.balance);
        if units > bank.balance {
            EconomyResponse::insufficient_funds(amount, balance)
        } else {
            EconomyResponse::success(amount, balance, balance)
        }
    }

    fn bank_withdraw(&self, name: &str, amount: f64) -> EconomyResponse {
        let units = match self.check_amount(amount, "withdraw") {
            Ok(units) => units,
            Err(e) => return EconomyResponse::failure(amount, 0.0, e.to_string()),
        };

        let mut state = self.state_mut();
        let Some(bank) = state.banks.get_mut(name) else {
            return EconomyResponse::failure(amount, 0.0, format!("Bank '{name}' does not exist"));
        };

        let start = bank.balance;
        if units > start {
            return EconomyResponse::insufficient_funds(amount, self.from_units(start));
        }
        bank.balance -= units;
        EconomyResponse::success(
            self.from_units(units),
            self.from_units(start),
            self.from_units(bank.balance),
        )
    }

    fn bank_deposit(&self, name: &str, amount: f64) -> EconomyResponse {
        let units = match self.check_amount(amount, "deposit") {
            Ok(units) => units,
            Err(e) => return EconomyResponse::failure(amount, 0.0, e.to_string()),
        };

        let mut state = self.state_mut();
        let Some(bank) = state.banks.get_mut(name) else {
            return EconomyResponse::failure(amount, 0.0, format!("Bank '{name}' does not exist"));
        };

        let start = bank.balance;
        let Some(updated) = start.checked_add(units) else {
            return EconomyResponse::failure(amount, self.from_units(start), BALANCE_OVERFLOW);
        };
        bank.balance = updated;
        EconomyResponse::success(
            self.from_units(units),
            self.from_units(start),
            self.from_units(bank.balance),
        )
    }

    fn is_bank_owner(&self, name: &str, player: &str) -> EconomyResponse {
        match self.state().banks.get(name) {
            Some(bank) if bank.owner == player => {
                let balance = self.from_units(bank.balance);
                EconomyResponse::success(0.0, balance, balance)
            }
            Some(bank) => EconomyResponse::failure(
                0.0,
                self.from_units(bank.balance),
                format!("{player} does not own bank '{name}'"),
            ),
            None => EconomyResponse::failure(0.0, 0.0, format!("Bank '{name}' does not exist")),
        }
    }

    fn is_bank_member(&self, name: &str, player: &str) -> EconomyResponse {
        match self.state().banks.get(name) {
            Some(bank) if bank.owner == player || bank.members.contains(player) => {
                let balance = self.from_units(bank.balance);
                EconomyResponse::success(0.0, balance, balance)
            }
            Some(bank) => EconomyResponse::failure(
                0.0,
                self.from_units(bank.balance),
                format!("{player} is not a member of bank '{name}'"),
            ),
            None => EconomyResponse::failure(0.0, 0.0, format!("Bank '{name}' does not exist")),
        }
    }

    fn banks(&self) -> Vec<String> {
        self.state().banks.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::OfflineProfile;

    fn economy() -> MemoryEconomy {
        MemoryEconomy::new(EconomySettings::default())
    }

    #[test]
    fn test_alice_withdraw_scenario() {
        let eco = economy();
        eco.set_balance("Alice", None, 100.0);

        let response = eco.withdraw_player("Alice", None, 30.0);
        assert_eq!(response.starting_balance, 100.0);
        assert_eq!(response.balance, 70.0);
        assert_eq!(response.amount, 30.0);
        assert_eq!(response.kind, ResponseType::Success);
        assert_eq!(eco.balance("Alice", None), 70.0);

        let response = eco.withdraw_player("Alice", None, 1000.0);
        assert_eq!(response.kind, ResponseType::InsufficientFunds);
        assert_eq!(response.balance, 70.0);
        assert_eq!(eco.balance("Alice", None), 70.0);
    }

    #[test]
    fn test_withdraw_then_deposit_restores_balance() {
        let eco = economy();
        eco.set_balance("Alice", None, 0.3);

        assert!(eco.withdraw_player("Alice", None, 0.1).transaction_success());
        assert!(eco.deposit_player("Alice", None, 0.1).transaction_success());
        assert_eq!(eco.balance("Alice", None), 0.3);
    }

    #[test]
    fn test_has_compares_balance() {
        let eco = economy();
        eco.set_balance("Alice", None, 50.0);
        assert!(eco.has("Alice", None, 50.0));
        assert!(!eco.has("Alice", None, 50.01));
        assert!(!eco.has("Nobody", None, 0.01));
    }

    #[test]
    fn test_negative_and_missing_accounts_fail() {
        let eco = economy();
        eco.set_balance("Alice", None, 10.0);

        let response = eco.withdraw_player("Alice", None, -5.0);
        assert_eq!(response.kind, ResponseType::Failure);
        assert_eq!(response.balance, 10.0);

        assert_eq!(eco.deposit_player("Alice", None, f64::NAN).kind, ResponseType::Failure);

        let response = eco.deposit_player("Ghost", None, 5.0);
        assert_eq!(response.kind, ResponseType::Failure);
        assert!(!eco.has_account("Ghost", None));
    }

    #[test]
    fn test_oversized_amounts_fail_without_panicking() {
        let eco = economy();
        eco.set_balance("Alice", None, 100.0);

        let response = eco.deposit_player("Alice", None, 1e17);
        assert_eq!(response.kind, ResponseType::Failure);
        assert_eq!(response.balance, 100.0);
        assert_eq!(eco.withdraw_player("Alice", None, 1e17).kind, ResponseType::Failure);
        assert_eq!(eco.balance("Alice", None), 100.0);

        eco.set_balance("Bob", None, 9.0e16);
        let response = eco.deposit_player("Bob", None, 5.0e15);
        assert_eq!(response.kind, ResponseType::Failure);
        assert_eq!(eco.balance("Bob", None), 9.0e16);

        assert!(eco.create_bank("guild", "Alice").transaction_success());
        assert!(eco.bank_deposit("guild", 9.0e16).transaction_success());
        assert_eq!(eco.bank_deposit("guild", 9.0e16).kind, ResponseType::Failure);
        assert_eq!(eco.bank_balance("guild").balance, 9.0e16);
    }

    #[test]
    fn test_bank_has_rejects_invalid_amounts() {
        let eco = economy();
        assert!(eco.create_bank("guild", "Alice").transaction_success());

        assert_eq!(eco.bank_has("guild", f64::NAN).kind, ResponseType::Failure);
        assert_eq!(eco.bank_has("guild", -1.0).kind, ResponseType::Failure);
        assert!(eco.bank_has("guild", 0.0).transaction_success());
    }

    #[test]
    fn test_create_player_account() {
        let eco = MemoryEconomy::new(EconomySettings {
            starting_balance: 25.0,
            ..Default::default()
        });

        assert!(!eco.has_account("Alice", None));
        assert!(eco.create_player_account("Alice", None));
        assert!(!eco.create_player_account("Alice", None));
        assert_eq!(eco.balance("Alice", None), 25.0);
    }

    #[test]
    fn test_world_accounts() {
        let shared = economy();
        shared.set_balance("Alice", Some("nether"), 5.0);
        assert_eq!(shared.balance("Alice", None), 5.0);

        let split = MemoryEconomy::new(EconomySettings {
            per_world_accounts: true,
            ..Default::default()
        });
        split.set_balance("Alice", Some("nether"), 5.0);
        assert_eq!(split.balance("Alice", None), 0.0);
        assert!(!split.has_account("Alice", None));
        assert!(split.has_account("Alice", Some("nether")));
    }

    #[test]
    fn test_format() {
        let eco = economy();
        assert_eq!(eco.format(1.0), "1.00 Dollar");
        assert_eq!(eco.format(10.5), "10.50 Dollars");
        assert_eq!(eco.fractional_digits(), Some(2));
    }

    #[test]
    fn test_banks() {
        let eco = economy();
        assert!(eco.create_bank("guild", "Alice").transaction_success());
        assert_eq!(eco.create_bank("guild", "Bob").kind, ResponseType::Failure);

        assert!(eco.is_bank_owner("guild", "Alice").transaction_success());
        assert!(!eco.is_bank_owner("guild", "Bob").transaction_success());
        assert!(eco.is_bank_member("guild", "Alice").transaction_success());
        assert!(!eco.is_bank_member("guild", "Bob").transaction_success());

        assert!(eco.add_bank_member("guild", "Bob"));
        assert!(eco.is_bank_member("guild", "Bob").transaction_success());
        assert!(!eco.add_bank_member("missing", "Bob"));

        assert!(eco.bank_deposit("guild", 40.0).transaction_success());
        assert_eq!(eco.bank_withdraw("guild", 50.0).kind, ResponseType::InsufficientFunds);
        assert_eq!(eco.bank_balance("guild").balance, 40.0);
        assert!(eco.bank_has("guild", 40.0).transaction_success());

        assert_eq!(eco.banks(), vec!["guild"]);
        assert!(eco.delete_bank("guild").transaction_success());
        assert_eq!(eco.bank_balance("guild").kind, ResponseType::Failure);
    }

    #[test]
    fn test_offline_forms() {
        let eco = economy();
        let alice = OfflineProfile::new("Alice");
        let nobody = OfflineProfile::unnamed();

        assert!(eco.create_player_account_for(&alice, None));
        assert!(eco.has_account("Alice", None));

        let response = eco.deposit_player_for(&alice, None, 12.5);
        assert_eq!(response, EconomyResponse::success(12.5, 0.0, 12.5));
        assert_eq!(eco.balance_for(&alice, None), Some(eco.balance("Alice", None)));

        assert!(eco.create_bank_for("guild", &alice).transaction_success());
        assert!(eco.is_bank_owner_for("guild", &alice).transaction_success());

        assert_eq!(eco.withdraw_player_for(&nobody, None, 1.0).kind, ResponseType::Failure);
        assert_eq!(eco.is_bank_member_for("guild", &nobody).kind, ResponseType::Failure);
    }
}
