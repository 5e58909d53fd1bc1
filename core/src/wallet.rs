use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::*;

/// Ledger the engine settles against: one debit when a bet is placed, at most one credit per round.
pub trait Wallet {
    fn balance(&self) -> Amount;

    /// Fails with [`GameError::InsufficientFunds`] without touching the balance.
    fn debit(&mut self, amount: Amount) -> Result<()>;

    fn credit(&mut self, amount: Amount) -> Result<()>;
}

impl<W: Wallet + ?Sized> Wallet for &mut W {
    fn balance(&self) -> Amount {
        (**self).balance()
    }

    fn debit(&mut self, amount: Amount) -> Result<()> {
        (**self).debit(amount)
    }

    fn credit(&mut self, amount: Amount) -> Result<()> {
        (**self).credit(amount)
    }
}

fn debited(balance: Amount, amount: Amount) -> Result<Amount> {
    balance
        .checked_sub(amount)
        .ok_or(GameError::InsufficientFunds {
            needed: amount,
            available: balance,
        })
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryWallet {
    balance: Amount,
}

impl MemoryWallet {
    pub fn new(balance: Amount) -> Self {
        Self { balance }
    }
}

impl Wallet for MemoryWallet {
    fn balance(&self) -> Amount {
        self.balance
    }

    fn debit(&mut self, amount: Amount) -> Result<()> {
        self.balance = debited(self.balance, amount)?;
        Ok(())
    }

    fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.saturating_add(amount);
        Ok(())
    }
}

/// Persisted balance document, stored as a decimal in currency units (`4989.5`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalletBalance(pub Amount);

impl WalletBalance {
    /// Balance handed to a player the first time the wallet is opened.
    pub const STARTING: Amount = Amount::from_cents(500_000);
}

impl Default for WalletBalance {
    fn default() -> Self {
        Self(Self::STARTING)
    }
}

impl StorageKey for WalletBalance {
    const KEY: &'static str = "wallet_balance";
}

impl Serialize for WalletBalance {
    fn serialize<Ser>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_f64(self.0.to_decimal())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BalanceRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for WalletBalance {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let units = match BalanceRepr::deserialize(deserializer)? {
            BalanceRepr::Number(units) => units,
            BalanceRepr::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid wallet balance {text:?}")))?,
        };
        Amount::from_decimal(units)
            .map(Self)
            .map_err(|_| D::Error::custom(format!("invalid wallet balance {units}")))
    }
}

/// Wallet whose balance lives in a [`KeyValueStore`] and is written through on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredWallet<S> {
    store: S,
    balance: Amount,
}

impl<S: KeyValueStore> StoredWallet<S> {
    /// Starts at [`WalletBalance::STARTING`] only when nothing is stored, an unreadable balance is an error.
    pub fn open(store: S) -> Result<Self> {
        let stored = store.load::<WalletBalance>().inspect_err(|err| {
            log::error!("failed to load {}: {}", WalletBalance::KEY, err);
        })?;
        let WalletBalance(balance) = stored.unwrap_or_default();
        log::debug!("wallet opened with balance {}", balance);
        Ok(Self { store, balance })
    }

    /// Adds funds from outside the game, zero is rejected.
    pub fn top_up(&mut self, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Err(GameError::InvalidBet);
        }
        self.credit(amount)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit(&mut self, balance: Amount) -> Result<()> {
        self.store.save(&WalletBalance(balance))?;
        self.balance = balance;
        Ok(())
    }
}

impl<S: KeyValueStore> Wallet for StoredWallet<S> {
    fn balance(&self) -> Amount {
        self.balance
    }

    fn debit(&mut self, amount: Amount) -> Result<()> {
        let balance = debited(self.balance, amount)?;
        self.commit(balance)
    }

    fn credit(&mut self, amount: Amount) -> Result<()> {
        let balance = self.balance.saturating_add(amount);
        self.commit(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_wallet_refuses_overdraft() {
        let mut wallet = MemoryWallet::new(Amount::from_cents(5000));

        assert_eq!(
            wallet.debit(Amount::from_cents(10_000)),
            Err(GameError::InsufficientFunds {
                needed: Amount::from_cents(10_000),
                available: Amount::from_cents(5000),
            })
        );
        assert_eq!(wallet.balance(), Amount::from_cents(5000));

        wallet.debit(Amount::from_cents(5000)).unwrap();
        assert_eq!(wallet.balance(), Amount::ZERO);
    }

    #[test]
    fn stored_wallet_starts_with_default_balance() {
        let wallet = StoredWallet::open(MemoryStore::new()).unwrap();

        assert_eq!(wallet.balance(), WalletBalance::STARTING);
        assert_eq!(wallet.balance().to_string(), "5000.00");
    }

    #[test]
    fn stored_wallet_writes_through() {
        let mut wallet = StoredWallet::open(MemoryStore::new()).unwrap();
        wallet.debit(Amount::from_cents(1000)).unwrap();
        wallet.credit(Amount::from_cents(1030)).unwrap();

        let reopened = StoredWallet::open(wallet.store().clone()).unwrap();
        assert_eq!(reopened.balance(), Amount::from_cents(500_030));
    }

    #[test]
    fn top_up_rejects_zero() {
        let mut wallet = StoredWallet::open(MemoryStore::new()).unwrap();

        assert_eq!(wallet.top_up(Amount::ZERO), Err(GameError::InvalidBet));
        wallet.top_up(Amount::from_cents(100_000)).unwrap();
        assert_eq!(wallet.balance(), Amount::from_cents(600_000));
    }

    #[test]
    fn balance_is_stored_in_currency_units() {
        let mut wallet = StoredWallet::open(MemoryStore::new()).unwrap();
        wallet.debit(Amount::from_cents(1050)).unwrap();

        assert_eq!(
            wallet.store().read(WalletBalance::KEY),
            Ok(Some("4989.5".to_owned()))
        );
    }

    #[test]
    fn decimal_and_textual_balances_are_read_as_units() {
        for (stored, cents) in [
            ("4989.5", 498_950),
            ("5000", 500_000),
            ("\"12.34\"", 1234),
            ("0", 0),
        ] {
            let mut store = MemoryStore::new();
            store.write(WalletBalance::KEY, stored.to_owned()).unwrap();

            let wallet = StoredWallet::open(store).unwrap();
            assert_eq!(wallet.balance(), Amount::from_cents(cents), "{stored}");
        }
    }

    #[test]
    fn unreadable_balance_is_not_reset() {
        for stored in ["\"lots\"", "-5", "{not json", "null"] {
            let mut store = MemoryStore::new();
            store.write(WalletBalance::KEY, stored.to_owned()).unwrap();

            assert!(
                matches!(StoredWallet::open(store.clone()), Err(GameError::Storage(_))),
                "{stored}"
            );
            assert_eq!(store.read(WalletBalance::KEY), Ok(Some(stored.to_owned())));
        }
    }
}
