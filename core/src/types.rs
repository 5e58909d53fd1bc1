use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Linear index of a tile on the grid, `0..total_tiles`.
pub type Position = u16;

/// Count type used for tile and mine counts.
pub type CellCount = u16;

const CENTS_PER_UNIT: u64 = 100;

/// Money in cents. Decimal input is converted once at the boundary so settlement math stays exact.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    pub fn from_decimal(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(GameError::InvalidBet);
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents >= u64::MAX as f64 {
            return Err(GameError::InvalidBet);
        }
        Ok(Self(cents as u64))
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Half of the amount, never dropping below one cent unless already zero.
    pub const fn halved(self) -> Self {
        if self.0 == 0 {
            Self(0)
        } else if self.0 / 2 == 0 {
            Self(1)
        } else {
            Self(self.0 / 2)
        }
    }

    pub const fn doubled(self) -> Self {
        Self(self.0.saturating_mul(2))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl FromStr for Amount {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim().parse().map_err(|_| GameError::InvalidBet)?;
        Self::from_decimal(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = GameError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_decimal(value)
    }
}

/// Payout factor in hundredths, `103` is `1.03x`.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(100);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn to_decimal(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Scales `amount` by this factor, rounding down to the cent.
    pub fn apply(self, amount: Amount) -> Amount {
        let scaled = u128::from(amount.cents()) * u128::from(self.0) / 100;
        Amount::from_cents(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_input_rounds_to_cents() {
        assert_eq!(Amount::from_decimal(10.0), Ok(Amount::from_cents(1000)));
        assert_eq!(Amount::from_decimal(0.125), Ok(Amount::from_cents(13)));
        assert_eq!("  2.50 ".parse::<Amount>(), Ok(Amount::from_cents(250)));
    }

    #[test]
    fn rejects_negative_nan_and_text() {
        assert_eq!(Amount::from_decimal(-5.0), Err(GameError::InvalidBet));
        assert_eq!(Amount::from_decimal(f64::NAN), Err(GameError::InvalidBet));
        assert_eq!(Amount::from_decimal(f64::INFINITY), Err(GameError::InvalidBet));
        assert_eq!("abc".parse::<Amount>(), Err(GameError::InvalidBet));
    }

    #[test]
    fn halving_keeps_a_cent_floor() {
        assert_eq!(Amount::from_cents(1000).halved(), Amount::from_cents(500));
        assert_eq!(Amount::from_cents(1).halved(), Amount::from_cents(1));
        assert_eq!(Amount::ZERO.halved(), Amount::ZERO);
        assert_eq!(Amount::from_cents(250).doubled(), Amount::from_cents(500));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Amount::from_cents(1030).to_string(), "10.30");
        assert_eq!(Amount::from_cents(7).to_string(), "0.07");
        assert_eq!(Multiplier::from_hundredths(103).to_string(), "1.03x");
        assert_eq!(Multiplier::from_hundredths(2475).to_string(), "24.75x");
    }

    #[test]
    fn multiplier_scales_amount_exactly() {
        let bet = Amount::from_cents(1000);
        assert_eq!(Multiplier::from_hundredths(103).apply(bet), Amount::from_cents(1030));
        assert_eq!(Multiplier::ONE.apply(bet), bet);
        assert_eq!(Multiplier::ZERO.apply(bet), Amount::ZERO);
    }
}
