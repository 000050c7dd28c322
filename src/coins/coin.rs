//! Coin, coin sets and decimal coin sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coins::{CoinError, Dec, Int};

/// Denominations follow the Cosmos SDK rule `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    let len_ok = (3..=128).contains(&denom.len());
    if first_ok && rest_ok && len_ok {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_string()))
    }
}

/// Split `"<digits-or-decimal><denom>"` at the first character that cannot be
/// part of the amount.
fn split_amount(s: &str) -> Option<(&str, &str)> {
    let idx = s.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    if idx == 0 {
        return None;
    }
    Some(s.split_at(idx))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Int,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<Int>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (amount, denom) = split_amount(s).ok_or_else(|| CoinError::InvalidCoin(s.to_string()))?;
        validate_denom(denom)?;
        Ok(Coin {
            denom: denom.to_string(),
            amount: amount.parse()?,
        })
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Canonical coin set: unique denominations, sorted ascending, no zero amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a canonical set from arbitrary coins, summing duplicates.
    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinError> {
        let mut set = Coins::new();
        for coin in coins {
            set.add_coin(coin)?;
        }
        Ok(set)
    }

    /// Parse a comma-separated list such as `"10uluna,5uusd"`. The empty string
    /// is the empty set. A denomination listed twice is rejected.
    pub fn parse(s: &str) -> Result<Self, CoinError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Coins::new());
        }
        let mut seen = BTreeMap::new();
        for part in s.split(',') {
            let coin: Coin = part.parse()?;
            if seen.insert(coin.denom.clone(), coin.amount).is_some() {
                return Err(CoinError::DuplicateDenom(coin.denom));
            }
        }
        Ok(Coins(
            seen.into_iter()
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        ))
    }

    /// Merge one coin in: sum per denomination, drop zeros, keep sorted.
    pub fn add_coin(&mut self, coin: Coin) -> Result<(), CoinError> {
        validate_denom(&coin.denom)?;
        if coin.amount.is_zero() {
            return Ok(());
        }
        match self.0.binary_search_by(|c| c.denom.as_str().cmp(&coin.denom)) {
            Ok(pos) => {
                let sum = self.0[pos].amount.checked_add(coin.amount)?;
                self.0[pos].amount = sum;
            }
            Err(pos) => self.0.insert(pos, coin),
        }
        Ok(())
    }

    /// Merge another set into a new one.
    pub fn add(&self, other: &Coins) -> Result<Coins, CoinError> {
        let mut out = self.clone();
        for coin in other.iter() {
            out.add_coin(coin.clone())?;
        }
        Ok(out)
    }

    pub fn amount_of(&self, denom: &str) -> Int {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(Int::ZERO)
    }

    pub fn first(&self) -> Option<&Coin> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Coin> {
        self.0
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::from_coins(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

/// Decimal-amount coin, used for gas prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Dec,
}

impl FromStr for DecCoin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (amount, denom) = split_amount(s).ok_or_else(|| CoinError::InvalidCoin(s.to_string()))?;
        validate_denom(denom)?;
        Ok(DecCoin {
            denom: denom.to_string(),
            amount: amount.parse()?,
        })
    }
}

/// Sorted, unique decimal coin set. Zero prices are kept out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecCoins(Vec<DecCoin>);

impl DecCoins {
    pub fn parse(s: &str) -> Result<Self, CoinError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(DecCoins::default());
        }
        let mut seen = BTreeMap::new();
        for part in s.split(',') {
            let coin: DecCoin = part.parse()?;
            if seen.insert(coin.denom.clone(), coin.amount).is_some() {
                return Err(CoinError::DuplicateDenom(coin.denom));
            }
        }
        Ok(DecCoins(
            seen.into_iter()
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(denom, amount)| DecCoin { denom, amount })
                .collect(),
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecCoin> {
        self.0.iter()
    }
}
