//! Identity and fixed-point value types shared by the account ledgers

use num_integer::Integer;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Block time in unix seconds, as delivered by the block header.
pub type Timestamp = i64;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Human-chosen account name, the key of every per-account record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(name: &str) -> LedgerResult<Self> {
        Self::try_from(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountKey {
    type Error = LedgerError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        let invalid = |reason| LedgerError::InvalidUsername {
            username: name.clone(),
            reason,
        };
        if name.len() < MIN_USERNAME_LENGTH {
            return Err(invalid("too short"));
        }
        if name.len() > MAX_USERNAME_LENGTH {
            return Err(invalid("too long"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("illegal character"));
        }
        Ok(AccountKey(name))
    }
}

impl From<AccountKey> for String {
    fn from(key: AccountKey) -> Self {
        key.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bank address. Derived from a public key for registered users
/// (see [`crate::crypto::address_from_public_key`]), but any opaque
/// string may receive coin before an account claims it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Address(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coin amount in base units. One whole coin is `decimal_scale` units.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct Coin(u64);

impl Coin {
    pub const fn new(units: u64) -> Self {
        Coin(units)
    }

    pub const fn zero() -> Self {
        Coin(0)
    }

    pub const fn units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whole coins scaled into base units.
    pub fn from_whole(coins: u64, decimal_scale: u64) -> LedgerResult<Self> {
        coins
            .checked_mul(decimal_scale)
            .map(Coin)
            .ok_or(LedgerError::Overflow { op: "from_whole" })
    }

    pub fn plus(self, other: Coin, op: &'static str) -> LedgerResult<Coin> {
        self.0
            .checked_add(other.0)
            .map(Coin)
            .ok_or(LedgerError::Overflow { op })
    }

    pub fn checked_minus(self, other: Coin) -> Option<Coin> {
        self.0.checked_sub(other.0).map(Coin)
    }

    pub fn saturating_minus(self, other: Coin) -> Coin {
        Coin(self.0.saturating_sub(other.0))
    }

    /// Parses a human amount such as `"12.5"` into base units. Amounts finer
    /// than the ledger precision are rejected rather than rounded.
    pub fn from_decimal_str(s: &str, decimal_scale: u64) -> LedgerResult<Self> {
        let invalid = LedgerError::InvalidAmount {
            op: "parse coin",
            amount: Coin::zero(),
        };
        let value = Decimal::from_str(s.trim()).map_err(|_| invalid.clone())?;
        if value.is_sign_negative() {
            return Err(invalid);
        }
        let scaled = value
            .checked_mul(Decimal::from(decimal_scale))
            .ok_or(LedgerError::Overflow { op: "parse coin" })?;
        if !scaled.fract().is_zero() {
            return Err(invalid);
        }
        scaled
            .to_u64()
            .map(Coin)
            .ok_or(LedgerError::Overflow { op: "parse coin" })
    }

    pub fn to_decimal(self, decimal_scale: u64) -> Decimal {
        Decimal::from(self.0) / Decimal::from(decimal_scale.max(1))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative rational used for per-operation capacity costs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: u64,
    den: u64,
}

impl Ratio {
    pub fn new(num: u64, den: u64) -> LedgerResult<Self> {
        if den == 0 {
            return Err(LedgerError::InvalidAmount {
                op: "ratio",
                amount: Coin::new(num),
            });
        }
        let g = num.gcd(&den);
        Ok(Ratio {
            num: num / g,
            den: den / g,
        })
    }

    pub const fn one() -> Self {
        Ratio { num: 1, den: 1 }
    }

    pub fn numer(&self) -> u64 {
        self.num
    }

    pub fn denom(&self) -> u64 {
        self.den
    }

    /// `self * value`, truncated toward zero.
    pub fn mul_floor(&self, value: u64) -> LedgerResult<Coin> {
        // a deserialized ratio skips `new`
        if self.den == 0 {
            return Err(LedgerError::InvalidAmount { op: "ratio", amount: Coin::new(self.num) });
        }
        let product = value as u128 * self.num as u128 / self.den as u128;
        u64::try_from(product)
            .map(Coin::new)
            .map_err(|_| LedgerError::Overflow { op: "ratio" })
    }
}
