use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ACCOUNT_LEN: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum AccountParseError {
    #[error("invalid account '{input}': expected {expected} hex characters, got {actual}")]
    InvalidLength {
        input: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid account '{input}': {source}")]
    InvalidHex {
        input: String,
        #[source]
        source: hex::FromHexError,
    },
}

/// Opaque 20-byte account address.
///
/// Only equality and ordering are meaningful. The zero address is a valid key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Account([u8; ACCOUNT_LEN]);

impl Account {
    pub const ZERO: Self = Self([0; ACCOUNT_LEN]);

    #[must_use]
    pub const fn new(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }

    /// Account whose bytes are all zero except the last, handy for fixtures.
    #[must_use]
    pub const fn from_low_u8(value: u8) -> Self {
        let mut bytes = [0; ACCOUNT_LEN];
        bytes[ACCOUNT_LEN - 1] = value;
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Account {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != ACCOUNT_LEN * 2 {
            return Err(AccountParseError::InvalidLength {
                input: s.to_string(),
                expected: ACCOUNT_LEN * 2,
                actual: digits.len(),
            });
        }

        let mut bytes = [0; ACCOUNT_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|source| {
            AccountParseError::InvalidHex {
                input: s.to_string(),
                source,
            }
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The registry's persistent state: account to harness admin status.
///
/// An absent key reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    #[serde(default)]
    permissions: BTreeMap<Account, bool>,
}

impl PermissionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, account: &Account) -> bool {
        self.permissions.get(account).copied().unwrap_or(false)
    }

    /// Writes `status` and returns whether the stored value changed.
    pub fn set(&mut self, account: Account, status: bool) -> bool {
        if self.get(&account) == status {
            return false;
        }
        self.permissions.insert(account, status);
        true
    }

    pub fn permitted(&self) -> impl Iterator<Item = &Account> {
        self.permissions
            .iter()
            .filter_map(|(account, status)| status.then_some(account))
    }

    #[must_use]
    pub fn permitted_count(&self) -> usize {
        self.permitted().count()
    }
}
