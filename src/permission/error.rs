use thiserror::Error;

use super::types::Account;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Unauthorized: {0}")]
    Unauthorized(Account),
}

impl PermissionError {
    #[must_use]
    pub const fn account(&self) -> Account {
        match self {
            Self::Unauthorized(account) => *account,
        }
    }
}
