use thiserror::Error;

use crate::permission::{AccountParseError, PermissionError};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid account: {0}")]
    Account(#[from] AccountParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
