//! Owner-delegated "harness admin" permission registry.
//!
//! The owner grants or revokes harness admin status per account; guarded
//! operations check the current caller against the registry. Every effective
//! change is emitted as an audit event.

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod permission;
pub mod reporting;
pub mod storage;

pub use crate::core::{AppError, Result};
pub use permission::{
    Account, Authority, OwnerAuthority, PermissionError, PermissionEvent, PermissionRegistry,
    PermissionState,
};
pub use storage::{StateStore, StorageSlot};
