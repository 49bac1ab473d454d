//! Daily balance reporting contract.
//!
//! Lives alongside the permission registry but shares nothing with it.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::permission::Account;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Longest range a single report may span.
pub const MAX_REPORT_DAYS: u64 = 36_600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("day range {from_day}..={to_day} exceeds {max} days")]
    RangeTooLarge { from_day: u64, to_day: u64, max: u64 },
}

/// Day index of a unix timestamp. Timestamps before 1970 map to day 0.
#[must_use]
pub fn day_index(timestamp: i64) -> u64 {
    u64::try_from(timestamp.div_euclid(SECONDS_PER_DAY)).unwrap_or(0)
}

pub trait DailyBalanceReport {
    /// One balance per day in `from_day..=to_day`, oldest first. Empty when
    /// `from_day > to_day`. Ranges longer than [`MAX_REPORT_DAYS`] are rejected.
    fn daily_balances(
        &self,
        account: &Account,
        from_day: u64,
        to_day: u64,
    ) -> Result<Vec<u128>, ReportError>;

    fn current_day_and_time(&self) -> (u64, i64);

    fn tracked_token(&self) -> Account;
}

/// Balance checkpoints per account. A day's balance is the last checkpoint at
/// or before it, zero before the first one.
#[derive(Debug, Clone)]
pub struct InMemoryBalances {
    token: Account,
    checkpoints: HashMap<Account, BTreeMap<u64, u128>>,
    clock: Option<DateTime<Utc>>,
}

impl InMemoryBalances {
    #[must_use]
    pub fn new(token: Account) -> Self {
        Self {
            token,
            checkpoints: HashMap::new(),
            clock: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn record(&mut self, account: Account, day: u64, balance: u128) {
        self.checkpoints
            .entry(account)
            .or_default()
            .insert(day, balance);
    }

    fn balance_at(history: &BTreeMap<u64, u128>, day: u64) -> u128 {
        history
            .range(..=day)
            .next_back()
            .map_or(0, |(_, balance)| *balance)
    }
}

impl DailyBalanceReport for InMemoryBalances {
    fn daily_balances(
        &self,
        account: &Account,
        from_day: u64,
        to_day: u64,
    ) -> Result<Vec<u128>, ReportError> {
        if from_day > to_day {
            return Ok(Vec::new());
        }

        if to_day - from_day >= MAX_REPORT_DAYS {
            return Err(ReportError::RangeTooLarge {
                from_day,
                to_day,
                max: MAX_REPORT_DAYS,
            });
        }

        let Some(history) = self.checkpoints.get(account) else {
            return Ok(vec![0; (to_day - from_day + 1) as usize]);
        };

        Ok((from_day..=to_day)
            .map(|day| Self::balance_at(history, day))
            .collect())
    }

    fn current_day_and_time(&self) -> (u64, i64) {
        let timestamp = self.clock.unwrap_or_else(Utc::now).timestamp();
        (day_index(timestamp), timestamp)
    }

    fn tracked_token(&self) -> Account {
        self.token
    }
}
