use parking_lot::RwLock;

use super::types::Account;

/// Owner role supplied by the host. The registry consults it but never
/// implements ownership itself.
pub trait Authority: Send + Sync {
    fn is_owner(&self, caller: &Account) -> bool;

    fn current_caller(&self) -> Account;
}

/// Single fixed owner with a swappable current caller.
///
/// Hosts that run one operation at a time set the caller before invoking a
/// guarded operation.
#[derive(Debug)]
pub struct OwnerAuthority {
    owner: Account,
    caller: RwLock<Account>,
}

impl OwnerAuthority {
    /// Starts with the owner as the current caller.
    #[must_use]
    pub fn new(owner: Account) -> Self {
        Self {
            owner,
            caller: RwLock::new(owner),
        }
    }

    #[must_use]
    pub fn with_caller(self, caller: Account) -> Self {
        self.set_caller(caller);
        self
    }

    pub fn set_caller(&self, caller: Account) {
        *self.caller.write() = caller;
    }

    #[must_use]
    pub const fn owner(&self) -> Account {
        self.owner
    }
}

impl Authority for OwnerAuthority {
    fn is_owner(&self, caller: &Account) -> bool {
        *caller == self.owner
    }

    fn current_caller(&self) -> Account {
        *self.caller.read()
    }
}

/// Authority with no owner, for hosts that only read the registry.
///
/// Every `configure` call is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOnlyAuthority;

impl Authority for ReadOnlyAuthority {
    fn is_owner(&self, _caller: &Account) -> bool {
        false
    }

    fn current_caller(&self) -> Account {
        Account::ZERO
    }
}
