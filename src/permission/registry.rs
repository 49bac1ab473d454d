use parking_lot::RwLock;
use std::sync::Arc;

use super::authority::Authority;
use super::error::PermissionError;
use super::events::{PermissionEventEmitter, PermissionEventHandler};
use super::types::{Account, PermissionState};

/// Registry of harness admins: accounts the owner has delegated access to
/// guarded operations, without handing over ownership.
pub struct PermissionRegistry {
    state: RwLock<PermissionState>,
    authority: Arc<dyn Authority>,
    emitter: PermissionEventEmitter,
}

impl PermissionRegistry {
    #[must_use]
    pub fn new(authority: Arc<dyn Authority>) -> Self {
        Self::from_state(authority, PermissionState::new())
    }

    /// Restores a previously persisted state. No events are emitted.
    #[must_use]
    pub fn from_state(authority: Arc<dyn Authority>, state: PermissionState) -> Self {
        Self {
            state: RwLock::new(state),
            authority,
            emitter: PermissionEventEmitter::new(),
        }
    }

    pub fn subscribe(&mut self, handler: Arc<dyn PermissionEventHandler>) {
        self.emitter.add_handler(handler);
    }

    /// Sets `account`'s harness admin status. Owner only.
    ///
    /// Returns `Ok(false)` without emitting when the status is already
    /// `new_status`.
    pub fn configure(&self, account: Account, new_status: bool) -> Result<bool, PermissionError> {
        let caller = self.authority.current_caller();
        if !self.authority.is_owner(&caller) {
            tracing::warn!(%caller, %account, new_status, "Rejected configure from non-owner");
            return Err(PermissionError::Unauthorized(caller));
        }

        // Event is emitted under the write lock so delivery order matches write order.
        let mut state = self.state.write();
        if !state.set(account, new_status) {
            tracing::debug!(%account, new_status, "Permission unchanged");
            return Ok(false);
        }
        self.emitter.emit_changed(account, new_status);
        Ok(true)
    }

    #[must_use]
    pub fn is_permitted(&self, account: &Account) -> bool {
        self.state.read().get(account)
    }

    pub fn require_permitted(&self, account: &Account) -> Result<(), PermissionError> {
        if self.is_permitted(account) {
            Ok(())
        } else {
            Err(PermissionError::Unauthorized(*account))
        }
    }

    /// Guard against the effective caller rather than a supplied account.
    pub fn require_caller_permitted(&self) -> Result<(), PermissionError> {
        let caller = self.authority.current_caller();
        self.require_permitted(&caller).inspect_err(|_| {
            tracing::warn!(%caller, "Caller is not a harness admin");
        })
    }

    /// Runs `op` only if the current caller is a harness admin.
    pub fn guarded<T>(&self, op: impl FnOnce() -> T) -> Result<T, PermissionError> {
        self.require_caller_permitted()?;
        Ok(op())
    }

    #[must_use]
    pub fn permitted_accounts(&self) -> Vec<Account> {
        self.state.read().permitted().copied().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> PermissionState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::authority::OwnerAuthority;
    use crate::permission::events::{EventLog, PermissionEvent};

    const OWNER: Account = Account::from_low_u8(0x01);
    const ADMIN: Account = Account::from_low_u8(0xa1);
    const STRANGER: Account = Account::from_low_u8(0xee);

    fn create_test_registry() -> (PermissionRegistry, Arc<OwnerAuthority>, Arc<EventLog>) {
        let authority = Arc::new(OwnerAuthority::new(OWNER));
        let log = Arc::new(EventLog::new());
        let mut registry = PermissionRegistry::new(Arc::clone(&authority) as Arc<dyn Authority>);
        registry.subscribe(Arc::clone(&log) as Arc<dyn PermissionEventHandler>);
        (registry, authority, log)
    }

    #[test]
    fn test_default_deny() {
        let (registry, _authority, _log) = create_test_registry();
        assert!(!registry.is_permitted(&ADMIN));
        assert!(!registry.is_permitted(&OWNER));
        assert!(!registry.is_permitted(&Account::ZERO));
    }

    #[test]
    fn test_configure_grants_and_emits() {
        let (registry, _authority, log) = create_test_registry();

        assert!(registry.configure(ADMIN, true).unwrap());
        assert!(registry.is_permitted(&ADMIN));
        assert_eq!(log.events(), vec![PermissionEvent::changed(ADMIN, true)]);
    }

    #[test]
    fn test_configure_is_idempotent() {
        let (registry, _authority, log) = create_test_registry();

        assert!(registry.configure(ADMIN, true).unwrap());
        assert!(!registry.configure(ADMIN, true).unwrap());
        assert!(registry.is_permitted(&ADMIN));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_revoking_unknown_account_is_noop() {
        let (registry, _authority, log) = create_test_registry();

        assert!(!registry.configure(ADMIN, false).unwrap());
        assert!(log.is_empty());
    }

    #[test]
    fn test_configure_rejects_non_owner() {
        let (registry, authority, log) = create_test_registry();
        authority.set_caller(STRANGER);

        let err = registry.configure(ADMIN, true).unwrap_err();
        assert_eq!(err, PermissionError::Unauthorized(STRANGER));
        assert!(!registry.is_permitted(&ADMIN));
        assert!(log.is_empty());
    }

    #[test]
    fn test_harness_admin_cannot_configure() {
        let (registry, authority, _log) = create_test_registry();
        registry.configure(ADMIN, true).unwrap();

        authority.set_caller(ADMIN);
        let err = registry.configure(STRANGER, true).unwrap_err();
        assert_eq!(err, PermissionError::Unauthorized(ADMIN));
        assert!(!registry.is_permitted(&STRANGER));
    }

    #[test]
    fn test_zero_account_is_a_valid_key() {
        let (registry, _authority, log) = create_test_registry();

        assert!(registry.configure(Account::ZERO, true).unwrap());
        assert!(registry.is_permitted(&Account::ZERO));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_round_trip_emits_two_events_in_order() {
        let (registry, _authority, log) = create_test_registry();

        registry.configure(ADMIN, true).unwrap();
        registry.configure(ADMIN, false).unwrap();

        assert!(!registry.is_permitted(&ADMIN));
        assert_eq!(
            log.events(),
            vec![
                PermissionEvent::changed(ADMIN, true),
                PermissionEvent::changed(ADMIN, false),
            ]
        );
    }

    #[test]
    fn test_require_permitted() {
        let (registry, _authority, _log) = create_test_registry();

        assert_eq!(
            registry.require_permitted(&ADMIN),
            Err(PermissionError::Unauthorized(ADMIN))
        );

        registry.configure(ADMIN, true).unwrap();
        assert_eq!(registry.require_permitted(&ADMIN), Ok(()));
    }

    #[test]
    fn test_require_caller_permitted_uses_current_caller() {
        let (registry, authority, _log) = create_test_registry();
        registry.configure(ADMIN, true).unwrap();

        authority.set_caller(ADMIN);
        assert!(registry.require_caller_permitted().is_ok());

        authority.set_caller(STRANGER);
        assert_eq!(
            registry.require_caller_permitted(),
            Err(PermissionError::Unauthorized(STRANGER))
        );
    }

    #[test]
    fn test_owner_is_not_implicitly_permitted() {
        let (registry, _authority, _log) = create_test_registry();
        assert_eq!(
            registry.require_caller_permitted(),
            Err(PermissionError::Unauthorized(OWNER))
        );
    }

    #[test]
    fn test_guarded_skips_op_when_denied() {
        let (registry, authority, _log) = create_test_registry();
        authority.set_caller(STRANGER);

        let mut ran = false;
        let result = registry.guarded(|| ran = true);

        assert!(result.is_err());
        assert!(!ran);
    }

    #[test]
    fn test_guarded_runs_op_for_admin() {
        let (registry, authority, _log) = create_test_registry();
        registry.configure(ADMIN, true).unwrap();
        authority.set_caller(ADMIN);

        assert_eq!(registry.guarded(|| 42), Ok(42));
    }

    #[test]
    fn test_permitted_accounts_sorted() {
        let (registry, _authority, _log) = create_test_registry();
        registry.configure(STRANGER, true).unwrap();
        registry.configure(ADMIN, true).unwrap();
        registry.configure(Account::ZERO, true).unwrap();
        registry.configure(Account::ZERO, false).unwrap();

        assert_eq!(registry.permitted_accounts(), vec![ADMIN, STRANGER]);
    }

    #[test]
    fn test_from_state_restores_without_events() {
        let (registry, _authority, _log) = create_test_registry();
        registry.configure(ADMIN, true).unwrap();
        let snapshot = registry.snapshot();

        let log = Arc::new(EventLog::new());
        let mut restored = PermissionRegistry::from_state(
            Arc::new(OwnerAuthority::new(OWNER)),
            snapshot,
        );
        restored.subscribe(Arc::clone(&log) as Arc<dyn PermissionEventHandler>);

        assert!(restored.is_permitted(&ADMIN));
        assert!(log.is_empty());
    }
}
