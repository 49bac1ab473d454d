use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AppError, Result};
use crate::permission::{
    Account, Authority, FileJournal, OwnerAuthority, PermissionEvent, PermissionRegistry,
    PermissionState, ReadOnlyAuthority, TracingAuditHandler,
};
use crate::storage::{StateStore, StorageSlot};

use super::Cli;

/// Effective settings after layering CLI flags over the loaded config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub owner: Option<Account>,
    pub state_path: PathBuf,
    pub journal_path: PathBuf,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Result<Self> {
        let owner = match &cli.owner {
            Some(text) => Some(text.parse::<Account>()?),
            None => config.owner,
        };

        let state_path = cli
            .state
            .clone()
            .or_else(|| config.state_path())
            .ok_or_else(|| AppError::Config("Could not determine state path".to_string()))?;

        let journal_path = cli
            .journal
            .clone()
            .or_else(|| config.journal_path())
            .ok_or_else(|| AppError::Config("Could not determine journal path".to_string()))?;

        Ok(Self {
            owner,
            state_path,
            journal_path,
        })
    }

    pub fn require_owner(&self) -> Result<Account> {
        self.owner.ok_or_else(|| {
            AppError::Config(
                "No owner configured. Set `owner` in config.toml, HARNESS_ADMIN_OWNER, or --owner"
                    .to_string(),
            )
        })
    }
}

fn load_state(store: &StateStore, slot: &StorageSlot) -> Result<PermissionState> {
    let state: PermissionState = store.load_section(slot)?.unwrap_or_default();
    tracing::debug!(
        path = %store.path().display(),
        admins = state.permitted_count(),
        "Loaded permission state"
    );
    Ok(state)
}

/// Loads the registry for queries only. Needs no owner and touches no files
/// beyond reading the state document.
pub fn load_read_only(settings: &Settings) -> Result<PermissionRegistry> {
    let store = StateStore::new(settings.state_path.clone());
    let state = load_state(&store, &StorageSlot::permissions())?;
    Ok(PermissionRegistry::from_state(
        Arc::new(ReadOnlyAuthority),
        state,
    ))
}

/// Registry loaded from the host state document for mutation. Each effective
/// change is saved to the registry's section first and journaled second.
pub struct AdminSession {
    registry: PermissionRegistry,
    authority: Arc<OwnerAuthority>,
    journal: FileJournal,
    store: StateStore,
    slot: StorageSlot,
}

impl AdminSession {
    pub fn open(settings: &Settings) -> Result<Self> {
        let owner = settings.require_owner()?;
        let store = StateStore::new(settings.state_path.clone());
        let slot = StorageSlot::permissions();
        let state = load_state(&store, &slot)?;

        let authority = Arc::new(OwnerAuthority::new(owner));
        let mut registry =
            PermissionRegistry::from_state(Arc::clone(&authority) as Arc<dyn Authority>, state);
        registry.subscribe(Arc::new(TracingAuditHandler));

        Ok(Self {
            registry,
            authority,
            journal: FileJournal::open(settings.journal_path.clone())?,
            store,
            slot,
        })
    }

    #[must_use]
    pub const fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// Runs `configure` as `caller` (the owner when `None`), then saves the
    /// new state and journals the change.
    ///
    /// A failed save leaves the journal untouched. A failed journal write
    /// restores the previously saved section and fails the call.
    pub fn configure(
        &self,
        account: Account,
        status: bool,
        caller: Option<Account>,
    ) -> Result<bool> {
        self.authority
            .set_caller(caller.unwrap_or_else(|| self.authority.owner()));

        let previous = self.registry.snapshot();
        let changed = self.registry.configure(account, status)?;
        if !changed {
            return Ok(false);
        }

        self.store
            .save_section(&self.slot, &self.registry.snapshot())?;

        if let Err(e) = self.journal.append(&PermissionEvent::changed(account, status)) {
            if let Err(restore) = self.store.save_section(&self.slot, &previous) {
                tracing::warn!("Failed to restore state after journal error: {}", restore);
            }
            return Err(e.into());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{PermissionError, read_journal, replay};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const OWNER: Account = Account::from_low_u8(0x01);
    const ADMIN: Account = Account::from_low_u8(0xa1);

    fn settings(temp_dir: &TempDir) -> Settings {
        Settings {
            owner: Some(OWNER),
            state_path: temp_dir.path().join("state.json"),
            journal_path: temp_dir.path().join("audit.jsonl"),
        }
    }

    #[test]
    fn test_resolve_prefers_cli_flags() {
        let cli = Cli::parse_from([
            "harness-admin",
            "--owner",
            "0x00000000000000000000000000000000000000a1",
            "--state",
            "/tmp/s.json",
            "--journal",
            "/tmp/j.jsonl",
            "list",
        ]);
        let config = AppConfig {
            owner: Some(OWNER),
            ..Default::default()
        };

        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.owner, Some(ADMIN));
        assert_eq!(settings.state_path, PathBuf::from("/tmp/s.json"));
        assert_eq!(settings.journal_path, PathBuf::from("/tmp/j.jsonl"));
    }

    #[test]
    fn test_resolve_rejects_bad_owner() {
        let cli = Cli::parse_from(["harness-admin", "--owner", "0x12", "list"]);
        let err = Settings::resolve(&cli, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Account(_)));
    }

    #[test]
    fn test_open_requires_owner() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            owner: None,
            ..settings(&temp_dir)
        };

        assert!(matches!(
            AdminSession::open(&settings),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_configure_persists_across_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);

        {
            let session = AdminSession::open(&settings).unwrap();
            assert!(session.configure(ADMIN, true, None).unwrap());
        }

        let session = AdminSession::open(&settings).unwrap();
        assert!(session.registry().is_permitted(&ADMIN));
        assert!(!session.configure(ADMIN, true, None).unwrap());

        let journal = read_journal(&settings.journal_path).unwrap();
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_configure_as_non_owner_fails() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);
        let session = AdminSession::open(&settings).unwrap();

        let err = session.configure(ADMIN, true, Some(ADMIN)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Permission(PermissionError::Unauthorized(a)) if a == ADMIN
        ));
        assert!(!settings.state_path.exists());
    }

    #[test]
    fn test_failed_save_leaves_journal_empty() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);
        fs::create_dir(temp_dir.path().join("state.json.tmp")).unwrap();

        let session = AdminSession::open(&settings).unwrap();
        let err = session.configure(ADMIN, true, None).unwrap_err();
        assert!(matches!(err, AppError::Store(_)));

        let persisted = load_read_only(&settings).unwrap();
        assert!(!persisted.is_permitted(&ADMIN));

        let journal = read_journal(&settings.journal_path).unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_journal_matches_saved_state() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);
        let other = Account::from_low_u8(0xb2);

        let session = AdminSession::open(&settings).unwrap();
        session.configure(ADMIN, true, None).unwrap();
        session.configure(other, true, None).unwrap();
        session.configure(ADMIN, false, None).unwrap();

        let events: Vec<_> = read_journal(&settings.journal_path)
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        let persisted = load_read_only(&settings).unwrap();
        assert_eq!(replay(&events), persisted.snapshot());
    }

    #[test]
    fn test_load_read_only_needs_no_owner_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            owner: None,
            ..settings(&temp_dir)
        };

        let registry = load_read_only(&settings).unwrap();
        assert!(!registry.is_permitted(&ADMIN));
        assert_eq!(
            registry.configure(ADMIN, true),
            Err(PermissionError::Unauthorized(Account::ZERO))
        );
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
