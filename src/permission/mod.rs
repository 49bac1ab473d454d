pub mod authority;
pub mod error;
pub mod events;
pub mod journal;
pub mod registry;
pub mod types;

pub use authority::{Authority, OwnerAuthority, ReadOnlyAuthority};
pub use error::PermissionError;
pub use events::{
    EventLog, PermissionEvent, PermissionEventEmitter, PermissionEventHandler, TracingAuditHandler,
};
pub use journal::{FileJournal, JournalEntry, read_journal, replay};
pub use registry::PermissionRegistry;
pub use types::{Account, AccountParseError, PermissionState};
