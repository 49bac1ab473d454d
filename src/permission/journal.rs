use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::events::{PermissionEvent, PermissionEventHandler};
use super::types::PermissionState;
use crate::storage::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: PermissionEvent,
}

struct JournalWriter {
    file: File,
    next_sequence: u64,
}

/// Append-only JSON-lines record of audit events.
pub struct FileJournal {
    writer: Mutex<JournalWriter>,
}

impl FileJournal {
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let next_sequence = read_journal(&path)?.last().map_or(0, |e| e.sequence + 1);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Mutex::new(JournalWriter {
                file,
                next_sequence,
            }),
        })
    }

    pub fn append(&self, event: &PermissionEvent) -> StoreResult<()> {
        let mut writer = self.writer.lock();
        let entry = JournalEntry {
            sequence: writer.next_sequence,
            recorded_at: Utc::now(),
            event: *event,
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        writer.file.write_all(line.as_bytes())?;
        writer.file.flush()?;
        writer.next_sequence += 1;
        Ok(())
    }
}

impl PermissionEventHandler for FileJournal {
    fn handle(&self, event: &PermissionEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!(
                "Failed to journal permission event: {}. Change succeeded in-memory.",
                e
            );
        }
    }
}

pub fn read_journal(path: &Path) -> StoreResult<Vec<JournalEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

/// Rebuilds the permission set by applying events in delivery order.
pub fn replay<'a>(events: impl IntoIterator<Item = &'a PermissionEvent>) -> PermissionState {
    let mut state = PermissionState::new();
    for event in events {
        match event {
            PermissionEvent::PermissionChanged {
                account,
                new_status,
            } => {
                state.set(*account, *new_status);
            }
        }
    }
    state
}
