use std::collections::{BTreeSet, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::LedgerError;

/// Per-user verified status.
///
/// Unknown users read as `false`. Entries are only ever set, never cleared.
pub trait VerificationLedger {
    fn is_verified(&self, user: &Address) -> bool;

    /// Record `user` as verified. Marking an already verified user is a no-op.
    /// On error the ledger is left unchanged.
    fn mark_verified(&mut self, user: Address) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    verified: HashSet<Address>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.verified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }
}

impl VerificationLedger for InMemoryLedger {
    fn is_verified(&self, user: &Address) -> bool {
        self.verified.contains(user)
    }

    fn mark_verified(&mut self, user: Address) -> Result<(), LedgerError> {
        self.verified.insert(user);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    verified: BTreeSet<Address>,
}

/// A ledger persisted as a JSON file.
///
/// Writers serialize on an exclusive lock over a `<path>.lock` sidecar and
/// merge with what is on disk before rewriting, so handles opened by
/// different processes never drop each other's entries. Reads answer from the
/// state seen at `open` or at this handle's last write.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    state: LedgerFile,
}

impl JsonFileLedger {
    /// Open the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let state = read_state(&path)?;
        debug!(path = %path.display(), entries = state.verified.len(), "opened ledger");
        Ok(Self { path, state })
    }

    /// Write the current state to disk, creating the file if needed.
    pub fn flush(&mut self) -> Result<(), LedgerError> {
        self.commit(None)
    }

    fn commit(&mut self, user: Option<Address>) -> Result<(), LedgerError> {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);
        let lock_err = |source: io::Error| LedgerError::Io {
            path: lock_path.clone(),
            source,
        };

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_err)?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().map_err(lock_err)?;

        let mut merged = read_state(&self.path)?;
        merged.verified.extend(self.state.verified.iter().copied());
        merged.verified.extend(user);
        write_state(&self.path, &merged)?;

        debug!(path = %self.path.display(), entries = merged.verified.len(), "wrote ledger");
        self.state = merged;
        Ok(())
    }
}

fn read_state(path: &Path) -> Result<LedgerFile, LedgerError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| LedgerError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LedgerFile::default()),
        Err(source) => Err(LedgerError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace `path` atomically with `state`.
fn write_state(path: &Path, state: &LedgerFile) -> Result<(), LedgerError> {
    let io_err = |source: io::Error| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = serde_json::to_vec_pretty(state).map_err(LedgerError::Encode)?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&bytes).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

impl VerificationLedger for JsonFileLedger {
    fn is_verified(&self, user: &Address) -> bool {
        self.state.verified.contains(user)
    }

    fn mark_verified(&mut self, user: Address) -> Result<(), LedgerError> {
        if self.state.verified.contains(&user) {
            return Ok(());
        }
        self.commit(Some(user))
    }
}
