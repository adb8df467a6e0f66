use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or persisting the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Ledger {path} does not hold a spend count: {content:?}")]
    Corrupt { path: PathBuf, content: String },

    #[error("Failed to persist ledger {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persistent counter of consumed quota units
///
/// The file holds the decimal spend count and is rewritten in full on every
/// debit. The in-memory count only advances once the new value is on disk, so
/// the file never under-reports what was spent.
#[derive(Debug)]
pub struct QuotaLedger {
    path: PathBuf,
    ceiling: u64,
    used: u64,
}

impl QuotaLedger {
    /// Opens the ledger at `path`, resuming from its persisted count
    ///
    /// A missing file is a fresh ledger with zero spend.
    pub fn open(path: &Path, ceiling: u64) -> Result<Self, LedgerError> {
        let used = match fs::read_to_string(path) {
            Ok(content) => {
                let trimmed = content.trim();
                trimmed.parse::<u64>().map_err(|_| LedgerError::Corrupt {
                    path: path.to_path_buf(),
                    content: trimmed.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(source) => {
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            ceiling,
            used,
        })
    }

    /// Records `units` of spend, persists it, and returns the new total
    pub fn spend(&mut self, units: u64) -> Result<u64, LedgerError> {
        let total = self.used.saturating_add(units);
        self.persist(total)?;
        self.used = total;
        Ok(total)
    }

    /// Units spent so far, including earlier runs
    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Units left before the ceiling
    pub fn remaining(&self) -> u64 {
        self.ceiling.saturating_sub(self.used)
    }

    /// True once no more than `margin` units remain
    pub fn near_exhaustion(&self, margin: u64) -> bool {
        self.remaining() <= margin
    }

    /// True when not a single call can be afforded
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `total` to a sibling temp file, syncs it and renames it over the ledger
    fn persist(&self, total: u64) -> Result<(), LedgerError> {
        let tmp_path = self.path.with_extension("tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(total.to_string().as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };

        write().map_err(|source| LedgerError::Persist {
            path: self.path.clone(),
            source,
        })
    }
}
