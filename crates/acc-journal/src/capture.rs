//! Locating and reading the journal files of one resolved run directory.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::canonical::{canonicalize_events, canonicalize_trades, CanonicalPayload};
use crate::markers::{extract_markers, MarkerLines};

pub const EVENTS_FILE: &str = "events.csv";
pub const TRADES_FILE: &str = "trades.csv";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while locating journal files inside a run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// The run directory itself is gone.
    RunDirMissing(PathBuf),
    /// `events.csv` is absent from an existing run directory.
    EventsMissing(PathBuf),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::RunDirMissing(p) => {
                write!(f, "run directory does not exist: {}", p.display())
            }
            JournalError::EventsMissing(p) => {
                write!(f, "events journal missing: {}", p.display())
            }
        }
    }
}

impl std::error::Error for JournalError {}

// ---------------------------------------------------------------------------
// Journal pair
// ---------------------------------------------------------------------------

/// The journal files of one run.
///
/// `events.csv` is mandatory. `trades.csv` may legitimately be absent (a run
/// with no fills); that case canonicalizes to an empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalPair {
    pub run_dir: PathBuf,
    pub events: PathBuf,
    pub trades: PathBuf,
}

impl JournalPair {
    pub fn locate(run_dir: &Path) -> Result<Self, JournalError> {
        if !run_dir.is_dir() {
            return Err(JournalError::RunDirMissing(run_dir.to_path_buf()));
        }
        let events = run_dir.join(EVENTS_FILE);
        if !events.is_file() {
            return Err(JournalError::EventsMissing(events));
        }
        Ok(Self {
            run_dir: run_dir.to_path_buf(),
            events,
            trades: run_dir.join(TRADES_FILE),
        })
    }

    pub fn has_trades(&self) -> bool {
        self.trades.is_file()
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Canonical view of one journal pair plus its marker lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalCapture {
    pub events: CanonicalPayload,
    pub trades: CanonicalPayload,
    pub markers: MarkerLines,
}

impl JournalCapture {
    /// Read and canonicalize both files of `pair`.
    pub fn read(pair: &JournalPair) -> Result<Self> {
        Self::read_paths(&pair.events, Some(&pair.trades))
    }

    /// Read an events file and an optional trades file from arbitrary paths.
    ///
    /// A trades path that does not exist yields an empty trades payload.
    pub fn read_paths(events: &Path, trades: Option<&Path>) -> Result<Self> {
        let raw_events =
            fs::read(events).with_context(|| format!("read events failed: {}", events.display()))?;

        let trades = match trades {
            Some(p) => read_optional(p)?
                .map(|raw| canonicalize_trades(&raw))
                .unwrap_or_default(),
            None => CanonicalPayload::empty(),
        };

        Ok(Self {
            events: canonicalize_events(&raw_events),
            trades,
            markers: extract_markers(&raw_events),
        })
    }

    pub fn events_sha(&self) -> String {
        self.events.digest()
    }

    pub fn trades_sha(&self) -> String {
        self.trades.digest()
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read trades failed: {}", path.display())),
    }
}
