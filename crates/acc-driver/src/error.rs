use std::fmt;
use std::path::Path;

use acc_journal::JournalError;
use acc_rundir::ResolveError;

/// Process exit codes. Engine failures propagate the engine's own code.
pub mod exit {
    pub const OK: u8 = 0;
    pub const INTERNAL: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const MISSING_INPUT: u8 = 3;
    pub const DETECTION_FAILED: u8 = 4;
    pub const MISSING_JOURNAL: u8 = 5;
    pub const PARITY_MISMATCH: u8 = 6;
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Every way an acceptance batch can fail. None of them is retried.
#[derive(Debug)]
pub enum DriverError {
    /// A required path or setting is absent.
    MissingInput { what: &'static str, detail: String },
    /// The engine exited non-zero (or was killed).
    Engine {
        variant: String,
        run_id: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// No run directory could be identified after the engine exited.
    Detection { variant: String, source: ResolveError },
    /// A run directory was resolved but its journal is incomplete.
    MissingJournal {
        variant: String,
        source: JournalError,
        /// Every directory the resolver considered, chosen one included.
        candidates: Vec<String>,
    },
    /// Digests differ from an accepted baseline or between two runs.
    ParityMismatch { mismatches: usize },
    /// Anything else (I/O, parse); not expected in a healthy setup.
    Internal(anyhow::Error),
}

impl DriverError {
    pub fn missing(what: &'static str, detail: impl Into<String>) -> Self {
        DriverError::MissingInput {
            what,
            detail: detail.into(),
        }
    }

    pub fn missing_path(what: &'static str, path: &Path) -> Self {
        Self::missing(what, path.display().to_string())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::MissingInput { .. } => exit::MISSING_INPUT,
            DriverError::Engine { code, .. } => engine_exit_code(*code),
            DriverError::Detection { .. } => exit::DETECTION_FAILED,
            DriverError::MissingJournal { .. } => exit::MISSING_JOURNAL,
            DriverError::ParityMismatch { .. } => exit::PARITY_MISMATCH,
            DriverError::Internal(_) => exit::INTERNAL,
        }
    }
}

/// Engine codes that fit a process exit status pass through; anything else
/// (signal, out-of-range) collapses to 1.
fn engine_exit_code(code: Option<i32>) -> u8 {
    match code {
        Some(c) if (1..=255).contains(&c) => c as u8,
        _ => exit::INTERNAL,
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::MissingInput { what, detail } => {
                write!(f, "MISSING_INPUT {what}: {detail}")
            }
            DriverError::Engine {
                variant,
                run_id,
                code,
                stdout,
                stderr,
            } => {
                let code = code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
                writeln!(f, "ENGINE_FAILED variant={variant} run_id={run_id} exit={code}")?;
                writeln!(f, "--- engine stdout ---")?;
                writeln!(f, "{}", stdout.trim_end())?;
                writeln!(f, "--- engine stderr ---")?;
                write!(f, "{}", stderr.trim_end())
            }
            DriverError::Detection { variant, source } => {
                write!(f, "variant={variant} {source}")
            }
            DriverError::MissingJournal {
                variant,
                source,
                candidates,
            } => {
                write!(
                    f,
                    "JOURNAL_MISSING variant={variant}: {source} candidates=[{}]",
                    candidates.join(", ")
                )
            }
            DriverError::ParityMismatch { mismatches } => {
                write!(f, "PARITY_MISMATCH {mismatches} digest(s) differ")
            }
            DriverError::Internal(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Detection { source, .. } => Some(source),
            DriverError::MissingJournal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for DriverError {
    fn from(e: anyhow::Error) -> Self {
        DriverError::Internal(e)
    }
}

/// Paths that must exist before a batch starts.
pub(crate) fn require_existing(what: &'static str, path: &Path) -> Result<(), DriverError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DriverError::missing_path(what, path))
    }
}
