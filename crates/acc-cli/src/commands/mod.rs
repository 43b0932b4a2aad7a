//! Command handler modules for the `acc` binary.
//!
//! Each handler returns the process exit code on success or a [`DriverError`]
//! carrying its own code.

pub mod collect;
pub mod digest;
pub mod parity;

use std::path::Path;

use acc_driver::DriverError;
use acc_journal::{JournalError, JournalPair};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Print a JSON value to stdout, pretty.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), DriverError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DriverError::Internal(anyhow::Error::new(e).context("serialize output failed")))?;
    println!("{json}");
    Ok(())
}

/// Locate a journal pair named on the command line. Any absence is an
/// input error here, not a journal error of a resolved run.
pub fn locate_input(what: &'static str, dir: &Path) -> Result<JournalPair, DriverError> {
    JournalPair::locate(dir).map_err(|e| match e {
        JournalError::RunDirMissing(p) | JournalError::EventsMissing(p) => {
            DriverError::missing_path(what, &p)
        }
    })
}
