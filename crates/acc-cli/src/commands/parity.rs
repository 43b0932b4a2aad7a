//! `acc parity`: compare the canonical journals of two run directories.

use std::path::Path;

use tracing::{info, warn};

use acc_driver::{exit, DriverError};
use acc_journal::{compare_captures, JournalCapture};

pub fn parity(a: &Path, b: &Path) -> Result<u8, DriverError> {
    let pair_a = super::locate_input("run directory A", a)?;
    let pair_b = super::locate_input("run directory B", b)?;

    let report = compare_captures(&JournalCapture::read(&pair_a)?, &JournalCapture::read(&pair_b)?);
    super::print_json(&report)?;

    if report.is_match() {
        info!("parity ok a={} b={}", a.display(), b.display());
        return Ok(exit::OK);
    }

    let mismatches = [&report.events, &report.trades]
        .iter()
        .filter(|s| !s.matched)
        .count();
    warn!(
        "parity mismatch a={} b={} sections={}",
        a.display(),
        b.display(),
        mismatches
    );
    Err(DriverError::ParityMismatch { mismatches })
}
