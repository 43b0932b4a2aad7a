//! `acc digest`: canonical digests of one journal pair.

use std::path::Path;

use serde_json::json;

use acc_driver::{exit, DriverError};
use acc_journal::JournalCapture;

pub fn digest(events: &Path, trades: Option<&Path>) -> Result<u8, DriverError> {
    if !events.is_file() {
        return Err(DriverError::missing_path("events journal", events));
    }
    let capture = JournalCapture::read_paths(events, trades)?;

    super::print_json(&json!({
        "events_sha": capture.events_sha(),
        "trades_sha": capture.trades_sha(),
    }))?;
    Ok(exit::OK)
}
