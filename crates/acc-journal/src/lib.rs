//! acc-journal
//!
//! Journal canonicalization + content digests for engine parity checks.
//!
//! An engine run leaves two files in its run directory:
//! - `events.csv`: two metadata/header lines, then opaque event records
//! - `trades.csv`: CSV with a header row; optional, may carry a volatile
//!   `config_hash` column
//!
//! Everything here is a pure function of file bytes. No wall-clock, no
//! locale, no path-dependent output. Malformed content never errors; it
//! degrades to the best-effort canonical payload.

mod canonical;
mod capture;
mod digest;
mod markers;
mod parity;

pub use canonical::{
    canonicalize_events, canonicalize_trades, CanonicalPayload, CONFIG_HASH_COLUMN,
    EVENTS_HEADER_LINES,
};
pub use capture::{JournalCapture, JournalError, JournalPair, EVENTS_FILE, TRADES_FILE};
pub use digest::{sha256_hex_upper, EMPTY_SHA256};
pub use markers::{
    extract_markers, first_line_containing, MarkerLines, MARKER_ALERT_BLOCK_DRAWDOWN,
    MARKER_ALERT_BLOCK_EXPOSURE, MARKER_RISK_EVAL,
};
pub use parity::{compare_captures, compare_payloads, ParityDiff, ParityReport, ParitySection};
