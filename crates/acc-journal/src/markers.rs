//! Marker-line extraction for human inspection of a run.
//!
//! A marker line is the first raw events line containing a token. The scan
//! covers the whole file, header lines included.

use serde::{Deserialize, Serialize};

/// Emitted once per risk evaluation when evaluations are enabled.
pub const MARKER_RISK_EVAL: &str = "INFO_RISK_EVAL_V1";
/// Emitted when an order is blocked on the net-exposure cap.
pub const MARKER_ALERT_BLOCK_EXPOSURE: &str = "ALERT_BLOCK_NET_EXPOSURE";
/// Emitted when an order is blocked on the drawdown cap.
pub const MARKER_ALERT_BLOCK_DRAWDOWN: &str = "ALERT_BLOCK_DRAWDOWN";

/// First line per marker token; empty string when the token never appears.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerLines {
    pub eval_line: String,
    pub alert_block_exposure: String,
    pub alert_block_drawdown: String,
}

pub fn first_line_containing<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    text.lines().find(|l| l.contains(token))
}

pub fn extract_markers(raw_events: &[u8]) -> MarkerLines {
    let text = String::from_utf8_lossy(raw_events);
    let pick = |token: &str| {
        first_line_containing(&text, token)
            .unwrap_or_default()
            .to_string()
    };

    MarkerLines {
        eval_line: pick(MARKER_RISK_EVAL),
        alert_block_exposure: pick(MARKER_ALERT_BLOCK_EXPOSURE),
        alert_block_drawdown: pick(MARKER_ALERT_BLOCK_DRAWDOWN),
    }
}
