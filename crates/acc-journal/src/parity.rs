//! Side-by-side parity of two journal captures.
//!
//! Digests decide the match. On mismatch the first differing canonical line
//! (1-based) is reported so a failure can be read without re-running.

use serde::Serialize;

use crate::canonical::CanonicalPayload;
use crate::capture::JournalCapture;

const EOF_A: &str = "<EOF>A";
const EOF_B: &str = "<EOF>B";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityDiff {
    pub line: usize,
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParitySection {
    #[serde(rename = "match")]
    pub matched: bool,
    pub hash_a: String,
    pub hash_b: String,
    pub first_diff: Option<ParityDiff>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityReport {
    pub events: ParitySection,
    pub trades: ParitySection,
}

impl ParityReport {
    pub fn is_match(&self) -> bool {
        self.events.matched && self.trades.matched
    }
}

pub fn compare_payloads(a: &CanonicalPayload, b: &CanonicalPayload) -> ParitySection {
    let hash_a = a.digest();
    let hash_b = b.digest();
    let matched = hash_a == hash_b;

    let first_diff = if matched {
        None
    } else {
        first_differing_line(&a.lines(), &b.lines())
    };

    ParitySection {
        matched,
        hash_a,
        hash_b,
        first_diff,
    }
}

pub fn compare_captures(a: &JournalCapture, b: &JournalCapture) -> ParityReport {
    ParityReport {
        events: compare_payloads(&a.events, &b.events),
        trades: compare_payloads(&a.trades, &b.trades),
    }
}

fn first_differing_line(a: &[String], b: &[String]) -> Option<ParityDiff> {
    let max = a.len().max(b.len());
    for i in 0..max {
        let la = a.get(i).map(String::as_str).unwrap_or(EOF_A);
        let lb = b.get(i).map(String::as_str).unwrap_or(EOF_B);
        if la != lb {
            return Some(ParityDiff {
                line: i + 1,
                a: la.to_string(),
                b: lb.to_string(),
            });
        }
    }
    None
}
