//! Canonical payloads for the two journal files.
//!
//! Events: drop the first [`EVENTS_HEADER_LINES`] lines (metadata + header),
//! keep the rest verbatim.
//!
//! Trades: parse as CSV, blank out the `config_hash` column (column count is
//! preserved), re-join each row with plain commas.
//!
//! Both outputs are `\n`-joined with one trailing `\n`. Events are zero bytes
//! when no text remains; trades are zero bytes only when there are no data
//! rows. A single data row that blanks to nothing is still `"\n"`.

use tracing::warn;

use crate::digest::sha256_hex_upper;

/// Lines at the top of `events.csv` that never take part in comparison.
pub const EVENTS_HEADER_LINES: usize = 2;

/// Trades column whose value differs per run and is excluded from comparison.
pub const CONFIG_HASH_COLUMN: &str = "config_hash";

/// Normalized bytes derived from one journal file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalPayload {
    bytes: Vec<u8>,
}

impl CanonicalPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Uppercase SHA-256 hex of the payload.
    pub fn digest(&self) -> String {
        sha256_hex_upper(&self.bytes)
    }

    /// Payload split back into lines (lossy UTF-8), used for first-diff reporting.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.bytes)
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    /// One `\n` per row, so `n` rows always give `n` newlines even when
    /// every row is empty after blank-out.
    fn from_rows<L: AsRef<[u8]>>(rows: Vec<L>) -> Self {
        let mut bytes = Vec::new();
        for row in &rows {
            bytes.extend_from_slice(row.as_ref());
            bytes.push(b'\n');
        }
        Self { bytes }
    }

    fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut bytes = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                bytes.push(b'\n');
            }
            bytes.extend_from_slice(line.as_ref());
        }
        if !bytes.is_empty() {
            bytes.push(b'\n');
        }
        Self { bytes }
    }
}

/// Canonicalize raw `events.csv` bytes.
///
/// Invalid UTF-8 is replaced (U+FFFD) rather than rejected so the result is
/// still a deterministic function of the input.
pub fn canonicalize_events(raw: &[u8]) -> CanonicalPayload {
    let text = String::from_utf8_lossy(raw);
    CanonicalPayload::from_lines(text.lines().skip(EVENTS_HEADER_LINES))
}

/// Canonicalize raw `trades.csv` bytes.
///
/// - first record is the header; `config_hash` is located by exact name
/// - the value at that index is blanked on every following row
/// - rows shorter than the index are left untouched
/// - blank lines are skipped by the reader; a quoted empty record (`""`) is kept
pub fn canonicalize_trades(raw: &[u8]) -> CanonicalPayload {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw);

    let mut records = rdr.byte_records();
    let header = match records.next() {
        Some(Ok(h)) => h,
        Some(Err(e)) => {
            warn!("trades header unreadable, treating as empty: {e}");
            return CanonicalPayload::empty();
        }
        None => return CanonicalPayload::empty(),
    };

    let hash_idx = header
        .iter()
        .position(|field| field == CONFIG_HASH_COLUMN.as_bytes());

    let mut rows: Vec<Vec<u8>> = Vec::new();
    for rec in records {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                // Keep whatever parsed cleanly; the digest still reflects it.
                warn!("trades row unreadable after {} row(s), stopping: {e}", rows.len());
                break;
            }
        };

        let mut line = Vec::with_capacity(rec.as_slice().len() + rec.len());
        for (i, field) in rec.iter().enumerate() {
            if i > 0 {
                line.push(b',');
            }
            if Some(i) != hash_idx {
                line.extend_from_slice(field);
            }
        }
        rows.push(line);
    }

    CanonicalPayload::from_rows(rows)
}
