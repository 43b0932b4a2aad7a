use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Directory name -> last-modified time (UTC epoch nanoseconds) for every
/// immediate subdirectory of an output root.
///
/// Names are unique within a root, so a `BTreeMap` gives deterministic
/// iteration order for both resolution and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunDirectorySnapshot {
    entries: BTreeMap<String, i64>,
}

impl RunDirectorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Snapshot the immediate subdirectories of `root`.
    ///
    /// A root that does not exist yet is an empty snapshot (the engine may
    /// create it on its first run). Entries that vanish mid-scan are skipped.
    /// Plain files and non-UTF-8 names are ignored.
    pub fn capture(root: &Path) -> Result<Self> {
        let rd = match fs::read_dir(root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("output root {} absent; empty snapshot", root.display());
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read output root failed: {}", root.display()))
            }
        };

        let mut entries = BTreeMap::new();
        for entry in rd {
            let entry =
                entry.with_context(|| format!("scan output root failed: {}", root.display()))?;
            let path = entry.path();

            let meta = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("stat failed: {}", path.display()))
                }
            };
            if !meta.is_dir() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(raw) => {
                    warn!("skipping non-UTF-8 directory name {:?}", raw);
                    continue;
                }
            };

            let modified = meta
                .modified()
                .with_context(|| format!("mtime unavailable: {}", path.display()))?;
            entries.insert(name, epoch_nanos(DateTime::<Utc>::from(modified)));
        }

        debug!("snapshot {} -> {} dir(s)", root.display(), entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_timestamp(&self) -> Option<i64> {
        self.entries.values().copied().max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for RunDirectorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{")?;
        for (i, (name, ts)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {}", render_ts(*ts))?;
        }
        write!(f, "}}")
    }
}

fn epoch_nanos(dt: DateTime<Utc>) -> i64 {
    // Out of i64 nanosecond range only past year 2262.
    dt.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

fn render_ts(nanos: i64) -> String {
    format!("{} ({nanos})", DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339())
}
