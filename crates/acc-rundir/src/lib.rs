//! acc-rundir
//!
//! Run-directory discovery for an engine that does not report where it wrote
//! its journal. The output root is snapshotted (name -> mtime) immediately
//! before and after an invocation and the two snapshots are diffed.
//!
//! Resolution rules (first that yields candidates wins):
//! 1. names new in `after` -> newest of those
//! 2. `before` empty -> newest in `after`
//! 3. otherwise -> newest entry of `after` strictly newer than every entry of `before`
//!
//! Ties on timestamp are broken by name (greatest name wins). No candidate is a
//! hard failure; the caller must never fall back to a guess.
//!
//! [`resolve`] is pure. Only [`RunDirectorySnapshot::capture`] touches the
//! filesystem.

mod resolve;
mod snapshot;

pub use resolve::{resolve, ResolutionRule, ResolveError, RunDirectoryResolution};
pub use snapshot::RunDirectorySnapshot;
