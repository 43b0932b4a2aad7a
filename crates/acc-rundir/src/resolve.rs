use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::snapshot::RunDirectorySnapshot;

/// Which rule produced the resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolutionRule {
    /// At least one name appeared that was absent before.
    NewDirectory,
    /// Output root had no directories before the run.
    FirstRun,
    /// No new names; an existing directory became newer than everything before.
    UpdatedDirectory,
}

impl ResolutionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionRule::NewDirectory => "NEW_DIRECTORY",
            ResolutionRule::FirstRun => "FIRST_RUN",
            ResolutionRule::UpdatedDirectory => "UPDATED_DIRECTORY",
        }
    }
}

/// The directory chosen for one invocation, plus every candidate considered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunDirectoryResolution {
    pub output_root: PathBuf,
    pub chosen: String,
    pub chosen_timestamp: i64,
    /// Sorted by name; always contains `chosen`.
    pub candidates: Vec<String>,
    pub rule: ResolutionRule,
}

impl RunDirectoryResolution {
    pub fn run_dir(&self) -> PathBuf {
        self.output_root.join(&self.chosen)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing new or newer appeared under the output root.
    NoCandidate {
        output_root: PathBuf,
        before: RunDirectorySnapshot,
        after: RunDirectorySnapshot,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoCandidate {
                output_root,
                before,
                after,
            } => write!(
                f,
                "RUN_DIR_NOT_DETECTED root={} before={} after={}",
                output_root.display(),
                before,
                after
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Infer which directory under `output_root` the just-finished run wrote.
///
/// # Errors
/// [`ResolveError::NoCandidate`] when no rule yields a candidate.
pub fn resolve(
    output_root: &Path,
    before: &RunDirectorySnapshot,
    after: &RunDirectorySnapshot,
) -> Result<RunDirectoryResolution, ResolveError> {
    let new_names: Vec<(&str, i64)> = after
        .iter()
        .filter(|(name, _)| !before.contains(name))
        .collect();

    let (candidates, rule) = if !new_names.is_empty() {
        (new_names, ResolutionRule::NewDirectory)
    } else if before.is_empty() {
        (after.iter().collect(), ResolutionRule::FirstRun)
    } else {
        // before is non-empty here, so max_timestamp is Some.
        let max_before = before.max_timestamp().unwrap_or(i64::MIN);
        let newer = after.iter().filter(|(_, ts)| *ts > max_before).collect();
        (newer, ResolutionRule::UpdatedDirectory)
    };

    let Some((chosen, chosen_timestamp)) = newest(&candidates) else {
        return Err(ResolveError::NoCandidate {
            output_root: output_root.to_path_buf(),
            before: before.clone(),
            after: after.clone(),
        });
    };

    let resolution = RunDirectoryResolution {
        output_root: output_root.to_path_buf(),
        chosen: chosen.to_string(),
        chosen_timestamp,
        candidates: candidates.iter().map(|(n, _)| n.to_string()).collect(),
        rule,
    };

    if resolution.is_ambiguous() {
        warn!(
            "RUN_DIR_AMBIGUOUS root={} rule={} chosen={} candidates={:?}",
            output_root.display(),
            rule.as_str(),
            resolution.chosen,
            resolution.candidates
        );
    }

    Ok(resolution)
}

/// Greatest timestamp wins; equal timestamps fall to the greatest name.
fn newest<'a>(candidates: &[(&'a str, i64)]) -> Option<(&'a str, i64)> {
    candidates
        .iter()
        .copied()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
}
