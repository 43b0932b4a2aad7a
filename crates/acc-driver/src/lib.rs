//! acc-driver
//!
//! Runs the acceptance matrix against the external engine, one variant at a
//! time:
//!
//! 1. derive the variant document from the baseline and write its scratch file
//! 2. snapshot the output root
//! 3. invoke the engine (blocking) with `--config <scratch> --run-id <id>`
//! 4. wait the fixed settle delay, snapshot again, resolve the run directory
//! 5. canonicalize + digest the journal, extract marker lines
//!
//! Strictly sequential: the snapshot diff assumes nothing else creates
//! directories under the output root during the before/after window. The
//! first failure aborts the batch.

mod driver;
mod engine;
mod error;
mod report;

pub use driver::{DriverConfig, VariantDriver};
pub use engine::{EngineCommand, EngineOutput};
pub use error::{exit, DriverError};
pub use report::{
    compare_with_baseline, display_relative, load_baseline_report, AcceptanceReport,
    BaselineMismatch, VariantResult,
};
