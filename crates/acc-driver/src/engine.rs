//! External engine invocation.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info};

use crate::error::DriverError;

/// How to start the engine: a program plus leading arguments.
///
/// Each invocation appends `--config <path> --run-id <id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// Captured streams of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub stdout: String,
    pub stderr: String,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument vector for one run.
    pub fn argv(&self, config_path: &Path, run_id: &str) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push("--config".to_string());
        argv.push(config_path.display().to_string());
        argv.push("--run-id".to_string());
        argv.push(run_id.to_string());
        argv
    }

    /// Run the engine to completion in `cwd`.
    ///
    /// Blocks until exit. A non-zero exit is [`DriverError::Engine`] carrying
    /// both captured streams; a program that cannot be found is
    /// [`DriverError::MissingInput`].
    pub fn invoke(
        &self,
        variant: &str,
        config_path: &Path,
        run_id: &str,
        cwd: &Path,
    ) -> Result<EngineOutput, DriverError> {
        let argv = self.argv(config_path, run_id);
        info!(
            "engine start variant={} run_id={} program={} cwd={}",
            variant,
            run_id,
            self.program,
            cwd.display()
        );
        debug!("engine argv={:?}", argv);

        let out = match Command::new(&self.program).args(&argv).current_dir(cwd).output() {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DriverError::missing("engine program", self.program.clone()));
            }
            Err(e) => {
                return Err(DriverError::Internal(
                    anyhow::Error::new(e)
                        .context(format!("spawn engine failed: {}", self.program)),
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();

        if !out.status.success() {
            return Err(DriverError::Engine {
                variant: variant.to_string(),
                run_id: run_id.to_string(),
                code: out.status.code(),
                stdout,
                stderr,
            });
        }

        info!("engine done variant={} run_id={}", variant, run_id);
        Ok(EngineOutput { stdout, stderr })
    }
}

/// Split a whitespace-separated command line into an [`EngineCommand`].
///
/// No shell quoting rules; use the settings file `engine.args` list when an
/// argument contains spaces.
pub(crate) fn parse_command_line(line: &str) -> anyhow::Result<EngineCommand> {
    let mut parts = line.split_whitespace();
    let program = parts
        .next()
        .context("engine command line is empty")?
        .to_string();
    Ok(EngineCommand::new(program).with_args(parts))
}
