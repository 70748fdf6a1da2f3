//! hg command execution abstraction

use async_trait::async_trait;
use hgapi_core::{ClientConfig, HgError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Output from an hg command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl HgOutput {
    /// A successful run with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// A failed run with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout without trailing newlines
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim_end_matches(['\n', '\r'])
    }

    /// Turn this output into a [`HgError::CommandFailed`]
    pub fn into_error(self, subcommand: &str, args: &[String]) -> HgError {
        HgError::CommandFailed {
            subcommand: subcommand.to_string(),
            args: args.to_vec(),
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr.trim_end().to_string(),
        }
    }

    /// Pass successful output through, fail on a non-zero exit
    pub fn check(self, subcommand: &str, args: &[String]) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(self.into_error(subcommand, args))
        }
    }
}

/// Decodes both streams as UTF-8, which `HGENCODING` requests from hg
impl From<Output> for HgOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        }
    }
}

/// Trait for executing hg commands (allows mocking in tests)
#[async_trait]
pub trait HgExecutor: Send + Sync {
    /// Execute `hg <args>` with `cwd` as working directory
    ///
    /// `args[0]` is the subcommand. A non-zero exit is not an error here.
    async fn exec(&self, cwd: &Path, args: &[String]) -> Result<HgOutput>;
}

#[async_trait]
impl<E: HgExecutor + ?Sized> HgExecutor for Arc<E> {
    async fn exec(&self, cwd: &Path, args: &[String]) -> Result<HgOutput> {
        (**self).exec(cwd, args).await
    }
}

/// Run `hg <subcommand> <args>` and return its raw output, whatever the exit code
pub async fn invoke<E: HgExecutor + ?Sized>(
    executor: &E,
    cwd: &Path,
    subcommand: &str,
    args: &[String],
) -> Result<HgOutput> {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(subcommand.to_string());
    argv.extend_from_slice(args);
    executor.exec(cwd, &argv).await
}

/// Run `hg <subcommand> <args>`, failing with [`HgError::CommandFailed`] on a non-zero exit
pub async fn run<E: HgExecutor + ?Sized>(
    executor: &E,
    cwd: &Path,
    subcommand: &str,
    args: &[String],
) -> Result<HgOutput> {
    invoke(executor, cwd, subcommand, args)
        .await?
        .check(subcommand, args)
}

/// Real hg command executor
#[derive(Debug, Clone, Default)]
pub struct HgCommand {
    config: ClientConfig,
}

impl HgCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl HgExecutor for HgCommand {
    #[instrument(skip(self, args), fields(cwd = %cwd.display()))]
    async fn exec(&self, cwd: &Path, args: &[String]) -> Result<HgOutput> {
        debug!("Executing {} {:?}", self.config.hg_binary, args);

        let output = Command::new(&self.config.hg_binary)
            .args(args)
            .current_dir(cwd)
            .envs(self.config.process_env())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| HgError::Spawn {
                program: self.config.hg_binary.clone(),
                source,
            })?;

        let hg_output = HgOutput::from(output);

        if !hg_output.success() {
            debug!(
                "hg exited with {:?}: {}",
                hg_output.exit_code,
                hg_output.stderr.trim_end()
            );
        }

        Ok(hg_output)
    }
}

/// Mock hg executor for testing
///
/// Responses are keyed by the space-joined argument list. Every call is
/// recorded, whether or not a response exists, so tests can assert that
/// nothing was spawned.
#[derive(Clone, Default)]
pub struct MockHgExecutor {
    responses: HashMap<String, HgOutput>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockHgExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, output: HgOutput) -> Self {
        self.responses.insert(command.to_string(), output);
        self
    }

    /// Commands executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HgExecutor for MockHgExecutor {
    async fn exec(&self, _cwd: &Path, args: &[String]) -> Result<HgOutput> {
        let key = args.join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key.clone());
        }
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| HgError::Other(format!("No mock response for: {}", key)))
    }
}
