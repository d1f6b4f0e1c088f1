use lazykube_framework::{DescribeError, LookupError};
use std::{
    io,
    path::PathBuf,
    process::{Command, Output},
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_PROGRAM: &str = "kubectl";
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct KubectlConfig {
    pub program: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    /// how long a log read waits before reporting an idle stream
    pub read_timeout: Duration,
    pub chunk_size: usize,
}

impl KubectlConfig {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            kubeconfig: None,
            context: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// global flags followed by `args`
    pub fn args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 4);
        if let Some(kubeconfig) = &self.kubeconfig {
            full.push("--kubeconfig".to_string());
            full.push(kubeconfig.display().to_string());
        }
        if let Some(context) = &self.context {
            full.push("--context".to_string());
            full.push(context.clone());
        }
        full.extend(args.iter().map(|arg| arg.as_ref().to_string()));
        full
    }

    /// Run to completion and return stdout.
    pub(crate) fn output<S: AsRef<str>>(&self, args: &[S]) -> Result<String, CommandError> {
        let full_args = self.args(args);
        log::debug!("Running {} {}", self.program, full_args.join(" "));

        let output = Command::new(&self.program)
            .args(&full_args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        check_output(output)
    }
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A one-shot `kubectl` invocation failed.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("cannot run {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{0}")]
    Denied(String),
    #[error("{0}")]
    Failed(String),
}

impl From<CommandError> for LookupError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::Denied(stderr) => LookupError::Denied(stderr),
            other => LookupError::Transport(other.to_string()),
        }
    }
}

impl From<CommandError> for DescribeError {
    fn from(e: CommandError) -> Self {
        DescribeError::Failed(e.to_string())
    }
}

fn check_output(output: Output) -> Result<String, CommandError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        return Err(CommandError::Failed(format!("exited with {}", output.status)));
    }
    Err(classify_failure(stderr))
}

fn classify_failure(stderr: String) -> CommandError {
    let lower = stderr.to_lowercase();
    if lower.contains("forbidden") || lower.contains("unauthorized") {
        CommandError::Denied(stderr)
    } else {
        CommandError::Failed(stderr)
    }
}
