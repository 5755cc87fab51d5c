use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::config::Config;
use crate::error::{SvnError, SvnResult};
use crate::svn::resolver::RepositoryLocation;

const NON_INTERACTIVE: &str = "--non-interactive";

/// Result of one svn invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub elapsed: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Per-call execution settings
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub use_credentials: bool,
    pub working_dir: Option<PathBuf>,
    /// Falls back to the configured timeout when unset
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn for_location(location: &RepositoryLocation) -> Self {
        Self {
            use_credentials: location.use_credentials,
            working_dir: location.working_dir.clone(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs an svn subcommand and hands back its stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &str, args: &[String], options: &ExecOptions)
    -> SvnResult<String>;
}

/// Executes the svn binary as a subprocess
#[derive(Debug, Clone)]
pub struct SvnExecutor {
    config: Arc<Config>,
    program: String,
}

impl SvnExecutor {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_program(config, "svn")
    }

    /// Use a different binary in place of `svn`
    pub fn with_program(config: Arc<Config>, program: impl Into<String>) -> Self {
        Self {
            config,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector for one invocation
    ///
    /// Credential flags are added only when requested and both username and
    /// password are configured. `--non-interactive` is always present exactly once.
    pub fn build_args(&self, command: &str, args: &[String], use_credentials: bool) -> Vec<String> {
        let mut full_args = Vec::with_capacity(args.len() + 7);
        full_args.push(command.to_string());
        full_args.extend(args.iter().cloned());

        if use_credentials {
            if let Some((username, password)) = self.config.credentials() {
                full_args.extend([
                    "--username".to_string(),
                    username.to_string(),
                    "--password".to_string(),
                    password.to_string(),
                    NON_INTERACTIVE.to_string(),
                    "--no-auth-cache".to_string(),
                ]);
            }
        }

        if !full_args.iter().any(|a| a == NON_INTERACTIVE) {
            full_args.push(NON_INTERACTIVE.to_string());
        }

        full_args
    }

    /// Run the command and return its output, failing on non-zero exit
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        options: &ExecOptions,
    ) -> SvnResult<CommandOutput> {
        let full_args = self.build_args(command, args, options.use_credentials);
        let timeout = options
            .timeout
            .unwrap_or(Duration::from_millis(self.config.timeout_ms));
        let shown = display_command(&self.program, &full_args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = options.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %shown, cwd = ?options.working_dir, "Spawning svn");
        let started = Instant::now();

        let mut child = cmd.spawn().map_err(|e| spawn_error(&self.program, e))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let collect = async {
            tokio::try_join!(read_pipe(stdout_pipe), read_pipe(stderr_pipe), child.wait())
        };
        let waited = tokio::time::timeout(timeout, collect).await;

        let (stdout, stderr, status) = match waited {
            Ok(Ok(collected)) => collected,
            Ok(Err(e)) => {
                return Err(SvnError::CommandFailed {
                    message: format!("Failed to execute SVN command: {}", e),
                    exit_code: -1,
                    details: None,
                });
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill timed out svn process");
                }
                tracing::warn!(command = %shown, timeout_ms = timeout.as_millis() as u64, "svn timed out");
                return Err(SvnError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                    command: format!("Command: {}", shown),
                });
            }
        };

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: exit_code(status),
            elapsed: started.elapsed(),
        };

        tracing::debug!(
            command = %shown,
            exit_code = output.exit_code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "svn finished"
        );

        if !output.success() {
            let err = classify_failure(&output);
            tracing::warn!(command = %shown, code = err.kind().code(), "svn failed");
            return Err(err);
        }

        Ok(output)
    }
}

#[async_trait]
impl CommandRunner for SvnExecutor {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        options: &ExecOptions,
    ) -> SvnResult<String> {
        self.run(command, args, options).await.map(|o| o.stdout)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn exit_code(status: ExitStatus) -> i32 {
    // Killed by a signal on unix
    status.code().unwrap_or(-1)
}

fn spawn_error(program: &str, err: io::Error) -> SvnError {
    if err.kind() == io::ErrorKind::NotFound {
        tracing::warn!(program, "svn binary not found");
        SvnError::NotInstalled
    } else {
        SvnError::CommandFailed {
            message: format!("Failed to execute SVN command: {}", err),
            exit_code: -1,
            details: None,
        }
    }
}

/// Command line for diagnostics, with the password value masked
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_string());

    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("***".to_string());
            mask_next = false;
        } else {
            mask_next = arg == "--password";
            parts.push(arg.clone());
        }
    }

    parts.join(" ")
}

/// Map a failed invocation to a typed error by looking at what svn printed
///
/// Checks run in a fixed order and the first match wins.
pub fn classify_failure(output: &CommandOutput) -> SvnError {
    let text = match (output.stderr.trim().is_empty(), output.stdout.trim().is_empty()) {
        (false, false) => format!("{}\n{}", output.stderr, output.stdout),
        (false, true) => output.stderr.clone(),
        _ => output.stdout.clone(),
    };

    if text.contains("is not a working copy") {
        return SvnError::NotWorkingCopy {
            message: "The specified path is not an SVN working copy".to_string(),
            details: Some(text),
        };
    }

    if text.contains("authorization failed") || text.contains("Authentication failed") {
        return SvnError::AuthFailed { details: text };
    }

    if text.contains("Unable to connect") || text.contains("Network is unreachable") {
        return SvnError::Network { details: text };
    }

    if text.contains("non-existent") || text.contains("not found") {
        return SvnError::FileNotFound {
            message: "The specified path or revision was not found".to_string(),
            details: Some(text),
        };
    }

    if text.contains("No such revision") {
        return SvnError::InvalidRevision { details: text };
    }

    SvnError::CommandFailed {
        message: format!("SVN command failed with exit code {}", output.exit_code),
        exit_code: output.exit_code,
        details: Some(text),
    }
}
