use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::error::RuntimeError;

/// Describes one CLI invocation. `args` is the full argument list passed to
/// the runtime binary.
#[derive(Debug, Clone)]
pub struct CliCommand {
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CliCommand {
    pub fn new<I, S>(args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// `docker <verb> <first arg>`, enough to identify the call in messages.
    pub fn label(&self, binary: &str) -> String {
        let head: Vec<&str> = self.args.iter().take(2).map(String::as_str).collect();
        format!("{binary} {}", head.join(" "))
    }
}

/// Captured output of a finished invocation.
#[derive(Debug, Clone)]
pub struct CliOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run the runtime binary to completion, bounded by the command's timeout.
///
/// A non-zero exit is *not* an error here; callers decide how to interpret
/// it (see [`classify_failure`]). Spawn failures and timeouts are.
pub async fn run(binary: &str, cmd: &CliCommand) -> Result<CliOutput, RuntimeError> {
    let label = cmd.label(binary);
    debug!(command = %label, args = ?cmd.args, "invoking runtime");

    let mut child = Command::new(binary);
    child
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(cmd.timeout, child.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RuntimeError::Unavailable(format!(
                "failed to invoke `{binary}`, is it installed and on PATH?"
            )));
        }
        Ok(Err(e)) => return Err(RuntimeError::Io(e)),
        Err(_) => {
            return Err(RuntimeError::Timeout {
                command: label,
                seconds: cmd.timeout.as_secs(),
            });
        }
    };

    let result = CliOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(command = %label, exit = ?result.exit_code, "runtime finished");
    Ok(result)
}

/// Run and require a zero exit, returning stdout.
pub async fn run_checked(binary: &str, cmd: &CliCommand) -> Result<String, RuntimeError> {
    let output = run(binary, cmd).await?;
    if output.success {
        Ok(output.stdout)
    } else {
        Err(classify_failure(&cmd.label(binary), &output))
    }
}

/// Map a failed invocation onto the error taxonomy.
pub fn classify_failure(command: &str, output: &CliOutput) -> RuntimeError {
    let message = failure_message(output);
    let lower = message.to_ascii_lowercase();

    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("is the docker daemon running")
        || lower.contains("error during connect")
    {
        return RuntimeError::Unavailable(message);
    }

    if lower.contains("no such container") || lower.contains("no such object") {
        let target = message
            .rsplit_once(": ")
            .map(|(_, id)| id.trim().to_string())
            .unwrap_or(message);
        return RuntimeError::NotFound(target);
    }

    RuntimeError::CommandFailed {
        command: command.to_string(),
        message,
    }
}

fn failure_message(output: &CliOutput) -> String {
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return stderr.trim_start_matches("Error response from daemon: ").to_string();
    }
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    match output.exit_code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Whether `binary` can be spawned at all, independent of the daemon.
pub async fn is_installed(binary: &str) -> bool {
    let cmd = CliCommand::new(["--version"], Duration::from_secs(5));
    match run(binary, &cmd).await {
        Ok(_) | Err(RuntimeError::Timeout { .. }) => true,
        Err(_) => false,
    }
}

/// Verify that the daemon is reachable and return its server version.
pub async fn ensure_available(binary: &str, wait: Duration) -> Result<String, RuntimeError> {
    let cmd = CliCommand::new(["version", "--format", "{{.Server.Version}}"], wait);
    let output = run(binary, &cmd).await?;

    let version = output.stdout.trim().to_string();
    if !output.success || version.is_empty() {
        let message = failure_message(&output);
        return Err(RuntimeError::Unavailable(format!(
            "{binary} daemon is not running ({message})"
        )));
    }
    Ok(version)
}
