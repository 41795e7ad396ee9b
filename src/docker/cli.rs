use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;

use super::engine::{self, CliCommand, classify_failure};
use super::error::RuntimeError;
use super::parse;
use super::runtime::ContainerRuntime;
use super::types::{Container, ContainerDetails, ContainerId, ContainerStats, PostgresOptions};

pub const DEFAULT_LOG_TAIL: usize = 100;

/// Daemon messages meaning the container is already in the requested state.
const ALREADY_STARTED: &[&str] = &["already started", "is already running"];
const ALREADY_STOPPED: &[&str] = &["is not running", "already stopped"];

/// [`ContainerRuntime`] backed by the `docker` command-line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    command_timeout: Duration,
    stats_timeout: Duration,
    create_timeout: Duration,
    log_tail: usize,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            command_timeout: Duration::from_secs(30),
            stats_timeout: Duration::from_secs(5),
            create_timeout: Duration::from_secs(300),
            log_tail: DEFAULT_LOG_TAIL,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            binary: cfg.docker_binary.clone(),
            command_timeout: Duration::from_secs(cfg.command_timeout),
            stats_timeout: Duration::from_secs(cfg.stats_timeout),
            create_timeout: Duration::from_secs(cfg.create_timeout),
            log_tail: cfg.log_tail,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Whether the client binary exists, even if the daemon is down.
    pub async fn is_installed(&self) -> bool {
        engine::is_installed(&self.binary).await
    }

    fn command<I, S>(&self, args: I) -> CliCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CliCommand::new(args, self.command_timeout)
    }

    async fn checked(&self, cmd: CliCommand) -> Result<String, RuntimeError> {
        engine::run_checked(&self.binary, &cmd).await
    }

    /// Run a lifecycle verb. Failures whose message contains one of
    /// `already_done` mean the container is already in the target state.
    async fn lifecycle(
        &self,
        verb: &str,
        id: &ContainerId,
        already_done: &[&str],
    ) -> Result<(), RuntimeError> {
        let cmd = self.command([verb, id.as_str()]);
        let label = cmd.label(&self.binary);
        let output = engine::run(&self.binary, &cmd).await?;

        if output.success {
            info!(container = %id, verb, "lifecycle operation succeeded");
            return Ok(());
        }

        let lower = output.stderr.to_ascii_lowercase();
        if already_done.iter().any(|m| lower.contains(m)) {
            info!(container = %id, verb, "container already in requested state");
            return Ok(());
        }

        let err = classify_failure(&label, &output);
        warn!(container = %id, verb, error = %err, "lifecycle operation failed");
        Err(err)
    }

    fn postgres_args(opts: &PostgresOptions) -> Vec<String> {
        vec![
            "run".into(),
            "-d".into(),
            "--name".into(),
            opts.name.clone(),
            "-e".into(),
            format!("POSTGRES_USER={}", opts.user),
            "-e".into(),
            format!("POSTGRES_PASSWORD={}", opts.password),
            "-e".into(),
            format!("POSTGRES_DB={}", opts.database),
            "-p".into(),
            format!("{}:5432", opts.host_port),
            format!("{}:{}", opts.image, opts.tag),
        ]
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn check_daemon(&self) -> Result<String, RuntimeError> {
        engine::ensure_available(&self.binary, self.stats_timeout).await
    }

    async fn list_containers(&self) -> Result<Vec<Container>, RuntimeError> {
        let cmd = self.command(["ps", "-a", "--size", "--no-trunc", "--format", "{{json .}}"]);
        let out = self.checked(cmd).await?;
        parse::parse_ps_lines(&out)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.lifecycle("start", id, ALREADY_STARTED).await
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.lifecycle("stop", id, ALREADY_STOPPED).await
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.lifecycle("rm", id, &["is already in progress"]).await
    }

    async fn restart_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.lifecycle("restart", id, &[]).await
    }

    async fn container_logs(
        &self,
        id: &ContainerId,
        tail: Option<usize>,
    ) -> Result<Vec<String>, RuntimeError> {
        let tail = tail.unwrap_or(self.log_tail).to_string();
        let cmd = self.command(["logs", "--tail", tail.as_str(), id.as_str()]);
        let output = engine::run(&self.binary, &cmd).await?;
        if !output.success {
            return Err(classify_failure(&cmd.label(&self.binary), &output));
        }

        // Container stdout and stderr arrive on separate pipes; the
        // interleaving is lost, so stdout comes first.
        Ok(output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .map(String::from)
            .collect())
    }

    async fn container_stats(&self, id: &ContainerId) -> Result<ContainerStats, RuntimeError> {
        let cmd = CliCommand::new(
            ["stats", "--no-stream", "--format", "{{json .}}", id.as_str()],
            self.stats_timeout,
        );
        let out = self.checked(cmd).await?;
        parse::parse_stats_line(&out)
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerDetails, RuntimeError> {
        let cmd = self.command(["inspect", "--type", "container", id.as_str()]);
        let out = self.checked(cmd).await?;
        parse::parse_inspect(&out)
    }

    async fn exec_in_container(
        &self,
        id: &ContainerId,
        command: &str,
    ) -> Result<String, RuntimeError> {
        let argv = shell_words::split(command)
            .map_err(|e| RuntimeError::Parse(format!("cannot parse command: {e}")))?;
        if argv.is_empty() {
            return Err(RuntimeError::Parse("empty command".into()));
        }

        let mut args = vec!["exec".to_string(), id.as_str().to_string()];
        args.extend(argv);
        let cmd = self.command(args);
        let output = engine::run(&self.binary, &cmd).await?;
        if !output.success {
            return Err(classify_failure(&cmd.label(&self.binary), &output));
        }

        let mut rendered = output.stdout;
        if !output.stderr.trim().is_empty() {
            if !rendered.is_empty() && !rendered.ends_with('\n') {
                rendered.push('\n');
            }
            rendered.push_str(&output.stderr);
        }
        Ok(rendered)
    }

    async fn container_env(&self, id: &ContainerId) -> Result<Vec<(String, String)>, RuntimeError> {
        let cmd = self.command([
            "inspect",
            "--type",
            "container",
            "--format",
            "{{json .Config.Env}}",
            id.as_str(),
        ]);
        let out = self.checked(cmd).await?;
        parse::parse_env(&out)
    }

    async fn cleanup_system(&self) -> Result<String, RuntimeError> {
        let cmd = self.command(["system", "prune", "-f"]);
        let out = self.checked(cmd).await?;
        info!("system prune finished");
        let summary = out
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("Nothing to clean up")
            .to_string();
        Ok(summary)
    }

    async fn create_postgres_container(
        &self,
        opts: &PostgresOptions,
    ) -> Result<ContainerId, RuntimeError> {
        let cmd = CliCommand::new(Self::postgres_args(opts), self.create_timeout);
        let out = self.checked(cmd).await?;
        // `docker run -d` may print pull progress before the id.
        let id = out
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| RuntimeError::Parse("docker run printed no container id".into()))?;
        info!(container = id, name = %opts.name, "created postgres container");
        Ok(ContainerId::new(id))
    }
}
