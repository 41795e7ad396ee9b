mod apply;
mod command;
mod keys;
mod state;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::docker::{Container, ContainerDetails, ContainerRuntime, ContainerStats};
use crate::services::{NotificationLevel, Notice, Notifier, ProgressTracker};

pub use command::{Artifact, Command, Outcome};
pub use state::{
    Confirmation, DaemonStatus, MenuItem, Overlay, Prompt, PromptKind, Selection, ViewState,
};

/// How long non-error notices stay in the status line.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Top-level application state.
pub struct App {
    pub running: bool,
    pub view: ViewState,
    /// Where "back" goes from the current view.
    pub previous: Option<ViewState>,
    pub menu_index: usize,

    /// Current container list, already filtered by `filter`.
    pub containers: Vec<Container>,
    pub selection: Selection,
    pub filter: Option<String>,

    /// Container shown by the details, logs and stats views.
    pub focused: Option<Container>,
    pub details: Option<ContainerDetails>,
    pub logs: Vec<String>,
    pub log_scroll: u16,
    pub stats: Option<ContainerStats>,
    pub stats_fetched_at: Option<Instant>,

    pub overlay: Option<Overlay>,
    pub prompt: Option<Prompt>,
    pub confirm: Option<Confirmation>,
    pub notice: Option<Notice>,
    pub daemon: DaemonStatus,

    /// Shared with running commands; the renderer reads it.
    pub progress: ProgressTracker,
    pub config: Config,

    runtime: Arc<dyn ContainerRuntime>,
    notifier: Notifier,
}

impl App {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: Config) -> Self {
        let notifier = Notifier::new(config.desktop_notifications);
        Self {
            running: true,
            view: ViewState::Main,
            previous: None,
            menu_index: 0,
            containers: Vec::new(),
            selection: Selection::default(),
            filter: None,
            focused: None,
            details: None,
            logs: Vec::new(),
            log_scroll: 0,
            stats: None,
            stats_fetched_at: None,
            overlay: None,
            prompt: None,
            confirm: None,
            notice: None,
            daemon: DaemonStatus::Unknown,
            progress: ProgressTracker::new(),
            config,
            runtime,
            notifier,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Enter `to`, remembering the current view for "back".
    pub fn navigate(&mut self, to: ViewState) {
        if to != self.view {
            self.previous = Some(self.view);
            self.view = to;
        }
    }

    /// Go back one level. "Back" from there follows the view hierarchy.
    /// Landing on the container list reloads it.
    pub fn back(&mut self) -> Option<Command> {
        let target = self.previous.or_else(|| self.view.parent())?;
        self.view = target;
        self.previous = target.parent();
        match target {
            ViewState::Containers => {
                self.log_scroll = 0;
                self.submit(Command::Refresh)
            }
            ViewState::Main => {
                self.log_scroll = 0;
                None
            }
            _ => None,
        }
    }

    pub fn cursor_container(&self) -> Option<&Container> {
        self.selection
            .cursor()
            .and_then(|i| self.containers.get(i))
    }

    /// Containers a lifecycle key acts on: marked rows, or else the cursor.
    pub fn targets(&self) -> Vec<&Container> {
        self.selection
            .targets()
            .into_iter()
            .filter_map(|i| self.containers.get(i))
            .collect()
    }

    /// Marked rows only, in list order.
    pub fn marked_containers(&self) -> Vec<Container> {
        self.selection
            .marked()
            .iter()
            .filter_map(|&i| self.containers.get(i))
            .cloned()
            .collect()
    }

    /// Swap in a fresh list, carrying cursor and marks over by identity.
    /// Returns false if the focused container is no longer listed.
    pub fn replace_containers(&mut self, containers: Vec<Container>) -> bool {
        self.selection.remap(&self.containers, &containers);
        self.containers = containers;

        match &self.focused {
            Some(focused) => match self.containers.iter().find(|c| c.id == focused.id) {
                Some(fresh) => {
                    self.focused = Some(fresh.clone());
                    true
                }
                None => false,
            },
            None => true,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notice = Some(self.notifier.notify(level, message));
    }

    /// Gate a command on runtime availability. Returns the command if it
    /// should run.
    pub fn submit(&mut self, cmd: Command) -> Option<Command> {
        if cmd.needs_runtime()
            && cmd != Command::ProbeDaemon
            && let DaemonStatus::Unavailable(reason) = &self.daemon
        {
            let message = format!("Container runtime unavailable ({reason}). Press R to retry.");
            self.notify(NotificationLevel::Warning, message);
            return None;
        }
        Some(cmd)
    }

    /// Periodic housekeeping: expire notices and schedule the stats
    /// auto-refresh.
    pub fn tick(&mut self, now: Instant) -> Option<Command> {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(now, NOTICE_TTL))
        {
            self.notice = None;
        }

        if self.view != ViewState::Stats
            || self.overlay.is_some()
            || self.prompt.is_some()
            || self.daemon.is_unavailable()
        {
            return None;
        }
        let container = self.focused.clone()?;
        let interval = Duration::from_millis(self.config.stats_refresh_ms);
        let due = self
            .stats_fetched_at
            .is_none_or(|at| now.duration_since(at) >= interval);
        due.then_some(Command::LoadStats(container))
    }

    /// Execute `cmd` and every follow-up it produces, applying each outcome.
    pub async fn run_command(&mut self, cmd: Command) {
        let mut next = Some(cmd);
        while let Some(cmd) = next.take() {
            let outcome = self.execute(cmd).await;
            next = self.apply(outcome);
        }
    }

    /// Handle one key end to end. Convenience for callers that do not need
    /// to redraw while the command runs.
    pub async fn dispatch_key(&mut self, key: crossterm::event::KeyEvent) {
        if let Some(cmd) = self.handle_key(key) {
            self.run_command(cmd).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::docker::{
        Container, ContainerDetails, ContainerId, ContainerRuntime, ContainerStats,
        ContainerStatus, PostgresOptions, RuntimeError,
    };

    /// Runtime with a fixed list that accepts every operation.
    pub struct FixedRuntime {
        pub containers: Vec<Container>,
    }

    pub fn container(id: &str, status: ContainerStatus) -> Container {
        Container {
            id: ContainerId::new(id),
            name: format!("svc-{id}"),
            status,
            image: "postgres:16".into(),
            ports: vec!["0.0.0.0:5432->5432/tcp".into()],
            created_at: None,
            size: "0B".into(),
        }
    }

    #[async_trait]
    impl ContainerRuntime for FixedRuntime {
        async fn check_daemon(&self) -> Result<String, RuntimeError> {
            Ok("27.0.0".into())
        }
        async fn list_containers(&self) -> Result<Vec<Container>, RuntimeError> {
            Ok(self.containers.clone())
        }
        async fn start_container(&self, _: &ContainerId) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn stop_container(&self, _: &ContainerId) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn remove_container(&self, _: &ContainerId) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn restart_container(&self, _: &ContainerId) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn container_logs(
            &self,
            _: &ContainerId,
            _: Option<usize>,
        ) -> Result<Vec<String>, RuntimeError> {
            Ok(vec!["ready to accept connections".into()])
        }
        async fn container_stats(&self, _: &ContainerId) -> Result<ContainerStats, RuntimeError> {
            Ok(ContainerStats::default())
        }
        async fn inspect_container(
            &self,
            id: &ContainerId,
        ) -> Result<ContainerDetails, RuntimeError> {
            Ok(ContainerDetails {
                entries: vec![("ID".into(), id.to_string())],
            })
        }
        async fn exec_in_container(
            &self,
            _: &ContainerId,
            command: &str,
        ) -> Result<String, RuntimeError> {
            Ok(format!("ran {command}\n"))
        }
        async fn container_env(
            &self,
            _: &ContainerId,
        ) -> Result<Vec<(String, String)>, RuntimeError> {
            Ok(vec![("PGDATA".into(), "/var/lib/postgresql/data".into())])
        }
        async fn cleanup_system(&self) -> Result<String, RuntimeError> {
            Ok("Total reclaimed space: 0B".into())
        }
        async fn create_postgres_container(
            &self,
            opts: &PostgresOptions,
        ) -> Result<ContainerId, RuntimeError> {
            Ok(ContainerId::new(format!("new-{}", opts.name)))
        }
    }
}
