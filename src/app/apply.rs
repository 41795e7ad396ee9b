use std::time::Instant;

use tracing::{debug, warn};

use crate::docker::{Container, RuntimeError};
use crate::services::{NotificationLevel, copy_to_clipboard};

use super::{App, Command, DaemonStatus, Outcome, Overlay, ViewState};

impl App {
    /// Fold a finished command into the state. This is the only place
    /// runtime results become visible. May return a follow-up command.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Command> {
        match outcome {
            Outcome::Daemon(Ok(version)) => {
                let recovered = self.daemon.is_unavailable();
                debug!(%version, "runtime available");
                self.daemon = DaemonStatus::Available(version.clone());
                if recovered {
                    self.notify(
                        NotificationLevel::Success,
                        format!("Container runtime available (server {version})"),
                    );
                }
                if self.view != ViewState::Main {
                    return Some(Command::Refresh);
                }
            }
            Outcome::Daemon(Err(e)) => {
                self.daemon = DaemonStatus::Unavailable(e.to_string());
                self.notify(NotificationLevel::Error, e.to_string());
            }

            Outcome::Containers(result) => self.apply_refresh(result),

            Outcome::Lifecycle {
                op,
                result,
                refreshed,
            } => match result {
                Ok(report) => {
                    self.selection.clear_marks();
                    self.apply_refresh(refreshed);
                    let n = report.outcomes.len();
                    self.notify(
                        NotificationLevel::Success,
                        format!("{} succeeded for {}", op.verb(), plural(n)),
                    );
                }
                Err(failure) => {
                    if failure.report.failed().any(|(_, e)| e.is_unavailable()) {
                        self.daemon =
                            DaemonStatus::Unavailable("daemon stopped responding".into());
                    }
                    self.apply_refresh(refreshed);
                    self.overlay = Some(Overlay::Text {
                        title: format!("{} report", op.verb()),
                        lines: failure.report.lines(),
                        scroll: 0,
                    });
                    self.notify(NotificationLevel::Error, failure.to_string());
                }
            },

            Outcome::Details { container, result } => match result {
                Ok(details) => {
                    self.details = Some(details);
                    self.focus(container, ViewState::Details);
                }
                Err(e) if e.is_not_found() && self.view == ViewState::Details => {
                    self.focus_lost(&container);
                    return self.submit(Command::Refresh);
                }
                Err(e) => self.fail(e),
            },

            Outcome::Logs { container, result } => match result {
                Ok(lines) => {
                    self.log_scroll = u16::try_from(lines.len()).unwrap_or(u16::MAX);
                    self.logs = lines;
                    self.focus(container, ViewState::Logs);
                }
                Err(e) if e.is_not_found() && self.view == ViewState::Logs => {
                    self.focus_lost(&container);
                    return self.submit(Command::Refresh);
                }
                Err(e) => self.fail(e),
            },

            Outcome::Stats { container, result } => {
                self.stats_fetched_at = Some(Instant::now());
                match result {
                    Ok(stats) => {
                        self.stats = Some(stats);
                        self.focus(container, ViewState::Stats);
                    }
                    Err(e) if e.is_not_found() && self.view == ViewState::Stats => {
                        self.focus_lost(&container);
                        return self.submit(Command::Refresh);
                    }
                    Err(e) => self.fail(e),
                }
            }

            Outcome::Exec {
                container,
                command,
                result,
            } => match result {
                Ok(output) => {
                    let body = if output.trim().is_empty() {
                        "(no output)"
                    } else {
                        output.as_str()
                    };
                    self.overlay = Some(Overlay::text(
                        format!("{} $ {command}", container.name),
                        body,
                    ));
                }
                Err(e) => self.fail(e),
            },

            Outcome::Env { container, result } => match result {
                Ok(pairs) => {
                    let body = if pairs.is_empty() {
                        "(no environment variables)".to_string()
                    } else {
                        pairs
                            .iter()
                            .map(|(k, v)| format!("{k}={v}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    };
                    self.overlay = Some(Overlay::text(
                        format!("Environment of {}", container.name),
                        &body,
                    ));
                }
                Err(e) => self.fail(e),
            },

            Outcome::Cleanup { result, refreshed } => {
                self.apply_refresh(refreshed);
                match result {
                    Ok(summary) if summary.is_empty() => {
                        self.notify(NotificationLevel::Success, "Cleanup finished")
                    }
                    Ok(summary) => self.notify(NotificationLevel::Success, summary),
                    Err(e) => self.fail(e),
                }
            }

            Outcome::Created {
                name,
                result,
                refreshed,
            } => {
                self.apply_refresh(refreshed);
                match result {
                    Ok(id) => self.notify(
                        NotificationLevel::Success,
                        format!("Created {name} ({})", id.short()),
                    ),
                    Err(e) => self.fail(e),
                }
            }

            Outcome::Generated { artifact, result } => match result {
                Ok(text) if text.trim().is_empty() || text.trim() == "services: {}" => {
                    self.notify(
                        NotificationLevel::Info,
                        format!("Nothing to put in {}", artifact.title()),
                    );
                }
                Ok(text) => {
                    self.overlay = Some(Overlay::text(artifact.title(), &text));
                    match copy_to_clipboard(&text) {
                        Ok(()) => self.notify(
                            NotificationLevel::Success,
                            format!("{} copied to clipboard", artifact.title()),
                        ),
                        Err(e) => {
                            warn!(error = %e, "clipboard copy failed");
                            self.notify(
                                NotificationLevel::Warning,
                                format!("{} generated; {e}", artifact.title()),
                            );
                        }
                    }
                }
                Err(e) => self.fail(e),
            },
        }
        None
    }

    fn apply_refresh(&mut self, result: Result<Vec<Container>, RuntimeError>) {
        match result {
            Ok(containers) => {
                let lost = self.focused.clone();
                if !self.replace_containers(containers)
                    && let Some(lost) = lost
                {
                    self.focus_lost(&lost);
                }
            }
            Err(e) => self.fail(e),
        }
    }

    /// Show `container` in `view`, entering it if needed.
    fn focus(&mut self, container: Container, view: ViewState) {
        if self.focused.as_ref().is_some_and(|f| f.id != container.id) {
            self.details = None;
            self.stats = None;
            self.logs.clear();
        }
        self.focused = Some(container);
        self.navigate(view);
    }

    /// The focused container is gone; leave its views.
    fn focus_lost(&mut self, container: &Container) {
        self.focused = None;
        self.details = None;
        self.stats = None;
        self.stats_fetched_at = None;
        self.logs.clear();
        if matches!(
            self.view,
            ViewState::Details | ViewState::Logs | ViewState::Stats
        ) {
            self.view = ViewState::Containers;
            self.previous = ViewState::Containers.parent();
            self.notify(
                NotificationLevel::Warning,
                format!("{} no longer exists", container.name),
            );
        }
    }

    fn fail(&mut self, err: RuntimeError) {
        if err.is_unavailable() {
            self.daemon = DaemonStatus::Unavailable(err.to_string());
        }
        self.notify(NotificationLevel::Error, err.to_string());
    }
}

fn plural(n: usize) -> String {
    if n == 1 {
        "1 container".to_string()
    } else {
        format!("{n} containers")
    }
}
