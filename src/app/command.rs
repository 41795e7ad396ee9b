use tracing::debug;

use crate::docker::{
    BulkFailure, BulkOperation, BulkReport, Container, ContainerDetails, ContainerId,
    ContainerStats, PostgresOptions, RuntimeError, generate_docker_compose,
    generate_environment_variables,
};
use crate::services::with_progress;

use super::App;

/// Generated text artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Env,
    ViteEnv,
    Compose,
}

impl Artifact {
    pub fn title(self) -> &'static str {
        match self {
            Self::Env => ".env",
            Self::ViteEnv => ".env (Vite)",
            Self::Compose => "docker-compose.yml",
        }
    }

    /// Render from an in-memory list. `.env` only describes running
    /// containers; compose describes everything it is given.
    pub fn render(self, containers: &[Container]) -> String {
        match self {
            Self::Env | Self::ViteEnv => {
                let running: Vec<Container> = containers
                    .iter()
                    .filter(|c| c.status.is_running())
                    .cloned()
                    .collect();
                generate_environment_variables(&running, self == Self::ViteEnv)
            }
            Self::Compose => generate_docker_compose(containers),
        }
    }
}

/// Work the manager hands to the runtime. Produced by key handling,
/// executed asynchronously, and turned into an [`Outcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ProbeDaemon,
    Refresh,
    Lifecycle {
        op: BulkOperation,
        ids: Vec<ContainerId>,
    },
    LoadDetails(Container),
    LoadLogs(Container),
    LoadStats(Container),
    Exec {
        container: Container,
        command: String,
    },
    ShowEnv(Container),
    Cleanup,
    CreatePostgres(PostgresOptions),
    /// `None` lists the runtime first; `Some` renders the given rows.
    Generate {
        artifact: Artifact,
        scope: Option<Vec<Container>>,
    },
}

impl Command {
    /// Whether the command calls the runtime at all.
    pub fn needs_runtime(&self) -> bool {
        !matches!(
            self,
            Self::Generate {
                scope: Some(_),
                ..
            }
        )
    }

    /// Label for the loading indicator.
    pub fn label(&self) -> String {
        match self {
            Self::ProbeDaemon => "Contacting runtime".to_string(),
            Self::Refresh => "Refreshing containers".to_string(),
            Self::Lifecycle { op, ids } => match ids.len() {
                1 => format!("{} container", op.progressive()),
                n => format!("{} {n} containers", op.progressive()),
            },
            Self::LoadDetails(c) => format!("Inspecting {}", c.name),
            Self::LoadLogs(c) => format!("Fetching logs for {}", c.name),
            Self::LoadStats(c) => format!("Sampling stats for {}", c.name),
            Self::Exec { container, .. } => format!("Running command in {}", container.name),
            Self::ShowEnv(c) => format!("Reading environment of {}", c.name),
            Self::Cleanup => "Cleaning up unused resources".to_string(),
            Self::CreatePostgres(o) => format!("Creating {}", o.name),
            Self::Generate { artifact, .. } => format!("Generating {}", artifact.title()),
        }
    }

    /// Mutating commands refresh the list once they finish.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Lifecycle { .. } | Self::Cleanup | Self::CreatePostgres(_)
        )
    }
}

/// Everything a command produced, applied to the state in one step.
#[derive(Debug)]
pub enum Outcome {
    Daemon(Result<String, RuntimeError>),
    Containers(Result<Vec<Container>, RuntimeError>),
    Lifecycle {
        op: BulkOperation,
        result: Result<BulkReport, BulkFailure>,
        refreshed: Result<Vec<Container>, RuntimeError>,
    },
    Details {
        container: Container,
        result: Result<ContainerDetails, RuntimeError>,
    },
    Logs {
        container: Container,
        result: Result<Vec<String>, RuntimeError>,
    },
    Stats {
        container: Container,
        result: Result<ContainerStats, RuntimeError>,
    },
    Exec {
        container: Container,
        command: String,
        result: Result<String, RuntimeError>,
    },
    Env {
        container: Container,
        result: Result<Vec<(String, String)>, RuntimeError>,
    },
    Cleanup {
        result: Result<String, RuntimeError>,
        refreshed: Result<Vec<Container>, RuntimeError>,
    },
    Created {
        name: String,
        result: Result<ContainerId, RuntimeError>,
        refreshed: Result<Vec<Container>, RuntimeError>,
    },
    Generated {
        artifact: Artifact,
        result: Result<String, RuntimeError>,
    },
}

impl App {
    /// Run `cmd` against the runtime with the loading indicator showing.
    ///
    /// Takes `&self`: nothing is mutated until [`App::apply`] receives the
    /// outcome, so the state can be drawn while this is pending.
    pub async fn execute(&self, cmd: Command) -> Outcome {
        debug!(command = ?cmd, "executing");
        let label = cmd.label();
        let total = match &cmd {
            Command::Lifecycle { ids, .. } => Some(ids.len()),
            _ => None,
        };
        let runtime = self.runtime.as_ref();
        let filter = self.filter.clone();

        with_progress(&self.progress, &label, total, |updater| async move {
            match cmd {
                Command::ProbeDaemon => Outcome::Daemon(runtime.check_daemon().await),
                Command::Refresh => Outcome::Containers(list(runtime, filter.as_deref()).await),
                Command::Lifecycle { op, ids } => {
                    let observer = |id: &ContainerId, _: &Result<(), RuntimeError>| {
                        updater.advance(Some(id.short()));
                    };
                    let result = runtime
                        .perform_bulk_operation_observed(&ids, op, &observer)
                        .await;
                    let refreshed = list(runtime, filter.as_deref()).await;
                    Outcome::Lifecycle {
                        op,
                        result,
                        refreshed,
                    }
                }
                Command::LoadDetails(container) => {
                    let result = runtime.inspect_container(&container.id).await;
                    Outcome::Details { container, result }
                }
                Command::LoadLogs(container) => {
                    let result = runtime.container_logs(&container.id, None).await;
                    Outcome::Logs { container, result }
                }
                Command::LoadStats(container) => {
                    let result = runtime.container_stats(&container.id).await;
                    Outcome::Stats { container, result }
                }
                Command::Exec { container, command } => {
                    let result = runtime.exec_in_container(&container.id, &command).await;
                    Outcome::Exec {
                        container,
                        command,
                        result,
                    }
                }
                Command::ShowEnv(container) => {
                    let result = runtime.container_env(&container.id).await;
                    Outcome::Env { container, result }
                }
                Command::Cleanup => {
                    let result = runtime.cleanup_system().await;
                    let refreshed = list(runtime, filter.as_deref()).await;
                    Outcome::Cleanup { result, refreshed }
                }
                Command::CreatePostgres(opts) => {
                    let result = runtime.create_postgres_container(&opts).await;
                    let refreshed = list(runtime, filter.as_deref()).await;
                    Outcome::Created {
                        name: opts.name,
                        result,
                        refreshed,
                    }
                }
                Command::Generate { artifact, scope } => {
                    let result = match scope {
                        Some(rows) => Ok(artifact.render(&rows)),
                        None => runtime
                            .list_containers()
                            .await
                            .map(|rows| artifact.render(&rows)),
                    };
                    Outcome::Generated { artifact, result }
                }
            }
        })
        .await
    }
}

async fn list(
    runtime: &dyn crate::docker::ContainerRuntime,
    filter: Option<&str>,
) -> Result<Vec<Container>, RuntimeError> {
    match filter {
        Some(query) => runtime.search_containers(query).await,
        None => runtime.list_containers().await,
    }
}
