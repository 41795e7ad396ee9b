//! Scripted in-memory container runtime for driving `App` end to end.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use dockhand::docker::{
    Container, ContainerDetails, ContainerId, ContainerRuntime, ContainerStats, ContainerStatus,
    PostgresOptions, RuntimeError,
};

/// Behaves like a tiny daemon: lifecycle calls change container state,
/// removing a running container fails, unknown ids are `NotFound`.
#[derive(Default)]
pub struct ScriptedRuntime {
    containers: Mutex<Vec<Container>>,
    calls: Mutex<Vec<String>>,
    down: AtomicBool,
}

impl ScriptedRuntime {
    pub fn new(containers: Vec<Container>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Self::default()
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Every call so far as `"verb id"`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, verb: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&format!("{verb} ")))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    fn record(&self, verb: &str, id: &str) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push(format!("{verb} {id}"));
        if self.down.load(Ordering::SeqCst) {
            return Err(RuntimeError::Unavailable("daemon not running".into()));
        }
        Ok(())
    }

    fn with_container<T>(
        &self,
        id: &ContainerId,
        f: impl FnOnce(&mut Container) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let mut all = self.containers.lock().unwrap();
        match all.iter_mut().find(|c| &c.id == id) {
            Some(c) => f(c),
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }
}

pub fn container(id: &str, status: ContainerStatus) -> Container {
    Container {
        id: ContainerId::new(id),
        name: format!("svc-{id}"),
        status,
        image: "postgres:16".into(),
        ports: vec![format!("0.0.0.0:54{}->5432/tcp", id.len())],
        created_at: None,
        size: "0B".into(),
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn check_daemon(&self) -> Result<String, RuntimeError> {
        self.record("version", "-")?;
        Ok("27.1.0".into())
    }

    async fn list_containers(&self) -> Result<Vec<Container>, RuntimeError> {
        self.record("ps", "-a")?;
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.record("start", id.as_str())?;
        self.with_container(id, |c| {
            c.status = ContainerStatus::Running;
            Ok(())
        })
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.record("stop", id.as_str())?;
        self.with_container(id, |c| {
            c.status = ContainerStatus::Exited;
            Ok(())
        })
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.record("rm", id.as_str())?;
        let mut all = self.containers.lock().unwrap();
        let Some(pos) = all.iter().position(|c| &c.id == id) else {
            return Err(RuntimeError::NotFound(id.to_string()));
        };
        if all[pos].status.is_running() {
            return Err(RuntimeError::CommandFailed {
                command: format!("docker rm {id}"),
                message: format!(
                    "cannot remove container \"/{id}\": container is running: stop the container before removing or force remove"
                ),
            });
        }
        all.remove(pos);
        Ok(())
    }

    async fn restart_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.record("restart", id.as_str())?;
        self.with_container(id, |c| {
            c.status = ContainerStatus::Running;
            Ok(())
        })
    }

    async fn container_logs(
        &self,
        id: &ContainerId,
        tail: Option<usize>,
    ) -> Result<Vec<String>, RuntimeError> {
        self.record("logs", id.as_str())?;
        let tail = tail.unwrap_or(100);
        self.with_container(id, |c| {
            Ok((1..=3)
                .map(|n| format!("{} line {n}", c.name))
                .take(tail)
                .collect())
        })
    }

    async fn container_stats(&self, id: &ContainerId) -> Result<ContainerStats, RuntimeError> {
        self.record("stats", id.as_str())?;
        self.with_container(id, |_| {
            Ok(ContainerStats {
                cpu_percent: 3.5,
                memory_usage: 64 * 1024 * 1024,
                memory_limit: 1024 * 1024 * 1024,
                memory_percent: 6.25,
                pids: 7,
                ..ContainerStats::default()
            })
        })
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerDetails, RuntimeError> {
        self.record("inspect", id.as_str())?;
        self.with_container(id, |c| {
            Ok(ContainerDetails {
                entries: vec![
                    ("ID".into(), c.id.to_string()),
                    ("Name".into(), c.name.clone()),
                    ("Image".into(), c.image.clone()),
                    ("Status".into(), c.status.to_string()),
                ],
            })
        })
    }

    async fn exec_in_container(
        &self,
        id: &ContainerId,
        command: &str,
    ) -> Result<String, RuntimeError> {
        self.record("exec", id.as_str())?;
        self.with_container(id, |c| {
            if c.status.is_running() {
                Ok(format!("$ {command}\nok\n"))
            } else {
                Err(RuntimeError::CommandFailed {
                    command: format!("docker exec {id}"),
                    message: format!("container {id} is not running"),
                })
            }
        })
    }

    async fn container_env(&self, id: &ContainerId) -> Result<Vec<(String, String)>, RuntimeError> {
        self.record("env", id.as_str())?;
        self.with_container(id, |_| {
            Ok(vec![
                ("POSTGRES_USER".into(), "postgres".into()),
                ("PATH".into(), "/usr/bin".into()),
            ])
        })
    }

    async fn cleanup_system(&self) -> Result<String, RuntimeError> {
        self.record("prune", "-f")?;
        let mut all = self.containers.lock().unwrap();
        let before = all.len();
        all.retain(|c| c.status.is_running());
        Ok(format!("Deleted {} containers", before - all.len()))
    }

    async fn create_postgres_container(
        &self,
        opts: &PostgresOptions,
    ) -> Result<ContainerId, RuntimeError> {
        self.record("run", &opts.name)?;
        let id = ContainerId::new(format!("pg-{}", opts.name));
        let mut all = self.containers.lock().unwrap();
        all.push(Container {
            id: id.clone(),
            name: opts.name.clone(),
            status: ContainerStatus::Running,
            image: format!("{}:{}", opts.image, opts.tag),
            ports: vec![format!("0.0.0.0:{}->5432/tcp", opts.host_port)],
            created_at: None,
            size: "0B".into(),
        });
        Ok(id)
    }
}
