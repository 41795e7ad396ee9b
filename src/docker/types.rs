use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::RuntimeError;

/// Runtime-assigned container identity. Never changes once obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, the way `docker ps` abbreviates ids.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status as shown in the container list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Running,
    Stopped,
    Exited,
}

impl ContainerStatus {
    /// Map a `docker ps` `State` value onto the three statuses the UI tracks.
    pub fn from_state(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "running" | "restarting" => Self::Running,
            "exited" | "dead" => Self::Exited,
            _ => Self::Stopped,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
            Self::Exited => f.write_str("exited"),
        }
    }
}

/// One row of the container list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    pub status: ContainerStatus,
    pub image: String,
    /// Published ports in the order the runtime reports them.
    pub ports: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub size: String,
}

impl Container {
    /// Host ports from the published port list, deduplicated, in order.
    pub fn host_ports(&self) -> Vec<u16> {
        let mut out = Vec::new();
        for mapping in self.ports.iter().filter_map(|p| PortMapping::parse(p)) {
            if let Some(host) = mapping.host_port
                && !out.contains(&host)
            {
                out.push(host);
            }
        }
        out
    }
}

/// A parsed `0.0.0.0:8080->80/tcp` style port entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub host_port: Option<u16>,
    pub container_port: u16,
    pub protocol: String,
}

impl PortMapping {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (published, target) = match raw.split_once("->") {
            Some((host, target)) => (Some(host), target),
            None => (None, raw),
        };

        let (port, protocol) = target.split_once('/').unwrap_or((target, "tcp"));
        // Ranges like 8000-8010 keep only their first port.
        let container_port = port.split('-').next()?.parse().ok()?;

        let host_port = match published {
            Some(host) => Some(host.rsplit(':').next()?.split('-').next()?.parse().ok()?),
            None => None,
        };

        Some(Self {
            host_port,
            container_port,
            protocol: protocol.to_string(),
        })
    }
}

/// Point-in-time resource snapshot for one container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerStats {
    pub cpu_percent: f64,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_percent: f64,
    pub net_rx: u64,
    pub net_tx: u64,
    pub block_read: u64,
    pub block_write: u64,
    pub pids: u32,
}

/// Free-form key/value record for the details view, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetails {
    pub entries: Vec<(String, String)>,
}

impl ContainerDetails {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Lifecycle operation that can be applied to many containers at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Start,
    Stop,
    Remove,
    Restart,
}

impl BulkOperation {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Remove => "remove",
            Self::Restart => "restart",
        }
    }

    /// Present participle for progress labels.
    pub fn progressive(self) -> &'static str {
        match self {
            Self::Start => "Starting",
            Self::Stop => "Stopping",
            Self::Remove => "Removing",
            Self::Restart => "Restarting",
        }
    }
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Outcome of one target inside a bulk operation.
#[derive(Debug)]
pub struct TargetOutcome {
    pub id: ContainerId,
    pub result: Result<(), RuntimeError>,
}

/// Per-target results of a bulk operation, in input order.
#[derive(Debug)]
pub struct BulkReport {
    pub operation: BulkOperation,
    pub outcomes: Vec<TargetOutcome>,
}

impl BulkReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ContainerId> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| &o.id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&ContainerId, &RuntimeError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.id, e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// One line per target, for the report overlay.
    pub fn lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(()) => format!("✓ {}  {}", o.id.short(), self.operation.verb()),
                Err(e) => format!("✗ {}  {e}", o.id.short()),
            })
            .collect()
    }
}

/// Settings for a new PostgreSQL container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresOptions {
    pub name: String,
    pub image: String,
    pub tag: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub host_port: u16,
}
