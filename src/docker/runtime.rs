use async_trait::async_trait;
use futures::future::join_all;

use super::error::{BulkFailure, RuntimeError};
use super::types::{
    BulkOperation, BulkReport, Container, ContainerDetails, ContainerId, ContainerStats,
    PostgresOptions, TargetOutcome,
};

/// Called once per target as a bulk operation resolves it.
pub type BulkObserver<'a> = &'a (dyn Fn(&ContainerId, &Result<(), RuntimeError>) + Send + Sync);

/// Port to the container runtime. Every call may block on process I/O and
/// reports failure only through its `Result`.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Liveness probe; returns the server version.
    async fn check_daemon(&self) -> Result<String, RuntimeError>;

    /// All containers, running and stopped.
    async fn list_containers(&self) -> Result<Vec<Container>, RuntimeError>;

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    /// Stopping an already stopped container succeeds.
    async fn stop_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    async fn remove_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    async fn restart_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    /// Most recent `tail` lines, oldest first. `None` uses the adapter default.
    async fn container_logs(
        &self,
        id: &ContainerId,
        tail: Option<usize>,
    ) -> Result<Vec<String>, RuntimeError>;

    async fn container_stats(&self, id: &ContainerId) -> Result<ContainerStats, RuntimeError>;

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerDetails, RuntimeError>;

    async fn exec_in_container(&self, id: &ContainerId, command: &str)
    -> Result<String, RuntimeError>;

    async fn container_env(&self, id: &ContainerId) -> Result<Vec<(String, String)>, RuntimeError>;

    /// Remove unused runtime resources. Returns the runtime's summary.
    async fn cleanup_system(&self) -> Result<String, RuntimeError>;

    async fn create_postgres_container(
        &self,
        opts: &PostgresOptions,
    ) -> Result<ContainerId, RuntimeError>;

    async fn apply_operation(
        &self,
        id: &ContainerId,
        op: BulkOperation,
    ) -> Result<(), RuntimeError> {
        match op {
            BulkOperation::Start => self.start_container(id).await,
            BulkOperation::Stop => self.stop_container(id).await,
            BulkOperation::Remove => self.remove_container(id).await,
            BulkOperation::Restart => self.restart_container(id).await,
        }
    }

    /// Apply `op` to every id. Targets resolve independently; the report
    /// keeps input order. `Err` iff at least one target failed.
    async fn perform_bulk_operation(
        &self,
        ids: &[ContainerId],
        op: BulkOperation,
    ) -> Result<BulkReport, BulkFailure> {
        let ignore: BulkObserver<'_> = &|_, _| {};
        self.perform_bulk_operation_observed(ids, op, ignore).await
    }

    async fn perform_bulk_operation_observed(
        &self,
        ids: &[ContainerId],
        op: BulkOperation,
        observer: BulkObserver<'_>,
    ) -> Result<BulkReport, BulkFailure> {
        let outcomes = join_all(ids.iter().map(|id| async move {
            let result = self.apply_operation(id, op).await;
            observer(id, &result);
            TargetOutcome {
                id: id.clone(),
                result,
            }
        }))
        .await;

        let report = BulkReport {
            operation: op,
            outcomes,
        };
        if report.all_succeeded() {
            Ok(report)
        } else {
            Err(BulkFailure { report })
        }
    }

    /// Containers whose name or image contains `query`, ignoring case.
    async fn search_containers(&self, query: &str) -> Result<Vec<Container>, RuntimeError> {
        let all = self.list_containers().await?;
        Ok(filter_containers(all, query))
    }
}

pub fn matches_query(container: &Container, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || container.name.to_lowercase().contains(&needle)
        || container.image.to_lowercase().contains(&needle)
}

pub fn filter_containers(containers: Vec<Container>, query: &str) -> Vec<Container> {
    containers
        .into_iter()
        .filter(|c| matches_query(c, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::ContainerStatus;

    fn container(name: &str, image: &str) -> Container {
        Container {
            id: ContainerId::new(format!("id-{name}")),
            name: name.into(),
            status: ContainerStatus::Running,
            image: image.into(),
            ports: Vec::new(),
            created_at: None,
            size: String::new(),
        }
    }

    #[test]
    fn query_matches_name_or_image_case_insensitively() {
        let c = container("Billing-DB", "postgres:16");
        assert!(matches_query(&c, "billing"));
        assert!(matches_query(&c, "POSTGRES"));
        assert!(matches_query(&c, "  db "));
        assert!(!matches_query(&c, "redis"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let all = vec![container("a", "x"), container("b", "y")];
        assert_eq!(filter_containers(all, "").len(), 2);
    }

    #[test]
    fn filter_keeps_order() {
        let all = vec![
            container("api", "node:20"),
            container("cache", "redis:7"),
            container("api-worker", "node:20"),
        ];
        let names: Vec<String> = filter_containers(all, "node")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["api", "api-worker"]);
    }
}
