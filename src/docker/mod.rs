// Runtime adapter: drives the container CLI and parses what it prints.

pub mod cli;
pub mod engine;
pub mod error;
pub mod generate;
pub mod parse;
pub mod runtime;
pub mod types;

pub use cli::{DEFAULT_LOG_TAIL, DockerCli};
pub use error::{BulkFailure, RuntimeError};
pub use generate::{generate_docker_compose, generate_environment_variables};
pub use runtime::{BulkObserver, ContainerRuntime, filter_containers, matches_query};
pub use types::{
    BulkOperation, BulkReport, Container, ContainerDetails, ContainerId, ContainerStats,
    ContainerStatus, PortMapping, PostgresOptions, TargetOutcome,
};
