// Text generators over an in-memory container list. No runtime calls.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::types::{Container, PortMapping};

const VITE_PREFIX: &str = "VITE_";

/// `KEY=VALUE` lines describing how to reach each container from the host.
///
/// Per container, in input order: `<NAME>_HOST`, one `<NAME>_PORT` per
/// published host port (`_PORT_2`, `_PORT_3`, ... after the first), and a
/// `<NAME>_URL` for PostgreSQL images. `is_vite` prefixes every key with
/// `VITE_` so the values are exposed to Vite client code.
pub fn generate_environment_variables(containers: &[Container], is_vite: bool) -> String {
    let prefix = if is_vite { VITE_PREFIX } else { "" };
    let mut lines = Vec::new();

    for c in containers {
        let key = env_key(&c.name);
        let ports = c.host_ports();

        lines.push(format!("{prefix}{key}_HOST=localhost"));
        for (i, port) in ports.iter().enumerate() {
            let suffix = if i == 0 {
                String::new()
            } else {
                format!("_{}", i + 1)
            };
            lines.push(format!("{prefix}{key}_PORT{suffix}={port}"));
        }
        if is_postgres(&c.image)
            && let Some(port) = ports.first()
        {
            lines.push(format!("{prefix}{key}_URL=postgresql://localhost:{port}"));
        }
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Upper-case the name and map everything outside `[A-Z0-9]` to `_`.
pub fn env_key(name: &str) -> String {
    let mut key: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

/// Matches on the last path segment with tag and digest stripped, so a
/// registry host with a port is not mistaken for the repository.
fn is_postgres(image: &str) -> bool {
    let image = image.split('@').next().unwrap_or(image);
    let last = image.rsplit('/').next().unwrap_or(image);
    let repo = last.split(':').next().unwrap_or(last);
    repo == "postgres" || repo == "postgis"
}

#[derive(Debug, Serialize)]
struct ComposeService {
    image: String,
    container_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    restart: &'static str,
}

/// A compose file with one service per container, keyed by container name in
/// input order.
pub fn generate_docker_compose(containers: &[Container]) -> String {
    let mut services = Mapping::new();
    for c in containers {
        let service = ComposeService {
            image: c.image.clone(),
            container_name: c.name.clone(),
            ports: compose_ports(&c.ports),
            restart: "unless-stopped",
        };
        // Serializing a plain struct of strings cannot fail.
        let value = serde_yaml::to_value(service).unwrap_or(Value::Null);
        services.insert(Value::String(c.name.clone()), value);
    }

    let mut root = Mapping::new();
    root.insert(Value::String("services".into()), Value::Mapping(services));
    serde_yaml::to_string(&root).unwrap_or_default()
}

/// `0.0.0.0:8080->80/tcp` → `8080:80`. Unpublished ports are dropped and
/// the IPv4/IPv6 duplicates collapse.
fn compose_ports(ports: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for mapping in ports.iter().filter_map(|p| PortMapping::parse(p)) {
        let Some(host) = mapping.host_port else {
            continue;
        };
        let mut entry = format!("{host}:{}", mapping.container_port);
        if mapping.protocol != "tcp" {
            entry.push('/');
            entry.push_str(&mapping.protocol);
        }
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}
