// Parsers for the JSON and line output of the runtime CLI.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::error::RuntimeError;
use super::types::{Container, ContainerDetails, ContainerId, ContainerStats, ContainerStatus};

/// One line of `docker ps --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsRow {
    #[serde(rename = "ID")]
    id: String,
    names: String,
    image: String,
    state: String,
    #[serde(default)]
    ports: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    size: String,
}

/// Parse the line-delimited JSON of `docker ps`. Blank lines are skipped.
pub fn parse_ps_lines(raw: &str) -> Result<Vec<Container>, RuntimeError> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let row: PsRow = serde_json::from_str(line)?;
            Ok(Container {
                id: ContainerId::new(row.id),
                // Multiple names are comma separated; the first is canonical.
                name: row.names.split(',').next().unwrap_or_default().to_string(),
                status: ContainerStatus::from_state(&row.state),
                image: row.image,
                ports: split_ports(&row.ports),
                created_at: parse_created_at(&row.created_at),
                size: row.size,
            })
        })
        .collect()
}

fn split_ports(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `2024-01-15 10:30:00 +0000 UTC`. The trailing zone name is redundant
/// with the offset and is dropped.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let without_zone = match raw.rsplit_once(' ') {
        Some((head, zone)) if zone.chars().all(|c| c.is_ascii_alphabetic()) => head,
        _ => raw,
    };
    DateTime::parse_from_str(without_zone, "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One line of `docker stats --no-stream --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(rename = "CPUPerc")]
    cpu_perc: String,
    #[serde(rename = "MemUsage")]
    mem_usage: String,
    #[serde(rename = "MemPerc")]
    mem_perc: String,
    #[serde(rename = "NetIO")]
    net_io: String,
    #[serde(rename = "BlockIO")]
    block_io: String,
    #[serde(rename = "PIDs")]
    pids: String,
}

pub fn parse_stats_line(raw: &str) -> Result<ContainerStats, RuntimeError> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| RuntimeError::Parse("empty stats output".into()))?;
    let row: StatsRow = serde_json::from_str(line)?;

    let (memory_usage, memory_limit) = parse_size_pair(&row.mem_usage)?;
    let (net_rx, net_tx) = parse_size_pair(&row.net_io)?;
    let (block_read, block_write) = parse_size_pair(&row.block_io)?;

    Ok(ContainerStats {
        cpu_percent: parse_percent(&row.cpu_perc)?,
        memory_usage,
        memory_limit,
        memory_percent: parse_percent(&row.mem_perc)?,
        net_rx,
        net_tx,
        block_read,
        block_write,
        pids: row.pids.trim().parse().unwrap_or(0),
    })
}

fn parse_percent(raw: &str) -> Result<f64, RuntimeError> {
    let trimmed = raw.trim().trim_end_matches('%');
    if trimmed == "--" || trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse()
        .map_err(|_| RuntimeError::Parse(format!("bad percentage: {raw}")))
}

fn parse_size_pair(raw: &str) -> Result<(u64, u64), RuntimeError> {
    let (left, right) = raw
        .split_once('/')
        .ok_or_else(|| RuntimeError::Parse(format!("expected `a / b`: {raw}")))?;
    Ok((parse_size(left)?, parse_size(right)?))
}

/// Parse a human size such as `1.5MiB`, `12kB`, or `0B` into bytes.
pub fn parse_size(raw: &str) -> Result<u64, RuntimeError> {
    let raw = raw.trim();
    if raw == "--" || raw.is_empty() {
        return Ok(0);
    }
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| RuntimeError::Parse(format!("bad size: {raw}")))?;

    let multiplier: f64 = match unit.trim() {
        "" | "B" => 1.0,
        "kB" | "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        other => return Err(RuntimeError::Parse(format!("unknown size unit: {other}"))),
    };
    Ok((value * multiplier).round() as u64)
}

/// Flatten `docker inspect` output into display rows.
pub fn parse_inspect(raw: &str) -> Result<ContainerDetails, RuntimeError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let obj = parsed
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| RuntimeError::Parse("inspect returned no objects".into()))?;

    let text = |ptr: &str| -> Option<String> {
        obj.pointer(ptr)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let mut entries: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            entries.push((key.to_string(), v));
        }
    };

    push("ID", text("/Id"));
    push(
        "Name",
        text("/Name").map(|n| n.trim_start_matches('/').to_string()),
    );
    push("Image", text("/Config/Image"));
    push("Status", text("/State/Status"));
    push("Started", text("/State/StartedAt"));
    if obj.pointer("/State/Running").and_then(Value::as_bool) == Some(false) {
        push("Finished", text("/State/FinishedAt"));
        push(
            "Exit code",
            obj.pointer("/State/ExitCode")
                .and_then(Value::as_i64)
                .map(|c| c.to_string()),
        );
    }
    push("Created", text("/Created"));
    push("Command", command_line(obj));
    push("Restart policy", text("/HostConfig/RestartPolicy/Name"));
    push("IP address", ip_address(obj));
    push("Networks", joined_keys(obj.pointer("/NetworkSettings/Networks")));
    push("Ports", port_bindings(obj.pointer("/NetworkSettings/Ports")));
    push("Mounts", mounts(obj.pointer("/Mounts")));
    push(
        "Env vars",
        obj.pointer("/Config/Env")
            .and_then(Value::as_array)
            .map(|a| a.len().to_string()),
    );

    Ok(ContainerDetails { entries })
}

fn command_line(obj: &Value) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(path) = obj.pointer("/Path").and_then(Value::as_str) {
        parts.push(path.to_string());
    }
    if let Some(args) = obj.pointer("/Args").and_then(Value::as_array) {
        parts.extend(args.iter().filter_map(Value::as_str).map(String::from));
    }
    if parts.is_empty() {
        None
    } else {
        Some(shell_words::join(parts))
    }
}

fn ip_address(obj: &Value) -> Option<String> {
    if let Some(ip) = obj
        .pointer("/NetworkSettings/IPAddress")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return Some(ip.to_string());
    }
    obj.pointer("/NetworkSettings/Networks")
        .and_then(Value::as_object)?
        .values()
        .filter_map(|n| n.get("IPAddress").and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn joined_keys(value: Option<&Value>) -> Option<String> {
    let map = value?.as_object()?;
    if map.is_empty() {
        return None;
    }
    Some(map.keys().cloned().collect::<Vec<_>>().join(", "))
}

fn port_bindings(value: Option<&Value>) -> Option<String> {
    let map = value?.as_object()?;
    let mut out = Vec::new();
    for (port, bindings) in map {
        match bindings.as_array() {
            Some(list) if !list.is_empty() => {
                for b in list {
                    let ip = b.get("HostIp").and_then(Value::as_str).unwrap_or("");
                    let host = b.get("HostPort").and_then(Value::as_str).unwrap_or("");
                    out.push(format!("{port} -> {ip}:{host}"));
                }
            }
            _ => out.push(port.clone()),
        }
    }
    if out.is_empty() { None } else { Some(out.join(", ")) }
}

fn mounts(value: Option<&Value>) -> Option<String> {
    let list = value?.as_array()?;
    let rendered: Vec<String> = list
        .iter()
        .map(|m| {
            let src = m
                .get("Name")
                .or_else(|| m.get("Source"))
                .and_then(Value::as_str)
                .unwrap_or("?");
            let dst = m.get("Destination").and_then(Value::as_str).unwrap_or("?");
            format!("{src} -> {dst}")
        })
        .collect();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join(", "))
    }
}

/// Parse `docker inspect --format '{{json .Config.Env}}'` into ordered pairs.
pub fn parse_env(raw: &str) -> Result<Vec<(String, String)>, RuntimeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let vars: Vec<String> = serde_json::from_str(trimmed)?;
    Ok(vars
        .into_iter()
        .map(|kv| {
            let (k, v) = kv.split_once('=').unwrap_or((kv.as_str(), ""));
            (k.to_string(), v.to_string())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_OUTPUT: &str = r#"{"Command":"\"docker-entrypoint.s…\"","CreatedAt":"2024-01-15 10:30:00 +0000 UTC","ID":"a1b2c3d4e5f6","Image":"postgres:16","Labels":"","LocalVolumes":"1","Mounts":"pgdata","Names":"db","Networks":"bridge","Ports":"0.0.0.0:5432->5432/tcp, :::5432->5432/tcp","RunningFor":"2 hours ago","Size":"63B (virtual 432MB)","State":"running","Status":"Up 2 hours"}
{"Command":"\"nginx -g 'daemon of…\"","CreatedAt":"2024-01-14 08:00:00 +0100 CET","ID":"f6e5d4c3b2a1","Image":"nginx:alpine","Labels":"","LocalVolumes":"0","Mounts":"","Names":"web","Networks":"bridge","Ports":"","RunningFor":"1 day ago","Size":"2B (virtual 43MB)","State":"exited","Status":"Exited (0) 3 hours ago"}
"#;

    // ── ps ────────────────────────────────────────────────────────────

    #[test]
    fn ps_lines_become_containers() {
        let containers = parse_ps_lines(PS_OUTPUT).unwrap();
        assert_eq!(containers.len(), 2);

        let db = &containers[0];
        assert_eq!(db.id.as_str(), "a1b2c3d4e5f6");
        assert_eq!(db.name, "db");
        assert_eq!(db.status, ContainerStatus::Running);
        assert_eq!(db.image, "postgres:16");
        assert_eq!(db.ports.len(), 2);
        assert_eq!(db.ports[0], "0.0.0.0:5432->5432/tcp");
        assert_eq!(db.size, "63B (virtual 432MB)");

        let web = &containers[1];
        assert_eq!(web.status, ContainerStatus::Exited);
        assert!(web.ports.is_empty());
    }

    #[test]
    fn ps_empty_output_is_empty_list() {
        assert!(parse_ps_lines("").unwrap().is_empty());
        assert!(parse_ps_lines("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn ps_garbage_is_parse_error() {
        let err = parse_ps_lines("not json").unwrap_err();
        assert!(matches!(err, RuntimeError::Parse(_)));
    }

    #[test]
    fn created_at_respects_offset() {
        let dt = parse_created_at("2024-01-14 08:00:00 +0100 CET").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-14T07:00:00+00:00");
        assert!(parse_created_at("yesterday").is_none());
    }

    // ── stats ─────────────────────────────────────────────────────────

    #[test]
    fn stats_line_parses_all_fields() {
        let raw = r#"{"BlockIO":"4.1MB / 0B","CPUPerc":"1.25%","Container":"a1","ID":"a1","MemPerc":"0.50%","MemUsage":"38.5MiB / 7.5GiB","Name":"db","NetIO":"1.2kB / 648B","PIDs":"7"}"#;
        let stats = parse_stats_line(raw).unwrap();
        assert_eq!(stats.cpu_percent, 1.25);
        assert_eq!(stats.memory_percent, 0.5);
        assert_eq!(stats.memory_usage, (38.5 * 1024.0 * 1024.0) as u64);
        assert_eq!(stats.memory_limit, (7.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert_eq!(stats.net_rx, 1200);
        assert_eq!(stats.net_tx, 648);
        assert_eq!(stats.block_read, 4_100_000);
        assert_eq!(stats.block_write, 0);
        assert_eq!(stats.pids, 7);
    }

    #[test]
    fn stats_of_stopped_container_reads_as_zero() {
        let raw = r#"{"BlockIO":"--","CPUPerc":"--","MemPerc":"--","MemUsage":"-- / --","NetIO":"--","PIDs":"--"}"#;
        // "--" without a slash is not a pair.
        assert!(parse_stats_line(raw).is_err());

        let raw = r#"{"BlockIO":"-- / --","CPUPerc":"--","MemPerc":"--","MemUsage":"-- / --","NetIO":"-- / --","PIDs":"--"}"#;
        let stats = parse_stats_line(raw).unwrap();
        assert_eq!(stats, ContainerStats::default());
    }

    #[test]
    fn stats_empty_output_is_error() {
        assert!(parse_stats_line("").is_err());
    }

    #[test]
    fn size_units() {
        assert_eq!(parse_size("0B").unwrap(), 0);
        assert_eq!(parse_size("12kB").unwrap(), 12_000);
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size(" 2GB ").unwrap(), 2_000_000_000);
        assert!(parse_size("12XB").is_err());
        assert!(parse_size("MB").is_err());
    }

    // ── inspect / env ─────────────────────────────────────────────────

    #[test]
    fn inspect_flattens_interesting_fields() {
        let raw = r#"[{
            "Id": "a1b2c3",
            "Created": "2024-01-15T10:30:00Z",
            "Path": "docker-entrypoint.sh",
            "Args": ["postgres"],
            "Name": "/db",
            "State": {"Status": "exited", "Running": false, "ExitCode": 137,
                      "StartedAt": "2024-01-15T10:30:01Z", "FinishedAt": "2024-01-15T12:00:00Z"},
            "HostConfig": {"RestartPolicy": {"Name": "unless-stopped"}},
            "Config": {"Image": "postgres:16", "Env": ["A=1", "B=2"]},
            "Mounts": [{"Name": "pgdata", "Destination": "/var/lib/postgresql/data"}],
            "NetworkSettings": {
                "IPAddress": "",
                "Ports": {"5432/tcp": [{"HostIp": "0.0.0.0", "HostPort": "5432"}]},
                "Networks": {"bridge": {"IPAddress": "172.17.0.2"}}
            }
        }]"#;
        let details = parse_inspect(raw).unwrap();
        assert_eq!(details.get("Name"), Some("db"));
        assert_eq!(details.get("Status"), Some("exited"));
        assert_eq!(details.get("Exit code"), Some("137"));
        assert_eq!(details.get("Command"), Some("docker-entrypoint.sh postgres"));
        assert_eq!(details.get("IP address"), Some("172.17.0.2"));
        assert_eq!(details.get("Ports"), Some("5432/tcp -> 0.0.0.0:5432"));
        assert_eq!(details.get("Mounts"), Some("pgdata -> /var/lib/postgresql/data"));
        assert_eq!(details.get("Env vars"), Some("2"));
        assert_eq!(details.entries[0].0, "ID");
    }

    #[test]
    fn inspect_empty_array_is_error() {
        assert!(parse_inspect("[]").is_err());
    }

    #[test]
    fn env_pairs_keep_order_and_equals_in_values() {
        let env = parse_env(r#"["PATH=/usr/bin","DSN=a=b","EMPTY"]"#).unwrap();
        assert_eq!(
            env,
            vec![
                ("PATH".to_string(), "/usr/bin".to_string()),
                ("DSN".to_string(), "a=b".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
        assert!(parse_env("null").unwrap().is_empty());
    }
}
