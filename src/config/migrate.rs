//! Upgrade stored records to the current entry shape.
//!
//! Saved presets were written by three generations of the form:
//!
//! * v1: one port and one volume as scalar `hostPort`/`containerPort` and
//!   `hostPath`/`containerPath` fields
//! * v2: `portBindings`/`bindVolumes` lists
//! * v3: adds `envVars`, `privileged` and `memo`
//!
//! [`normalize`] lifts any of them to [`Entry`]. Applying it to its own
//! output changes nothing.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::config::entry::{new_entry_id, Entry};
use crate::docker::command::build_run_command;
use crate::docker::options::{EnvVar, PortBinding, RunOptions, VolumeBinding, DEFAULT_TAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    V1 = 1,
    V2 = 2,
    V3 = 3,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V3;
}

/// Stored record as read back, every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: Option<String>,
    container_name: Option<String>,
    image_name: Option<String>,
    tag_name: Option<String>,
    remove_after_stop: Option<bool>,
    privileged: Option<bool>,
    env_vars: Option<Vec<EnvVar>>,
    publish_ports: Option<bool>,
    port_bindings: Option<Vec<PortBinding>>,
    bind_volume: Option<bool>,
    bind_volumes: Option<Vec<VolumeBinding>>,
    gpu_mode: Option<String>,
    gpu_ids: Option<String>,
    run_mode: Option<String>,
    command: Option<String>,
    memo: Option<String>,
    command_line: Option<String>,

    // v1 scalars
    host_port: Option<String>,
    container_port: Option<String>,
    host_path: Option<String>,
    container_path: Option<String>,
}

fn is_missing<T>(list: &Option<Vec<T>>) -> bool {
    list.as_ref().map_or(true, |l| l.is_empty())
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

impl RawEntry {
    fn schema_version(&self) -> SchemaVersion {
        let has_scalars = self.host_port.is_some()
            || self.container_port.is_some()
            || self.host_path.is_some()
            || self.container_path.is_some();
        if has_scalars && (is_missing(&self.port_bindings) || is_missing(&self.bind_volumes)) {
            SchemaVersion::V1
        } else if self.env_vars.is_none() && self.privileged.is_none() && self.memo.is_none() {
            SchemaVersion::V2
        } else {
            SchemaVersion::V3
        }
    }

    /// v1 -> v2: turn the scalar port/volume fields into one-row lists
    fn lift_scalar_bindings(&mut self) {
        if is_missing(&self.port_bindings)
            && (non_empty(&self.host_port) || non_empty(&self.container_port))
        {
            self.port_bindings = Some(vec![PortBinding::new(
                self.host_port.take().unwrap_or_default(),
                self.container_port.take().unwrap_or_default(),
            )]);
        }
        if is_missing(&self.bind_volumes)
            && (non_empty(&self.host_path) || non_empty(&self.container_path))
        {
            self.bind_volumes = Some(vec![VolumeBinding::new(
                self.host_path.take().unwrap_or_default(),
                self.container_path.take().unwrap_or_default(),
            )]);
        }
    }

    /// v2 -> v3: env vars, privileged mode and memo arrive
    fn add_v3_fields(&mut self) {
        self.env_vars.get_or_insert_with(Vec::new);
        self.privileged.get_or_insert(false);
        self.memo.get_or_insert_with(String::new);
    }

    fn into_entry(self) -> Entry {
        let mut options = RunOptions {
            container_name: self.container_name.unwrap_or_default(),
            image_name: self.image_name.unwrap_or_default(),
            tag_name: self
                .tag_name
                .filter(|tag| !tag.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TAG.to_string()),
            remove_after_stop: self.remove_after_stop.unwrap_or(false),
            privileged: self.privileged.unwrap_or(false),
            env_vars: self.env_vars.unwrap_or_default(),
            publish_ports: self.publish_ports.unwrap_or(false),
            port_bindings: self.port_bindings.unwrap_or_default(),
            bind_volume: self.bind_volume.unwrap_or(false),
            bind_volumes: self.bind_volumes.unwrap_or_default(),
            gpu_mode: self
                .gpu_mode
                .as_deref()
                .and_then(|mode| mode.parse().ok())
                .unwrap_or_default(),
            gpu_ids: self.gpu_ids.unwrap_or_default(),
            run_mode: self
                .run_mode
                .as_deref()
                .and_then(|mode| mode.parse().ok())
                .unwrap_or_default(),
            command: self.command.unwrap_or_default(),
            memo: self.memo.unwrap_or_default(),
        };
        options.ensure_placeholder_rows();

        let id = self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_entry_id);
        let command_line = self
            .command_line
            .filter(|line| !line.is_empty())
            .unwrap_or_else(|| build_run_command(&options));

        Entry { id, options, command_line }
    }
}

/// Upgrade one stored record. Returns `None` for records that are not
/// objects or whose fields carry the wrong JSON types.
pub fn normalize(raw: Value) -> Option<Entry> {
    if !raw.is_object() {
        tracing::warn!("Skipping stored entry that is not an object");
        return None;
    }
    let mut record: RawEntry = match serde_json::from_value(raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Skipping unreadable stored entry: {}", e);
            return None;
        }
    };

    let version = record.schema_version();
    if version < SchemaVersion::CURRENT {
        tracing::debug!(
            "Upgrading entry {} from schema v{}",
            record.id.as_deref().unwrap_or("<no id>"),
            version as u8
        );
    }
    if version <= SchemaVersion::V1 {
        record.lift_scalar_bindings();
    }
    if version <= SchemaVersion::V2 {
        record.add_v3_fields();
    }

    Some(record.into_entry())
}

/// Result of upgrading a whole stored payload
#[derive(Debug, Default)]
pub struct Normalized {
    pub entries: Vec<Entry>,
    /// Records that got a fresh id, either because theirs was missing or
    /// because an earlier record already used it
    pub ids_assigned: usize,
}

/// Upgrade a whole stored payload. Anything but a list reads as empty.
/// Ids come out unique; the first record keeps a repeated id.
pub fn normalize_all(payload: Value) -> Normalized {
    let records = match payload {
        Value::Array(records) => records,
        _ => {
            tracing::warn!("Stored entries are not a list, starting empty");
            return Normalized::default();
        }
    };

    let mut seen = HashSet::new();
    let mut normalized = Normalized::default();
    for raw in records {
        let had_id = raw.get("id").and_then(Value::as_str).map_or(false, |id| !id.is_empty());
        let Some(mut entry) = normalize(raw) else {
            continue;
        };
        if !had_id {
            normalized.ids_assigned += 1;
        }
        if !seen.insert(entry.id.clone()) {
            tracing::warn!("Stored entry id {} is repeated, assigning a new one", entry.id);
            entry.id = new_entry_id();
            seen.insert(entry.id.clone());
            normalized.ids_assigned += 1;
        }
        normalized.entries.push(entry);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::options::{GpuMode, RunMode};
    use serde_json::json;

    #[test]
    fn test_v1_scalar_port_becomes_binding_list() {
        let entry = normalize(json!({
            "id": "legacy-1",
            "hostPort": "8080",
            "containerPort": "80",
            "imageName": "x"
        }))
        .unwrap();

        assert_eq!(entry.options.port_bindings, vec![PortBinding::new("8080", "80")]);
        assert_eq!(entry.options.bind_volumes, vec![VolumeBinding::default()]);
        assert_eq!(entry.options.tag_name, "latest");
        assert_eq!(entry.command_line, build_run_command(&entry.options));
        assert_eq!(entry.command_line, "docker run -it x:latest");
    }

    #[test]
    fn test_v1_full_record() {
        let entry = normalize(json!({
            "id": "legacy-2",
            "containerName": "db",
            "imageName": "postgres",
            "tagName": "16",
            "removeAfterStop": false,
            "publishPorts": true,
            "hostPort": "5432",
            "containerPort": "5432",
            "bindVolume": true,
            "hostPath": "/srv/pg",
            "containerPath": "/var/lib/postgresql/data",
            "gpuMode": "none",
            "gpuIds": "",
            "runMode": "detach",
            "command": "",
            "commandLine": ""
        }))
        .unwrap();

        assert_eq!(
            entry.options.bind_volumes,
            vec![VolumeBinding::new("/srv/pg", "/var/lib/postgresql/data")]
        );
        assert_eq!(entry.options.env_vars, vec![EnvVar::default()]);
        assert!(!entry.options.privileged);
        assert_eq!(entry.options.memo, "");
        assert_eq!(
            entry.command_line,
            "docker run -d --name db -p 5432:5432 -v /srv/pg:/var/lib/postgresql/data postgres:16"
        );
    }

    #[test]
    fn test_blank_scalars_give_placeholder_rows() {
        let entry = normalize(json!({
            "id": "legacy-3",
            "hostPort": "",
            "containerPort": " ",
            "imageName": "x"
        }))
        .unwrap();

        assert_eq!(entry.options.port_bindings, vec![PortBinding::default()]);
    }

    #[test]
    fn test_v2_record_gets_v3_defaults() {
        let entry = normalize(json!({
            "id": "v2",
            "imageName": "nginx",
            "tagName": "",
            "portBindings": [],
            "bindVolumes": [{"hostPath": "/a", "containerPath": "/b"}],
            "commandLine": "docker run -it nginx:latest"
        }))
        .unwrap();

        assert_eq!(entry.options.tag_name, "latest");
        assert_eq!(entry.options.env_vars, vec![EnvVar::default()]);
        assert_eq!(entry.options.port_bindings, vec![PortBinding::default()]);
        assert_eq!(entry.options.bind_volumes, vec![VolumeBinding::new("/a", "/b")]);
        assert_eq!(entry.command_line, "docker run -it nginx:latest");
    }

    #[test]
    fn test_existing_command_line_is_kept() {
        let entry = normalize(json!({
            "id": "keep",
            "imageName": "nginx",
            "commandLine": "docker run -d nginx:latest"
        }))
        .unwrap();

        assert_eq!(entry.command_line, "docker run -d nginx:latest");
    }

    #[test]
    fn test_missing_id_gets_fresh_one() {
        let a = normalize(json!({"imageName": "nginx"})).unwrap();
        let b = normalize(json!({"id": "", "imageName": "nginx"})).unwrap();

        assert!(!a.id.is_empty());
        assert!(!b.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_unknown_modes_fall_back() {
        let entry = normalize(json!({
            "id": "modes",
            "gpuMode": "some",
            "runMode": "background"
        }))
        .unwrap();

        assert_eq!(entry.options.gpu_mode, GpuMode::None);
        assert_eq!(entry.options.run_mode, RunMode::Interactive);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = json!({
            "id": "twice",
            "hostPath": "/data",
            "containerPath": "/data",
            "bindVolume": true,
            "imageName": "alpine",
            "envVars": []
        });
        let once = normalize(raw).unwrap();
        let twice = normalize(serde_json::to_value(&once).unwrap()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_current_entry_passes_through_unchanged() {
        let entry = Entry::with_id(
            "current".to_string(),
            RunOptions {
                image_name: "busybox".to_string(),
                env_vars: vec![EnvVar::new("A", "1")],
                privileged: true,
                memo: "note".to_string(),
                ..Default::default()
            },
        );
        let back = normalize(serde_json::to_value(&entry).unwrap()).unwrap();

        assert_eq!(back, entry);
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let normalized = normalize_all(json!([
            "not an object",
            {"id": "bad", "privileged": "yes"},
            {"id": "good", "imageName": "nginx"},
            42
        ]));

        assert_eq!(normalized.entries.len(), 1);
        assert_eq!(normalized.entries[0].id, "good");
        assert_eq!(normalized.ids_assigned, 0);
    }

    #[test]
    fn test_non_list_payload_reads_empty() {
        assert!(normalize_all(json!({"entries": []})).entries.is_empty());
        assert!(normalize_all(json!(null)).entries.is_empty());
    }

    #[test]
    fn test_repeated_ids_are_made_unique() {
        let normalized = normalize_all(json!([
            {"id": "same", "imageName": "a"},
            {"id": "same", "imageName": "b"},
            {"imageName": "c"}
        ]));
        let ids: Vec<&str> = normalized.entries.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids[0], "same");
        assert_ne!(ids[1], "same");
        assert!(!ids[2].is_empty());
        assert_ne!(ids[1], ids[2]);
        assert_eq!(normalized.entries[1].options.image_name, "b");
        assert_eq!(normalized.ids_assigned, 2);
    }

    #[test]
    fn test_schema_detection() {
        let v1: RawEntry = serde_json::from_value(json!({"hostPort": "1"})).unwrap();
        let v2: RawEntry = serde_json::from_value(json!({"portBindings": []})).unwrap();
        let v3: RawEntry = serde_json::from_value(json!({"memo": ""})).unwrap();

        assert_eq!(v1.schema_version(), SchemaVersion::V1);
        assert_eq!(v2.schema_version(), SchemaVersion::V2);
        assert_eq!(v3.schema_version(), SchemaVersion::V3);
    }
}
