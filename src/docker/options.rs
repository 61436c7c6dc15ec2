use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag used whenever the form leaves the tag blank
pub const DEFAULT_TAG: &str = "latest";

/// GPU passthrough selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuMode {
    #[default]
    None,
    All,
    Custom,
}

/// How the container is attached to the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Detach,
    #[default]
    Interactive,
}

impl FromStr for GpuMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            other => Err(format!("Unknown GPU mode '{}'", other)),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "detach" => Ok(Self::Detach),
            "interactive" => Ok(Self::Interactive),
            other => Err(format!("Unknown run mode '{}'", other)),
        }
    }
}

impl fmt::Display for GpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::All => "all",
            Self::Custom => "custom",
        };
        f.write_str(label)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Detach => "detach",
            Self::Interactive => "interactive",
        };
        f.write_str(label)
    }
}

/// Environment variable row (`-e KEY[=VALUE]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Published port row (`-p HOST:CONTAINER`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortBinding {
    #[serde(default)]
    pub host_port: String,
    #[serde(default)]
    pub container_port: String,
}

/// Bind mount row (`-v HOST:CONTAINER`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeBinding {
    #[serde(default)]
    pub host_path: String,
    #[serde(default)]
    pub container_path: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl PortBinding {
    pub fn new(host_port: impl Into<String>, container_port: impl Into<String>) -> Self {
        Self { host_port: host_port.into(), container_port: container_port.into() }
    }

    /// Both sides present after trimming
    pub fn is_complete(&self) -> bool {
        !self.host_port.trim().is_empty() && !self.container_port.trim().is_empty()
    }
}

impl VolumeBinding {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self { host_path: host_path.into(), container_path: container_path.into() }
    }

    /// Both sides present after trimming
    pub fn is_complete(&self) -> bool {
        !self.host_path.trim().is_empty() && !self.container_path.trim().is_empty()
    }
}

/// Working state of the wizard form: everything needed to synthesize one
/// `docker run` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub container_name: String,
    pub image_name: String,
    pub tag_name: String,
    pub remove_after_stop: bool,
    pub privileged: bool,
    pub env_vars: Vec<EnvVar>,
    pub publish_ports: bool,
    pub port_bindings: Vec<PortBinding>,
    pub bind_volume: bool,
    pub bind_volumes: Vec<VolumeBinding>,
    pub gpu_mode: GpuMode,
    pub gpu_ids: String,
    pub run_mode: RunMode,
    pub command: String,
    /// Free-text note, never part of the command line
    pub memo: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            container_name: String::new(),
            image_name: String::new(),
            tag_name: DEFAULT_TAG.to_string(),
            remove_after_stop: false,
            privileged: false,
            env_vars: vec![EnvVar::default()],
            publish_ports: false,
            port_bindings: vec![PortBinding::default()],
            bind_volume: false,
            bind_volumes: vec![VolumeBinding::default()],
            gpu_mode: GpuMode::None,
            gpu_ids: String::new(),
            run_mode: RunMode::Interactive,
            command: String::new(),
            memo: String::new(),
        }
    }
}

impl RunOptions {
    /// An image name is the only field the wizard insists on
    pub fn is_complete(&self) -> bool {
        !self.image_name.trim().is_empty()
    }

    /// Keep one editable row in every repeated list. Blank rows are only
    /// dropped when the command line is built.
    pub fn ensure_placeholder_rows(&mut self) {
        if self.env_vars.is_empty() {
            self.env_vars.push(EnvVar::default());
        }
        if self.port_bindings.is_empty() {
            self.port_bindings.push(PortBinding::default());
        }
        if self.bind_volumes.is_empty() {
            self.bind_volumes.push(VolumeBinding::default());
        }
    }

    pub fn with_placeholder_rows(mut self) -> Self {
        self.ensure_placeholder_rows();
        self
    }
}
