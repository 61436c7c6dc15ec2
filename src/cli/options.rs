use anyhow::Result;
use clap::Args;

use crate::docker::options::{EnvVar, GpuMode, PortBinding, RunMode, RunOptions, VolumeBinding};

/// Form fields as command-line flags. Every flag is optional so the same set
/// serves `new`, `preview` and `edit` (where only given flags change).
#[derive(Args, Debug, Default)]
pub struct OptionArgs {
    /// Container name
    #[arg(long = "name", value_name = "NAME")]
    pub container_name: Option<String>,

    /// Image to run, optionally with an explicit :tag
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Image tag (ignored when the image already names one)
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Remove the container after it stops (--rm)
    #[arg(long, overrides_with = "no_rm")]
    pub rm: bool,

    /// Keep the container after it stops
    #[arg(long, overrides_with = "rm")]
    pub no_rm: bool,

    /// Run in privileged mode
    #[arg(long, overrides_with = "no_privileged")]
    pub privileged: bool,

    /// Drop privileged mode
    #[arg(long, overrides_with = "privileged")]
    pub no_privileged: bool,

    /// Environment variable (repeatable)
    #[arg(short, long = "env", value_name = "KEY[=VALUE]")]
    pub env: Vec<String>,

    /// Publish a port (repeatable, enables port publishing)
    #[arg(short = 'p', long = "publish", value_name = "HOST:CONTAINER")]
    pub publish: Vec<String>,

    /// Bind a host path (repeatable, enables volume binding)
    #[arg(short = 'v', long = "volume", value_name = "HOST:CONTAINER")]
    pub volume: Vec<String>,

    /// GPU access: none, all, or a comma-separated device list
    #[arg(long, value_name = "none|all|IDS")]
    pub gpus: Option<String>,

    /// Run detached (-d)
    #[arg(short, long, conflicts_with = "interactive")]
    pub detach: bool,

    /// Run attached to a terminal (-it)
    #[arg(short, long)]
    pub interactive: bool,

    /// Free-text note stored with the entry
    #[arg(long)]
    pub memo: Option<String>,

    /// Command and arguments for the container (after --)
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl OptionArgs {
    /// Whether any flag was given at all
    pub fn has_overrides(&self) -> bool {
        self.container_name.is_some()
            || self.image.is_some()
            || self.tag.is_some()
            || self.rm
            || self.no_rm
            || self.privileged
            || self.no_privileged
            || !self.env.is_empty()
            || !self.publish.is_empty()
            || !self.volume.is_empty()
            || self.gpus.is_some()
            || self.detach
            || self.interactive
            || self.memo.is_some()
            || !self.command.is_empty()
    }

    /// Overwrite the fields named by flags. List flags replace whole lists.
    pub fn apply_to(&self, options: &mut RunOptions) -> Result<()> {
        if let Some(name) = &self.container_name {
            options.container_name = name.clone();
        }
        if let Some(image) = &self.image {
            options.image_name = image.clone();
        }
        if let Some(tag) = &self.tag {
            options.tag_name = tag.clone();
        }

        if self.rm {
            options.remove_after_stop = true;
        } else if self.no_rm {
            options.remove_after_stop = false;
        }
        if self.privileged {
            options.privileged = true;
        } else if self.no_privileged {
            options.privileged = false;
        }

        if !self.env.is_empty() {
            options.env_vars = self.env.iter().map(|s| parse_env(s)).collect();
        }
        if !self.publish.is_empty() {
            options.port_bindings = self
                .publish
                .iter()
                .map(|s| parse_port(s))
                .collect::<Result<_>>()?;
            options.publish_ports = true;
        }
        if !self.volume.is_empty() {
            options.bind_volumes = self
                .volume
                .iter()
                .map(|s| parse_volume(s))
                .collect::<Result<_>>()?;
            options.bind_volume = true;
        }

        if let Some(gpus) = &self.gpus {
            let (mode, ids) = parse_gpus(gpus);
            options.gpu_mode = mode;
            options.gpu_ids = ids;
        }

        if self.detach {
            options.run_mode = RunMode::Detach;
        } else if self.interactive {
            options.run_mode = RunMode::Interactive;
        }

        if let Some(memo) = &self.memo {
            options.memo = memo.clone();
        }
        if !self.command.is_empty() {
            options.command = self.command.join(" ");
        }

        options.ensure_placeholder_rows();
        Ok(())
    }
}

/// `KEY=VALUE` or a bare `KEY`
pub fn parse_env(input: &str) -> EnvVar {
    match input.split_once('=') {
        Some((key, value)) => EnvVar::new(key.trim(), value.trim()),
        None => EnvVar::new(input.trim(), ""),
    }
}

/// `HOST:CONTAINER`; the host side may carry an address (`127.0.0.1:8080:80`)
pub fn parse_port(input: &str) -> Result<PortBinding> {
    match input.trim().rsplit_once(':') {
        Some((host, container)) => Ok(PortBinding::new(host.trim(), container.trim())),
        None => anyhow::bail!("Invalid port binding '{}'. Expected HOST:CONTAINER", input),
    }
}

/// `HOST:CONTAINER`, split at the last colon so drive letters survive
pub fn parse_volume(input: &str) -> Result<VolumeBinding> {
    match input.trim().rsplit_once(':') {
        Some((host, container)) => Ok(VolumeBinding::new(host.trim(), container.trim())),
        None => anyhow::bail!("Invalid volume binding '{}'. Expected HOST:CONTAINER", input),
    }
}

pub fn parse_gpus(input: &str) -> (GpuMode, String) {
    match input.trim() {
        "" | "none" => (GpuMode::None, String::new()),
        "all" => (GpuMode::All, String::new()),
        ids => (GpuMode::Custom, ids.to_string()),
    }
}

pub fn format_env(env: &EnvVar) -> Option<String> {
    match (env.key.trim(), env.value.trim()) {
        ("", "") => None,
        (key, "") => Some(key.to_string()),
        (key, value) => Some(format!("{}={}", key, value)),
    }
}

pub fn format_port(binding: &PortBinding) -> Option<String> {
    match (binding.host_port.trim(), binding.container_port.trim()) {
        ("", "") => None,
        (host, container) => Some(format!("{}:{}", host, container)),
    }
}

pub fn format_volume(binding: &VolumeBinding) -> Option<String> {
    match (binding.host_path.trim(), binding.container_path.trim()) {
        ("", "") => None,
        (host, container) => Some(format!("{}:{}", host, container)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::command::build_run_command;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        options: OptionArgs,
    }

    fn parse(args: &[&str]) -> OptionArgs {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().options
    }

    #[test]
    fn test_flags_build_web_preset() {
        let args = parse(&["--name", "web", "--image", "nginx", "--rm", "-d", "-p", "8080:80"]);
        let mut options = RunOptions::default();
        args.apply_to(&mut options).unwrap();

        assert_eq!(
            build_run_command(&options),
            "docker run --rm -d --name web -p 8080:80 nginx:latest"
        );
    }

    #[test]
    fn test_trailing_command_and_env() {
        let args = parse(&[
            "--image", "python:3.12", "-e", "A=1", "-e", "DEBUG", "--gpus", "0,1", "--", "python", "-m",
            "http.server",
        ]);
        let mut options = RunOptions::default();
        args.apply_to(&mut options).unwrap();

        assert_eq!(options.env_vars, vec![EnvVar::new("A", "1"), EnvVar::new("DEBUG", "")]);
        assert_eq!(options.gpu_mode, GpuMode::Custom);
        assert_eq!(options.command, "python -m http.server");
        assert_eq!(
            build_run_command(&options),
            "docker run -it -e A=1 -e DEBUG --gpus \"device=0,1\" python:3.12 python -m http.server"
        );
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut options = RunOptions {
            container_name: "db".to_string(),
            image_name: "postgres".to_string(),
            remove_after_stop: true,
            publish_ports: true,
            port_bindings: vec![PortBinding::new("5432", "5432")],
            ..Default::default()
        };
        let args = parse(&["--no-rm", "--memo", "staging"]);
        assert!(args.has_overrides());
        args.apply_to(&mut options).unwrap();

        assert!(!options.remove_after_stop);
        assert_eq!(options.memo, "staging");
        assert_eq!(options.container_name, "db");
        assert_eq!(options.port_bindings, vec![PortBinding::new("5432", "5432")]);
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        assert!(!parse(&[]).has_overrides());
    }

    #[test]
    fn test_detach_conflicts_with_interactive() {
        assert!(TestCli::try_parse_from(["test", "-d", "-i"]).is_err());
    }

    #[test]
    fn test_binding_parsers() {
        assert_eq!(parse_port("127.0.0.1:8080:80").unwrap(), PortBinding::new("127.0.0.1:8080", "80"));
        assert!(parse_port("8080").is_err());
        assert_eq!(
            parse_volume("C:\\data:/data").unwrap(),
            VolumeBinding::new("C:\\data", "/data")
        );
        assert_eq!(parse_gpus("all"), (GpuMode::All, String::new()));
        assert_eq!(parse_gpus("none"), (GpuMode::None, String::new()));
    }

    #[test]
    fn test_row_formatting_skips_blank_rows() {
        assert_eq!(format_env(&EnvVar::default()), None);
        assert_eq!(format_env(&EnvVar::new("K", "")).as_deref(), Some("K"));
        assert_eq!(format_port(&PortBinding::new("80", "")).as_deref(), Some("80:"));
        assert_eq!(format_volume(&VolumeBinding::default()), None);
    }
}
