use crate::docker::options::{GpuMode, RunMode, RunOptions, DEFAULT_TAG};

/// Resolve the image reference for a model: an explicit tag inside the
/// image name wins over `tag_name`. Returns `None` without an image.
pub fn image_reference(options: &RunOptions) -> Option<String> {
    let image = options.image_name.trim();
    if image.is_empty() {
        return None;
    }
    if image.contains(':') {
        return Some(image.to_string());
    }
    let tag = match options.tag_name.trim() {
        "" => DEFAULT_TAG,
        tag => tag,
    };
    Some(format!("{}:{}", image, tag))
}

/// Build the `docker run` command line for a model.
///
/// Flags are emitted in a fixed order no matter how the model was filled
/// in, and any field that is blank after trimming is left out.
pub fn build_run_command(options: &RunOptions) -> String {
    let mut parts: Vec<String> = vec!["docker".to_string(), "run".to_string()];

    if options.remove_after_stop {
        parts.push("--rm".to_string());
    }

    match options.run_mode {
        RunMode::Detach => parts.push("-d".to_string()),
        RunMode::Interactive => parts.push("-it".to_string()),
    }

    let name = options.container_name.trim();
    if !name.is_empty() {
        parts.push(format!("--name {}", name));
    }

    if options.publish_ports {
        for binding in options.port_bindings.iter().filter(|b| b.is_complete()) {
            parts.push(format!(
                "-p {}:{}",
                binding.host_port.trim(),
                binding.container_port.trim()
            ));
        }
    }

    for env in &options.env_vars {
        let key = env.key.trim();
        if key.is_empty() {
            continue;
        }
        match env.value.trim() {
            "" => parts.push(format!("-e {}", key)),
            value => parts.push(format!("-e {}={}", key, value)),
        }
    }

    if options.bind_volume {
        for binding in options.bind_volumes.iter().filter(|b| b.is_complete()) {
            parts.push(format!(
                "-v {}:{}",
                binding.host_path.trim(),
                binding.container_path.trim()
            ));
        }
    }

    if options.privileged {
        parts.push("--privileged".to_string());
    }

    match options.gpu_mode {
        GpuMode::All => parts.push("--gpus all".to_string()),
        GpuMode::Custom if !options.gpu_ids.trim().is_empty() => {
            parts.push(format!("--gpus \"device={}\"", options.gpu_ids.trim()));
        }
        _ => {}
    }

    if let Some(image) = image_reference(options) {
        parts.push(image);
    }

    let command = options.command.trim();
    if !command.is_empty() {
        parts.push(command.to_string());
    }

    parts.join(" ")
}
