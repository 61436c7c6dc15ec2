use anyhow::Result;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::sync::Arc;

use super::options::{
    format_env, format_port, format_volume, parse_env, parse_port, parse_volume,
};
use super::{spinner, AppContext};
use crate::docker::command::build_run_command;
use crate::docker::options::{GpuMode, RunMode, RunOptions};
use crate::docker::registry::{suggest_tags, RegistryLookup};
use crate::docker::suggest::Suggester;

const STEPS: [&str; 3] = ["Basic info", "Options", "Command"];

fn print_step(index: usize) {
    println!();
    println!(
        "{} {}",
        format!("[{}/{}]", index + 1, STEPS.len()).blue().bold(),
        STEPS[index].bold()
    );
}

/// Walk the user through the form, starting from `form`.
/// Returns `None` when the user declines to save.
pub async fn run(ctx: &AppContext, mut form: RunOptions, title: &str) -> Result<Option<RunOptions>> {
    let theme = ColorfulTheme::default();
    let lookup = ctx.registry();
    let suggester = lookup
        .as_ref()
        .map(|lookup| Suggester::new(Arc::clone(lookup), &ctx.settings.registry));

    println!("{}", title.bold());

    print_step(0);
    form.container_name = Input::<String>::with_theme(&theme)
        .with_prompt("Container name")
        .with_initial_text(form.container_name.clone())
        .allow_empty(true)
        .interact_text()?
        .trim()
        .to_string();

    let typed: String = Input::with_theme(&theme)
        .with_prompt("Image name")
        .with_initial_text(form.image_name.clone())
        .validate_with(|input: &String| -> Result<(), &'static str> {
            if input.trim().is_empty() {
                Err("An image name is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    form.image_name = choose_image(&theme, suggester.as_ref(), typed.trim()).await?;

    if !form.image_name.contains(':') {
        form.tag_name = choose_tag(&theme, lookup.as_deref(), &form.image_name, &form.tag_name).await?;
    }

    print_step(1);
    form.remove_after_stop = Confirm::with_theme(&theme)
        .with_prompt("Remove the container after it stops (--rm)?")
        .default(form.remove_after_stop)
        .interact()?;

    form.privileged = Confirm::with_theme(&theme)
        .with_prompt("Run privileged (--privileged)?")
        .default(form.privileged)
        .interact()?;

    let existing: Vec<String> = form.env_vars.iter().filter_map(format_env).collect();
    form.env_vars = edit_rows(&theme, "Environment variable KEY=VALUE", existing, |s| Ok(parse_env(s)))?;

    form.publish_ports = Confirm::with_theme(&theme)
        .with_prompt("Publish ports?")
        .default(form.publish_ports)
        .interact()?;
    if form.publish_ports {
        let existing: Vec<String> = form.port_bindings.iter().filter_map(format_port).collect();
        form.port_bindings = edit_rows(&theme, "Port HOST:CONTAINER", existing, parse_port)?;
    }

    form.bind_volume = Confirm::with_theme(&theme)
        .with_prompt("Bind host directories?")
        .default(form.bind_volume)
        .interact()?;
    if form.bind_volume {
        let existing: Vec<String> = form.bind_volumes.iter().filter_map(format_volume).collect();
        form.bind_volumes = edit_rows(&theme, "Volume HOST:CONTAINER", existing, parse_volume)?;
    }

    let gpu_modes = [GpuMode::None, GpuMode::All, GpuMode::Custom];
    let gpu_index = Select::with_theme(&theme)
        .with_prompt("GPU access")
        .items(&gpu_modes)
        .default(gpu_modes.iter().position(|m| *m == form.gpu_mode).unwrap_or(0))
        .interact()?;
    form.gpu_mode = gpu_modes[gpu_index];
    if form.gpu_mode == GpuMode::Custom {
        form.gpu_ids = Input::<String>::with_theme(&theme)
            .with_prompt("GPU ids (e.g. 1,2)")
            .with_initial_text(form.gpu_ids.clone())
            .allow_empty(true)
            .interact_text()?
            .trim()
            .to_string();
    }

    let run_modes = ["detach (-d)", "interactive (-it)"];
    let run_index = Select::with_theme(&theme)
        .with_prompt("Run mode")
        .items(&run_modes)
        .default(match form.run_mode {
            RunMode::Detach => 0,
            RunMode::Interactive => 1,
        })
        .interact()?;
    form.run_mode = if run_index == 0 { RunMode::Detach } else { RunMode::Interactive };

    print_step(2);
    form.command = Input::<String>::with_theme(&theme)
        .with_prompt("Command (empty uses the image default)")
        .with_initial_text(form.command.clone())
        .allow_empty(true)
        .interact_text()?;

    form.memo = Input::<String>::with_theme(&theme)
        .with_prompt("Memo")
        .with_initial_text(form.memo.clone())
        .allow_empty(true)
        .interact_text()?;

    form.ensure_placeholder_rows();

    println!();
    println!("{}", "Preview:".bold());
    println!("  {}", build_run_command(&form).cyan());
    println!();

    let save = Confirm::with_theme(&theme)
        .with_prompt("Save this command?")
        .default(true)
        .interact()?;

    Ok(save.then_some(form))
}

/// Offer registry matches for the typed name; the typed text stays first
async fn choose_image(
    theme: &ColorfulTheme,
    suggester: Option<&Suggester>,
    typed: &str,
) -> Result<String> {
    let Some(suggester) = suggester else {
        return Ok(typed.to_string());
    };
    if typed.contains(':') {
        return Ok(typed.to_string());
    }

    suggester.request(typed);
    let pb = spinner("Searching registry...");
    let state = suggester.settle().await;
    pb.finish_and_clear();

    let mut items = vec![typed.to_string()];
    items.extend(state.options.into_iter().filter(|name| name != typed));
    if items.len() == 1 {
        return Ok(typed.to_string());
    }

    let index = Select::with_theme(theme)
        .with_prompt("Image")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(items.swap_remove(index))
}

async fn choose_tag(
    theme: &ColorfulTheme,
    lookup: Option<&dyn RegistryLookup>,
    image: &str,
    current: &str,
) -> Result<String> {
    let mut items = match lookup {
        Some(lookup) => {
            let pb = spinner("Fetching tags...");
            let tags = suggest_tags(lookup, image).await;
            pb.finish_and_clear();
            tags
        }
        None => vec!["latest".to_string()],
    };
    let current = current.trim();
    if !current.is_empty() && !items.iter().any(|t| t == current) {
        items.insert(0, current.to_string());
    }
    let default = items.iter().position(|t| t == current).unwrap_or(0);
    items.push("other...".to_string());

    let index = Select::with_theme(theme)
        .with_prompt("Tag")
        .items(&items)
        .default(default)
        .interact()?;

    if index == items.len() - 1 {
        let tag = Input::<String>::with_theme(theme)
            .with_prompt("Tag")
            .allow_empty(true)
            .interact_text()?;
        return Ok(tag.trim().to_string());
    }
    Ok(items.swap_remove(index))
}

/// Revisit existing rows (empty answer drops one), then add rows until an
/// empty answer.
fn edit_rows<T>(
    theme: &ColorfulTheme,
    prompt: &str,
    existing: Vec<String>,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rows = Vec::new();

    for current in existing {
        let answer = Input::<String>::with_theme(theme)
            .with_prompt(format!("{} (empty to drop)", prompt))
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        if answer.trim().is_empty() {
            continue;
        }
        match parse(answer.trim()) {
            Ok(row) => rows.push(row),
            Err(e) => println!("{} {}", "!".yellow().bold(), e),
        }
    }

    loop {
        let answer = Input::<String>::with_theme(theme)
            .with_prompt(format!("{} (empty to finish)", prompt))
            .allow_empty(true)
            .interact_text()?;
        if answer.trim().is_empty() {
            break;
        }
        match parse(answer.trim()) {
            Ok(row) => rows.push(row),
            Err(e) => println!("{} {}", "!".yellow().bold(), e),
        }
    }

    Ok(rows)
}
