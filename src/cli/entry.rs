use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use super::options::OptionArgs;
use super::wizard;
use super::AppContext;
use crate::config::entry::Entry;
use crate::docker::command::{build_run_command, image_reference};
use crate::docker::options::RunOptions;
use crate::utils::clipboard::{self, CopyMethod};

pub async fn new_entry(ctx: &AppContext, args: &OptionArgs, use_wizard: bool) -> Result<()> {
    let mut options = RunOptions::default();
    args.apply_to(&mut options)?;

    if use_wizard || args.image.is_none() {
        match wizard::run(ctx, options, "New command").await? {
            Some(filled) => options = filled,
            None => {
                println!("{}", "Cancelled, nothing saved".yellow());
                return Ok(());
            }
        }
    }

    if !options.is_complete() {
        anyhow::bail!("An image name is required (use --image or the wizard)");
    }

    let mut store = ctx.open_store()?;
    let entry = store.create(options).context("Failed to save command")?;

    println!("{} Saved {}", "✓".green().bold(), entry.short_id().cyan());
    println!("{}", entry.command_line);
    Ok(())
}

pub async fn edit_entry(
    ctx: &AppContext,
    id: &str,
    args: &OptionArgs,
    use_wizard: bool,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    let current = store.resolve(id)?.clone();

    let mut options = current.options.clone();
    args.apply_to(&mut options)?;

    if use_wizard || !args.has_overrides() {
        let title = format!("Edit {}", current.short_id());
        match wizard::run(ctx, options, &title).await? {
            Some(filled) => options = filled,
            None => {
                println!("{}", "Cancelled, entry unchanged".yellow());
                return Ok(());
            }
        }
    }

    if !options.is_complete() {
        anyhow::bail!("An image name is required");
    }

    let entry = store
        .update(&current.id, options)
        .context("Failed to save command")?;

    println!("{} Updated {}", "✓".green().bold(), entry.short_id().cyan());
    println!("{}", entry.command_line);
    Ok(())
}

pub fn preview(args: &OptionArgs) -> Result<()> {
    let mut options = RunOptions::default();
    args.apply_to(&mut options)?;
    println!("{}", build_run_command(&options));
    Ok(())
}

pub fn duplicate_entry(ctx: &AppContext, id: &str, name: Option<&str>) -> Result<()> {
    let mut store = ctx.open_store()?;
    let source = store.resolve(id)?.clone();

    let name = match name {
        Some(name) => name.trim().to_string(),
        None => default_copy_name(&source),
    };
    let entry = store
        .duplicate(&source, &name)
        .context("Failed to save duplicated command")?;

    println!(
        "{} Duplicated {} as {}",
        "✓".green().bold(),
        source.short_id(),
        entry.short_id().cyan()
    );
    println!("{}", entry.command_line);
    Ok(())
}

fn default_copy_name(source: &Entry) -> String {
    match source.options.container_name.trim() {
        "" => "copy".to_string(),
        name => format!("{}-copy", name),
    }
}

pub fn delete_entry(ctx: &AppContext, id: &str, yes: bool) -> Result<()> {
    let mut store = ctx.open_store()?;
    let entry = store.resolve(id)?.clone();

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete '{}' ({})?", display_name(&entry), entry.short_id()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled".yellow());
            return Ok(());
        }
    }

    store.remove(&entry.id).context("Failed to delete command")?;
    println!("{} Deleted {}", "✓".green().bold(), entry.short_id());
    Ok(())
}

pub fn list_entries(ctx: &AppContext, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let entries = store.list();

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No saved commands".yellow());
        println!("\nCreate one with: {}", "docker-wizard new".cyan());
        return Ok(());
    }

    let name_w = entries
        .iter()
        .map(|e| display_name(e).chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    println!();
    println!(
        "{:<8}  {:<name_w$}  {}",
        "ID".bold(),
        "NAME".bold(),
        "IMAGE".bold(),
        name_w = name_w
    );
    println!("{}", "-".repeat(8 + 2 + name_w + 2 + 30));
    for entry in entries {
        println!(
            "{:<8}  {:<name_w$}  {}",
            entry.short_id().cyan(),
            display_name(entry),
            display_image(entry),
            name_w = name_w
        );
        println!("          {}", entry.command_line.dimmed());
    }
    println!();
    Ok(())
}

pub fn show_entry(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let entry = store.resolve(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    let options = &entry.options;
    println!("{} {}", "Id:".bold(), entry.id);
    println!("{} {}", "Name:".bold(), display_name(entry));
    println!("{} {}", "Image:".bold(), display_image(entry));
    println!("{} {}", "Mode:".bold(), options.run_mode);
    println!("{} {}", "GPU:".bold(), options.gpu_mode);
    if !options.memo.trim().is_empty() {
        println!("{} {}", "Memo:".bold(), options.memo.trim());
    }
    println!();
    println!("{}", entry.command_line.cyan());
    Ok(())
}

pub fn copy_entry(ctx: &AppContext, id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let entry = store.resolve(id)?;

    match clipboard::copy_text(&entry.command_line)? {
        CopyMethod::Tool(tool) => {
            println!("{} Copied to clipboard via {}", "✓".green().bold(), tool);
        }
        CopyMethod::Terminal => {
            println!("{} Sent to the terminal clipboard", "✓".green().bold());
        }
    }
    println!("{}", entry.command_line);
    Ok(())
}

fn display_name(entry: &Entry) -> String {
    match entry.options.container_name.trim() {
        "" => "(unnamed)".to_string(),
        name => name.to_string(),
    }
}

fn display_image(entry: &Entry) -> String {
    image_reference(&entry.options).unwrap_or_else(|| "(no image)".to_string())
}
