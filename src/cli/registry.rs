use anyhow::{Context, Result};
use colored::Colorize;

use super::{spinner, AppContext};
use crate::docker::registry::{suggest_repositories, suggest_tags};

pub async fn search(ctx: &AppContext, query: &str) -> Result<()> {
    let lookup = ctx
        .registry()
        .context("Registry lookups are disabled in settings.yaml")?;

    let pb = spinner(&format!("Searching for '{}'...", query.trim()));
    let names = suggest_repositories(lookup.as_ref(), query).await;
    pb.finish_and_clear();

    if names.is_empty() {
        println!("{}", "No matching repositories".yellow());
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn tags(ctx: &AppContext, repository: &str) -> Result<()> {
    let lookup = ctx
        .registry()
        .context("Registry lookups are disabled in settings.yaml")?;

    let pb = spinner(&format!("Fetching tags for '{}'...", repository.trim()));
    let tags = suggest_tags(lookup.as_ref(), repository).await;
    pb.finish_and_clear();

    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}
