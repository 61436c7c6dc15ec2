pub mod entry;
pub mod options;
pub mod registry;
pub mod wizard;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::persist::{FileSlots, SlotPersistence};
use crate::config::settings::Settings;
use crate::config::store::EntryStore;
use crate::docker::registry::{DockerHubClient, RegistryLookup};
use crate::utils::paths;
use options::OptionArgs;

#[derive(Parser)]
#[command(name = "docker-wizard")]
#[command(author = "Docker Wizard Team")]
#[command(version)]
#[command(about = "Build, save and reuse docker run commands", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Data directory (defaults to ~/.docker-wizard)
    #[arg(long, global = true, env = "DOCKER_WIZARD_HOME", value_name = "DIR")]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and save a new command (runs the wizard when --image is missing)
    New {
        #[command(flatten)]
        options: OptionArgs,

        /// Always run the interactive wizard, using flags as starting values
        #[arg(short, long)]
        wizard: bool,
    },

    /// Change a saved command
    Edit {
        /// Entry id (or unique prefix)
        id: String,

        #[command(flatten)]
        options: OptionArgs,

        /// Run the interactive wizard prefilled with the entry
        #[arg(short, long)]
        wizard: bool,
    },

    /// Print the command for the given flags without saving
    Preview {
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Copy a saved command under a new container name
    Duplicate {
        /// Entry id (or unique prefix)
        id: String,

        /// Container name for the copy (defaults to <name>-copy)
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a saved command
    Delete {
        /// Entry id (or unique prefix)
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List saved commands, newest first
    List {
        /// Output as JSON (for programmatic use)
        #[arg(long)]
        json: bool,
    },

    /// Show one saved command
    Show {
        /// Entry id (or unique prefix)
        id: String,

        /// Output as JSON (for programmatic use)
        #[arg(long)]
        json: bool,
    },

    /// Copy a saved command line to the clipboard
    Copy {
        /// Entry id (or unique prefix)
        id: String,
    },

    /// Search the registry for repositories
    Search {
        /// Partial image name
        query: String,
    },

    /// List tags published for a repository
    Tags {
        /// Repository name (e.g. nginx or bitnami/redis)
        repository: String,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let ctx = AppContext::load(self.home.as_deref())?;

        match self.command {
            Commands::New { options, wizard } => entry::new_entry(&ctx, &options, wizard).await,
            Commands::Edit { id, options, wizard } => {
                entry::edit_entry(&ctx, &id, &options, wizard).await
            }
            Commands::Preview { options } => entry::preview(&options),
            Commands::Duplicate { id, name } => entry::duplicate_entry(&ctx, &id, name.as_deref()),
            Commands::Delete { id, yes } => entry::delete_entry(&ctx, &id, yes),
            Commands::List { json } => entry::list_entries(&ctx, json),
            Commands::Show { id, json } => entry::show_entry(&ctx, &id, json),
            Commands::Copy { id } => entry::copy_entry(&ctx, &id),
            Commands::Search { query } => registry::search(&ctx, &query).await,
            Commands::Tags { repository } => registry::tags(&ctx, &repository).await,
        }
    }
}

/// Settings and data directory shared by every command
pub struct AppContext {
    pub home: PathBuf,
    pub settings: Settings,
}

impl AppContext {
    pub fn load(home: Option<&Path>) -> Result<Self> {
        let home = paths::get_config_dir(home)?;
        let settings = Settings::load(&home)?;
        Ok(Self { home, settings })
    }

    /// Open the entry store backed by the slot directory
    pub fn open_store(&self) -> Result<EntryStore> {
        let slots = FileSlots::new(paths::get_slots_dir(&self.home)?);
        let persistence = SlotPersistence::new(slots, self.settings.storage_key.clone());
        Ok(EntryStore::open(Box::new(persistence)))
    }

    /// Registry client, or `None` when lookups are disabled or unavailable
    pub fn registry(&self) -> Option<Arc<dyn RegistryLookup>> {
        if !self.settings.registry.enabled {
            return None;
        }
        match DockerHubClient::new(&self.settings.registry) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Registry suggestions unavailable: {}", e);
                None
            }
        }
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
