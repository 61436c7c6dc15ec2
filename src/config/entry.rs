use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::docker::command::build_run_command;
use crate::docker::options::{RunOptions, DEFAULT_TAG};

/// A saved preset: form snapshot plus identity and the cached command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,

    #[serde(flatten)]
    pub options: RunOptions,

    /// Always `build_run_command(&options)` as of the last create/update
    pub command_line: String,
}

impl Entry {
    /// Wrap a model under a fresh id
    pub fn new(options: RunOptions) -> Self {
        Self::with_id(new_entry_id(), options)
    }

    /// Stored options are kept in their defaulted form: placeholder rows
    /// present and a blank tag spelled `latest`.
    pub fn with_id(id: String, options: RunOptions) -> Self {
        let mut options = options.with_placeholder_rows();
        if options.tag_name.trim().is_empty() {
            options.tag_name = DEFAULT_TAG.to_string();
        }
        let command_line = build_run_command(&options);
        Self { id, options, command_line }
    }

    /// Short form of the id for listings
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}
