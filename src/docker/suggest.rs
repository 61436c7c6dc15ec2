//! Debounced image-name suggestions.
//!
//! Every keystroke (or prompt answer) becomes a request. A request waits out
//! the debounce window, queries the registry and publishes its result. A
//! newer request cancels the older one, and a task that finishes anyway only
//! publishes while its generation is still the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::settings::RegistrySettings;
use crate::docker::registry::{suggest_repositories, RegistryLookup};

/// Latest published suggestion list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub generation: u64,
    pub query: String,
    pub options: Vec<String>,
    pub loading: bool,
}

pub struct Suggester {
    lookup: Arc<dyn RegistryLookup>,
    debounce: Duration,
    min_query_len: usize,
    generation: AtomicU64,
    inflight: Mutex<Option<CancellationToken>>,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl Suggester {
    pub fn new(lookup: Arc<dyn RegistryLookup>, settings: &RegistrySettings) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            lookup,
            debounce: Duration::from_millis(settings.debounce_ms),
            min_query_len: settings.min_query_len,
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    /// Start a lookup for `query`, superseding any earlier one.
    /// Returns the generation assigned to this request.
    pub fn request(&self, query: &str) -> u64 {
        let query = query.trim().to_string();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let token = CancellationToken::new();
        let previous = self
            .inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        if query.chars().count() < self.min_query_len {
            self.state.send_replace(SuggestionState {
                generation,
                query,
                options: Vec::new(),
                loading: false,
            });
            return generation;
        }

        // Previous options stay visible while the new lookup runs
        self.state.send_modify(|state| {
            state.generation = generation;
            state.query = query.clone();
            state.loading = true;
        });

        let lookup = Arc::clone(&self.lookup);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        tokio::spawn(async move {
            let options = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Suggestion request {} for '{}' superseded", generation, query);
                    return;
                }
                options = async {
                    tokio::time::sleep(debounce).await;
                    suggest_repositories(lookup.as_ref(), &query).await
                } => options,
            };

            let published = state.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.options = options;
                current.loading = false;
                true
            });
            if !published {
                tracing::debug!("Discarding stale suggestions for '{}'", query);
            }
        });

        generation
    }

    /// Current suggestions without waiting
    pub fn snapshot(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Wait until the most recent request has published its result
    pub async fn settle(&self) -> SuggestionState {
        let target = self.generation.load(Ordering::SeqCst);
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|state| state.generation == target && !state.loading)
            .await
            .map(|state| state.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.snapshot(),
        }
    }
}

impl Drop for Suggester {
    fn drop(&mut self) {
        if let Ok(mut inflight) = self.inflight.lock() {
            if let Some(token) = inflight.take() {
                token.cancel();
            }
        }
    }
}
