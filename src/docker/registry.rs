use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::RegistrySettings;
use crate::docker::options::DEFAULT_TAG;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry answered {status} for {url}")]
    Status { status: u16, url: String },
}

/// Remote image catalog used for autocomplete
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Repository names matching a partial image name
    async fn search_repositories(&self, query: &str) -> Result<Vec<String>, RegistryError>;

    /// Tag names published for a repository
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    repo_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<TagResult>,
}

#[derive(Debug, Deserialize)]
struct TagResult {
    name: Option<String>,
}

/// Docker Hub v2 API client
pub struct DockerHubClient {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl DockerHubClient {
    pub fn new(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("docker-wizard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/v2/search/repositories/", self.base_url)
    }

    fn tags_url(&self, repository: &str) -> String {
        let (namespace, name) = split_repository(repository);
        format!("{}/v2/repositories/{}/{}/tags", self.base_url, namespace, name)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RegistryError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RegistryLookup for DockerHubClient {
    async fn search_repositories(&self, query: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.search_url();
        let params = [
            ("query", query.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        let body: SearchResponse = self.get_json(&url, &params).await?;
        Ok(body
            .results
            .into_iter()
            .filter_map(|r| r.repo_name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.tags_url(repository);
        let params = [("page_size", self.page_size.to_string())];
        let body: TagsResponse = self.get_json(&url, &params).await?;
        Ok(body
            .results
            .into_iter()
            .filter_map(|t| t.name)
            .filter(|name| !name.is_empty())
            .collect())
    }
}

/// Split `namespace/name`; official images live under `library`.
pub fn split_repository(repository: &str) -> (&str, &str) {
    let repository = repository.trim().trim_matches('/');
    match repository.split_once('/') {
        Some((namespace, name)) => (namespace, name),
        None => ("library", repository),
    }
}

/// Repository candidates for a partial name. Failures degrade to no suggestions.
pub async fn suggest_repositories(lookup: &dyn RegistryLookup, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match lookup.search_repositories(query).await {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!("Repository search for '{}' failed: {}", query, e);
            Vec::new()
        }
    }
}

/// Tag candidates for a repository, always led by `latest`.
pub async fn suggest_tags(lookup: &dyn RegistryLookup, repository: &str) -> Vec<String> {
    let mut tags = vec![DEFAULT_TAG.to_string()];
    let repository = repository.trim();
    if repository.is_empty() {
        return tags;
    }
    match lookup.list_tags(repository).await {
        Ok(names) => {
            for name in names {
                if !tags.contains(&name) {
                    tags.push(name);
                }
            }
        }
        Err(e) => tracing::debug!("Tag lookup for '{}' failed: {}", repository, e),
    }
    tags
}
