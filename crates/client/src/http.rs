//! The reqwest-backed implementation of the core's backend seams.
//!
//! Every endpoint is a GET returning a small JSON envelope; missing list
//! fields decode as empty lists, matching the backend's habit of omitting
//! them. Only non-empty filter fields are serialized as query parameters.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use regscope_core::{Agency, FilterState, MetadataProvider, SearchBackend, SearchHit, Title};

use crate::config::ClientConfig;
use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TitlesEnvelope {
    #[serde(default)]
    titles: Vec<Title>,
}

#[derive(Deserialize)]
struct AgenciesEnvelope {
    #[serde(default)]
    agencies: Vec<Agency>,
}

#[derive(Deserialize)]
struct AgencyTitleMapEnvelope {
    #[serde(default)]
    map: HashMap<String, Vec<u32>>,
}

#[derive(Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SuggestionsEnvelope {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct TitleWordCountEnvelope {
    #[serde(rename = "wordCount")]
    word_count: u64,
}

/// Word count for an agency, broken down by CFR reference where the backend
/// provides it.
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyWordCount {
    #[serde(default)]
    pub breakdowns: Vec<WordCountBreakdown>,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordCountBreakdown {
    pub title: u32,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(rename = "wordCount")]
    pub word_count: u64,
}

// ---------------------------------------------------------------------------
// Backend client
// ---------------------------------------------------------------------------

/// HTTP client for the regulatory metadata and search service.
pub struct HttpBackend {
    config: ClientConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Build)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!(url = url.as_str(), params = query.len(), "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }
        response.json().await.map_err(|source| ClientError::Decode { url, source })
    }

    /// Word count for a single CFR title.
    pub async fn title_word_count(&self, title_number: u32) -> Result<u64, ClientError> {
        let url = self.endpoint(&format!("/api/wordcount/{title_number}"));
        let envelope: TitleWordCountEnvelope = self.get_json(url, &[]).await?;
        Ok(envelope.word_count)
    }

    /// Word count for an agency, with per-reference breakdowns when present.
    pub async fn agency_word_count(&self, slug: &str) -> Result<AgencyWordCount, ClientError> {
        let url = self.endpoint(&format!("/api/wordcount/agency/{slug}"));
        self.get_json(url, &[]).await
    }
}

#[async_trait]
impl MetadataProvider for HttpBackend {
    async fn fetch_titles(&self) -> anyhow::Result<Vec<Title>> {
        let envelope: TitlesEnvelope = self.get_json(self.endpoint("/api/titles"), &[]).await?;
        Ok(envelope.titles)
    }

    async fn fetch_agencies(&self) -> anyhow::Result<Vec<Agency>> {
        let envelope: AgenciesEnvelope =
            self.get_json(self.endpoint("/api/agencies"), &[]).await?;
        Ok(envelope.agencies)
    }

    async fn fetch_agency_title_map(&self) -> anyhow::Result<HashMap<String, Vec<u32>>> {
        let envelope: AgencyTitleMapEnvelope =
            self.get_json(self.endpoint("/api/agency-title-map"), &[]).await?;
        Ok(envelope.map)
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, filters: &FilterState) -> anyhow::Result<Vec<SearchHit>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        let q = filters.query.trim();
        if !q.is_empty() {
            query.push(("q", q.to_string()));
        }
        if let Some(slug) = &filters.agency_slug {
            query.push(("agency_slugs[]", slug.clone()));
        }
        if let Some(number) = filters.title_number {
            query.push(("title", number.to_string()));
        }
        if let Some(date) = filters.version_date {
            query.push(("issueDate", date.to_string()));
        }

        let envelope: ResultsEnvelope =
            self.get_json(self.endpoint("/api/search"), &query).await?;
        Ok(envelope.results)
    }

    async fn suggest(&self, partial: &str) -> anyhow::Result<Vec<String>> {
        let envelope: SuggestionsEnvelope = self
            .get_json(
                self.endpoint("/api/search/suggestions"),
                &[("query", partial.to_string())],
            )
            .await?;
        Ok(envelope.suggestions)
    }
}
