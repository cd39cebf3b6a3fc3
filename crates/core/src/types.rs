//! Core types shared across regscope: regulatory metadata records, the
//! user-editable filter state, search hits as the backend returns them, and
//! the tagged outcomes the presentation layer consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Regulatory metadata records (wire format: snake_case)
// ---------------------------------------------------------------------------

/// A CFR title as served by the metadata endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub up_to_date_as_of: Option<NaiveDate>,
    #[serde(default)]
    pub latest_amended_on: Option<NaiveDate>,
    #[serde(default)]
    pub latest_issue_date: Option<NaiveDate>,
}

/// A title/chapter reference attached to an agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfrReference {
    pub title: u32,
    #[serde(default)]
    pub chapter: Option<String>,
}

/// A federal agency as served by the metadata endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cfr_references: Vec<CfrReference>,
}

impl Agency {
    /// The agency's slug, or one derived from the display name when the
    /// backend omits it (lowercased, whitespace collapsed to hyphens).
    pub fn slug_or_derived(&self) -> String {
        match &self.slug {
            Some(slug) => slug.clone(),
            None => self.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// The user-editable search filters. A read-only snapshot is taken each time
/// a search is submitted; mutating the live state never affects an in-flight
/// request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub agency_slug: Option<String>,
    pub title_number: Option<u32>,
    pub version_date: Option<NaiveDate>,
}

impl FilterState {
    /// True when the trimmed query is empty and no facet is set. Such a
    /// request must never reach the backend.
    pub fn is_unconstrained(&self) -> bool {
        self.query.trim().is_empty()
            && self.agency_slug.is_none()
            && self.title_number.is_none()
            && self.version_date.is_none()
    }

    /// True when a version date is set without a title or agency to scope it.
    /// Historical-version searches are markedly less precise unscoped, so the
    /// presentation layer shows a guidance hint.
    pub fn wants_scope_hint(&self) -> bool {
        self.version_date.is_some() && self.agency_slug.is_none() && self.title_number.is_none()
    }
}

// ---------------------------------------------------------------------------
// Search hits (wire format: camelCase)
// ---------------------------------------------------------------------------

/// One ranked result from the search backend. Every field is optional on the
/// wire; [`SearchHit::label`] resolves the display label fallback chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SearchHit {
    /// Display label: section reference, else title, else a generic marker.
    pub fn label(&self) -> &str {
        self.section
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("Section")
    }
}

// ---------------------------------------------------------------------------
// Controller outcomes and phases
// ---------------------------------------------------------------------------

/// The tagged outcome of a search submission. This is the only thing the
/// presentation layer ever receives; no transport error crosses the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Success with at least one hit, excerpts already highlighted.
    Results(Vec<SearchHit>),
    /// Success with zero hits; rendered as "no results found", not an error.
    NoMatches,
    /// Empty query and no facets; the backend was never called.
    ValidationFailed,
    /// Cancelled by the user or superseded by a newer submission.
    Aborted,
    /// Transport failure, non-success status, or malformed response.
    BackendError(String),
}

/// Observable state of the search lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Loading,
    Results,
    Empty,
    Error,
    Aborted,
}
