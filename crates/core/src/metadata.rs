//! Metadata snapshot — titles, agencies, and the agency→title mapping,
//! fetched once per session and owned explicitly by the caller. Both the
//! facet filter and the search controller borrow the same snapshot; nothing
//! here is ambient global state.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::types::{Agency, Title};

// ---------------------------------------------------------------------------
// Provider seam
// ---------------------------------------------------------------------------

/// Read-only source of regulatory metadata. Implemented by the HTTP client;
/// tests swap in fixtures.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_titles(&self) -> Result<Vec<Title>>;
    async fn fetch_agencies(&self) -> Result<Vec<Agency>>;
    /// Agency display name → associated CFR title numbers.
    async fn fetch_agency_title_map(&self) -> Result<HashMap<String, Vec<u32>>>;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable snapshot of the metadata endpoints, taken at page/session start.
pub struct MetadataSnapshot {
    titles: Vec<Title>,
    agencies: Vec<Agency>,
    agency_title_map: HashMap<String, Vec<u32>>,
}

/// Scoreboard-style rollup derived from the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulatorySummary {
    pub total_titles: usize,
    pub total_agencies: usize,
    pub most_recent_amendment: Option<Amendment>,
}

/// The most recently amended title across the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Amendment {
    pub title_number: u32,
    pub title_name: String,
    pub amended_on: NaiveDate,
}

impl MetadataSnapshot {
    pub fn new(
        titles: Vec<Title>,
        agencies: Vec<Agency>,
        agency_title_map: HashMap<String, Vec<u32>>,
    ) -> Self {
        Self { titles, agencies, agency_title_map }
    }

    /// Fetch all three metadata endpoints concurrently and build a snapshot.
    pub async fn load(provider: &impl MetadataProvider) -> Result<Self> {
        let (titles, agencies, agency_title_map) = tokio::try_join!(
            provider.fetch_titles(),
            provider.fetch_agencies(),
            provider.fetch_agency_title_map(),
        )?;
        info!(
            titles = titles.len(),
            agencies = agencies.len(),
            mapped_agencies = agency_title_map.len(),
            "metadata snapshot loaded"
        );
        Ok(Self::new(titles, agencies, agency_title_map))
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    pub fn agency_title_map(&self) -> &HashMap<String, Vec<u32>> {
        &self.agency_title_map
    }

    /// Agency display names, used to classify backend suggestions.
    pub fn agency_names(&self) -> HashSet<&str> {
        self.agencies.iter().map(|a| a.name.as_str()).collect()
    }

    /// Resolve a facet slug back to the agency's display name.
    pub fn agency_display_name(&self, slug: &str) -> Option<&str> {
        self.agencies
            .iter()
            .find(|a| a.slug_or_derived() == slug)
            .map(|a| a.name.as_str())
    }

    /// Distinct historical version dates across all titles, newest first.
    /// Each title contributes its latest issue date, falling back to its
    /// up-to-date-as-of date.
    pub fn version_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .titles
            .iter()
            .filter_map(|t| t.latest_issue_date.or(t.up_to_date_as_of))
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates.reverse();
        dates
    }

    /// Totals plus the most recently amended title.
    pub fn summary(&self) -> RegulatorySummary {
        let most_recent_amendment = self
            .titles
            .iter()
            .filter_map(|t| t.latest_amended_on.map(|d| (d, t)))
            .max_by_key(|(d, _)| *d)
            .map(|(d, t)| Amendment {
                title_number: t.number,
                title_name: t.name.clone(),
                amended_on: d,
            });
        RegulatorySummary {
            total_titles: self.titles.len(),
            total_agencies: self.agencies.len(),
            most_recent_amendment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(number: u32, name: &str, issued: Option<&str>, amended: Option<&str>) -> Title {
        Title {
            number,
            name: name.into(),
            up_to_date_as_of: None,
            latest_amended_on: amended.map(|d| d.parse().unwrap()),
            latest_issue_date: issued.map(|d| d.parse().unwrap()),
        }
    }

    fn agency(name: &str, slug: Option<&str>) -> Agency {
        Agency { name: name.into(), slug: slug.map(Into::into), cfr_references: vec![] }
    }

    #[test]
    fn version_dates_are_unique_newest_first() {
        let snapshot = MetadataSnapshot::new(
            vec![
                title(1, "General Provisions", Some("2024-01-01"), None),
                title(2, "Grants", Some("2024-06-15"), None),
                title(3, "The President", Some("2024-01-01"), None),
            ],
            vec![],
            HashMap::new(),
        );
        let dates: Vec<String> =
            snapshot.version_dates().iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, ["2024-06-15", "2024-01-01"]);
    }

    #[test]
    fn summary_picks_latest_amendment() {
        let snapshot = MetadataSnapshot::new(
            vec![
                title(1, "General Provisions", None, Some("2023-11-02")),
                title(32, "National Defense", None, Some("2024-03-09")),
                title(3, "The President", None, None),
            ],
            vec![agency("Department of Defense", None)],
            HashMap::new(),
        );
        let summary = snapshot.summary();
        assert_eq!(summary.total_titles, 3);
        assert_eq!(summary.total_agencies, 1);
        let amendment = summary.most_recent_amendment.unwrap();
        assert_eq!(amendment.title_number, 32);
        assert_eq!(amendment.amended_on.to_string(), "2024-03-09");
    }

    #[test]
    fn display_name_resolves_explicit_and_derived_slugs() {
        let snapshot = MetadataSnapshot::new(
            vec![],
            vec![
                agency("Department of Defense", Some("department-of-defense")),
                agency("Office of Management and Budget", None),
            ],
            HashMap::new(),
        );
        assert_eq!(
            snapshot.agency_display_name("department-of-defense"),
            Some("Department of Defense")
        );
        assert_eq!(
            snapshot.agency_display_name("office-of-management-and-budget"),
            Some("Office of Management and Budget")
        );
        assert_eq!(snapshot.agency_display_name("no-such-agency"), None);
    }
}
