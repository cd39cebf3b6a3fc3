//! Search controller — owns the search request lifecycle. At most one search
//! request is in flight at any time: a newer submission cancels the previous
//! transport and any response that still arrives for a superseded request is
//! discarded. Suggestion lookups follow the same most-recent-wins discipline
//! on an independent sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::facets::{derive_options, FacetOptions};
use crate::highlight::highlight;
use crate::metadata::MetadataSnapshot;
use crate::suggest::{classify, Suggestion};
use crate::types::{FilterState, SearchHit, SearchOutcome, SearchPhase};

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The remote search service. Implemented by the HTTP client; tests swap in
/// scripted fakes.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search for the given filter snapshot, returning ranked hits.
    /// An empty list is a normal success, not an error.
    async fn search(&self, filters: &FilterState) -> Result<Vec<SearchHit>>;

    /// Fetch autocomplete suggestions for a partial query.
    async fn suggest(&self, partial: &str) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Translates user-editable [`FilterState`] into at most one outstanding
/// backend request and emits tagged [`SearchOutcome`]s. The observable
/// lifecycle phase is published on a watch channel for presentation
/// adapters.
pub struct SearchController<B> {
    backend: Arc<B>,
    metadata: Arc<MetadataSnapshot>,
    search_seq: AtomicU64,
    suggest_seq: AtomicU64,
    active: Mutex<Option<CancellationToken>>,
    phase: watch::Sender<SearchPhase>,
}

impl<B: SearchBackend> SearchController<B> {
    pub fn new(backend: Arc<B>, metadata: Arc<MetadataSnapshot>) -> Self {
        let (phase, _) = watch::channel(SearchPhase::Idle);
        Self {
            backend,
            metadata,
            search_seq: AtomicU64::new(0),
            suggest_seq: AtomicU64::new(0),
            active: Mutex::new(None),
            phase,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SearchPhase {
        *self.phase.borrow()
    }

    /// Subscribe to phase transitions.
    pub fn watch_phase(&self) -> watch::Receiver<SearchPhase> {
        self.phase.subscribe()
    }

    /// The metadata snapshot this controller classifies and derives against.
    pub fn metadata(&self) -> &MetadataSnapshot {
        &self.metadata
    }

    /// Submit a search for a snapshot of `filters`.
    ///
    /// Rejects unconstrained filters before any network call. Otherwise
    /// cancels the previously active request, issues exactly one backend
    /// call, and maps its resolution to a [`SearchOutcome`]. A response that
    /// arrives after a newer submission (or a reset) has claimed the
    /// lifecycle is discarded as [`SearchOutcome::Aborted`].
    pub async fn submit_search(&self, filters: &FilterState) -> SearchOutcome {
        if filters.is_unconstrained() {
            debug!("rejected unconstrained search (empty query, no facets)");
            return SearchOutcome::ValidationFailed;
        }

        let (seq, token) = self.begin_search();
        self.phase.send_replace(SearchPhase::Loading);

        let snapshot = filters.clone();
        debug!(query = snapshot.query.as_str(), seq, "search submitted");

        let resolution = tokio::select! {
            _ = token.cancelled() => None,
            res = self.backend.search(&snapshot) => Some(res),
        };

        // A newer submission or a reset owns the lifecycle now; whatever the
        // transport returned is dead on arrival.
        if self.search_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding stale search response");
            return SearchOutcome::Aborted;
        }

        match resolution {
            None => {
                self.phase.send_replace(SearchPhase::Aborted);
                SearchOutcome::Aborted
            }
            Some(Err(err)) => {
                warn!(error = %err, "search request failed");
                self.phase.send_replace(SearchPhase::Error);
                SearchOutcome::BackendError(err.to_string())
            }
            Some(Ok(hits)) if hits.is_empty() => {
                self.phase.send_replace(SearchPhase::Empty);
                SearchOutcome::NoMatches
            }
            Some(Ok(mut hits)) => {
                let query = snapshot.query.trim();
                if !query.is_empty() {
                    for hit in &mut hits {
                        if let Some(excerpt) = hit.excerpt.take() {
                            hit.excerpt = Some(highlight(&excerpt, query));
                        }
                    }
                }
                self.phase.send_replace(SearchPhase::Results);
                SearchOutcome::Results(hits)
            }
        }
    }

    /// Cancel the active search, if any. Idempotent; the awaiting
    /// `submit_search` call resolves to [`SearchOutcome::Aborted`] and flips
    /// the phase to a terminal "stopped" state distinct from an error.
    pub fn cancel_search(&self) {
        if let Some(token) = self.active.lock().take() {
            debug!("search cancelled");
            token.cancel();
        }
    }

    /// Fetch and classify suggestions for a partial query. An empty partial
    /// returns immediately with no backend call. A lookup superseded by a
    /// newer one resolves to an empty list; so does a transport failure
    /// (logged, never surfaced as a search error).
    pub async fn suggestions(&self, partial: &str) -> Vec<Suggestion> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Vec::new();
        }

        let seq = self.suggest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let labels = match self.backend.suggest(partial).await {
            Ok(labels) => labels,
            Err(err) => {
                warn!(error = %err, "suggestion lookup failed");
                return Vec::new();
            }
        };
        if self.suggest_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding stale suggestion response");
            return Vec::new();
        }

        let agency_names = self.metadata.agency_names();
        labels
            .into_iter()
            .map(|label| {
                let kind = classify(&label, &agency_names);
                Suggestion { label, kind }
            })
            .collect()
    }

    /// Clear everything back to defaults: invalidates any in-flight response,
    /// cancels the active transport, returns to `Idle`, and hands back the
    /// default filters plus the full facet option sets from the snapshot.
    pub fn reset_filters(&self) -> (FilterState, FacetOptions) {
        {
            let mut active = self.active.lock();
            self.search_seq.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = active.take() {
                token.cancel();
            }
        }
        self.phase.send_replace(SearchPhase::Idle);
        (FilterState::default(), self.full_facet_options())
    }

    /// Facet options for the current selection, re-derived from the mapping.
    /// The filter carries an agency slug; the mapping is keyed by display
    /// name, so the slug is resolved through the snapshot first.
    pub fn facet_options(&self, filters: &FilterState) -> FacetOptions {
        let agency_name =
            filters.agency_slug.as_deref().and_then(|s| self.metadata.agency_display_name(s));
        derive_options(
            self.metadata.agency_title_map(),
            agency_name,
            filters.title_number,
            self.metadata.titles(),
            self.metadata.agencies(),
        )
    }

    /// The unrestricted option sets (no facet selected).
    pub fn full_facet_options(&self) -> FacetOptions {
        derive_options(
            self.metadata.agency_title_map(),
            None,
            None,
            self.metadata.titles(),
            self.metadata.agencies(),
        )
    }

    /// Claim the next request sequence and install a fresh cancellation
    /// token, cancelling the previous one. Both happen under the token lock:
    /// a later submission can never be cancelled by an earlier one's
    /// leftover token.
    fn begin_search(&self) -> (u64, CancellationToken) {
        let mut active = self.active.lock();
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        if let Some(prev) = active.replace(token.clone()) {
            prev.cancel();
        }
        (seq, token)
    }
}
