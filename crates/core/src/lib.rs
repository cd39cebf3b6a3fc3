//! regscope-core — the search request lifecycle and filter-state logic behind
//! the regscope frontends.
//!
//! The crate is pure domain logic: it talks to the outside world only through
//! the [`SearchBackend`] and [`MetadataProvider`] trait seams, so any
//! transport (the bundled HTTP client, a test fake) plugs in unchanged.
//!
//! # Modules
//!
//! - [`types`] — metadata records, filter state, search hits, tagged outcomes
//! - [`controller`] — the search controller: one in-flight request, cancellation,
//!   most-recent-wins response handling
//! - [`metadata`] — the owned metadata snapshot and its provider seam
//! - [`facets`] — relational agency/title facet option derivation
//! - [`suggest`] — suggestion label classification
//! - [`highlight`] — case-insensitive excerpt highlighting

pub mod controller;
pub mod facets;
pub mod highlight;
pub mod metadata;
pub mod suggest;
pub mod types;

pub use controller::{SearchBackend, SearchController};
pub use facets::{derive_options, FacetOption, FacetOptions};
pub use metadata::{MetadataProvider, MetadataSnapshot, RegulatorySummary};
pub use suggest::{Suggestion, SuggestionKind};
pub use types::{Agency, CfrReference, FilterState, SearchHit, SearchOutcome, SearchPhase, Title};
