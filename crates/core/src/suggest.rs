//! Suggestion classification. The backend returns plain strings; the display
//! category is sniffed from the label text and the cached agency name set.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Title \d+").expect("valid title pattern"));
static SECTION_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^§ \d").expect("valid section pattern"));

/// Display category of a suggestion label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    TitleReference,
    SectionReference,
    AgencyName,
    Generic,
}

/// A backend suggestion with its resolved display category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub kind: SuggestionKind,
}

/// Classify a raw suggestion label. Order matters: structural references win
/// over an agency whose name happens to start the same way.
pub fn classify(label: &str, agency_names: &HashSet<&str>) -> SuggestionKind {
    if TITLE_REFERENCE.is_match(label) {
        SuggestionKind::TitleReference
    } else if SECTION_REFERENCE.is_match(label) {
        SuggestionKind::SectionReference
    } else if agency_names.contains(label) {
        SuggestionKind::AgencyName
    } else {
        SuggestionKind::Generic
    }
}
