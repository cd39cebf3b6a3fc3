//! Facet relational filter — derives the selectable option sets for the
//! agency and title dropdowns from the agency→title mapping. Pure
//! computation, no I/O: selecting a value in one facet restricts the other,
//! clearing a facet restores the full list from the snapshot.

use std::collections::HashMap;

use crate::types::{Agency, Title};

/// One selectable dropdown entry: the value submitted with the filter and
/// the label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

/// The derived option sets for both facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOptions {
    pub agencies: Vec<FacetOption>,
    pub titles: Vec<FacetOption>,
}

/// Derive both facets' options. `selected_agency` is the agency display name
/// (the mapping key); an agency with no mapping entry behaves like no
/// selection. Agencies are alphabetized, titles ordered by number.
pub fn derive_options(
    map: &HashMap<String, Vec<u32>>,
    selected_agency: Option<&str>,
    selected_title: Option<u32>,
    titles: &[Title],
    agencies: &[Agency],
) -> FacetOptions {
    let allowed_titles = selected_agency.and_then(|name| map.get(name));

    let mut title_entries: Vec<&Title> = titles
        .iter()
        .filter(|t| match allowed_titles {
            Some(allowed) => allowed.contains(&t.number),
            None => true,
        })
        .collect();
    title_entries.sort_unstable_by_key(|t| t.number);

    let mut agency_entries: Vec<&Agency> = agencies
        .iter()
        .filter(|a| match selected_title {
            Some(number) => map.get(&a.name).is_some_and(|nums| nums.contains(&number)),
            None => true,
        })
        .collect();
    agency_entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));

    FacetOptions {
        agencies: agency_entries
            .into_iter()
            .map(|a| FacetOption { value: a.slug_or_derived(), label: a.name.clone() })
            .collect(),
        titles: title_entries
            .into_iter()
            .map(|t| FacetOption {
                value: t.number.to_string(),
                label: format!("Title {}: {}", t.number, t.name),
            })
            .collect(),
    }
}
