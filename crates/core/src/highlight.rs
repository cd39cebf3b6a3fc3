//! Excerpt highlighting: wrap every case-insensitive occurrence of the query
//! term in `<mark>` tags, preserving the original casing of the matched text.

use regex::RegexBuilder;

/// Highlight `query` inside `excerpt`. The query is treated literally (regex
/// metacharacters escaped); an empty or whitespace query returns the excerpt
/// unchanged.
pub fn highlight(excerpt: &str, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return excerpt.to_string();
    }
    let pattern = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build();
    match pattern {
        Ok(re) => re.replace_all(excerpt, "<mark>$0</mark>").into_owned(),
        Err(_) => excerpt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_all_occurrences_case_insensitively() {
        let marked = highlight("Privacy rules protect PRIVACY interests.", "privacy");
        assert_eq!(
            marked,
            "<mark>Privacy</mark> rules protect <mark>PRIVACY</mark> interests."
        );
    }

    #[test]
    fn preserves_matched_casing() {
        assert_eq!(highlight("The Act", "act"), "The <mark>Act</mark>");
    }

    #[test]
    fn empty_query_is_identity() {
        assert_eq!(highlight("unchanged text", "  "), "unchanged text");
    }

    #[test]
    fn query_metacharacters_are_literal() {
        assert_eq!(
            highlight("see § 310.4 for details", "§ 310.4"),
            "see <mark>§ 310.4</mark> for details"
        );
        assert_eq!(highlight("a.c abc", "a.c"), "<mark>a.c</mark> abc");
    }
}
