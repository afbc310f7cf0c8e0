use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::binder::FieldErrors;

/// `GET /contacts/search?query=...`; a missing query matches everything.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

impl SearchParams {
    /// The query as a case-insensitive pattern, or a `query` field error.
    pub fn pattern(&self) -> Result<Regex, FieldErrors> {
        search_pattern(&self.query).map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert("query".into(), "must be a valid regular expression".into());
            errors
        })
    }
}

/// Unanchored, so a plain word matches as a substring.
pub fn search_pattern(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(query).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> SearchParams {
        SearchParams {
            query: query.into(),
        }
    }

    #[test]
    fn plain_words_match_as_substrings() {
        let re = params("ali").pattern().unwrap();
        assert!(re.is_match("Alice"));
        assert!(re.is_match("Malik"));
        assert!(params("").pattern().unwrap().is_match("anything"));
    }

    #[test]
    fn anchors_and_wildcards_are_honoured() {
        let re = params("^al").pattern().unwrap();
        assert!(re.is_match("Alice"));
        assert!(!re.is_match("Malik"));

        let re = params("a.i").pattern().unwrap();
        assert!(re.is_match("Alice"));
        assert!(re.is_match("Malik"));
    }

    #[test]
    fn broken_pattern_is_a_query_error() {
        let errors = params("(unclosed").pattern().unwrap_err();
        assert_eq!(errors["query"], "must be a valid regular expression");
    }
}
