//! Tag selection and case-insensitive matching.

use std::collections::BTreeSet;

use crate::config::FILTER_CATEGORIES;

/// Split a tile's tag attribute. Accepts `,` or `|` separators.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split([',', '|'])
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn is_known_category(value: &str) -> bool {
    let folded = value.trim().to_lowercase();
    FILTER_CATEGORIES.iter().any(|c| *c == folded)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Marker {
    /// No filter active.
    #[default]
    Neutral,
    Match,
    Unmatched,
}

impl Marker {
    pub fn is_match(self) -> bool {
        self == Marker::Match
    }
}

/// Selected categories, case-folded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagFilter {
    selected: BTreeSet<String>,
}

impl TagFilter {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_lowercase())
            .filter(|v| is_known_category(v))
            .collect();
        Self { selected }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Any selected tag equals any tile tag.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter()
            .any(|tag| self.selected.contains(&tag.as_ref().trim().to_lowercase()))
    }

    pub fn marker_for<S: AsRef<str>>(&self, tags: &[S]) -> Marker {
        if self.is_empty() {
            Marker::Neutral
        } else if self.matches(tags) {
            Marker::Match
        } else {
            Marker::Unmatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_either_separator() {
        assert_eq!(
            parse_tag_list(" Light, Installation |AV,, "),
            vec!["light", "installation", "av"]
        );
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn unknown_values_are_dropped() {
        let filter = TagFilter::from_values(["light", "pottery", "STAGE"]);
        assert_eq!(filter.selected().collect::<Vec<_>>(), vec!["light", "stage"]);
    }

    #[test]
    fn matching_ignores_case() {
        let filter = TagFilter::from_values(["light"]);
        assert!(filter.matches(&["Light"]));
        assert_eq!(filter.marker_for(&["Light"]), Marker::Match);
        assert_eq!(filter.marker_for(&["stage"]), Marker::Unmatched);
        assert_eq!(filter.marker_for::<&str>(&[]), Marker::Unmatched);
    }

    #[test]
    fn multi_word_category() {
        let filter = TagFilter::from_values(["Mixed Reality"]);
        assert!(filter.matches(&parse_tag_list("installation|mixed reality")));
    }

    #[test]
    fn empty_selection_is_neutral() {
        let filter = TagFilter::default();
        assert_eq!(filter.marker_for(&["light"]), Marker::Neutral);
    }
}
