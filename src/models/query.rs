use super::Pokemon;
use std::fmt;

/// Lookup key submitted to the remote API.
///
/// Free text is sent as typed apart from lowercasing, so a numeric string
/// typed into the search box stays a `Name` and is passed through as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free-text name, matched case-insensitively by the API
    Name(String),

    /// Numeric identifier, produced by navigation
    Id(u32),
}

impl Query {
    pub fn name(name: impl Into<String>) -> Self {
        Query::Name(name.into())
    }

    /// Normalized form used as the final URL path segment.
    ///
    /// Names are lowercased. Trailing spaces and control characters are
    /// dropped, as are tabs and line breaks anywhere in the text, matching
    /// what URL parsing does to the end of a URL.
    pub fn path_segment(&self) -> String {
        match self {
            Query::Name(name) => name
                .to_lowercase()
                .trim_end_matches(|c: char| c <= ' ')
                .chars()
                .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
                .collect(),
            Query::Id(id) => id.to_string(),
        }
    }

    /// Query for the record `step` positions away from `current`.
    ///
    /// Returns `None` when nothing is loaded. The identifier is clamped to
    /// 1 rather than rejected.
    pub fn neighbor_of(current: Option<&Pokemon>, step: i64) -> Option<Self> {
        let current = current?;
        let target = (i64::from(current.id) + step).clamp(1, i64::from(u32::MAX));
        Some(Query::Id(target as u32))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_segment())
    }
}
