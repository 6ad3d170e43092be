//! Declarative signature tables and the matcher that consumes them
//!
//! Every heuristic used by the classifier and the audit probes is data:
//! `const` tables of named pattern lists. Logic lives in [`match_table`] and a
//! handful of helpers; tables never contain control flow.

pub mod consent;
pub mod criteria;
pub mod plugins;
pub mod technology;
pub mod trackers;

/// How a pattern is compared against a haystack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Pattern occurs anywhere in the haystack
    Contains,
    /// Haystack starts with the pattern (cookie names)
    Prefix,
    /// Haystack equals the pattern
    Exact,
}

impl MatchMode {
    fn matches(self, haystack: &str, pattern: &str) -> bool {
        match self {
            MatchMode::Contains => haystack.contains(pattern),
            MatchMode::Prefix => haystack.starts_with(pattern),
            MatchMode::Exact => haystack == pattern,
        }
    }
}

/// Returns the table entries with at least one pattern matching any haystack
///
/// Patterns are written lowercase; haystacks are lowercased here. Entries are
/// returned once each, in table order.
pub fn match_table<'t, T, F>(
    table: &'t [T],
    patterns_of: F,
    haystacks: &[&str],
    mode: MatchMode,
) -> Vec<&'t T>
where
    F: Fn(&T) -> &'static [&'static str],
{
    let lowered: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();

    table
        .iter()
        .filter(|entry| {
            patterns_of(entry).iter().any(|pattern| {
                lowered
                    .iter()
                    .any(|haystack| mode.matches(haystack, pattern))
            })
        })
        .collect()
}

/// First entry of an ordered table that matches
pub fn first_match<'t, T, F>(
    table: &'t [T],
    patterns_of: F,
    haystacks: &[&str],
    mode: MatchMode,
) -> Option<&'t T>
where
    F: Fn(&T) -> &'static [&'static str],
{
    match_table(table, patterns_of, haystacks, mode)
        .into_iter()
        .next()
}

/// Distinct keywords of `keywords` occurring in `text` (case-insensitive)
pub fn keyword_hits(keywords: &[&str], text: &str) -> usize {
    let text = text.to_lowercase();
    keywords.iter().filter(|k| text.contains(*k)).count()
}
