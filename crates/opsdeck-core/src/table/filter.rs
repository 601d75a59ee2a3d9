// ── Fuzzy ranking for the global search box ──
//
// A needle is ranked against each searchable cell and the row keeps its
// best tier. Anything at Subsequence or better passes the filter; the
// tiers also give a stable relevance order if a frontend wants one.

use std::cmp::Ordering;

/// Match quality, worst to best. `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    NoMatch,
    Subsequence,
    Acronym,
    Contains,
    WordPrefix,
    Prefix,
    Equal,
    CaseSensitiveEqual,
}

impl MatchTier {
    /// Lowest tier that still passes the search filter.
    pub const THRESHOLD: Self = Self::Subsequence;

    pub fn passes(self) -> bool {
        self >= Self::THRESHOLD
    }
}

/// Rank how well `needle` matches `haystack`.
///
/// An empty needle matches everything at the top tier; callers skip
/// filtering entirely in that case, this just keeps the function total.
pub fn rank(haystack: &str, needle: &str) -> MatchTier {
    if needle.is_empty() {
        return MatchTier::CaseSensitiveEqual;
    }
    if haystack == needle {
        return MatchTier::CaseSensitiveEqual;
    }

    let hay = haystack.to_lowercase();
    let need = needle.to_lowercase();

    if hay == need {
        return MatchTier::Equal;
    }
    if hay.starts_with(&need) {
        return MatchTier::Prefix;
    }
    if hay
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| !word.is_empty() && word.starts_with(&need))
    {
        return MatchTier::WordPrefix;
    }
    if hay.contains(&need) {
        return MatchTier::Contains;
    }

    let acronym: String = hay
        .split(|c: char| !c.is_alphanumeric())
        .filter_map(|word| word.chars().next())
        .collect();
    if !acronym.is_empty() && acronym.contains(&need) {
        return MatchTier::Acronym;
    }

    if is_subsequence(&hay, &need) {
        return MatchTier::Subsequence;
    }
    MatchTier::NoMatch
}

/// Whether `needle`'s characters appear in `haystack` in order.
fn is_subsequence(haystack: &str, needle: &str) -> bool {
    let mut chars = needle.chars().peekable();
    for c in haystack.chars() {
        match chars.peek() {
            Some(&next) if next == c => {
                chars.next();
            }
            Some(_) => {}
            None => return true,
        }
    }
    chars.peek().is_none()
}

/// Relevance comparison: better tiers sort first.
pub fn by_relevance(a: MatchTier, b: MatchTier) -> Ordering {
    b.cmp(&a)
}
