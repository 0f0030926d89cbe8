use std::cmp::Ordering;

use crate::ranking::{compare_by_change, compare_by_liquidity, compare_by_volume};
use crate::types::Market;

// ---------------------------------------------------------------------------
// Category filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterCategory {
    #[default]
    All,
    Crypto,
    Politics,
    Sports,
    Entertainment,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 5] = [
        FilterCategory::All,
        FilterCategory::Crypto,
        FilterCategory::Politics,
        FilterCategory::Sports,
        FilterCategory::Entertainment,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::All => "All",
            FilterCategory::Crypto => "Crypto",
            FilterCategory::Politics => "Politics",
            FilterCategory::Sports => "Sports",
            FilterCategory::Entertainment => "Entertainment",
        }
    }

    /// Question keywords that place a market in this category.
    fn question_keywords(self) -> &'static [&'static str] {
        match self {
            FilterCategory::All => &[],
            FilterCategory::Crypto => &["bitcoin", "ethereum", "crypto"],
            FilterCategory::Politics => &["election", "president", "congress", "senate", "mayor", "governor"],
            FilterCategory::Sports => &["nba", "nfl", "fifa", "champion", "world series", "playoff"],
            FilterCategory::Entertainment => &["movie", "oscar", "box office"],
        }
    }

    /// Substring test against the category label and question, case-insensitive.
    pub fn matches(self, m: &Market) -> bool {
        if self == FilterCategory::All {
            return true;
        }
        let category = m.category.to_lowercase();
        let name = self.label().to_lowercase();
        if category.contains(&name) {
            return true;
        }
        let question = m.question.to_lowercase();
        self.question_keywords().iter().any(|k| question.contains(k))
    }
}

// ---------------------------------------------------------------------------
// Sort key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Volume,
    Change,
    Liquidity,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Volume => SortKey::Change,
            SortKey::Change => SortKey::Liquidity,
            SortKey::Liquidity => SortKey::Volume,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Volume => "Volume",
            SortKey::Change => "24h Change",
            SortKey::Liquidity => "Liquidity",
        }
    }

    pub fn compare(self, a: &Market, b: &Market) -> Ordering {
        match self {
            SortKey::Volume => compare_by_volume(a, b),
            SortKey::Change => compare_by_change(a, b),
            SortKey::Liquidity => compare_by_liquidity(a, b),
        }
    }
}

/// Case-insensitive match of the query against question or description.
/// An empty query matches everything.
pub fn matches_query(m: &Market, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    m.question.to_lowercase().contains(&query) || m.description.to_lowercase().contains(&query)
}
