//! Top-10 category classification

use crate::types::{CategoryId, Sport, Top10Category};
use serde::{Deserialize, Serialize};

/// Club slugs shown under the "clubs" tab
const CLUB_SLUGS: &[&str] = &[
    "real-madrid",
    "fc-barcelona",
    "barcelona-all-time",
    "bayern",
    "manchester-united",
    "liverpool",
    "ac-milan",
    "milan-all-time",
    "boca",
    "river",
];

/// Slug prefixes of national-team lists
const COUNTRY_PREFIXES: &[&str] = &[
    "brazil-",
    "argentina-",
    "france-",
    "germany-",
    "spain-",
    "italy-",
    "england-",
];

/// Grouping of a Top-10 category for browsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Top10Kind {
    Club,
    Country,
    Position,
}

impl Top10Kind {
    /// Classify a category by its slug
    pub fn classify(slug: &str) -> Self {
        let slug = slug.trim().to_ascii_lowercase();

        if CLUB_SLUGS.iter().any(|club| slug.contains(club)) {
            Top10Kind::Club
        } else if COUNTRY_PREFIXES.iter().any(|prefix| slug.starts_with(prefix)) {
            Top10Kind::Country
        } else {
            Top10Kind::Position
        }
    }
}

impl std::fmt::Display for Top10Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Top10Kind::Club => write!(f, "club"),
            Top10Kind::Country => write!(f, "country"),
            Top10Kind::Position => write!(f, "position"),
        }
    }
}

/// Human-readable sport name for a sport category id
pub fn sport_label(category_id: CategoryId) -> String {
    Sport::from_category_id(category_id).to_string()
}

/// A Top-10 category as listed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Top10CategoryView {
    #[serde(flatten)]
    pub category: Top10Category,
    pub kind: Top10Kind,
    pub sport: String,
}

impl From<Top10Category> for Top10CategoryView {
    fn from(category: Top10Category) -> Self {
        Self {
            kind: Top10Kind::classify(&category.slug),
            sport: sport_label(category.category_id),
            category,
        }
    }
}
