// src/app/types.rs
use serde::Deserialize;

use super::omdb::CatalogError;

/// Value the API puts in place of a missing poster URL or rating.
pub const NOT_AVAILABLE: &str = "N/A";

// ---- records received from the catalog ----

/// One row of a list query. Year stays a string: OMDb sends ranges like "2005–2008".
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchResultItem {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Type")]
    pub media_type: String,
    #[serde(rename = "Poster")]
    pub poster: String,
}

/// One successful list query: the items of the first page plus the upstream total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<SearchResultItem>,
    pub total_results: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetailRecord {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Rated")]
    pub age_rating: String,
    #[serde(rename = "Released")]
    pub released: String,
    #[serde(rename = "Runtime")]
    pub runtime: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Director")]
    pub director: String,
    #[serde(rename = "Actors")]
    pub cast: String,
    #[serde(rename = "Plot")]
    pub plot: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "imdbRating")]
    pub rating: String,
    #[serde(rename = "Type")]
    pub media_type: String,
}

impl DetailRecord {
    /// Rating badge text, or `None` when the API has no rating.
    pub fn rating_badge(&self) -> Option<String> {
        let r = self.rating.trim();
        if r.is_empty() || r == NOT_AVAILABLE {
            None
        } else {
            Some(format!("★ {r}/10"))
        }
    }

    /// "2005 • 140 min • PG-13", skipping blanks and N/A parts.
    pub fn summary_line(&self) -> String {
        [&self.year, &self.runtime, &self.age_rating]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != NOT_AVAILABLE)
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// Result of a query whose transport succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// Upstream said `Response: "False"`; carries its `Error` text when present.
    Rejected(Option<String>),
}

// ---- fetch lifecycle ----

/// Identifies one outgoing request: the state value that triggered it plus a sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTag {
    pub seq: u64,
    pub key: String,
}

/// Single lifecycle value per independent fetch; loading and failure cannot coexist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading(RequestTag),
    Success(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// True when `tag` is the request this state is waiting on.
    pub fn awaits(&self, tag: &RequestTag) -> bool {
        matches!(self, Self::Loading(current) if current == tag)
    }
}

// ---- cross-thread messages ----

pub struct SearchMsg {
    pub tag: RequestTag,
    pub outcome: Result<Lookup<SearchPage>, CatalogError>,
}

pub struct DetailMsg {
    pub tag: RequestTag,
    pub outcome: Result<Lookup<DetailRecord>, CatalogError>,
}
