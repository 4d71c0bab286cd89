//! In-memory catalog and fixtures for unit tests.

use std::collections::HashMap;

use super::omdb::{CatalogError, MovieCatalog};
use super::types::{DetailRecord, Lookup, SearchPage, SearchResultItem};

pub(crate) fn item(id: &str, title: &str) -> SearchResultItem {
    SearchResultItem {
        id: id.to_string(),
        title: title.to_string(),
        year: "2005".to_string(),
        media_type: "movie".to_string(),
        poster: "N/A".to_string(),
    }
}

pub(crate) fn detail(id: &str, title: &str) -> DetailRecord {
    DetailRecord {
        id: id.to_string(),
        title: title.to_string(),
        year: "2005".to_string(),
        age_rating: "PG-13".to_string(),
        released: "15 Jun 2005".to_string(),
        runtime: "140 min".to_string(),
        genre: "Action, Drama".to_string(),
        director: "Christopher Nolan".to_string(),
        cast: "Christian Bale, Michael Caine".to_string(),
        plot: format!("Plot of {title}."),
        poster: "N/A".to_string(),
        rating: "8.2".to_string(),
        media_type: "movie".to_string(),
    }
}

/// Serves canned answers: terms map to pages, identifiers to records.
/// Unknown terms/ids are rejected the way OMDb rejects them.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pages: HashMap<String, Vec<SearchResultItem>>,
    records: HashMap<String, DetailRecord>,
    failing_terms: Vec<String>,
}

impl FakeCatalog {
    pub(crate) fn with_page(mut self, term: &str, items: Vec<SearchResultItem>) -> Self {
        self.pages.insert(term.to_string(), items);
        self
    }

    pub(crate) fn with_record(mut self, record: DetailRecord) -> Self {
        self.records.insert(record.id.clone(), record);
        self
    }

    pub(crate) fn failing_on(mut self, term: &str) -> Self {
        self.failing_terms.push(term.to_string());
        self
    }
}

impl MovieCatalog for FakeCatalog {
    fn search(&self, term: &str) -> Result<Lookup<SearchPage>, CatalogError> {
        if self.failing_terms.iter().any(|t| t == term) {
            return Err(CatalogError::Status(502));
        }
        Ok(match self.pages.get(term) {
            Some(items) => Lookup::Found(SearchPage {
                items: items.clone(),
                total_results: Some(items.len() as u32),
            }),
            None => Lookup::Rejected(Some("Movie not found!".to_string())),
        })
    }

    fn details(&self, id: &str) -> Result<Lookup<DetailRecord>, CatalogError> {
        Ok(match self.records.get(id) {
            Some(rec) => Lookup::Found(rec.clone()),
            None => Lookup::Rejected(Some("Incorrect IMDb ID.".to_string())),
        })
    }
}
