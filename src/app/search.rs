// src/app/search.rs — list-mode searches: query text, result list, fetch lifecycle
use std::sync::mpsc::Sender;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{debug, warn};

use super::omdb::MovieCatalog;
use super::types::{FetchState, Lookup, RequestTag, SearchMsg, SearchResultItem};

pub const NO_MOVIES_FALLBACK: &str = "No movies found";
pub const SEARCH_FAILED: &str = "Failed to fetch movies. Please try again.";

/// What the search body should show this frame, in precedence order.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchView<'a> {
    Loading,
    Error(&'a str),
    Grid {
        term: &'a str,
        items: &'a [SearchResultItem],
        total: Option<u32>,
    },
    NoResults {
        term: &'a str,
    },
    Nothing,
}

#[derive(Debug, Default)]
pub struct SearchState {
    /// Text in the search box; the input edits it directly.
    pub query: String,
    results: Vec<SearchResultItem>,
    total_results: Option<u32>,
    /// `Success` carries the term whose results are in `results`.
    status: FetchState<String>,
    next_seq: u64,
}

impl SearchState {
    #[cfg(test)]
    pub(crate) fn results(&self) -> &[SearchResultItem] {
        &self.results
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> &FetchState<String> {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// The search control is live only when idle and the box holds something.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.query.trim().is_empty()
    }

    /// Start a search for `term`. Blank terms change nothing and issue nothing.
    ///
    /// The previous result list stays in place until the new response lands.
    pub fn begin(&mut self, term: &str) -> Option<RequestTag> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.next_seq += 1;
        let tag = RequestTag {
            seq: self.next_seq,
            key: term.to_string(),
        };
        self.status = FetchState::Loading(tag.clone());
        Some(tag)
    }

    /// Search for whatever is in the box, if the control would be enabled.
    pub fn submit(&mut self) -> Option<RequestTag> {
        if !self.can_submit() {
            return None;
        }
        let query = self.query.clone();
        self.begin(&query)
    }

    /// Apply a finished request. Returns false when the response was stale and dropped.
    pub fn apply(&mut self, msg: SearchMsg) -> bool {
        if !self.status.awaits(&msg.tag) {
            debug!(
                "dropping stale search response #{} for '{}'",
                msg.tag.seq, msg.tag.key
            );
            return false;
        }

        match msg.outcome {
            Ok(Lookup::Found(page)) => {
                self.results = page.items;
                self.total_results = page.total_results;
                self.status = FetchState::Success(msg.tag.key);
            }
            Ok(Lookup::Rejected(reason)) => {
                self.results.clear();
                self.total_results = None;
                self.status =
                    FetchState::Failed(reason.unwrap_or_else(|| NO_MOVIES_FALLBACK.to_string()));
            }
            Err(e) => {
                warn!("search for '{}' failed: {e}", msg.tag.key);
                self.results.clear();
                self.total_results = None;
                self.status = FetchState::Failed(SEARCH_FAILED.to_string());
            }
        }
        true
    }

    pub fn view(&self) -> SearchView<'_> {
        match &self.status {
            FetchState::Loading(_) => SearchView::Loading,
            FetchState::Failed(msg) => SearchView::Error(msg),
            FetchState::Success(term) if !self.results.is_empty() => SearchView::Grid {
                term,
                items: &self.results,
                total: self.total_results,
            },
            FetchState::Success(term) => SearchView::NoResults { term },
            FetchState::Idle => SearchView::Nothing,
        }
    }
}

/// Run one list query off the UI thread; the answer comes back on `tx`.
pub(crate) fn spawn_search(
    catalog: Arc<dyn MovieCatalog>,
    tag: RequestTag,
    tx: Sender<SearchMsg>,
    ctx: eg::Context,
) {
    std::thread::spawn(move || {
        let outcome = catalog.search(&tag.key);
        let _ = tx.send(SearchMsg { tag, outcome });
        ctx.request_repaint();
    });
}
