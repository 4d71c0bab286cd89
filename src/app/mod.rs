// src/app/mod.rs — search view + detail overlay over a background-fetching OMDb client

// ---- Standard lib imports ----
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

// ---- Crates ----
use eframe::egui as eg;
use tracing::info;

// ---- Local modules ----
pub mod cache;
pub mod detail;
pub mod gfx;
pub mod omdb;
pub mod posters;
pub mod search;
pub mod types;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::AppConfig;
use cache::PosterCache;
use detail::{spawn_detail, DetailState};
use omdb::MovieCatalog;
use posters::PosterPool;
use search::{spawn_search, SearchState};
use types::{DetailMsg, SearchMsg};

// ---- Tunables ----
const MAX_MSGS_PER_FRAME: usize = 8;

pub struct MarqueeApp {
    config: AppConfig,
    catalog: Arc<dyn MovieCatalog>,

    // search view
    search: SearchState,
    search_tx: Sender<SearchMsg>,
    search_rx: Receiver<SearchMsg>,

    // detail overlay
    detail: DetailState,
    detail_tx: Sender<DetailMsg>,
    detail_rx: Receiver<DetailMsg>,

    posters: PosterPool,

    // one-time init guard
    did_init: bool,
}

impl MarqueeApp {
    pub fn new(config: AppConfig, catalog: Arc<dyn MovieCatalog>) -> Self {
        let (search_tx, search_rx) = mpsc::channel();
        let (detail_tx, detail_rx) = mpsc::channel();
        let posters = PosterPool::new(
            PosterCache::open(&config.cache_dir),
            config.poster_workers,
            Duration::from_secs(config.request_timeout_secs),
        );
        Self {
            config,
            catalog,
            search: SearchState::default(),
            search_tx,
            search_rx,
            detail: DetailState::default(),
            detail_tx,
            detail_rx,
            posters,
            did_init: false,
        }
    }

    /// Search for `term` now. Blank terms are ignored.
    pub(crate) fn run_search(&mut self, ctx: &eg::Context, term: &str) {
        if let Some(tag) = self.search.begin(term) {
            info!("searching for '{}'", tag.key);
            spawn_search(
                Arc::clone(&self.catalog),
                tag,
                self.search_tx.clone(),
                ctx.clone(),
            );
        }
    }

    /// First frame: search for the configured default term, once.
    pub(crate) fn seed_default_search(&mut self, ctx: &eg::Context) {
        if self.did_init {
            return;
        }
        self.did_init = true;
        let term = self.config.default_search_term.clone();
        self.run_search(ctx, &term);
    }

    /// The page behind the detail overlay takes no input while it is open.
    pub(crate) fn page_interactive(&self) -> bool {
        !self.detail.is_open()
    }

    /// Search for the text in the box, if the search control is enabled.
    pub(crate) fn submit_search(&mut self, ctx: &eg::Context) {
        if !self.page_interactive() {
            return;
        }
        if let Some(tag) = self.search.submit() {
            info!("searching for '{}'", tag.key);
            spawn_search(
                Arc::clone(&self.catalog),
                tag,
                self.search_tx.clone(),
                ctx.clone(),
            );
        }
    }

    pub(crate) fn select_movie(&mut self, ctx: &eg::Context, id: &str) {
        if let Some(tag) = self.detail.select(id) {
            spawn_detail(
                Arc::clone(&self.catalog),
                tag,
                self.detail_tx.clone(),
                ctx.clone(),
            );
        }
    }

    pub(crate) fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Apply whatever background requests have finished since the last frame.
    /// Anything left past the per-frame cap gets another frame.
    fn poll_messages(&mut self, ctx: &eg::Context) {
        let mut capped = true;
        for _ in 0..MAX_MSGS_PER_FRAME {
            let Ok(msg) = self.search_rx.try_recv() else {
                capped = false;
                break;
            };
            self.search.apply(msg);
        }
        if capped {
            ctx.request_repaint();
        }

        let mut capped = true;
        for _ in 0..MAX_MSGS_PER_FRAME {
            let Ok(msg) = self.detail_rx.try_recv() else {
                capped = false;
                break;
            };
            self.detail.apply(msg);
        }
        if capped {
            ctx.request_repaint();
        }
    }
}

// ========== App impl ==========
impl eframe::App for MarqueeApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.seed_default_search(ctx);

        self.poll_messages(ctx);
        self.posters.poll(ctx);

        let interactive = self.page_interactive();
        eg::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| self.ui_render_topbar(ui, ctx));
        });

        eg::CentralPanel::default().show(ctx, |ui| {
            self.ui_render_body(ui, ctx);
        });

        self.ui_render_detail_overlay(ctx);
    }
}
