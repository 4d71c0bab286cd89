// src/app/detail.rs
use std::sync::mpsc::Sender;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{debug, warn};

use super::omdb::MovieCatalog;
use super::types::{DetailMsg, DetailRecord, FetchState, Lookup, RequestTag};

pub const DETAIL_NOT_FOUND: &str = "Movie not found";
pub const DETAIL_FAILED: &str = "Failed to fetch movie details";

#[derive(Debug, PartialEq, Eq)]
pub enum DetailView<'a> {
    Hidden,
    Loading,
    Failed(&'a str),
    Ready(&'a DetailRecord),
}

/// Selection plus the overlay's own fetch lifecycle for that selection.
#[derive(Debug, Default)]
pub struct DetailState {
    selected: Option<String>,
    fetch: FetchState<DetailRecord>,
    next_seq: u64,
}

impl DetailState {
    #[cfg(test)]
    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Open the overlay for `id`. Returns the request to issue, or `None` when
    /// the identifier is blank or already the current one.
    pub fn select(&mut self, id: &str) -> Option<RequestTag> {
        let id = id.trim();
        if id.is_empty() || self.selected.as_deref() == Some(id) {
            return None;
        }
        self.next_seq += 1;
        let tag = RequestTag {
            seq: self.next_seq,
            key: id.to_string(),
        };
        self.selected = Some(tag.key.clone());
        self.fetch = FetchState::Loading(tag.clone());
        Some(tag)
    }

    /// Drop the selection and everything fetched for it.
    pub fn close(&mut self) {
        self.selected = None;
        self.fetch = FetchState::Idle;
    }

    /// Apply a finished detail request unless the overlay has moved on.
    pub fn apply(&mut self, msg: DetailMsg) -> bool {
        let current = self.selected.as_deref() == Some(msg.tag.key.as_str());
        if !current || !self.fetch.awaits(&msg.tag) {
            debug!(
                "dropping stale detail response #{} for {}",
                msg.tag.seq, msg.tag.key
            );
            return false;
        }

        self.fetch = match msg.outcome {
            Ok(Lookup::Found(rec))
                if rec.id.is_empty() || rec.id.eq_ignore_ascii_case(&msg.tag.key) =>
            {
                FetchState::Success(rec)
            }
            Ok(Lookup::Found(rec)) => {
                warn!("detail for {} answered with {}", msg.tag.key, rec.id);
                FetchState::Failed(DETAIL_FAILED.to_string())
            }
            Ok(Lookup::Rejected(reason)) => {
                FetchState::Failed(reason.unwrap_or_else(|| DETAIL_NOT_FOUND.to_string()))
            }
            Err(e) => {
                warn!("detail fetch for {} failed: {e}", msg.tag.key);
                FetchState::Failed(DETAIL_FAILED.to_string())
            }
        };
        true
    }

    pub fn view(&self) -> DetailView<'_> {
        if self.selected.is_none() {
            return DetailView::Hidden;
        }
        match &self.fetch {
            FetchState::Idle | FetchState::Loading(_) => DetailView::Loading,
            FetchState::Failed(msg) => DetailView::Failed(msg),
            FetchState::Success(rec) => DetailView::Ready(rec),
        }
    }
}

pub(crate) fn spawn_detail(
    catalog: Arc<dyn MovieCatalog>,
    tag: RequestTag,
    tx: Sender<DetailMsg>,
    ctx: eg::Context,
) {
    std::thread::spawn(move || {
        let outcome = catalog.details(&tag.key);
        let _ = tx.send(DetailMsg { tag, outcome });
        ctx.request_repaint();
    });
}

// ---- overlay ----

fn section(ui: &mut eg::Ui, heading: &str, body: &str) {
    ui.label(eg::RichText::new(heading).strong());
    let body = body.trim();
    ui.label(if body.is_empty() { "—" } else { body });
    ui.add_space(6.0);
}

impl crate::app::MarqueeApp {
    pub(crate) fn ui_render_detail_overlay(&mut self, ctx: &eg::Context) {
        if !self.detail.is_open() {
            return;
        }

        // Dim the page under the window; panels sit below this layer, windows above.
        let screen = ctx.screen_rect();
        ctx.layer_painter(eg::LayerId::new(
            eg::Order::PanelResizeLine,
            eg::Id::new("detail_dim"),
        ))
        .rect_filled(screen, 0.0, eg::Color32::from_black_alpha(128));

        if ctx.input(|i| i.key_pressed(eg::Key::Escape)) {
            self.close_detail();
            return;
        }

        let width = (screen.width() * 0.9).clamp(280.0, 680.0);
        let max_h = screen.height() * 0.9;
        let mut close = false;

        eg::Window::new("Movie details")
            .id(eg::Id::new("detail_overlay"))
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, [0.0, 0.0])
            .default_width(width)
            .show(ctx, |ui| {
                ui.set_width(width);
                match self.detail.view() {
                    DetailView::Hidden => {}
                    DetailView::Loading => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(24.0);
                            ui.add(eg::Spinner::new().size(28.0));
                            ui.add_space(8.0);
                            ui.label("Loading...");
                            ui.add_space(24.0);
                        });
                    }
                    DetailView::Failed(msg) => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(12.0);
                            ui.label(msg);
                            ui.add_space(12.0);
                            if ui.button("Close").clicked() {
                                close = true;
                            }
                            ui.add_space(6.0);
                        });
                    }
                    DetailView::Ready(rec) => {
                        ui.horizontal(|ui| {
                            ui.heading(&rec.title);
                            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                                if ui.button("✕").on_hover_text("Close").clicked() {
                                    close = true;
                                }
                            });
                        });
                        ui.separator();

                        eg::ScrollArea::vertical()
                            .max_height(max_h - 80.0)
                            .auto_shrink([false, true])
                            .show(ui, |ui| {
                                ui.horizontal_top(|ui| {
                                    let poster_w = (width / 3.0).clamp(120.0, 220.0);
                                    let tex = self.posters.texture(ctx, &rec.poster);
                                    ui.image((tex.id(), eg::vec2(poster_w, poster_w * 1.5)));

                                    ui.vertical(|ui| {
                                        let line = rec.summary_line();
                                        if !line.is_empty() {
                                            ui.label(eg::RichText::new(line).weak());
                                        }
                                        if let Some(badge) = rec.rating_badge() {
                                            ui.add_space(4.0);
                                            ui.label(
                                                eg::RichText::new(badge)
                                                    .strong()
                                                    .color(eg::Color32::from_rgb(230, 190, 60)),
                                            );
                                        }
                                        ui.add_space(8.0);
                                        section(ui, "Plot", &rec.plot);
                                        section(ui, "Genre", &rec.genre);
                                        section(ui, "Director", &rec.director);
                                        section(ui, "Cast", &rec.cast);
                                        section(ui, "Released", &rec.released);
                                    });
                                });
                            });
                    }
                }
            });

        if close {
            self.close_detail();
        }
    }
}
