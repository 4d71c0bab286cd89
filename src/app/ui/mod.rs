// src/app/ui/mod.rs
pub mod grid;
pub mod topbar;

use eframe::egui as eg;

use super::search::SearchView;

fn centered_message(ui: &mut eg::Ui, text: impl Into<eg::WidgetText>) {
    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.label(text);
    });
}

impl crate::app::MarqueeApp {
    /// Search body: spinner, error panel, grid, or the empty message (in that order).
    pub(crate) fn ui_render_body(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let interactive = self.page_interactive();
        let mut clicked: Option<String> = None;

        match self.search.view() {
            SearchView::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.add(eg::Spinner::new().size(28.0));
                    ui.add_space(8.0);
                    ui.label("Searching...");
                });
            }
            SearchView::Error(msg) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    eg::Frame::group(ui.style())
                        .fill(eg::Color32::from_rgb(60, 20, 20))
                        .stroke(eg::Stroke::new(1.0, eg::Color32::from_rgb(160, 60, 60)))
                        .inner_margin(eg::Margin::same(16.0))
                        .show(ui, |ui| {
                            ui.label(
                                eg::RichText::new(msg).color(eg::Color32::from_rgb(255, 140, 140)),
                            );
                        });
                });
            }
            SearchView::Grid { term, items, total } => {
                let heading = match total {
                    Some(t) if t as usize > items.len() => {
                        format!("Results for \"{term}\" ({} of {t})", items.len())
                    }
                    _ => format!("Results for \"{term}\" ({})", items.len()),
                };
                ui.heading(heading);
                ui.add_space(8.0);

                eg::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        clicked = grid::show_grid(ui, ctx, &mut self.posters, items, interactive);
                    });
            }
            SearchView::NoResults { .. } => {
                centered_message(ui, "No movies found. Try a different search term.");
            }
            SearchView::Nothing => {}
        }

        if let Some(id) = clicked {
            self.select_movie(ctx, &id);
        }
    }
}
