// src/app/ui/topbar.rs
use eframe::egui as eg;

const INPUT_W: f32 = 320.0;

impl crate::app::MarqueeApp {
    // ---------- SEARCH BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.heading("🎬 Movie Search");
            ui.label(eg::RichText::new("Search for movies and TV shows").weak());
            ui.add_space(8.0);
        });

        let mut submit = false;
        ui.horizontal(|ui| {
            let row_w = INPUT_W + 120.0;
            ui.add_space(((ui.available_width() - row_w) * 0.5).max(0.0));

            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search.query)
                    .hint_text("Search movies...")
                    .desired_width(INPUT_W),
            );
            if resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter)) {
                submit = true;
                resp.request_focus();
            }

            let enabled = self.search.can_submit();
            if ui
                .add_enabled(enabled, eg::Button::new("🔍 Search"))
                .clicked()
            {
                submit = true;
            }
            if self.search.is_loading() {
                ui.add(eg::Spinner::new().size(14.0));
            }
        });
        ui.add_space(8.0);

        // submit() re-checks can_submit, so Enter on a blank box or mid-search does nothing
        if submit {
            self.submit_search(ctx);
        }
    }
}
