// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::posters::PosterPool;
use crate::app::types::SearchResultItem;

pub const H_SPACING: f32 = 16.0;
pub const V_SPACING: f32 = 16.0;
pub const CARD_W: f32 = 170.0;
const TEXT_H: f32 = 66.0;
const TITLE_ROWS: usize = 2;

fn tile_label(item: &SearchResultItem) -> (String, String) {
    let year = item.year.trim();
    let kind = item.media_type.trim();
    let line2 = match (year.is_empty(), kind.is_empty()) {
        (false, false) => format!("{year} • {kind}"),
        (false, true) => year.to_string(),
        (true, false) => kind.to_string(),
        (true, true) => String::new(),
    };
    (item.title.clone(), line2)
}

/// Title wrapped to at most two rows, elided after that.
fn title_job(title: &str, width: f32, color: eg::Color32) -> eg::text::LayoutJob {
    let mut job = eg::text::LayoutJob::single_section(
        title.to_string(),
        eg::text::TextFormat::simple(eg::FontId::proportional(14.0), color),
    );
    job.wrap = eg::text::TextWrapping {
        max_width: width,
        max_rows: TITLE_ROWS,
        break_anywhere: false,
        overflow_character: Some('…'),
    };
    job
}

/// One result card. Returns true when clicked.
fn draw_tile(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    posters: &mut PosterPool,
    item: &SearchResultItem,
    interactive: bool,
) -> bool {
    let card_h = CARD_W * 1.5 + TEXT_H;
    let sense = if interactive {
        eg::Sense::click()
    } else {
        eg::Sense::hover()
    };
    let (rect, resp) = ui.allocate_exact_size(eg::vec2(CARD_W, card_h), sense);

    let poster_rect =
        eg::Rect::from_min_max(rect.min, eg::pos2(rect.min.x + CARD_W, rect.min.y + CARD_W * 1.5));
    let text_rect = eg::Rect::from_min_max(eg::pos2(rect.min.x, poster_rect.max.y), rect.max);

    let tex = posters.texture(ctx, &item.poster);
    ui.painter().image(
        tex.id(),
        poster_rect,
        eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
        eg::Color32::WHITE,
    );

    let (title, line2) = tile_label(item);
    ui.allocate_ui_at_rect(text_rect.shrink2(eg::vec2(4.0, 4.0)), |ui| {
        let job = title_job(&title, ui.available_width(), ui.visuals().strong_text_color());
        ui.add(eg::Label::new(job).wrap());
        if !line2.is_empty() {
            ui.label(eg::RichText::new(line2).weak().size(12.0));
        }
    });

    if interactive && resp.hovered() {
        ui.painter().rect_stroke(
            rect.expand(2.0),
            6.0,
            eg::Stroke::new(2.0, ui.visuals().selection.stroke.color),
        );
    }

    interactive && resp.clicked()
}

/// Results grid; returns the identifier of a clicked tile.
pub(crate) fn show_grid(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    posters: &mut PosterPool,
    items: &[SearchResultItem],
    interactive: bool,
) -> Option<String> {
    let mut clicked = None;

    let avail = ui.available_width();
    let cols = ((avail + H_SPACING) / (CARD_W + H_SPACING)).floor().max(1.0) as usize;
    let used = cols as f32 * CARD_W + cols.saturating_sub(1) as f32 * H_SPACING;
    let left_pad = ((avail - used) * 0.5).max(0.0);

    for row in items.chunks(cols) {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);
            ui.add_space(left_pad);
            for item in row {
                if draw_tile(ui, ctx, posters, item, interactive) {
                    clicked = Some(item.id.clone());
                }
            }
        });
        ui.add_space(V_SPACING);
    }

    clicked
}
