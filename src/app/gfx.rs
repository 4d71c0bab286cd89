// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, Color32, ColorImage, TextureHandle};

pub const PLACEHOLDER_W: usize = 200;
pub const PLACEHOLDER_H: usize = 300;

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(ctx: &eg::Context, w: u32, h: u32, bytes: &[u8], name: &str) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a texture from a cached poster file. (UI thread only)
pub fn load_texture_from_path(
    ctx: &eg::Context,
    path: &Path,
    cache_name: &str,
) -> Result<TextureHandle, String> {
    let (w, h, bytes) = crate::app::cache::load_rgba(path)?;
    if w == 0 || h == 0 || bytes.len() != (w as usize) * (h as usize) * 4 {
        return Err(format!("bad pixel buffer {w}x{h} ({} bytes)", bytes.len()));
    }
    Ok(upload_rgba(ctx, w, h, &bytes, cache_name))
}

/// Fallback poster: dark vertical gradient with film-strip sprocket holes down both edges.
pub fn placeholder_image(w: usize, h: usize) -> ColorImage {
    let mut img = ColorImage::new([w, h], Color32::from_gray(30));
    let strip = (w / 10).max(4);
    let hole = (strip / 2).max(2);
    let pitch = hole * 2;

    for y in 0..h {
        let shade = 52u8.saturating_sub(((y * 28) / h.max(1)) as u8);
        for x in 0..w {
            let in_strip = x < strip || x >= w.saturating_sub(strip);
            let px = if in_strip {
                let local_x = if x < strip { x } else { x + strip - w };
                let hole_x = (strip - hole) / 2;
                let is_hole = (hole_x..hole_x + hole).contains(&local_x) && (y % pitch) < hole;
                if is_hole {
                    Color32::from_gray(90)
                } else {
                    Color32::from_gray(12)
                }
            } else {
                Color32::from_gray(shade)
            };
            img.pixels[y * w + x] = px;
        }
    }
    img
}

pub fn placeholder_texture(ctx: &eg::Context) -> TextureHandle {
    ctx.load_texture(
        "poster_placeholder",
        placeholder_image(PLACEHOLDER_W, PLACEHOLDER_H),
        eg::TextureOptions::LINEAR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_requested_size_and_strip() {
        let img = placeholder_image(PLACEHOLDER_W, PLACEHOLDER_H);
        assert_eq!(img.size, [PLACEHOLDER_W, PLACEHOLDER_H]);
        assert_eq!(img.pixels.len(), PLACEHOLDER_W * PLACEHOLDER_H);

        // strip=20, hole=10 at x 5..15, rows 0..10 of every 20
        let hole = img.pixels[2 * PLACEHOLDER_W + 8];
        let strip = img.pixels[12 * PLACEHOLDER_W + 8];
        let body = img.pixels[150 * PLACEHOLDER_W + 100];
        assert_eq!(hole, Color32::from_gray(90));
        assert_eq!(strip, Color32::from_gray(12));
        assert_ne!(body, strip);

        // right edge mirrors the left
        let right_hole = img.pixels[2 * PLACEHOLDER_W + (PLACEHOLDER_W - 20 + 8)];
        assert_eq!(right_hole, hole);
    }

    #[test]
    fn tiny_placeholder_does_not_panic() {
        let img = placeholder_image(3, 2);
        assert_eq!(img.pixels.len(), 6);
    }
}
