// src/app/posters.rs — background poster downloads + lazy texture upload
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, warn};

use super::cache::{url_to_cache_key, PosterCache};
use super::types::NOT_AVAILABLE;

const RESIZE_MAX_W: u32 = 300;
const RESIZE_QUALITY: u8 = 80;
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;

/// Usable poster URL, or `None` for the "N/A" sentinel, blanks and non-http references.
pub fn poster_url(raw: &str) -> Option<&str> {
    let url = raw.trim();
    if url.is_empty() || url.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(url)
}

enum PosterState {
    Pending,            // queued or downloading
    Cached(PathBuf),    // on disk, waiting for upload
    Ready(TextureHandle),
    Failed,
}

type PosterJob = (String, String); // (url, cache key)

struct PosterDone {
    url: String,
    result: Result<PathBuf, String>,
}

pub(crate) struct PosterPool {
    cache: Arc<PosterCache>,
    workers: usize,
    timeout: Duration,
    states: HashMap<String, PosterState>,
    work_tx: Option<Sender<PosterJob>>,
    workers_failed: bool,
    done_tx: Sender<PosterDone>,
    done_rx: Receiver<PosterDone>,
    placeholder: Option<TextureHandle>,
    uploads_left: usize,
}

impl PosterPool {
    pub(crate) fn new(cache: PosterCache, workers: usize, timeout: Duration) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            cache: Arc::new(cache),
            workers: workers.max(1),
            timeout,
            states: HashMap::new(),
            work_tx: None,
            workers_failed: false,
            done_tx,
            done_rx,
            placeholder: None,
            uploads_left: MAX_UPLOADS_PER_FRAME,
        }
    }

    /// Spawn the download workers on first use. They share one HTTP client.
    fn ensure_workers(&mut self, ctx: &eg::Context) -> Option<Sender<PosterJob>> {
        if let Some(tx) = &self.work_tx {
            return Some(tx.clone());
        }
        if self.workers_failed {
            return None;
        }

        let client = match reqwest::blocking::Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION"), " posters"))
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.workers)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("poster http client build failed: {e}");
                self.workers_failed = true;
                return None;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<PosterJob>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..self.workers {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = self.done_tx.clone();
            let client = Arc::clone(&client);
            let cache = Arc::clone(&self.cache);
            let ctx = ctx.clone();

            std::thread::spawn(move || loop {
                let job = {
                    let Ok(rx) = work_rx.lock() else { break };
                    rx.recv()
                };
                let Ok((url, key)) = job else { break };

                let result =
                    cache.download_resized(&client, &url, &key, RESIZE_MAX_W, RESIZE_QUALITY);
                if done_tx.send(PosterDone { url, result }).is_err() {
                    break;
                }
                ctx.request_repaint();
            });
        }

        self.work_tx = Some(work_tx.clone());
        Some(work_tx)
    }

    /// Queue a download for `raw` unless it is the sentinel or already known.
    pub(crate) fn request(&mut self, ctx: &eg::Context, raw: &str) {
        let Some(url) = poster_url(raw) else { return };
        if self.states.contains_key(url) {
            return;
        }
        let url = url.to_string();
        let key = url_to_cache_key(&url);

        // disk hit: no worker round-trip
        if let Some(path) = self.cache.find(&key) {
            self.states.insert(url, PosterState::Cached(path));
            return;
        }

        let queued = self
            .ensure_workers(ctx)
            .is_some_and(|tx| tx.send((url.clone(), key)).is_ok());
        let state = if queued {
            PosterState::Pending
        } else {
            PosterState::Failed
        };
        self.states.insert(url, state);
    }

    /// Drain finished downloads and reset the per-frame upload budget.
    /// Hitting the drain cap schedules another frame for the rest.
    pub(crate) fn poll(&mut self, ctx: &eg::Context) {
        self.uploads_left = MAX_UPLOADS_PER_FRAME;
        for drained in 0.. {
            if drained == MAX_DONE_PER_FRAME {
                ctx.request_repaint();
                break;
            }
            let Ok(done) = self.done_rx.try_recv() else { break };
            let state = match done.result {
                Ok(path) => PosterState::Cached(path),
                Err(e) => {
                    debug!("poster {} failed: {e}", done.url);
                    PosterState::Failed
                }
            };
            self.states.insert(done.url, state);
        }
    }

    pub(crate) fn placeholder(&mut self, ctx: &eg::Context) -> TextureHandle {
        self.placeholder
            .get_or_insert_with(|| super::gfx::placeholder_texture(ctx))
            .clone()
    }

    /// The texture to draw for `raw` right now: the poster once uploaded, otherwise the placeholder.
    pub(crate) fn texture(&mut self, ctx: &eg::Context, raw: &str) -> TextureHandle {
        let Some(url) = poster_url(raw) else {
            return self.placeholder(ctx);
        };
        if !self.states.contains_key(url) {
            self.request(ctx, url);
        }

        let cached_path = match self.states.get(url) {
            Some(PosterState::Ready(tex)) => return tex.clone(),
            Some(PosterState::Cached(path)) if self.uploads_left > 0 => Some(path.clone()),
            Some(PosterState::Cached(_)) => {
                // over budget: upload it next frame
                ctx.request_repaint();
                None
            }
            _ => None,
        };
        let Some(cached_path) = cached_path else {
            return self.placeholder(ctx);
        };

        self.uploads_left -= 1;
        let key = url_to_cache_key(url);
        match super::gfx::load_texture_from_path(ctx, &cached_path, &key) {
            Ok(tex) => {
                self.states
                    .insert(url.to_string(), PosterState::Ready(tex.clone()));
                tex
            }
            Err(e) => {
                // broken file on disk: drop it so a later session re-downloads
                warn!("poster decode failed for {url}: {e}");
                let _ = std::fs::remove_file(&cached_path);
                self.states.insert(url.to_string(), PosterState::Failed);
                self.placeholder(ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(root: &std::path::Path) -> PosterPool {
        PosterPool::new(PosterCache::open(root), 2, Duration::from_secs(5))
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            20,
            30,
            image::Rgb([10, 20, 30]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    fn repaint_delay(out: &eg::FullOutput) -> Duration {
        out.viewport_output
            .get(&eg::ViewportId::ROOT)
            .map(|v| v.repaint_delay)
            .unwrap_or(Duration::MAX)
    }

    #[test]
    fn sentinel_and_malformed_references_have_no_url() {
        assert_eq!(poster_url("N/A"), None);
        assert_eq!(poster_url("n/a"), None);
        assert_eq!(poster_url("   "), None);
        assert_eq!(poster_url("not a url"), None);
        assert_eq!(poster_url("ftp://x/y.jpg"), None);
        assert_eq!(
            poster_url(" https://m.media-amazon.com/images/M/x.jpg "),
            Some("https://m.media-amazon.com/images/M/x.jpg")
        );
    }

    #[test]
    fn sentinel_poster_is_never_queued() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();
        p.request(&ctx, "N/A");
        assert!(p.states.is_empty());
        assert!(p.work_tx.is_none());
    }

    #[test]
    fn sentinel_texture_is_the_placeholder() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();
        let a = p.texture(&ctx, "N/A");
        let b = p.placeholder(&ctx);
        assert_eq!(a.id(), b.id());
        assert!(p.states.is_empty());
    }

    #[test]
    fn cached_poster_skips_workers_and_uploads() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();
        let url = "https://example.invalid/poster.jpg";
        p.cache
            .store_resized(&png_bytes(), &url_to_cache_key(url), 300, 80)
            .unwrap();

        p.poll(&ctx);
        let tex = p.texture(&ctx, url);
        assert!(p.work_tx.is_none(), "disk hit must not start workers");
        assert!(matches!(p.states.get(url), Some(PosterState::Ready(_))));
        assert_ne!(tex.id(), p.placeholder(&ctx).id());
    }

    #[test]
    fn undecodable_cached_file_falls_back_to_placeholder() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();
        let url = "https://example.invalid/broken.jpg";
        let path = p.cache.path_for(&url_to_cache_key(url));
        std::fs::write(&path, b"not an image").unwrap();

        p.poll(&ctx);
        let tex = p.texture(&ctx, url);
        assert_eq!(tex.id(), p.placeholder(&ctx).id());
        assert!(matches!(p.states.get(url), Some(PosterState::Failed)));
        assert!(!path.exists());
    }

    #[test]
    fn cached_posters_over_the_upload_budget_all_land_before_idle() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();

        let png = png_bytes();
        let urls: Vec<String> = (0..10)
            .map(|i| format!("https://example.invalid/poster{i}.jpg"))
            .collect();
        for url in &urls {
            p.cache
                .store_resized(&png, &url_to_cache_key(url), 300, 80)
                .unwrap();
        }

        let mut frames = 0;
        loop {
            frames += 1;
            assert!(frames <= 20, "ui never went idle");
            let out = ctx.run(eg::RawInput::default(), |ctx| {
                p.poll(ctx);
                for url in &urls {
                    p.texture(ctx, url);
                }
            });
            if repaint_delay(&out) == Duration::MAX {
                break;
            }
        }

        for url in &urls {
            assert!(
                matches!(p.states.get(url.as_str()), Some(PosterState::Ready(_))),
                "{url} still on the placeholder"
            );
        }
    }

    #[test]
    fn failed_download_settles_on_placeholder() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();
        let url = "https://example.invalid/missing.jpg";

        p.states.insert(url.to_string(), PosterState::Pending);
        p.done_tx
            .send(PosterDone {
                url: url.to_string(),
                result: Err("HTTP status 404".to_string()),
            })
            .unwrap();

        p.poll(&ctx);
        assert!(matches!(p.states.get(url), Some(PosterState::Failed)));
        let tex = p.texture(&ctx, url);
        assert_eq!(tex.id(), p.placeholder(&ctx).id());
        assert!(p.work_tx.is_none(), "a failed poster is not retried");
    }

    #[test]
    fn drain_cap_schedules_another_frame() {
        let root = tempfile::tempdir().unwrap();
        let mut p = pool(root.path());
        let ctx = eg::Context::default();

        for i in 0..MAX_DONE_PER_FRAME + 3 {
            p.done_tx
                .send(PosterDone {
                    url: format!("https://example.invalid/{i}.jpg"),
                    result: Err("timeout".to_string()),
                })
                .unwrap();
        }

        // a fresh context repaints once on its own; let it go idle first
        while repaint_delay(&ctx.run(eg::RawInput::default(), |_| {})) != Duration::MAX {}

        let out = ctx.run(eg::RawInput::default(), |ctx| p.poll(ctx));
        assert_eq!(p.states.len(), MAX_DONE_PER_FRAME);
        assert_eq!(repaint_delay(&out), Duration::ZERO);

        ctx.run(eg::RawInput::default(), |ctx| p.poll(ctx));
        assert_eq!(p.states.len(), MAX_DONE_PER_FRAME + 3);
    }
}
