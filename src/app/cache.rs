use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{info, warn};

const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// On-disk poster store: `<root>/posters/<md5(url)>.jpg`, resized on the way in.
#[derive(Debug)]
pub struct PosterCache {
    dir: PathBuf,
}

impl PosterCache {
    /// Create the poster directory under `root` and prune stale files once.
    pub fn open(root: &Path) -> Self {
        let dir = root.join("posters");
        if let Err(e) = fs::create_dir_all(&dir) {
            // downloads will fail per poster and fall back to the placeholder
            warn!("failed to create poster cache dir {}: {e}", dir.display());
        }
        let cache = Self { dir };
        match cache.prune(Duration::from_secs(POSTER_RETENTION_SECS)) {
            Ok(0) => {}
            Ok(n) => info!("pruned {n} stale posters from {}", cache.dir.display()),
            Err(e) => warn!("poster cache prune failed: {e}"),
        }
        cache
    }

    #[cfg(test)]
    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.jpg"))
    }

    pub fn find(&self, key: &str) -> Option<PathBuf> {
        let p = self.path_for(key);
        p.exists().then_some(p)
    }

    /// Remove cached images (and leftover `.part` files) older than `max_age`.
    pub fn prune(&self, max_age: Duration) -> std::io::Result<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase());
            if !matches!(ext.as_deref(), Some("jpg" | "part")) {
                continue;
            }
            let modified = entry
                .metadata()?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if modified < cutoff {
                let _ = fs::remove_file(&path);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Download `url` with the shared client and store it resized. Cache hits skip the network.
    pub fn download_resized(
        &self,
        client: &Client,
        url: &str,
        key: &str,
        max_width: u32,
        quality: u8,
    ) -> Result<PathBuf, String> {
        if let Some(hit) = self.find(key) {
            return Ok(hit);
        }

        let bytes = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| format!("download {url}: {e}"))?;

        self.store_resized(&bytes, key, max_width, quality)
    }

    /// Decode `bytes`, shrink to `max_width` keeping aspect, write JPEG via a `.part` rename.
    pub fn store_resized(
        &self,
        bytes: &[u8],
        key: &str,
        max_width: u32,
        quality: u8,
    ) -> Result<PathBuf, String> {
        let img = image::load_from_memory(bytes).map_err(|e| format!("decode: {e}"))?;

        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(format!("empty image {w}x{h}"));
        }
        let out: DynamicImage = if w > max_width {
            let new_h = ((h as f32) * (max_width as f32 / w as f32))
                .round()
                .max(1.0) as u32;
            img.resize_exact(max_width, new_h, FilterType::CatmullRom)
        } else {
            img
        };

        // JPEG has no alpha channel
        let rgb = out.to_rgb8();
        let mut jpeg_bytes: Vec<u8> = Vec::new();
        {
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| format!("jpeg encode: {e}"))?;
        }

        let dest = self.path_for(key);
        let tmp = dest.with_extension("jpg.part");
        {
            let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
            f.write_all(&jpeg_bytes).map_err(|e| format!("write: {e}"))?;
        }
        fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
        Ok(dest)
    }
}

/// Return (width, height, RGBA8 bytes) for a cached poster file.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}
