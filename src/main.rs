// src/main.rs
use std::env;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use marquee::app::omdb::OmdbClient;
use marquee::app::MarqueeApp;
use marquee::config::load_config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("MARQUEE_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            {
                eframe::Renderer::Wgpu
            }
            #[cfg(not(target_os = "windows"))]
            {
                eframe::Renderer::Glow
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    // A missing key is fatal before any window opens.
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(2);
        }
    };
    let client = match OmdbClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to build OMDb client: {e}");
            std::process::exit(2);
        }
    };
    info!(
        "OMDb endpoint {}, poster cache {}",
        config.omdb_base_url,
        config.cache_dir.display()
    );

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([420.0, 360.0]),
        ..Default::default()
    };

    match eframe::run_native(
        "Movie Search",
        options,
        Box::new(|_cc| Ok(Box::new(MarqueeApp::new(config, Arc::new(client))))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try MARQUEE_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
