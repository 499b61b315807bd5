//! Native globe viewer
//!
//! Run with: cargo run --bin hacker-globe --features native

use hacker_globe::app::GlobeApp;
use hacker_globe::config::AppConfig;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hacker_globe=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = AppConfig::from_env();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("hacker globe")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "hacker globe",
        options,
        Box::new(|cc| Ok(Box::new(GlobeApp::new(cc, config)))),
    )?;
    Ok(())
}
