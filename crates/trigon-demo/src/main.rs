mod demo;
mod triangle;

use trigon_engine::logging::{init_logging, LoggingConfig};

use demo::{DemoApp, DemoConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::default();
    log::info!(
        "starting `{}` ({}x{})",
        config.title,
        config.width,
        config.height
    );

    DemoApp::new(config).run()
}
