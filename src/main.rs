mod app;
mod cli;
mod color;
mod data;
mod state;
mod ui;

use anyhow::anyhow;
use app::HotelScopeApp;
use clap::Parser;
use cli::{Cli, Command};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Command::Report(args)) = &cli.command {
        return cli::run_report(args, &mut std::io::stdout().lock());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hotel Scope – Listing Explorer",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(HotelScopeApp::with_initial_file(
                cli.path.as_deref(),
            )))
        }),
    )
    .map_err(|e| anyhow!("viewer exited with error: {e}"))
}
