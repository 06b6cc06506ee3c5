use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use chainview::feed::records;
use chainview::gui::frontend::FlowApp;
use chainview::persistence::persist::{self, SessionFile};
use chainview::persistence::settings::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "chainview", version, about = "Layered attack-surface flow graph viewer")]
struct Cli {
    /// Flow snapshot (JSON) to load instead of the saved session
    snapshot: Option<PathBuf>,

    /// Skip the saved session and start from the built-in demo snapshot
    #[arg(long)]
    fresh: bool,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let settings = AppSettings::load().unwrap_or_default();
    persist::set_settings_override(settings.clone());

    let session = resolve_session(&cli);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 710.0])
            // Provide sensible bounds so the UI stays usable on small screens
            .with_min_inner_size([700.0, 420.0])
            .with_resizable(true),
        ..Default::default()
    };
    eframe::run_native(
        "Chainview",
        options,
        Box::new(move |_cc| Ok(Box::new(FlowApp::new(settings, session)) as Box<dyn eframe::App>)),
    )
}

// Startup order: explicit snapshot beats the saved session, --fresh beats
// both, and a missing session falls back to the demo graph.
fn resolve_session(cli: &Cli) -> SessionFile {
    if let Some(path) = &cli.snapshot {
        let snapshot = match records::load_snapshot(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("chainview: {:#}", e);
                std::process::exit(2);
            }
        };
        // Keep the saved view where node ids still resolve
        let view = persist::load_active()
            .ok()
            .flatten()
            .map(|s| s.view)
            .unwrap_or_default();
        return SessionFile { snapshot, view };
    }
    if cli.fresh {
        return SessionFile {
            snapshot: records::demo_snapshot(),
            view: Default::default(),
        };
    }
    persist::load_active().ok().flatten().unwrap_or_else(|| SessionFile {
        snapshot: records::demo_snapshot(),
        view: Default::default(),
    })
}
