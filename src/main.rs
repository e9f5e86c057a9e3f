// GUI-subsystem binary on Windows: no console window opens for the editor.
// Headless replay prints through whatever console launched it.
#![windows_subsystem = "windows"]

mod app;

use clap::Parser;
use eframe::egui;

use app::ZPaintApp;
use zpaint::cli::{self, CliArgs};
use zpaint::logger;
use zpaint::settings::AppSettings;
use zpaint::toolbox::check_canvas_size;

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();

    // -- CLI / headless mode ---------------------------------------------
    if args.is_cli_mode() {
        logger::init();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------
    logger::init();

    let mut settings = AppSettings::load();
    if let Some(w) = args.width {
        settings.canvas_width = w;
    }
    if let Some(h) = args.height {
        settings.canvas_height = h;
    }
    if (settings.canvas_width, settings.canvas_height) != (0, 0)
        && let Err(e) = check_canvas_size(settings.canvas_width, settings.canvas_height)
    {
        zpaint::log_warn!("{}; sizing the canvas to the window instead", e);
        settings.canvas_width = 0;
        settings.canvas_height = 0;
    }
    if let Some(z) = args.zoom {
        settings.zoom = z.clamp(settings.zoom_min, settings.zoom_max);
    }
    zpaint::log_info!(
        "starting editor (canvas {}x{}, zoom {}%)",
        settings.canvas_width,
        settings.canvas_height,
        settings.zoom
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title("ZPaint"),
        ..Default::default()
    };

    eframe::run_native(
        "ZPaint",
        options,
        Box::new(move |cc| Box::new(ZPaintApp::new(cc, settings))),
    )
}
