mod cli;
mod controller;
mod editor;
mod logging;
mod settings;
mod store;
mod theme;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use controller::SettingsController;
use editor::TimeoutBounds;
use settings::Settings;
use store::{FileSessionStash, FileSettingsRepository, SettingsRepository};
use tracing::info;
use tui::EditorExit;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init_logging(cli.log_file.clone(), cli.verbose)?;

    let settings_path = match cli.settings_file {
        Some(path) => path,
        None => store::settings_path()?,
    };
    let session_path = store::session_path_for(&settings_path);
    info!(
        "picam-tui {} using {} (log {})",
        env!("CARGO_PKG_VERSION"),
        settings_path.display(),
        log_path.display()
    );

    match cli.command {
        None | Some(Command::Settings) => {
            let repository = FileSettingsRepository::open(settings_path.clone())?;
            let stash = FileSessionStash::new(session_path);
            let controller = SettingsController::open(repository, stash, TimeoutBounds::default());

            match tui::run_settings_editor(controller)? {
                EditorExit::Saved => println!("Saved settings to {}", settings_path.display()),
                EditorExit::Suspended => {
                    println!("Edits stashed. Run picam-tui again to resume.");
                }
                EditorExit::Discarded => println!("Settings unchanged."),
            }
        }
        Some(Command::Show(args)) => {
            let repository = FileSettingsRepository::open(settings_path)?;
            let settings = repository.current();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                return Ok(());
            }
            print_settings(&settings);
        }
        Some(Command::Reset) => {
            // A malformed file is overwritten rather than parsed.
            let mut repository = FileSettingsRepository::with_defaults(settings_path);
            repository.flush().context("failed resetting settings")?;
            FileSessionStash::new(session_path).discard()?;
            info!("settings reset to defaults");
            println!("Settings reset to defaults: {}", repository.path().display());
        }
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("{:<14}  {}", "CAMERA NAME", settings.camera_name);
    println!(
        "{:<14}  {}",
        "SHOW",
        if settings.show_all_cameras {
            "all cameras"
        } else {
            "filtered cameras"
        }
    );
    println!("{:<14}  {} ms", "SCAN TIMEOUT", settings.scan_timeout);
    for connection_type in settings::ConnectionType::ALL {
        println!(
            "{:<14}  {}",
            connection_type.label().to_ascii_uppercase(),
            settings.source(connection_type)
        );
    }
}
