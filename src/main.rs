//! Entry point: sets up logging, settings and themes, then runs the sampler
//! thread and the ui loop until the user quits.

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tracing::{error, info, warn};

use restop::app::App;
use restop::cli::Cli;
use restop::collector::Collector;
use restop::config::{self, Settings};
use restop::sampler::Sampler;
use restop::state::SharedState;
use restop::theme::{self, ThemeManager};
use restop::{logging, Error};

fn load_settings(path: &Path) -> Settings {
    Settings::load(path).unwrap_or_else(|err| {
        warn!(%err, "using default settings");
        Settings::default()
    })
}

fn load_themes(dir: &Path) -> ThemeManager {
    match ThemeManager::load_dir(dir) {
        Ok(themes) => themes,
        Err(err) => {
            warn!(%err, "falling back to the built-in theme");
            ThemeManager::builtin()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    let _guard = logging::init(&log_path);

    let config_path = config::resolve_path(cli.config.as_deref());
    let settings = load_settings(&config_path);
    let hz = cli.hz.unwrap_or(settings.hz);

    let themes_dir = cli.themes.clone().unwrap_or_else(theme::resolve_themes_dir);
    let mut themes = load_themes(&themes_dir);
    if let Some(name) = cli.theme.as_deref().or(settings.theme.as_deref()) {
        if !themes.select_by_name(name) {
            warn!(theme = name, "unknown theme, keeping {}", themes.current().name);
        }
    }
    info!(
        themes = themes.len(),
        dir = %themes_dir.display(),
        config = %config_path.display(),
        hz,
        "restop starting"
    );

    let start = Settings {
        theme: Some(themes.current().name.clone()),
        hz,
    };

    let host = sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_owned());

    let mut terminal = match ratatui::try_init() {
        Ok(terminal) => terminal,
        Err(err) => {
            let err = Error::Terminal(err);
            error!(%err, "terminal setup failed");
            eprintln!("restop: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = execute!(io::stdout(), EnableMouseCapture) {
        warn!(%err, "mouse capture unavailable");
    }

    let state = SharedState::shared(hz);
    let shutdown = Arc::new(AtomicBool::new(false));
    let sampler = Sampler::new(Collector::new()).spawn(state.clone(), shutdown.clone());

    let result = sampler.and_then(|handle| {
        let mut app = App::new(state.clone(), themes, host);
        let result = app.run(&mut terminal);

        shutdown.store(true, Ordering::Release);
        if handle.join().is_err() {
            error!("sampler thread panicked");
        }

        let end = Settings {
            theme: Some(app.themes().current().name.clone()),
            hz: state.lock().hz(),
        };
        if let Err(err) = settings.for_exit(&start, &end).save(&config_path) {
            warn!(%err, "settings not saved");
        }
        result
    });

    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();

    match result {
        Ok(()) => {
            info!("restop exited");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "restop failed");
            eprintln!("restop: {err}");
            ExitCode::FAILURE
        }
    }
}
