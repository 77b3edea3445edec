//! SortPot - classroom randomizer
//!
//! Command shell over the SortPot core: groups, picker, turn order, dice,
//! roulette and countdown timer, persisted to a local SQLite database.

use std::io::{self, BufRead, Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod shell;
mod state;

use config::AppConfig;
use shell::Outcome;
use state::{AppState, StartupError};

fn load_config() -> Result<AppConfig, StartupError> {
    let dirs = state::project_dirs()?;
    Ok(AppConfig::load_from_dir(dirs.config_dir())?)
}

fn main() {
    // No subscriber yet
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting SortPot");

    let mut app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut app_state) {
        tracing::error!("Shell stopped: {}", e);
        std::process::exit(1);
    }
}

fn run(app_state: &mut AppState) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "SortPot. Type `help` for commands.")?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        // Advance the countdown between commands
        if let Some(alert) = app_state.controller.tick_timer() {
            writeln!(stdout, "Time is up! ({})", alert.sound.as_str())?;
        }

        if line.trim().is_empty() {
            continue;
        }

        let command = match shell::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                continue;
            }
        };

        match shell::execute(&mut app_state.controller, command) {
            Ok(Outcome::Print(text)) => writeln!(stdout, "{}", text)?,
            Ok(Outcome::Quit) => break,
            Err(e) if e.is_user_facing() => writeln!(stdout, "{}", e)?,
            Err(e) => {
                tracing::error!(error = %e, "Command failed");
                writeln!(stdout, "Something went wrong: {}", e)?;
            }
        }
    }

    tracing::info!(data_dir = %app_state.data_dir().display(), "Goodbye");
    Ok(())
}
