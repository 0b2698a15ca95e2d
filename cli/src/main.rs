//! Mandala CLI - binary entry point.
//!
//! ```text
//! main() -> Command::parse(args) -> App::run(command, now) -> stdout
//!                                        |
//!                                        v
//!                      JsonFileStore (<data_dir>/<user>.json)
//! ```
//!
//! Logs go to a file so command output on stdout stays clean.

use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mandala::{App, Command, DEFAULT_USER, USER_ENV};
use mandala_config::{Settings, config_path};
use mandala_store::JsonFileStore;
use mandala_types::UserId;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mix logs into command output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.mandala/logs/mandala.log
    if let Some(config_path) = config_path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("mandala.log"));
    }

    // Fallback: ./.mandala/logs/mandala.log
    candidates.push(PathBuf::from(".mandala").join("logs").join("mandala.log"));

    candidates
}

fn user_from_env() -> Result<UserId> {
    let raw = env::var(USER_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string());
    UserId::new(raw.trim()).with_context(|| format!("invalid {USER_ENV}"))
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args);

    let settings = Settings::load().context("failed to load configuration")?;
    let user = user_from_env()?;
    let store = JsonFileStore::new(settings.data_dir());
    let app = App::new(store, user, settings);

    let output = app.run(&command, Utc::now())?;
    println!("{}", output.trim_end());
    Ok(())
}
