//! Configuration loading for Mandala.
//!
//! Reads `~/.mandala/config.toml` when it exists and resolves it into the
//! validated settings types from `mandala-types`. A missing file is not an
//! error: every section has a default.
//!
//! ```toml
//! [interchange]
//! export_dir = "${HOME}/Notes/Mandala"
//!
//! [progression]
//! ui_tracks_activity = true
//! utc_offset_minutes = 540
//!
//! [store]
//! data_dir = "${HOME}/.mandala/data"
//!
//! [reminders]
//! enabled = true
//! time = "09:00"
//! frequency = "weekdays"
//! weekly_day = 1
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Deserialize;
use thiserror::Error;

use mandala_types::{
    ActivityTracking, Document, ProgressionSettings, ReminderSchedule, SettingsError,
};

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting in {}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: SettingsError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

// ── Raw file layout ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct MandalaConfig {
    interchange: Option<InterchangeConfig>,
    progression: Option<ProgressionConfig>,
    store: Option<StoreConfig>,
    reminders: Option<RemindersConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct InterchangeConfig {
    export_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressionConfig {
    /// Whether toggling a sub-task in the grid also counts toward the
    /// streak and behavior stats.
    #[serde(default = "default_true")]
    ui_tracks_activity: bool,
    /// Minutes east of UTC. Defaults to the local offset at startup.
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreConfig {
    data_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemindersConfig {
    #[serde(default)]
    enabled: bool,
    #[serde(flatten)]
    schedule: ReminderSchedule,
}

impl MandalaConfig {
    fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    fn resolve(self) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();

        let progression = match self.progression {
            None => defaults.progression,
            Some(raw) => {
                let tracking = ActivityTracking::from_flag(raw.ui_tracks_activity);
                match raw.utc_offset_minutes {
                    Some(minutes) => ProgressionSettings::from_minutes(tracking, minutes)?,
                    None => ProgressionSettings::new(tracking, defaults.progression.offset()),
                }
            }
        };

        let reminders = self
            .reminders
            .filter(|raw| raw.enabled)
            .map(|raw| raw.schedule);

        let export_dir = self
            .interchange
            .and_then(|raw| raw.export_dir)
            .and_then(|dir| expand_path(&dir));

        let data_dir = self
            .store
            .and_then(|raw| raw.data_dir)
            .and_then(|dir| expand_path(&dir))
            .unwrap_or(defaults.data_dir);

        Ok(Settings {
            progression,
            reminders,
            export_dir,
            data_dir,
        })
    }
}

// ── Resolved settings ────────────────────────────────────────

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    progression: ProgressionSettings,
    reminders: Option<ReminderSchedule>,
    export_dir: Option<PathBuf>,
    data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            progression: ProgressionSettings::new(ActivityTracking::Full, *Local::now().offset()),
            reminders: None,
            export_dir: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Settings {
    /// Load `~/.mandala/config.toml`, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = MandalaConfig::load_from(path)?.unwrap_or_default();
        config.resolve().map_err(|source| {
            tracing::warn!("Invalid config at {:?}: {}", path, source);
            ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    #[must_use]
    pub fn with_progression(mut self, progression: ProgressionSettings) -> Self {
        self.progression = progression;
        self
    }

    #[must_use]
    pub const fn progression(&self) -> ProgressionSettings {
        self.progression
    }

    /// `None` when reminders are disabled.
    #[must_use]
    pub const fn reminders(&self) -> Option<ReminderSchedule> {
        self.reminders
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory Markdown files are exchanged through for `document`.
    ///
    /// The document's own `interchange.exportPath` wins over the config
    /// file; without either, exports go to `<data_dir>/export`.
    #[must_use]
    pub fn export_dir(&self, document: &Document) -> PathBuf {
        document
            .interchange
            .as_ref()
            .and_then(|interchange| expand_path(&interchange.export_path))
            .or_else(|| self.export_dir.clone())
            .unwrap_or_else(|| self.data_dir.join("export"))
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mandala").join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mandala")
        .join("data")
}

/// Expand `${VAR}` references and a leading `~/`. Blank results are `None`.
fn expand_path(raw: &str) -> Option<PathBuf> {
    let expanded = expand_env_vars(raw.trim());
    if expanded.is_empty() {
        return None;
    }
    match (expanded.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => Some(home.join(rest)),
        _ => Some(PathBuf::from(expanded)),
    }
}

/// Replace every `${VAR}` with the variable's value (empty when unset).
///
/// An unclosed `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
