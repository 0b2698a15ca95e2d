//! Command shell over the Mandala store, progression engine and Markdown
//! codec. The `mandala` binary is a thin wrapper around [`App::run`].

mod app;
mod commands;
mod view;

pub use app::App;
pub use commands::{Command, CommandSpec, ExportTarget, ImportTarget, command_specs, help_text};
pub use view::render_overview;

/// Environment variable selecting the user whose document is used.
pub const USER_ENV: &str = "MANDALA_USER";
pub const DEFAULT_USER: &str = "local";
