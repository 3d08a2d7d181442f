//! Daily Screenshot - rule model for automatic in-game screenshots
//!
//! Rules pair a [`Trigger`] (day, season, weather, location, time window or
//! a button) with where and how to save the capture. The [`Config`] holds
//! the ordered rule list and upgrades settings files written by older
//! releases.

pub mod config;
pub mod rules;

pub use config::{Config, Format, MigrationReport};
pub use rules::{GameState, Rule, RuleEngine, Trigger};

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
});

/// Expand a leading `~` and environment variables (`$VAR`, `${VAR}`).
///
/// Unknown variables are left as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();

    let home = dirs::home_dir();
    let expanded = match (raw.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        (None, Some(home)) if raw == "~" => home.to_string_lossy().into_owned(),
        _ => raw.to_string(),
    };

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    PathBuf::from(result.as_ref())
}
