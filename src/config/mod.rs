//! Configuration management

pub mod legacy;
mod schema;

pub use legacy::{LegacyData, MigrationError, MigrationReport, migrate_legacy};
pub use schema::Config;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// On-disk document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Pick the format from a file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

impl Config {
    /// Parse a document and run the legacy fixup on it
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let mut config: Config = match format {
            Format::Json => serde_json::from_str(content).context("Invalid JSON config")?,
            Format::Toml => toml::from_str(content).context("Invalid TOML config")?,
        };

        if let Some(report) = config.on_deserialized_fixup() {
            if report.found {
                info!(
                    "Migrated legacy settings ({} rule(s) added)",
                    report.rules_added
                );
            }
            if !report.is_complete() {
                warn!("Legacy settings were only partially migrated");
            }
        }

        Ok(config)
    }

    /// Render the document in the given format
    pub fn render(&self, format: Format) -> Result<String> {
        match format {
            Format::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize config")
            }
            Format::Toml => toml::to_string_pretty(self).context("Failed to serialize config"),
        }
    }

    /// Load configuration from a file or default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            Self::parse(&content, Format::from_path(&config_path)).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file (with advisory file locking)
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = self.render(Format::from_path(&config_path))?;

        let mut lock_name = config_path.as_os_str().to_owned();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        use fs2::FileExt;
        lock_file
            .lock_exclusive()
            .with_context(|| "Failed to acquire config file lock")?;

        let result = std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {}", config_path.display()));

        let _ = lock_file.unlock();

        result
    }

    /// Get the default config file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("daily-screenshot").join("config.json"))
    }

    /// Folder a rule with the `Default` directory saves into
    pub fn screenshots_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("StardewValley").join("Screenshots"))
    }
}
