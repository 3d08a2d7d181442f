//! Snapshot rules - triggers plus where and how to save the capture

mod engine;
mod trigger;

pub use engine::RuleEngine;
pub use trigger::{
    DEFAULT_END_TIME, DEFAULT_START_TIME, DateFlags, GameState, LocationFlags, Season, Trigger,
    WeatherFlags,
};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Directory sentinel meaning "the host's screenshot folder"
pub const DEFAULT_DIRECTORY: &str = "Default";

/// Zoom level used when none (or a bad one) is configured
pub const DEFAULT_ZOOM: f32 = 0.25;

/// Smallest zoom level accepted by validation
pub const MIN_ZOOM: f32 = 0.01;

/// Largest zoom level accepted by validation
pub const MAX_ZOOM: f32 = 1.0;

bitflags! {
    /// Parts that make up a saved screenshot's file name.
    ///
    /// The empty set leaves naming to the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FileNameFlags: u32 {
        const DEFAULT = Self::GAME_ID.bits() | Self::DATE.bits() | Self::UNIQUE_ID.bits();

        const GAME_ID = 1 << 0;
        const DATE = 1 << 1;
        const TIME = 1 << 2;
        const LOCATION = 1 << 3;
        const WEATHER = 1 << 4;
        const PLAYER_NAME = 1 << 5;
        const UNIQUE_ID = 1 << 6;
    }
}

/// A rule that decides when to take a screenshot and where to put it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Human-readable name, unique within a config
    #[serde(default)]
    pub name: String,

    /// Conditions to match (all must match)
    #[serde(default)]
    pub trigger: Trigger,

    /// Destination folder, or [`DEFAULT_DIRECTORY`]
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_zoom")]
    pub zoom_level: f32,

    #[serde(default = "default_file_name_mode")]
    pub file_name_mode: FileNameFlags,

    /// Set only on the rule a fresh config starts with, until it is named
    #[serde(skip)]
    placeholder: bool,
}

fn default_directory() -> String {
    DEFAULT_DIRECTORY.to_string()
}

fn default_zoom() -> f32 {
    DEFAULT_ZOOM
}

fn default_file_name_mode() -> FileNameFlags {
    FileNameFlags::DEFAULT
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: String::new(),
            trigger: Trigger::default(),
            directory: default_directory(),
            zoom_level: default_zoom(),
            file_name_mode: default_file_name_mode(),
            placeholder: false,
        }
    }
}

impl Rule {
    /// Create a new rule
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            name: name.into(),
            trigger,
            ..Default::default()
        }
    }

    /// The untouched rule a fresh config is seeded with
    pub fn placeholder() -> Self {
        Self {
            placeholder: true,
            ..Default::default()
        }
    }

    /// Whether this is still the seeded rule nobody has claimed yet
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Whether this rule still needs a generated name
    pub fn needs_name(&self) -> bool {
        self.placeholder || self.name.trim().is_empty()
    }

    /// Give the rule a name, claiming it if it was the placeholder
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.placeholder = false;
    }

    /// Order rules by name
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    /// Coerce malformed user input back to defaults.
    ///
    /// Returns true if anything changed.
    pub fn validate_user_input(&mut self) -> bool {
        let mut changed = false;

        let trimmed = self.name.trim();
        if trimmed.len() != self.name.len() {
            self.name = trimmed.to_string();
            changed = true;
        }

        if self.directory.trim().is_empty() || self.directory.chars().any(char::is_control) {
            self.directory = default_directory();
            changed = true;
        }

        if !self.zoom_level.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom_level) {
            self.zoom_level = DEFAULT_ZOOM;
            changed = true;
        }

        if self.trigger.validate() {
            changed = true;
        }

        changed
    }

    /// Resolve the destination folder.
    ///
    /// [`DEFAULT_DIRECTORY`] maps to `default_dir`; anything else gets
    /// `~` and environment variable expansion.
    pub fn resolve_directory(&self, default_dir: &Path) -> PathBuf {
        if self.directory == DEFAULT_DIRECTORY {
            default_dir.to_path_buf()
        } else {
            crate::expand_path(Path::new(&self.directory))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rule_defaults() {
        let rule = Rule::new("Morning", Trigger::default());
        assert_eq!(rule.directory, DEFAULT_DIRECTORY);
        assert_eq!(rule.zoom_level, DEFAULT_ZOOM);
        assert_eq!(rule.file_name_mode, FileNameFlags::DEFAULT);
        assert!(!rule.needs_name());
        assert!(!rule.is_placeholder());
    }

    #[test]
    fn test_placeholder_needs_name_until_claimed() {
        let mut rule = Rule::placeholder();
        assert!(rule.needs_name());

        rule.set_name("Farm at noon");
        assert!(!rule.needs_name());
        assert!(!rule.is_placeholder());
    }

    #[test]
    fn test_validate_coerces_bad_input() {
        let mut rule = Rule {
            name: "  Padded ".to_string(),
            directory: "   ".to_string(),
            zoom_level: f32::NAN,
            ..Default::default()
        };

        assert!(rule.validate_user_input());
        assert_eq!(rule.name, "Padded");
        assert_eq!(rule.directory, DEFAULT_DIRECTORY);
        assert_eq!(rule.zoom_level, DEFAULT_ZOOM);

        // Second pass has nothing left to fix
        assert!(!rule.validate_user_input());
    }

    #[test]
    fn test_validate_zoom_range() {
        for (zoom, changed) in [(0.0, true), (0.01, false), (0.5, false), (1.0, false), (4.0, true)] {
            let mut rule = Rule {
                zoom_level: zoom,
                ..Default::default()
            };
            assert_eq!(rule.validate_user_input(), changed, "zoom {}", zoom);
        }
    }

    #[test]
    fn test_validate_keeps_good_rule() {
        let mut rule = Rule {
            name: "Keep".to_string(),
            directory: "~/Pictures/Farm".to_string(),
            zoom_level: 0.75,
            ..Default::default()
        };
        let before = rule.clone();
        assert!(!rule.validate_user_input());
        assert_eq!(rule, before);
    }

    #[test]
    fn test_resolve_default_directory() {
        let rule = Rule::default();
        let base = Path::new("/games/screenshots");
        assert_eq!(rule.resolve_directory(base), base);

        let custom = Rule {
            directory: "/srv/shots".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.resolve_directory(base), PathBuf::from("/srv/shots"));
    }

    #[test]
    fn test_cmp_by_name() {
        let a = Rule::new("A", Trigger::default());
        let b = Rule::new("B", Trigger::default());
        assert_eq!(a.cmp_by_name(&b), Ordering::Less);
        assert_eq!(b.cmp_by_name(&a), Ordering::Greater);
    }

    #[test]
    fn test_parse_rule_document() {
        let json = r#"{
            "name": "Rainy beach",
            "trigger": {
                "location": "BEACH",
                "weather": "RAINY | STORMY",
                "days": "WEEKENDS",
                "startTime": 800,
                "endTime": 1800
            },
            "directory": "Default",
            "zoomLevel": 0.5,
            "fileNameMode": "DATE | LOCATION"
        }"#;

        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.name, "Rainy beach");
        assert_eq!(rule.trigger.location, LocationFlags::BEACH);
        assert_eq!(rule.trigger.weather, WeatherFlags::RAINY | WeatherFlags::STORMY);
        assert_eq!(rule.trigger.days, DateFlags::WEEKENDS);
        assert_eq!(rule.trigger.start_time, 800);
        assert_eq!(rule.trigger.key, None);
        assert_eq!(rule.zoom_level, 0.5);
        assert_eq!(rule.file_name_mode, FileNameFlags::DATE | FileNameFlags::LOCATION);
        assert!(!rule.is_placeholder());
    }
}
