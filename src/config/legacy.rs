//! Upgrade of the flat, boolean-keyed settings used by older releases
//!
//! Older config files had no rule list. They carried a handful of top-level
//! keys instead: which days to take the daily screenshot on, whether to
//! skip rainy days, where to save, the zoom level, the time after which the
//! screenshot is taken, and an optional button for manual screenshots.
//! Those keys become one automatic rule and, when a button was set, one
//! key-press rule.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{trace, warn};

use crate::rules::{
    DEFAULT_DIRECTORY, DEFAULT_END_TIME, DEFAULT_START_TIME, DEFAULT_ZOOM, DateFlags,
    FileNameFlags, LocationFlags, Rule, WeatherFlags,
};

/// Out-of-schema keys captured while deserializing a config
pub type LegacyData = IndexMap<String, Value>;

/// Key names used by the flat settings format
pub mod keys {
    pub const HOW_OFTEN: &str = "HowOftenToTakeScreenshot";
    pub const RAINY_DAYS: &str = "TakeScreenshotOnRainyDays";
    pub const DAILY_FOLDER: &str = "FolderDestinationForDailyScreenshots";
    pub const DAILY_ZOOM: &str = "TakeScreenshotZoomLevel";
    pub const START_TIME: &str = "TimeScreenshotGetsTakenAfter";
    pub const KEY: &str = "TakeScreenshotKey";
    pub const KEY_ZOOM: &str = "TakeScreenshotKeyZoomLevel";
    pub const KEY_FOLDER: &str = "FolderDestinationForKeypressScreenshots";
}

/// Button name meaning "no manual screenshot key"
const NO_BUTTON: &str = "None";

/// Errors that abort a legacy migration
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("legacy key \"{key}\" has an unexpected value")]
    InvalidValue {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// What a migration did
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// The legacy day settings were found
    pub found: bool,

    /// Rules were changed and the config should be written back
    pub modified: bool,

    /// The seeded placeholder rule became the automatic rule
    pub reused_placeholder: bool,

    /// Number of rules appended to the rule list
    pub rules_added: usize,

    /// Day labels that did not name a known day
    pub unknown_days: Vec<String>,

    /// Why migration stopped early, if it did
    pub error: Option<MigrationError>,
}

impl MigrationReport {
    /// Whether every step ran
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Turn legacy settings into rules, appending to or reusing `rules`.
///
/// Never fails: a malformed value stops the migration where it is, gets
/// logged, and is recorded in the report. Whatever was built up to that
/// point stays in `rules`. The day map is read first, so a malformed one
/// leaves `rules` untouched.
pub fn migrate_legacy(legacy: &LegacyData, rules: &mut Vec<Rule>) -> MigrationReport {
    let mut report = MigrationReport::default();

    if let Err(e) = apply(legacy, rules, &mut report) {
        warn!("Unable to read old config. Technical details: {:?}", e);
        report.error = Some(e);
    }

    report
}

fn apply(
    legacy: &LegacyData,
    rules: &mut Vec<Rule>,
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    let Some(how_often) = read::<IndexMap<String, bool>>(legacy, keys::HOW_OFTEN)? else {
        trace!("No legacy day settings, nothing to migrate");
        return Ok(());
    };
    report.found = true;
    trace!("Migrating legacy screenshot settings");

    let auto_index = if rules.len() == 1 && rules[0].is_placeholder() {
        report.reused_placeholder = true;
        0
    } else {
        rules.push(Rule::default());
        report.rules_added += 1;
        rules.len() - 1
    };

    let auto = &mut rules[auto_index];
    auto.file_name_mode = FileNameFlags::DEFAULT;
    auto.trigger.location = LocationFlags::FARM;
    auto.trigger.end_time = DEFAULT_END_TIME;

    auto.trigger.weather = match read::<bool>(legacy, keys::RAINY_DAYS)? {
        Some(false) => WeatherFlags::SNOWY | WeatherFlags::SUNNY | WeatherFlags::WINDY,
        _ => WeatherFlags::ANY,
    };

    // Rebuilt from scratch out of the enabled labels
    auto.trigger.days = DateFlags::empty();
    for (label, enabled) in &how_often {
        if !enabled {
            continue;
        }

        // "Last Day of Month" -> "LastDayOfTheMonth"
        let flag_name = label.replace("of", "OfThe").replace(' ', "");
        match DateFlags::from_label(&flag_name) {
            Some(days) => auto.trigger.days |= days,
            None => {
                warn!("Unknown key: \"{}\"", label);
                report.unknown_days.push(label.clone());
            }
        }
    }

    auto.directory = read_or(legacy, keys::DAILY_FOLDER, DEFAULT_DIRECTORY.to_string())?;
    auto.zoom_level = read_or(legacy, keys::DAILY_ZOOM, DEFAULT_ZOOM)?;
    auto.trigger.start_time = read_or(legacy, keys::START_TIME, DEFAULT_START_TIME)?;
    report.modified = true;

    let button = read::<String>(legacy, keys::KEY)?;
    if let Some(button) = button.filter(|b| !is_no_button(b)) {
        trace!("Adding key-press rule for {}", button);

        let mut key_rule = Rule::default();
        key_rule.trigger.key = Some(button);
        key_rule.trigger.location = LocationFlags::ANY;
        key_rule.zoom_level = read_or(legacy, keys::KEY_ZOOM, DEFAULT_ZOOM)?;
        key_rule.directory = read_or(legacy, keys::KEY_FOLDER, DEFAULT_DIRECTORY.to_string())?;
        key_rule.file_name_mode = FileNameFlags::empty();

        rules.push(key_rule);
        report.rules_added += 1;
    }

    Ok(())
}

fn is_no_button(button: &str) -> bool {
    let button = button.trim();
    button.is_empty() || button.eq_ignore_ascii_case(NO_BUTTON)
}

/// Read a legacy key; absent and `null` are both `None`
fn read<T: DeserializeOwned>(
    legacy: &LegacyData,
    key: &'static str,
) -> Result<Option<T>, MigrationError> {
    match legacy.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| MigrationError::InvalidValue { key, source }),
    }
}

fn read_or<T: DeserializeOwned>(
    legacy: &LegacyData,
    key: &'static str,
    default: T,
) -> Result<T, MigrationError> {
    Ok(read(legacy, key)?.unwrap_or(default))
}
