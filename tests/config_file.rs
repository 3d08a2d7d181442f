use assert_fs::prelude::*;
use daily_screenshot::Config;
use daily_screenshot::rules::{DateFlags, FileNameFlags, LocationFlags, WeatherFlags};
use predicates::prelude::*;

const LEGACY_CONFIG: &str = r#"{
  "HowOftenToTakeScreenshot": {
    "Daily": false,
    "Mondays": false,
    "Fridays": true,
    "First Day of Month": false,
    "Last Day of Month": true
  },
  "TakeScreenshotOnRainyDays": false,
  "TimeScreenshotGetsTakenAfter": 700,
  "FolderDestinationForDailyScreenshots": "Default",
  "TakeScreenshotZoomLevel": 0.5,
  "TakeScreenshotKey": "Multiply",
  "TakeScreenshotKeyZoomLevel": 0.75,
  "FolderDestinationForKeypressScreenshots": "~/Pictures/Manual"
}"#;

#[test]
fn missing_file_gives_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(Some(dir.path().join("config.json").as_path())).unwrap();

    assert_eq!(config.rules.len(), 1);
    assert!(config.rules[0].is_placeholder());
    assert!(!config.is_modified());
}

#[test]
fn legacy_file_is_migrated_and_written_back() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(LEGACY_CONFIG).unwrap();

    let mut config = Config::load(Some(file.path())).unwrap();
    assert!(config.is_modified());
    config.normalize();

    assert_eq!(config.rules.len(), 2);
    let auto = config.rule("Unnamed Rule 1").unwrap();
    assert_eq!(
        auto.trigger.days,
        DateFlags::FRIDAYS | DateFlags::LAST_DAY_OF_THE_MONTH
    );
    assert_eq!(
        auto.trigger.weather,
        WeatherFlags::SNOWY | WeatherFlags::SUNNY | WeatherFlags::WINDY
    );
    assert_eq!(auto.trigger.location, LocationFlags::FARM);
    assert_eq!(auto.trigger.start_time, 700);
    assert_eq!(auto.zoom_level, 0.5);

    let manual = config.rule("Unnamed Rule 2").unwrap();
    assert_eq!(manual.trigger.key.as_deref(), Some("Multiply"));
    assert_eq!(manual.trigger.location, LocationFlags::ANY);
    assert_eq!(manual.file_name_mode, FileNameFlags::empty());
    assert_eq!(manual.directory, "~/Pictures/Manual");

    config.save(Some(file.path())).unwrap();
    file.assert(predicate::str::contains("SnapshotRules"));
    file.assert(predicate::str::contains("HowOftenToTakeScreenshot").not());
    file.assert(predicate::str::contains("TakeScreenshotKey\"").not());

    // Second load is already in the current format
    let mut reloaded = Config::load(Some(file.path())).unwrap();
    assert!(!reloaded.is_modified());
    assert!(!reloaded.normalize());
    assert_eq!(reloaded.rules, config.rules);
}

#[test]
fn unknown_day_label_does_not_fail_load() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(r#"{ "HowOftenToTakeScreenshot": { "Blorp Day": true } }"#)
        .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert!(config.is_modified());
    assert_eq!(config.rules.len(), 1);
    assert!(config.rules[0].trigger.days.is_empty());
}

#[test]
fn malformed_legacy_value_does_not_fail_load() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(
        r#"{
            "HowOftenToTakeScreenshot": { "Daily": true },
            "TakeScreenshotZoomLevel": "very close"
        }"#,
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert!(!config.has_extension_data());
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].trigger.days, DateFlags::DAILY);
}

#[test]
fn toml_config_is_supported() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.toml");
    file.write_str(
        r#"
            [[SnapshotRules]]
            name = "Beach"
            directory = "Default"
            zoomLevel = 0.5

            [SnapshotRules.trigger]
            location = "BEACH"
            days = "WEEKENDS"
            startTime = 900
            endTime = 1500
        "#,
    )
    .unwrap();

    let mut config = Config::load(Some(file.path())).unwrap();
    assert!(!config.normalize());
    assert_eq!(config.rules[0].trigger.location, LocationFlags::BEACH);
    assert_eq!(config.rules[0].trigger.weather, WeatherFlags::ANY);

    config.rules[0].name = "Beach weekends".to_string();
    config.save(Some(file.path())).unwrap();
    file.assert(predicate::str::contains("Beach weekends"));
}

#[test]
fn broken_document_is_an_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str("{ not json").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}
