//! Rule triggers - the environmental conditions a rule fires on

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Earliest time on the game clock (6:00 AM)
pub const DEFAULT_START_TIME: u32 = 600;

/// Latest time on the game clock (2:00 AM the following night)
pub const DEFAULT_END_TIME: u32 = 2600;

bitflags! {
    /// Places a rule may fire in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LocationFlags: u32 {
        const ANY = Self::FARM.bits()
            | Self::FARMHOUSE.bits()
            | Self::GREENHOUSE.bits()
            | Self::BEACH.bits()
            | Self::MOUNTAIN.bits()
            | Self::FOREST.bits()
            | Self::TOWN.bits()
            | Self::DESERT.bits()
            | Self::MINES.bits()
            | Self::SKULL_CAVERN.bits()
            | Self::ISLAND.bits()
            | Self::OTHER.bits();

        const FARM = 1 << 0;
        const FARMHOUSE = 1 << 1;
        const GREENHOUSE = 1 << 2;
        const BEACH = 1 << 3;
        const MOUNTAIN = 1 << 4;
        const FOREST = 1 << 5;
        const TOWN = 1 << 6;
        const DESERT = 1 << 7;
        const MINES = 1 << 8;
        const SKULL_CAVERN = 1 << 9;
        const ISLAND = 1 << 10;
        /// Anywhere not covered by a more specific flag
        const OTHER = 1 << 11;
    }
}

bitflags! {
    /// Weather a rule may fire in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WeatherFlags: u32 {
        const ANY = Self::SUNNY.bits()
            | Self::RAINY.bits()
            | Self::WINDY.bits()
            | Self::STORMY.bits()
            | Self::SNOWY.bits();

        const SUNNY = 1 << 0;
        const RAINY = 1 << 1;
        const WINDY = 1 << 2;
        const STORMY = 1 << 3;
        const SNOWY = 1 << 4;
    }
}

bitflags! {
    /// Calendar days a rule may fire on.
    ///
    /// A date matches when both its day-of-month bit and its season bit are
    /// set. The empty set matches no date at all, which is different from
    /// [`DateFlags::DAILY`].
    ///
    /// Composites are declared before the single bits so the text form
    /// prefers the short names (`"MONDAYS | LAST_DAY_OF_THE_MONTH"`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DateFlags: u64 {
        const DAILY = Self::ALL_DAYS.bits() | Self::ANY_SEASON.bits();
        const WEEKDAYS = Self::MONDAYS.bits()
            | Self::TUESDAYS.bits()
            | Self::WEDNESDAYS.bits()
            | Self::THURSDAYS.bits()
            | Self::FRIDAYS.bits();
        const WEEKENDS = Self::SATURDAYS.bits() | Self::SUNDAYS.bits();
        const MONDAYS = Self::DAY_01.bits() | Self::DAY_08.bits() | Self::DAY_15.bits() | Self::DAY_22.bits() | Self::ANY_SEASON.bits();
        const TUESDAYS = Self::DAY_02.bits() | Self::DAY_09.bits() | Self::DAY_16.bits() | Self::DAY_23.bits() | Self::ANY_SEASON.bits();
        const WEDNESDAYS = Self::DAY_03.bits() | Self::DAY_10.bits() | Self::DAY_17.bits() | Self::DAY_24.bits() | Self::ANY_SEASON.bits();
        const THURSDAYS = Self::DAY_04.bits() | Self::DAY_11.bits() | Self::DAY_18.bits() | Self::DAY_25.bits() | Self::ANY_SEASON.bits();
        const FRIDAYS = Self::DAY_05.bits() | Self::DAY_12.bits() | Self::DAY_19.bits() | Self::DAY_26.bits() | Self::ANY_SEASON.bits();
        const SATURDAYS = Self::DAY_06.bits() | Self::DAY_13.bits() | Self::DAY_20.bits() | Self::DAY_27.bits() | Self::ANY_SEASON.bits();
        const SUNDAYS = Self::DAY_07.bits() | Self::DAY_14.bits() | Self::DAY_21.bits() | Self::DAY_28.bits() | Self::ANY_SEASON.bits();
        const FIRST_DAY_OF_THE_MONTH = Self::DAY_01.bits() | Self::ANY_SEASON.bits();
        const LAST_DAY_OF_THE_MONTH = Self::DAY_28.bits() | Self::ANY_SEASON.bits();
        const ANY_SEASON = Self::SPRING.bits() | Self::SUMMER.bits() | Self::FALL.bits() | Self::WINTER.bits();
        const ALL_DAYS = (1 << 28) - 1;

        const DAY_01 = 1 << 0;
        const DAY_02 = 1 << 1;
        const DAY_03 = 1 << 2;
        const DAY_04 = 1 << 3;
        const DAY_05 = 1 << 4;
        const DAY_06 = 1 << 5;
        const DAY_07 = 1 << 6;
        const DAY_08 = 1 << 7;
        const DAY_09 = 1 << 8;
        const DAY_10 = 1 << 9;
        const DAY_11 = 1 << 10;
        const DAY_12 = 1 << 11;
        const DAY_13 = 1 << 12;
        const DAY_14 = 1 << 13;
        const DAY_15 = 1 << 14;
        const DAY_16 = 1 << 15;
        const DAY_17 = 1 << 16;
        const DAY_18 = 1 << 17;
        const DAY_19 = 1 << 18;
        const DAY_20 = 1 << 19;
        const DAY_21 = 1 << 20;
        const DAY_22 = 1 << 21;
        const DAY_23 = 1 << 22;
        const DAY_24 = 1 << 23;
        const DAY_25 = 1 << 24;
        const DAY_26 = 1 << 25;
        const DAY_27 = 1 << 26;
        const DAY_28 = 1 << 27;

        const SPRING = 1 << 28;
        const SUMMER = 1 << 29;
        const FALL = 1 << 30;
        const WINTER = 1 << 31;
    }
}

/// PascalCase labels accepted by [`DateFlags::from_label`]
const DATE_LABELS: &[(&str, DateFlags)] = &[
    ("Daily", DateFlags::DAILY),
    ("Weekdays", DateFlags::WEEKDAYS),
    ("Weekends", DateFlags::WEEKENDS),
    ("Mondays", DateFlags::MONDAYS),
    ("Tuesdays", DateFlags::TUESDAYS),
    ("Wednesdays", DateFlags::WEDNESDAYS),
    ("Thursdays", DateFlags::THURSDAYS),
    ("Fridays", DateFlags::FRIDAYS),
    ("Saturdays", DateFlags::SATURDAYS),
    ("Sundays", DateFlags::SUNDAYS),
    ("FirstDayOfTheMonth", DateFlags::FIRST_DAY_OF_THE_MONTH),
    ("LastDayOfTheMonth", DateFlags::LAST_DAY_OF_THE_MONTH),
    ("AnySeason", DateFlags::ANY_SEASON),
    ("Spring", DateFlags::SPRING),
    ("Summer", DateFlags::SUMMER),
    ("Fall", DateFlags::FALL),
    ("Winter", DateFlags::WINTER),
];

impl DateFlags {
    /// Bit for a single day of the month (1-28)
    pub fn day(day_of_month: u8) -> Option<Self> {
        if (1..=28).contains(&day_of_month) {
            Self::from_bits(1 << (day_of_month - 1))
        } else {
            None
        }
    }

    /// Day bit plus season bit for a live date
    pub fn for_date(day_of_month: u8, season: Season) -> Option<Self> {
        Self::day(day_of_month).map(|day| day | season.date_flag())
    }

    /// Parse a PascalCase label such as `LastDayOfTheMonth` or `Day_07`.
    ///
    /// Matching is exact, like the names persisted by older releases.
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some((_, flags)) = DATE_LABELS.iter().find(|(name, _)| *name == label) {
            return Some(*flags);
        }

        let digits = label.strip_prefix("Day_")?;
        if digits.len() != 2 {
            return None;
        }
        digits.parse::<u8>().ok().and_then(Self::day)
    }
}

/// Season of the in-game calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    fn date_flag(self) -> DateFlags {
        match self {
            Season::Spring => DateFlags::SPRING,
            Season::Summer => DateFlags::SUMMER,
            Season::Fall => DateFlags::FALL,
            Season::Winter => DateFlags::WINTER,
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season: {}", other)),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        };
        f.write_str(name)
    }
}

/// Live game state a trigger is evaluated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Game clock in HHMM form (600-2600)
    pub time_of_day: u32,

    /// Day of the month (1-28)
    pub day_of_month: u8,

    pub season: Season,

    /// Current weather (a single flag)
    pub weather: WeatherFlags,

    /// Current location (a single flag)
    pub location: LocationFlags,

    /// Button pressed this tick, if any
    pub pressed_key: Option<String>,
}

/// Conditions that must all hold for a rule to fire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default = "default_location")]
    pub location: LocationFlags,

    #[serde(default = "default_weather")]
    pub weather: WeatherFlags,

    /// Empty means "no days configured", which never fires
    #[serde(default = "default_days")]
    pub days: DateFlags,

    #[serde(default = "default_start_time")]
    pub start_time: u32,

    #[serde(default = "default_end_time")]
    pub end_time: u32,

    /// Button that fires this rule manually
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

fn default_location() -> LocationFlags {
    LocationFlags::FARM
}

fn default_weather() -> WeatherFlags {
    WeatherFlags::ANY
}

fn default_days() -> DateFlags {
    DateFlags::DAILY
}

fn default_start_time() -> u32 {
    DEFAULT_START_TIME
}

fn default_end_time() -> u32 {
    DEFAULT_END_TIME
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            location: default_location(),
            weather: default_weather(),
            days: default_days(),
            start_time: default_start_time(),
            end_time: default_end_time(),
            key: None,
        }
    }
}

impl Trigger {
    /// Check if the live game state satisfies this trigger
    pub fn matches(&self, state: &GameState) -> bool {
        // Check calendar day; an empty set never fires
        let Some(today) = DateFlags::for_date(state.day_of_month, state.season) else {
            return false;
        };
        if self.days.is_empty() || !self.days.contains(today) {
            return false;
        }

        // Check weather
        if !self.weather.is_empty() && !self.weather.contains(state.weather) {
            return false;
        }

        // Check location
        if !self.location.is_empty() && !self.location.contains(state.location) {
            return false;
        }

        // Check time window (inclusive)
        if state.time_of_day < self.start_time || state.time_of_day > self.end_time {
            return false;
        }

        // Check manual key
        if let Some(ref key) = self.key {
            let pressed = state
                .pressed_key
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(key));
            if !pressed {
                return false;
            }
        }

        true
    }

    /// Coerce malformed fields back to their defaults.
    ///
    /// Returns true if anything changed.
    pub fn validate(&mut self) -> bool {
        let mut changed = false;

        let window = DEFAULT_START_TIME..=DEFAULT_END_TIME;
        if !window.contains(&self.start_time)
            || !window.contains(&self.end_time)
            || self.start_time > self.end_time
        {
            self.start_time = DEFAULT_START_TIME;
            self.end_time = DEFAULT_END_TIME;
            changed = true;
        }

        if self.key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.key = None;
            changed = true;
        }

        changed
    }

    /// Whether this trigger fires on a button press rather than automatically
    pub fn is_key_trigger(&self) -> bool {
        self.key.is_some()
    }
}
