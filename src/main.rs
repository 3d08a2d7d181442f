//! Daily Screenshot CLI
//!
//! Inspect, upgrade and try out screenshot rule configs.

use anyhow::{Context, Result};
use clap::Parser;
use daily_screenshot::config::Config;
use daily_screenshot::rules::{GameState, LocationFlags, RuleEngine, Season, WeatherFlags};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "daily-screenshot")]
#[command(author, version, about = "Screenshot rule configuration tool")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List all rules (default)
    List,

    /// Validate config file without writing it
    Check,

    /// Upgrade and normalize the config file, writing it back if it changed
    Migrate {
        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which rules would fire for a given game state
    Eval {
        /// Game clock, e.g. 600 for 6:00 AM or 2400 for midnight
        #[arg(short, long, default_value_t = 600)]
        time: u32,

        /// Day of the month (1-28)
        #[arg(short, long, default_value_t = 1)]
        day: u8,

        #[arg(short, long, default_value = "spring")]
        season: Season,

        #[arg(short, long, default_value = "sunny", value_parser = parse_weather)]
        weather: WeatherFlags,

        #[arg(short, long, default_value = "farm", value_parser = parse_location)]
        location: LocationFlags,

        /// Button pressed this tick
        #[arg(short, long)]
        key: Option<String>,
    },
}

fn flag_name(s: &str) -> String {
    s.trim().replace(['-', ' '], "_").to_ascii_uppercase()
}

fn parse_weather(s: &str) -> Result<WeatherFlags, String> {
    WeatherFlags::from_name(&flag_name(s)).ok_or_else(|| format!("unknown weather: {}", s))
}

fn parse_location(s: &str) -> Result<LocationFlags, String> {
    LocationFlags::from_name(&flag_name(s)).ok_or_else(|| format!("unknown location: {}", s))
}

/// Load the config and bring it into canonical shape
fn load(path: Option<&std::path::Path>) -> Result<Config> {
    let mut config = Config::load(path)?;
    config.normalize();
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("DAILY_SCREENSHOT_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        None | Some(Commands::List) => {
            let config = load(cli.config.as_deref())?;
            let default_dir = Config::screenshots_dir().unwrap_or_else(|| PathBuf::from("."));
            println!("Rules:");
            for (i, rule) in config.rules.iter().enumerate() {
                let kind = match rule.trigger.key {
                    Some(ref key) => format!("key {}", key),
                    None => "auto".to_string(),
                };
                println!(
                    "  [{}] {} ({}) -> {}",
                    i + 1,
                    rule.name,
                    kind,
                    rule.resolve_directory(&default_dir).display()
                );
            }
        }
        Some(Commands::Check) => match load(cli.config.as_deref()) {
            Ok(config) => {
                println!("✓ Config is valid");
                println!("  {} rules", config.rules.len());
                if config.is_modified() {
                    println!("  Run `daily-screenshot migrate` to save the corrected rules");
                }
            }
            Err(e) => {
                eprintln!("✗ Config error: {:#}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Migrate { dry_run }) => {
            let path = cli
                .config
                .clone()
                .or_else(Config::default_path)
                .context("Could not determine config path")?;
            let config = load(Some(path.as_path()))?;

            if dry_run {
                print!("{}", config.render(daily_screenshot::Format::from_path(&path))?);
            } else if config.is_modified() {
                config.save(Some(path.as_path()))?;
                println!("✓ Wrote {} rules to {}", config.rules.len(), path.display());
            } else {
                println!("✓ Config is already up to date");
            }
        }
        Some(Commands::Eval {
            time,
            day,
            season,
            weather,
            location,
            key,
        }) => {
            let config = load(cli.config.as_deref())?;
            let engine = RuleEngine::new(config.rules);
            let state = GameState {
                time_of_day: time,
                day_of_month: day,
                season,
                weather,
                location,
                pressed_key: key,
            };

            let mut matched = 0;
            for rule in engine.evaluate(&state) {
                println!("  ✓ {}", rule.name);
                matched += 1;
            }
            if matched == 0 {
                println!("  No rules match");
            }
        }
    }

    Ok(())
}
