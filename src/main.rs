// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;

use platecheck::app_config::{self, Config};
use platecheck::database::{SearchHistoryEntry, UserRecord};
use platecheck::lookup::ViolationResult;
use platecheck::{AppError, Controller, VehicleType};

/// CLI Wrapper for VehicleType to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliVehicleType {
    Car,
    Motorcycle,
}

impl From<CliVehicleType> for VehicleType {
    fn from(cli_type: CliVehicleType) -> Self {
        match cli_type {
            CliVehicleType::Car => VehicleType::Car,
            CliVehicleType::Motorcycle => VehicleType::Motorcycle,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up the violations recorded for a license plate
    Search {
        /// License plate to look up
        #[arg(value_name = "PLATE")]
        plate: String,

        /// Vehicle type the plate is registered for
        #[arg(short = 't', long, value_enum, default_value = "car")]
        vehicle_type: CliVehicleType,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches, most recent first
    History {
        /// Number of entries to show (defaults to the configured limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one search history entry
    Delete {
        /// Entry id as shown by `history`
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Delete the whole search history
    Clear,

    /// Check that the lookup service is reachable
    Ping,

    /// Manage the local user profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Show database statistics
    Stats,

    /// Generate shell completions for platecheck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Create a profile and make it the current one
    Set {
        /// Display name
        #[arg(value_name = "NAME")]
        name: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Show the current profile
    Show,
}

/// platecheck - Traffic violation lookup
///
/// Looks up the traffic violations recorded for a license plate and keeps a
/// local history of the plates searched.
#[derive(Parser, Debug)]
#[command(name = "platecheck")]
#[command(version)]
#[command(about = "Traffic violation lookup with search history")]
#[command(long_about = "platecheck queries a traffic violation service by license plate and remembers your searches.

EXAMPLES:
    platecheck search 30A12345                    # Look up a car plate
    platecheck search 59X1-23456 -t motorcycle    # Look up a motorcycle plate
    platecheck history                            # Show recent searches
    platecheck delete 3                           # Remove one history entry
    platecheck clear                              # Remove the whole history
    platecheck ping                               # Check the lookup service
    platecheck completions bash > platecheck.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in platecheck.json by default. You can specify a
    different config file with --config. If the config file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "platecheck.json", global = true)]
    config: String,

    /// Database file path (overrides the configuration)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "platecheck", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        error!("{}", e.user_message());
        log::debug!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Load the configuration with command line overrides applied
fn load_config(options: &CommandLineOptions) -> Result<Config, AppError> {
    let cli_log_level: Option<app_config::LogLevel> = options.log_level.clone().map(Into::into);

    // Apply a command line log level before the config file is read
    if let Some(level) = &cli_log_level {
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    config.apply_overrides(options.database.clone(), cli_log_level);
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

async fn run(options: CommandLineOptions) -> Result<(), AppError> {
    let config = load_config(&options)?;
    let controller = Controller::new(config)?;

    match options.command {
        Commands::Search {
            plate,
            vehicle_type,
            json,
        } => {
            let outcome = controller.search(&plate, vehicle_type.into()).await?;
            if json {
                let value = serde_json::json!({
                    "result": outcome.result,
                    "entry": outcome.entry,
                });
                print_json(&value)?;
            } else {
                print_violations(&outcome.result);
                println!();
                print_history(&outcome.recent);
            }
        }
        Commands::History { limit, json } => {
            let entries = match limit {
                Some(limit) => controller.recent_history_with_limit(limit).await?,
                None => controller.recent_history().await?,
            };
            if json {
                print_json(&entries)?;
            } else {
                print_history(&entries);
            }
        }
        Commands::Delete { id } => {
            if controller.delete_history_entry(id).await? {
                info!("Deleted history entry {}", id);
            } else {
                warn!("No history entry with id {}", id);
            }
        }
        Commands::Clear => {
            let removed = controller.clear_history().await?;
            info!("Cleared {} history entr{}", removed, if removed == 1 { "y" } else { "ies" });
        }
        Commands::Ping => {
            let report = controller.startup().await;
            if report.api_reachable {
                println!(
                    "Lookup service is reachable at {}",
                    controller.config().api.base_url
                );
            } else {
                println!(
                    "Lookup service is NOT reachable at {}",
                    controller.config().api.base_url
                );
            }
            println!("{} recent search(es) stored", report.recent.len());
            if !report.api_reachable {
                std::process::exit(2);
            }
        }
        Commands::Profile(ProfileCommands::Set { name, email }) => {
            let id = controller.create_profile(&name, email.as_deref()).await?;
            info!("Created profile {} (id {})", name.trim(), id);
        }
        Commands::Profile(ProfileCommands::Show) => match controller.current_profile().await? {
            Some(user) => print_profile(&user),
            None => println!("No profile set. Use `platecheck profile set <NAME>` to create one."),
        },
        Commands::Stats => {
            let stats = controller.stats()?;
            println!("{}", stats);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Unknown(format!("Failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn print_violations(result: &ViolationResult) {
    if result.is_clean() {
        println!("No violations found for {}.", result.license_plate);
        return;
    }

    println!(
        "{} violation(s) found for {} ({} unpaid):",
        result.violations.len(),
        result.license_plate,
        result.unpaid_count()
    );

    for (index, violation) in result.violations.iter().enumerate() {
        let paid = if violation.is_paid() { "paid" } else { "unpaid" };
        println!();
        println!("  #{} [{}] {}", index + 1, paid, violation.status);
        println!("     Time:     {}", violation.violation_time);
        println!("     Location: {}", violation.violation_location);
        println!("     Behavior: {}", violation.violation_behavior);
        println!("     Unit:     {}", violation.detection_unit);
        for place in &violation.resolution_places {
            match &place.address {
                Some(address) => println!("     Resolve at: {} ({})", place.name, address),
                None => println!("     Resolve at: {}", place.name),
            }
        }
    }
}

fn print_history(entries: &[SearchHistoryEntry]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }

    println!("Recent searches:");
    for entry in entries {
        println!(
            "  {:>4}  {:<14} {:<10} x{:<4} {}",
            entry.id,
            entry.license_plate,
            entry.vehicle_type.display_name(),
            entry.search_count,
            entry
                .last_searched
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_profile(user: &UserRecord) {
    println!("Name:    {}", user.name);
    if let Some(email) = &user.email {
        println!("Email:   {}", email);
    }
    println!(
        "Created: {}",
        user.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
    );
}
