pub mod site_config;

pub use site_config::SiteConfig;

#[cfg(feature = "cli")]
use crate::core::salary::SalaryType;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_range, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
pub const DEFAULT_SETTINGS_PATH: &str = "./wage-clock-settings.json";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "wage-clock")]
#[command(about = "Shows prices as the work time needed to pay for them")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum Command {
    /// Convert price strings to work time
    Convert {
        #[arg(required = true)]
        prices: Vec<String>,

        #[arg(long, help = "Hourly wage; read from the settings file when omitted")]
        wage: Option<f64>,

        #[arg(long, help = "Hours in one workday")]
        hours: Option<f64>,

        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: String,
    },
    /// Store a salary as the hourly wage used for conversion
    Configure {
        #[arg(long)]
        amount: f64,

        #[arg(long, value_enum, default_value = "hourly")]
        salary_type: SalaryType,

        #[arg(long, default_value = "8")]
        hours: f64,

        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: String,
    },
    /// Print the stored salary settings, seeding defaults if there are none
    Show {
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: String,
    },
    /// Run the converter against a sample product page
    Demo {
        #[arg(long, help = "Site configuration TOML")]
        config: Option<String>,

        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: String,

        #[arg(long, help = "Log statistics for every pass")]
        monitor: bool,
    },
}

#[cfg(feature = "cli")]
impl Command {
    pub fn settings_path(&self) -> &str {
        match self {
            Command::Convert { settings, .. }
            | Command::Configure { settings, .. }
            | Command::Show { settings }
            | Command::Demo { settings, .. } => settings,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("settings", self.command.settings_path())?;

        match &self.command {
            Command::Convert { wage, hours, .. } => {
                if let Some(wage) = wage {
                    validate_range("wage", *wage, f64::MIN_POSITIVE, f64::MAX)?;
                }
                if let Some(hours) = hours {
                    validate_range("hours", *hours, f64::MIN_POSITIVE, 24.0)?;
                }
            }
            Command::Demo {
                config: Some(config),
                ..
            } => validate_path("config", config)?,
            // salary forms carry their own messages
            Command::Configure { .. } | Command::Show { .. } | Command::Demo { .. } => {}
        }

        Ok(())
    }
}
