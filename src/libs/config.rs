//! Configuration management for ergonomy.
//!
//! Settings are stored as pretty-printed JSON in `config.json` inside the
//! per-user data directory (see [`DataStorage`]). The file is made of
//! optional modules, each of which falls back to its defaults when absent:
//!
//! - **`alarm`**: activity threshold, alarm timeouts, escalation limit and
//!   the reporting/notification cadences
//! - **`assets`**: where reminder images come from and how they are picked
//! - **`report`**: where periodic activity reports go and in which format
//!
//! ```json
//! {
//!   "alarm": {
//!     "activityThresholdSeconds": 3600,
//!     "primaryAlarmAutoCloseSeconds": 30,
//!     "sessionCloseLimit": 3,
//!     "secondaryAlarmUnclosableSeconds": 10,
//!     "secondaryAlarmAutoCloseSeconds": 7,
//!     "loggingIntervalHours": 1,
//!     "notificationIntervalSeconds": 3600
//!   }
//! }
//! ```
//!
//! A missing file means "all defaults". A file that exists but cannot be
//! parsed, or whose values fail [`Config::validate`], is fatal: nothing is
//! monitored with settings the user did not mean.

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Reasons a configuration is rejected before monitoring starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}

/// Timing and escalation settings.
///
/// Field names serialize in camelCase so the file keys read
/// `activityThresholdSeconds`, `sessionCloseLimit` and so on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmConfig {
    /// Combined keyboard + mouse activity, in seconds, that triggers a reminder.
    pub activity_threshold_seconds: u64,

    /// How long a reminder stays on screen before closing by itself.
    pub primary_alarm_auto_close_seconds: u64,

    /// Reminders the user may close in a row before the next one escalates
    /// to the warning.
    pub session_close_limit: u32,

    /// How long the warning ignores close requests.
    pub secondary_alarm_unclosable_seconds: u64,

    /// How long the warning stays open once it has become closable.
    pub secondary_alarm_auto_close_seconds: u64,

    /// Cadence of activity reports.
    pub logging_interval_hours: u64,

    /// Service mode only: a reminder is raised on this fixed cadence instead
    /// of waiting for the activity threshold.
    pub notification_interval_seconds: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        AlarmConfig {
            activity_threshold_seconds: 3600,
            primary_alarm_auto_close_seconds: 30,
            session_close_limit: 3,
            secondary_alarm_unclosable_seconds: 10,
            secondary_alarm_auto_close_seconds: 7,
            logging_interval_hours: 1,
            notification_interval_seconds: 3600,
        }
    }
}

impl AlarmConfig {
    pub fn activity_threshold(&self) -> Duration {
        Duration::from_secs(self.activity_threshold_seconds)
    }

    pub fn primary_auto_close(&self) -> Duration {
        Duration::from_secs(self.primary_alarm_auto_close_seconds)
    }

    pub fn secondary_unclosable(&self) -> Duration {
        Duration::from_secs(self.secondary_alarm_unclosable_seconds)
    }

    pub fn secondary_auto_close(&self) -> Duration {
        Duration::from_secs(self.secondary_alarm_auto_close_seconds)
    }

    pub fn logging_interval(&self) -> Duration {
        Duration::from_secs(self.logging_interval_hours * 60 * 60)
    }

    pub fn notification_interval(&self) -> Duration {
        Duration::from_secs(self.notification_interval_seconds)
    }

    /// Checks the values that would otherwise make the monitor spin or
    /// never fire. A zero session limit is allowed and means every
    /// interruption is a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("activityThresholdSeconds", self.activity_threshold_seconds),
            ("primaryAlarmAutoCloseSeconds", self.primary_alarm_auto_close_seconds),
            ("secondaryAlarmAutoCloseSeconds", self.secondary_alarm_auto_close_seconds),
            ("loggingIntervalHours", self.logging_interval_hours),
            ("notificationIntervalSeconds", self.notification_interval_seconds),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::MustBePositive(key));
            }
        }
        Ok(())
    }
}

/// How the next reminder image is chosen.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageSelection {
    /// Cycle through the images in order.
    #[default]
    Rotate,
    /// Pick uniformly at random every time.
    Random,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssetsConfig {
    /// Directory scanned for `*.png` and `*.gif` files.
    pub directory: PathBuf,
    #[serde(default)]
    pub selection: ImageSelection,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ReportConfig {
    /// Output directory; defaults to `reports/` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<AlarmConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

impl Config {
    /// Loads the configuration file, or the defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    /// Same as [`Config::read`] for an explicit file.
    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Loads and validates the configuration. This is what every monitoring
    /// entry point calls, so a bad file stops the program before any hook
    /// is installed.
    pub fn load_validated() -> Result<Config> {
        let config = Self::read()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.alarm_config().validate()
    }

    /// Alarm settings with defaults filled in.
    pub fn alarm_config(&self) -> AlarmConfig {
        self.alarm.clone().unwrap_or_default()
    }

    pub fn report_config(&self) -> ReportConfig {
        self.report.clone().unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive setup wizard. Existing values are offered as defaults.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = [Message::ConfigModuleAlarm, Message::ConfigModuleAssets, Message::ConfigModuleReport];
        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| module.to_string()).collect::<Vec<_>>())
            .interact()?;

        for index in selected {
            match index {
                0 => config.alarm = Some(Self::prompt_alarm(config.alarm_config())?),
                1 => config.assets = Some(Self::prompt_assets(config.assets.clone())?),
                2 => config.report = Some(Self::prompt_report(config.report_config())?),
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn prompt_alarm(default: AlarmConfig) -> Result<AlarmConfig> {
        msg_print!(Message::ConfigModuleAlarm);
        let theme = ColorfulTheme::default();
        Ok(AlarmConfig {
            activity_threshold_seconds: Input::with_theme(&theme)
                .with_prompt(Message::PromptActivityThreshold.to_string())
                .default(default.activity_threshold_seconds)
                .interact_text()?,
            primary_alarm_auto_close_seconds: Input::with_theme(&theme)
                .with_prompt(Message::PromptPrimaryAutoClose.to_string())
                .default(default.primary_alarm_auto_close_seconds)
                .interact_text()?,
            session_close_limit: Input::with_theme(&theme)
                .with_prompt(Message::PromptSessionCloseLimit.to_string())
                .default(default.session_close_limit)
                .interact_text()?,
            secondary_alarm_unclosable_seconds: Input::with_theme(&theme)
                .with_prompt(Message::PromptSecondaryUnclosable.to_string())
                .default(default.secondary_alarm_unclosable_seconds)
                .interact_text()?,
            secondary_alarm_auto_close_seconds: Input::with_theme(&theme)
                .with_prompt(Message::PromptSecondaryAutoClose.to_string())
                .default(default.secondary_alarm_auto_close_seconds)
                .interact_text()?,
            logging_interval_hours: Input::with_theme(&theme)
                .with_prompt(Message::PromptLoggingInterval.to_string())
                .default(default.logging_interval_hours)
                .interact_text()?,
            notification_interval_seconds: Input::with_theme(&theme)
                .with_prompt(Message::PromptNotificationInterval.to_string())
                .default(default.notification_interval_seconds)
                .interact_text()?,
        })
    }

    fn prompt_assets(default: Option<AssetsConfig>) -> Result<AssetsConfig> {
        msg_print!(Message::ConfigModuleAssets);
        let theme = ColorfulTheme::default();
        let default = default.unwrap_or(AssetsConfig {
            directory: PathBuf::from("assets"),
            selection: ImageSelection::default(),
        });

        let directory: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptAssetsDirectory.to_string())
            .default(default.directory.display().to_string())
            .interact_text()?;
        let selections = [ImageSelection::Rotate, ImageSelection::Random];
        let selection = Select::with_theme(&theme)
            .with_prompt(Message::PromptImageSelection.to_string())
            .items(&["rotate", "random"])
            .default(selections.iter().position(|s| *s == default.selection).unwrap_or(0))
            .interact()?;

        Ok(AssetsConfig {
            directory: PathBuf::from(directory),
            selection: selections[selection],
        })
    }

    fn prompt_report(default: ReportConfig) -> Result<ReportConfig> {
        msg_print!(Message::ConfigModuleReport);
        let theme = ColorfulTheme::default();

        // An empty answer keeps the data directory default
        let directory: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptReportDirectory.to_string())
            .default(default.directory.as_ref().map(|d| d.display().to_string()).unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let formats = [ReportFormat::Xlsx, ReportFormat::Csv];
        let format = Select::with_theme(&theme)
            .with_prompt(Message::PromptReportFormat.to_string())
            .items(&["xlsx", "csv"])
            .default(formats.iter().position(|f| *f == default.format).unwrap_or(0))
            .interact()?;

        Ok(ReportConfig {
            directory: (!directory.trim().is_empty()).then(|| PathBuf::from(directory.trim())),
            format: formats[format],
        })
    }
}
