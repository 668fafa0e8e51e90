//! The alarm process launched by the service.
//!
//! Shows a single interruption in its own terminal and exits with the
//! outcome: `1` when the user closed it (Enter, or `ergonomy dismiss` from
//! any terminal), `0` when it closed by itself.
//! Durations come from the same configuration file the service reads.

use crate::libs::alarm;
use crate::libs::config::Config;
use crate::libs::escalation::{InterruptionRequest, Level};
use crate::libs::messages::Message;
use crate::msg_error_anyhow;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AlarmArgs {
    /// Alarm level: primary or secondary
    level: Level,

    /// Image to show with a primary alarm
    image: Option<PathBuf>,
}

pub async fn cmd(args: AlarmArgs) -> Result<()> {
    let config = Config::load_validated().map_err(|e| msg_error_anyhow!(Message::ConfigInvalid(e.to_string())))?;
    let settings = config.alarm_config();

    // The id is only meaningful inside the service
    let request = match args.level {
        Level::Primary => InterruptionRequest::primary(0, settings.primary_auto_close(), args.image),
        Level::Secondary => InterruptionRequest::secondary(0, settings.secondary_unclosable(), settings.secondary_auto_close()),
    };

    let mut dismissals = alarm::user_dismissals();
    let kind = alarm::show(&request, &mut dismissals).await;
    std::process::exit(kind.exit_code());
}
