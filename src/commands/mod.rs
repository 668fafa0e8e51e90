//! Command-line interface.
//!
//! | Command                           | What it does                              |
//! |-----------------------------------|-------------------------------------------|
//! | `init`                            | Interactive configuration wizard          |
//! | `watch`                           | Monitor in this terminal                  |
//! | `service [--detach \| --stop]`    | Background monitor with alarm processes   |
//! | `alarm <primary\|secondary> [IMG]`| Show one alarm, report via exit code      |
//! | `dismiss`                         | Close the alarm currently on screen       |

pub mod alarm;
pub mod dismiss;
pub mod init;
pub mod service;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init,
    #[command(about = "Watch keyboard and mouse activity and remind you to take breaks")]
    Watch,
    #[command(about = "Run the reminder service in the background")]
    Service(service::ServiceArgs),
    #[command(about = "Show a single alarm (used by the service)", arg_required_else_help = true)]
    Alarm(alarm::AlarmArgs),
    #[command(about = "Close the alarm currently on screen")]
    Dismiss,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init => init::cmd(),
            Commands::Watch => watch::cmd().await,
            Commands::Service(args) => service::cmd(args).await,
            Commands::Alarm(args) => alarm::cmd(args).await,
            Commands::Dismiss => dismiss::cmd(),
        }
    }
}
