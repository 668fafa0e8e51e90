//! Core library modules for ergonomy.
//!
//! ## Layout
//!
//! - **Input**: [`input`] hooks the devices, [`accrual`] turns raw events
//!   into debounced activity time
//! - **Escalation**: [`escalation`] decides when to interrupt and at which
//!   level, [`presenter`], [`alarm`] and [`notifier`] put interruptions on
//!   screen
//! - **Hosting**: [`monitor`] runs the event loop, [`daemon`] wraps it in
//!   signal handling and the background service
//! - **Support**: configuration, data storage, images, reports and messages
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ergonomy::libs::config::Config;
//! use ergonomy::libs::monitor::{Deployment, Monitor};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load_validated()?;
//! let state = Monitor::from_config(&config, Deployment::InProcess)?.run().await?;
//! println!("closed {} times", state.total_close_count());
//! # Ok(())
//! # }
//! ```

pub mod accrual;
pub mod alarm;
pub mod config;
pub mod daemon;
pub mod data_storage;
pub mod escalation;
pub mod images;
pub mod input;
pub mod messages;
pub mod monitor;
pub mod notifier;
pub mod presenter;
pub mod report;
