//! # Ergonomy - Activity-Driven Break Reminders
//!
//! Watches keyboard and mouse activity and interrupts the user once they
//! have been active for too long.
//!
//! ## Features
//!
//! - **Activity Accrual**: Debounced per-channel activity time, so a burst of
//!   keystrokes counts as continuous work and a long gap counts as rest
//! - **Two-Level Escalation**: Dismissable primary reminders, followed by a
//!   secondary reminder that cannot be closed right away once the user has
//!   dismissed too many in a row
//! - **Background Service**: Detached process that launches every reminder
//!   as a separate `alarm` process and reads back its exit code
//! - **Activity Reports**: Periodic Excel or CSV snapshots of accumulated
//!   activity and the all-time close count
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ergonomy::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod libs;
