use crate::libs::daemon;
use crate::libs::monitor::Deployment;
use anyhow::Result;

/// Runs the monitor in this terminal until Ctrl+C. Alarms are shown inline
/// and closed with Enter.
pub async fn cmd() -> Result<()> {
    daemon::run_with_signal_handling(Deployment::InProcess).await
}
