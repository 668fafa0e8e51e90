//! Background reminder service.
//!
//! Without flags the service runs in the foreground of the calling process,
//! which is also what the detached child executes. `--detach` starts that
//! child and returns, `--stop` terminates it.

use crate::libs::daemon;
use crate::libs::monitor::Deployment;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Start the service as a detached background process
    #[arg(long, conflicts_with = "stop")]
    detach: bool,

    /// Stop the running background service
    #[arg(long)]
    stop: bool,
}

pub async fn cmd(args: ServiceArgs) -> Result<()> {
    if args.stop {
        return daemon::stop();
    }
    if args.detach {
        return daemon::spawn();
    }
    daemon::run_with_signal_handling(Deployment::Service).await
}
