use ergonomy::commands::Cli;
use ergonomy::libs::messages::macros::is_debug_mode;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if is_debug_mode() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ergonomy=debug"));
        fmt().with_env_filter(filter).with_target(false).init();
    }

    Cli::menu().await
}
