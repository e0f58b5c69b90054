use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use tss_console::config::{parse_log_level, ConsoleConfig};
use tss_console::managers::{create_shared_admin_manager, create_shared_session_manager};
use tss_console::state::{create_shared_store, FileStorage};

mod commands;

use commands::{Command, Data};

/// Admin console for the training program: accounts, staff approvals and time slots
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding users, slots and the session (overrides TSS_STATE_PATH)
    #[arg(long, short = 'd', global = true)]
    state_path: Option<PathBuf>,

    /// Storage key prefix (overrides TSS_NAMESPACE)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// trace, debug, info, warn, error or off (overrides TSS_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = ConsoleConfig::from_env()?;
    if let Some(path) = args.state_path {
        config.state_path = path;
    }
    if let Some(namespace) = args.namespace {
        config.set_namespace(namespace)?;
    }
    if let Some(level) = args.log_level.as_deref().and_then(parse_log_level) {
        config.log_level = level;
    }

    // Logs go to stderr so command output stays clean
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(config.log_level)
        .init();

    debug!(
        "Opening state in {} (namespace {})",
        config.state_path.display(),
        config.namespace
    );
    let storage = FileStorage::open(&config.state_path).with_context(|| {
        format!("could not open state directory {}", config.state_path.display())
    })?;

    let store = create_shared_store(Arc::new(storage), &config.namespace);
    let data = Data {
        session: create_shared_session_manager(store.clone()),
        admin: create_shared_admin_manager(store.clone()),
        store,
    };

    commands::run(&data, args.command)
}
