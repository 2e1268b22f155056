//! tracker-notify: bridges a coding-agent host's busy/idle status into an
//! external task tracker and desktop notifications, scoped to one tmux pane.

use clap::Parser;

mod bridge;
mod cli;
mod cmd_context;
mod cmd_reconcile;
mod config;
mod fetch;
mod host;
mod logging;
mod notifier;
mod plugin;
mod process;
mod rpc;
mod tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::from_env(&args.opts);
    logging::init(&config.debug_log, config.log_utc_offset);

    let command = args.command.unwrap_or(cli::Command::Run);
    let exit_code = match command {
        cli::Command::Run => {
            bridge::run(&config).await?;
            0
        }
        cli::Command::Context => cmd_context::cmd_context(&config).await?,
        cli::Command::Reconcile => cmd_reconcile::cmd_reconcile(&config).await?,
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
