//! Bridge run loop: activation gate, wiring, and the serialized event loop.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncRead, BufReader};
use tracker_notify_core::{HostEvent, PaneContext};
use tracker_notify_tmux::{ContextResolver, TmuxCli};

use crate::config::Config;
use crate::host::HostApi;
use crate::notifier::Notifier;
use crate::plugin::Plugin;
use crate::process::{ProcessInvoker, TokioInvoker};
use crate::rpc::{EventStream, RpcHost};
use crate::tracker::TrackerClient;

/// Entry point for `run`. Without a pane the bridge stays inert and only
/// drains its input so the host never blocks on a full pipe.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let Some(ref pane) = config.pane else {
        tracing::info!("no tmux pane configured; bridge inert");
        let drained = drain_inert(tokio::io::stdin()).await?;
        tracing::debug!(bytes = drained, "host input closed while inert");
        return Ok(());
    };

    let context = resolve_context(config, pane).await;
    let (host, events) = RpcHost::spawn(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.directory.clone(),
    );
    let host = Arc::new(host);
    let invoker = Arc::new(TokioInvoker);
    let tracker = TrackerClient::new(config.tracker_bin.clone(), Arc::clone(&invoker));
    let notifier = Arc::new(Notifier::new(
        Arc::clone(&host),
        invoker,
        config.notify_bin.clone(),
        config.notify_script.clone(),
    ));
    let plugin = Plugin::new(context, tracker, host, notifier, config.retry);

    drive(plugin, events, shutdown_signal()).await;
    Ok(())
}

pub fn tmux_cli(config: &Config) -> TmuxCli {
    let cli = TmuxCli::new(config.tmux_bin.clone());
    match config.tmux_socket {
        Some(ref socket) => cli.with_socket(socket.clone()),
        None => cli,
    }
}

/// Resolve the pane context once, falling back to the raw pane id.
pub async fn resolve_context(config: &Config, pane: &str) -> PaneContext {
    let cli = tmux_cli(config);
    let raw_pane = pane.to_string();
    let resolved = tokio::task::spawn_blocking(move || {
        ContextResolver::new(cli, raw_pane).resolve_verbose()
    })
    .await;

    match resolved {
        Ok((context, None)) => {
            tracing::info!(pane = %context, "pane context resolved");
            context
        }
        Ok((context, Some(e))) => {
            tracing::warn!(pane = %context, error = %e, "pane context query failed; using pane id only");
            context
        }
        Err(e) => {
            tracing::warn!(error = %e, "pane context query panicked; using pane id only");
            PaneContext::pane_only(pane)
        }
    }
}

/// Feed queued events to the plugin one at a time until the input ends
/// or `shutdown` fires.
///
/// End of input drains background work first. A shutdown signal drops it:
/// queries in flight would never be answered.
pub async fn drive<H, P>(
    mut plugin: Plugin<H, P>,
    mut events: EventStream,
    shutdown: impl Future<Output = ()>,
) where
    H: HostApi,
    P: ProcessInvoker,
{
    tokio::pin!(shutdown);
    tokio::select! {
        () = &mut shutdown => {
            tracing::info!("shutdown requested during reconciliation");
            return;
        }
        () = plugin.start() => {}
    }

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("shutdown requested; abandoning background work");
                return;
            }
            next = events.recv() => {
                let Some(raw) = next else {
                    tracing::info!("host input closed");
                    break;
                };
                match HostEvent::from_value(raw) {
                    Ok(event) => plugin.handle(event).await,
                    Err(e) => tracing::warn!(error = %e, "malformed host event skipped"),
                }
            }
        }
    }

    plugin.shutdown().await;
}

async fn drain_inert<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<u64> {
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("received ctrl-c, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "SIGTERM handler unavailable"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down"),
        Err(e) => {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}
