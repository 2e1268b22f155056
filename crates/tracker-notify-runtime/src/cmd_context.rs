//! `tracker-notify context`: print the resolved pane context as JSON.

use tracker_notify_core::PaneContext;

use crate::bridge::resolve_context;
use crate::config::Config;

pub(crate) fn render_context(context: &PaneContext) -> anyhow::Result<String> {
    Ok(serde_json::to_string(context)?)
}

/// Returns the process exit code: 1 when no pane is configured.
pub async fn cmd_context(config: &Config) -> anyhow::Result<i32> {
    let Some(ref pane) = config.pane else {
        eprintln!("no tmux pane: set TMUX_PANE or pass --pane");
        return Ok(1);
    };
    let context = resolve_context(config, pane).await;
    println!("{}", render_context(&context)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_context_uses_camel_case_keys() {
        let json = render_context(&PaneContext::resolved("$0", "@3", "%7")).expect("json");
        assert_eq!(json, r#"{"sessionId":"$0","windowId":"@3","paneId":"%7"}"#);
    }

    #[test]
    fn degraded_context_omits_missing_ids() {
        let json = render_context(&PaneContext::pane_only("%7")).expect("json");
        assert_eq!(json, r#"{"paneId":"%7"}"#);
    }

    #[tokio::test]
    async fn missing_pane_exits_one() {
        let opts = crate::cli::GlobalOpts {
            tmux_bin: "tmux".to_string(),
            ..Default::default()
        };
        let config = Config::from_opts(&opts, std::path::Path::new("/h"), "/w");
        assert_eq!(cmd_context(&config).await.expect("ok"), 1);
    }
}
