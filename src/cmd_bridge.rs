//! `vaultlink bridge`: the background coordinator over stdio.
//!
//! Each stdin line is one JSON request (`{"type": ...}`) or one browser
//! window/tab event (`{"event": ...}`). Responses are written to stdout as one
//! JSON line each; events only answer when they cannot be applied. Broadcast
//! events are written to stdout as they happen.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, info};

use vaultlink_background::host::{ChannelBroadcaster, MemoryBrowser, MemoryStore, TimerAlarms};
use vaultlink_background::{
    BackgroundHost, Bridge, HttpVaultClient, MessageRouter, SessionCoordinator, SessionSettings,
    VaultApi,
};
use vaultlink_config::Config;

/// Window the in-memory browser starts with.
const INITIAL_WINDOW: u32 = 1;

pub(crate) async fn run(config: &Config) -> anyhow::Result<()> {
    let vault: Arc<dyn VaultApi> = Arc::new(HttpVaultClient::from_config(&config.vault));
    let (alarms, mut fired) = TimerAlarms::new();
    let browser = Arc::new(MemoryBrowser::new());
    browser.open_window(INITIAL_WINDOW);
    let broadcaster = Arc::new(ChannelBroadcaster::default());
    let mut events = broadcaster.subscribe();

    let host = BackgroundHost {
        session_store: Arc::new(MemoryStore::new()),
        local_store: Arc::new(MemoryStore::new()),
        alarms: Arc::new(alarms),
        browser: browser.clone(),
        broadcaster,
    };
    let coordinator = Arc::new(SessionCoordinator::new(
        vault.clone(),
        host,
        SessionSettings::from(config),
    ));
    coordinator.on_startup().await;
    let router = MessageRouter::new(coordinator.clone(), vault, browser.clone());
    let bridge = Bridge::new(router, browser);

    info!(vault = %config.vault.base_url, "Bridge ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(response) = bridge.handle_line(line).await {
                    write_line(&mut stdout, &response).await?;
                }
            }
            Some(name) = fired.recv() => {
                coordinator.on_alarm(&name).await;
            }
            Ok(event) = events.recv() => {
                debug!(?event, "Forwarding event");
                write_line(&mut stdout, &event).await?;
            }
        }
    }

    info!("Input closed, bridge exiting");
    Ok(())
}

async fn write_line<T: Serialize>(stdout: &mut Stdout, value: &T) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
