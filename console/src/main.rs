mod clock;
mod command;
mod config;
mod controller;
mod event;
mod paths;
mod presenter;
mod resources;
mod state;
mod surface;
mod watcher;

use std::path::PathBuf;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::clock::SystemClock;
use crate::command::HostAction;
use crate::controller::ViewController;
use crate::event::{ConsoleLine, HostEvent, ViewInput};
use crate::presenter::Presenter;
use crate::resources::DiskResources;
use crate::surface::{SettingsForm, TextBuffer};

/// Visible height of the headless editor, in lines.
const EDITOR_VIEWPORT_LINES: usize = 40;

fn init_tracing() {
    // stdout carries the editor echo, so logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    // ── Configuration ─────────────────────────────────────────────────────────
    let default_root = paths::default_resource_root();
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| paths::config_file_path(&default_root));
    let config = config::load_or_default(&config_path).unwrap_or_else(|e| {
        error!("[config] Error (using defaults): {e:#}");
        config::Config::default()
    });
    let root = config.resource_root.clone().unwrap_or(default_root);
    let resources = DiskResources::new(&root);

    let (host_tx, host_rx) = mpsc::channel::<HostEvent>(32);
    let (view_tx, mut view_rx) = mpsc::channel::<ViewInput>(32);
    let (action_tx, action_rx) = mpsc::unbounded_channel::<HostAction>();

    // ── Background tasks ──────────────────────────────────────────────────────
    if config.host.watch_logs {
        tokio::spawn(watcher::watch_logs(
            paths::logs_dir(resources.root()),
            host_tx.clone(),
        ));
    }
    tokio::spawn(read_console(host_tx.clone(), view_tx.clone()));

    // Graceful shutdown on Ctrl+C.
    {
        let tx = host_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(HostEvent::Shutdown).await;
            }
        });
    }

    info!(
        root = %resources.root().display(),
        "server-console v{} started",
        env!("CARGO_PKG_VERSION")
    );

    // ── View and presenter ────────────────────────────────────────────────────
    let frame_interval = config.view.frame_interval();
    let presenter = Presenter::new(config.host, view_tx);
    let view = Rc::new(ViewController::new(
        TextBuffer::new(EDITOR_VIEWPORT_LINES).with_echo(),
        SettingsForm::default(),
        resources,
        action_tx,
        SystemClock,
        frame_interval,
    ));

    LocalSet::new()
        .run_until(async move {
            let inputs = Rc::clone(&view);
            tokio::task::spawn_local(async move {
                while let Some(input) = view_rx.recv().await {
                    inputs.dispatch(input);
                }
            });

            tokio::select! {
                _ = view.run() => {}
                _ = presenter.run(host_rx, action_rx) => {}
            }
        })
        .await;

    info!("Shutting down");
}

/// Feeds stdin lines to the presenter (file selection, quit) or the view
/// (keys, scrolling, typing). Ends quietly at EOF.
async fn read_console(host_tx: mpsc::Sender<HostEvent>, view_tx: mpsc::Sender<ViewInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("[console] Failed to read stdin: {e}");
                break;
            }
        };
        let delivered = match ConsoleLine::parse(&line) {
            Some(ConsoleLine::Host(evt)) => host_tx.send(evt).await.is_ok(),
            Some(ConsoleLine::View(input)) => view_tx.send(input).await.is_ok(),
            None => true,
        };
        if !delivered {
            break;
        }
    }
}
