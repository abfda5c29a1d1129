use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use crate::event::HostEvent;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Watches the logs directory and sends a `FileChanged` event with the file
/// name of every created or modified log. The watcher is rebuilt after a
/// failure (e.g. the directory does not exist yet).
pub async fn watch_logs(dir: PathBuf, tx: mpsc::Sender<HostEvent>) {
    loop {
        if let Err(e) = watch(&dir, &tx).await {
            warn!("[watcher] {e:#}");
        }
        if tx.is_closed() {
            break;
        }
        tokio::time::sleep(RETRY_DELAY).await;
    }
}

async fn watch(dir: &Path, tx: &mpsc::Sender<HostEvent>) -> Result<()> {
    let (watch_tx, mut watch_rx) = mpsc::channel::<notify::Event>(16);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = watch_tx.blocking_send(event);
            }
        },
        NotifyConfig::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    while let Some(event) = watch_rx.recv().await {
        for name in changed_file_names(&event) {
            if tx.send(HostEvent::FileChanged(name)).await.is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// File names touched by a create or modify event.
pub fn changed_file_names(event: &notify::Event) -> Vec<String> {
    let is_write = matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_)
    );
    if !is_write {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::{Event, EventKind};

    #[test]
    fn modify_yields_file_name() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/srv/console/logs/hbbs.out"));
        assert_eq!(changed_file_names(&event), vec!["hbbs.out"]);
    }

    #[test]
    fn create_yields_every_path() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/srv/console/logs/hbbr.out"))
            .add_path(PathBuf::from("/srv/console/logs/hbbr.err"));
        assert_eq!(changed_file_names(&event), vec!["hbbr.out", "hbbr.err"]);
    }

    #[test]
    fn remove_is_ignored() {
        let event = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/srv/console/logs/hbbs.out"));
        assert!(changed_file_names(&event).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_directory_retries_until_receiver_closes() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(watch_logs(dir.path().join("no-such-logs"), tx));

        tokio::time::sleep(RETRY_DELAY * 3).await;
        assert!(!handle.is_finished());

        drop(rx);
        tokio::time::sleep(RETRY_DELAY * 2).await;
        assert!(handle.is_finished());
    }
}
