/// Host side of the console: owns the file selection and relays it to the view.
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::command::{HostAction, HostCommand};
use crate::config::HostConfig;
use crate::event::{HostEvent, ViewInput};

pub struct Presenter {
    config: HostConfig,
    selected: String,
    view_tx: mpsc::Sender<ViewInput>,
    restart_requests: usize,
}

impl Presenter {
    pub fn new(config: HostConfig, view_tx: mpsc::Sender<ViewInput>) -> Self {
        let selected = config.initial_file.clone();
        Self {
            config,
            selected,
            view_tx,
            restart_requests: 0,
        }
    }

    #[cfg(test)]
    pub fn selected(&self) -> &str {
        &self.selected
    }

    #[cfg(test)]
    pub fn restart_requests(&self) -> usize {
        self.restart_requests
    }

    /// Processes host events and view actions until shutdown or until every
    /// host-event sender is gone. View actions are served first.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<HostEvent>,
        mut actions: mpsc::UnboundedReceiver<HostAction>,
    ) -> Self {
        loop {
            let evt = tokio::select! {
                biased;
                Some(action) = actions.recv() => HostEvent::ViewAction(action),
                evt = events.recv() => match evt {
                    Some(evt) => evt,
                    None => break,
                },
            };
            if !self.handle(evt).await {
                break;
            }
        }
        self
    }

    /// Returns `false` once the presenter should stop.
    pub async fn handle(&mut self, evt: HostEvent) -> bool {
        match evt {
            HostEvent::ViewAction(HostAction::Init) => self.send_selection().await,
            HostEvent::ViewAction(HostAction::Restart) => {
                self.restart_requests += 1;
                info!(count = self.restart_requests, "Server restart requested");
                true
            }
            HostEvent::FileChanged(name) => {
                // Only the file on screen needs re-reading.
                if name == self.selected {
                    self.send_selection().await
                } else {
                    true
                }
            }
            HostEvent::Select(name) => {
                if !self.config.is_selectable(&name) {
                    warn!(file = %name, "Not a selectable file");
                    return true;
                }
                info!(file = %name, "Selected");
                self.selected = name;
                self.send_selection().await
            }
            HostEvent::Shutdown => false,
        }
    }

    async fn send_selection(&self) -> bool {
        let payload = HostCommand::file_payload(&self.selected);
        self.view_tx.send(ViewInput::Update(payload)).await.is_ok()
    }
}
