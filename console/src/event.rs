use tokio::sync::mpsc;
use tracing::warn;

use crate::command::{HostAction, ACTION_EVENT};
use crate::surface::KeyPress;

/// Events consumed by the host-side presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The view emitted on `__action__`.
    ViewAction(HostAction),
    /// A file under logs/ was created or modified.
    FileChanged(String),
    /// The user picked a file from the menu.
    Select(String),
    /// Ctrl+C received or the user asked to quit.
    Shutdown,
}

/// Events consumed by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewInput {
    /// Raw `__update__` payload from the host.
    Update(String),
    Key(KeyPress),
    /// The auto-scroll checkbox changed.
    FormChanged { checked: bool },
    /// Scroll the editor to the given offset, as a user drag would.
    ScrollTo(f64),
    /// Text typed into the editor.
    Typed(String),
}

/// A line typed on the console's stdin, routed to whichever side owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Host(HostEvent),
    View(ViewInput),
}

impl ConsoleLine {
    /// Parses one stdin line:
    ///   `<name>`           select a file
    ///   `:save`            press Ctrl+S in the editor
    ///   `:follow on|off`   toggle the auto-scroll checkbox
    ///   `:up`              scroll the editor to the top
    ///   `:quit`            shut down
    ///   `+<text>`          type a line into the editor
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(text) = line.strip_prefix('+') {
            return Some(ConsoleLine::View(ViewInput::Typed(text.to_string())));
        }
        let line = line.trim();
        match line {
            "" => None,
            ":save" => Some(ConsoleLine::View(ViewInput::Key(KeyPress::ctrl('s')))),
            ":follow on" => Some(ConsoleLine::View(ViewInput::FormChanged { checked: true })),
            ":follow off" => Some(ConsoleLine::View(ViewInput::FormChanged { checked: false })),
            ":up" => Some(ConsoleLine::View(ViewInput::ScrollTo(0.0))),
            ":quit" => Some(ConsoleLine::Host(HostEvent::Shutdown)),
            other if other.starts_with(':') => {
                warn!(command = other, "Unknown console command");
                None
            }
            name => Some(ConsoleLine::Host(HostEvent::Select(name.to_string()))),
        }
    }
}

/// Outbound channel from the view to the host.
pub trait HostSink {
    fn emit(&self, action: HostAction);
}

/// View actions get their own unbounded channel so that log-change traffic
/// can never crowd out a `restart`.
impl HostSink for mpsc::UnboundedSender<HostAction> {
    fn emit(&self, action: HostAction) {
        if self.send(action).is_err() {
            warn!(event = ACTION_EVENT, payload = action.payload(), "Host is gone; action dropped");
        }
    }
}

#[cfg(test)]
pub use recording::RecordingHost;
