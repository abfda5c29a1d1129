/// Messages exchanged between the host process and the view.
///
/// The host pushes `__update__` events whose payload is a JSON pair
/// `["<action>", "<data>"]`; the view answers on `__action__` with a bare
/// string payload.
use anyhow::{Context, Result};

use crate::paths;
use crate::state::Mode;

/// Event name the view listens on.
pub const UPDATE_EVENT: &str = "__update__";
/// Event name the view emits on.
pub const ACTION_EVENT: &str = "__action__";

/// A recognized inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Show the named file.
    File(String),
    /// Any action this view does not understand. Kept so callers can log it.
    Unrecognized { action: String },
}

impl HostCommand {
    pub fn from_pair(action: &str, data: &str) -> Self {
        match action {
            "file" => HostCommand::File(data.to_string()),
            _ => HostCommand::Unrecognized {
                action: action.to_string(),
            },
        }
    }

    /// Decodes an `__update__` payload.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let (action, data): (String, String) = serde_json::from_str(payload)
            .with_context(|| format!("Malformed {UPDATE_EVENT} payload: {payload}"))?;
        Ok(Self::from_pair(&action, &data))
    }

    /// Encodes a `file` command the way the host sends it.
    pub fn file_payload(name: &str) -> String {
        // Serializing a pair of strings cannot fail.
        serde_json::to_string(&("file", name)).unwrap_or_default()
    }
}

/// Where a `file` command points and how it must be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Path relative to the resource root.
    pub path: String,
    pub mode: Mode,
}

impl Target {
    /// The environment file is editable; every other name is a log.
    pub fn for_file(name: &str) -> Self {
        if name == paths::ENV_FILE_NAME {
            Target {
                path: paths::ENV_FILE_PATH.to_string(),
                mode: Mode::Edit,
            }
        } else {
            Target {
                path: paths::log_file_path(name),
                mode: Mode::Log,
            }
        }
    }
}

/// Outbound requests from the view to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostAction {
    /// Ask the host to resend the current selection.
    Init,
    /// The environment file was saved; the server should restart.
    Restart,
}

impl HostAction {
    pub fn payload(self) -> &'static str {
        match self {
            HostAction::Init => "__init__",
            HostAction::Restart => "restart",
        }
    }
}
