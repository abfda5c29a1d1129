use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_FRAME_INTERVAL_MS: u64 = 1;
pub const MAX_FRAME_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
pub const DEFAULT_INITIAL_FILE: &str = "hbbs.out";
/// Files the host is allowed to select, in menu order.
pub const DEFAULT_FILES: [&str; 5] = ["hbbs.out", "hbbs.err", "hbbr.out", "hbbr.err", ".env"];

/// Root configuration structure. Deserialized from <resource root>/console.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Overrides the resource root (defaults to the executable's directory).
    #[serde(default)]
    pub resource_root: Option<PathBuf>,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub host: HostConfig,
}

/// Settings for the view controller's poll loop.
#[derive(Debug, Deserialize)]
pub struct ViewConfig {
    /// Frame budget of one poll-loop iteration in milliseconds. Clamped to [1, 1000].
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

impl ViewConfig {
    pub fn frame_interval(&self) -> Duration {
        let ms = self
            .frame_interval_ms
            .clamp(MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS);
        Duration::from_millis(ms)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

/// Settings for the host side: which files can be shown and which one is
/// selected at startup.
#[derive(Debug, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_initial_file")]
    pub initial_file: String,
    #[serde(default = "default_files")]
    pub files: Vec<String>,
    /// Re-send the selection whenever its log file changes on disk.
    #[serde(default = "default_watch_logs")]
    pub watch_logs: bool,
}

impl HostConfig {
    pub fn is_selectable(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            initial_file: default_initial_file(),
            files: default_files(),
            watch_logs: default_watch_logs(),
        }
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_frame_interval() -> u64 {
    DEFAULT_FRAME_INTERVAL_MS
}

fn default_initial_file() -> String {
    DEFAULT_INITIAL_FILE.to_string()
}

fn default_files() -> Vec<String> {
    DEFAULT_FILES.iter().map(|f| f.to_string()).collect()
}

fn default_watch_logs() -> bool {
    true
}
