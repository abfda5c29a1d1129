/// Canonical locations inside the console's resource root.
///
/// Everything the view reads or writes is addressed relative to the root:
///   - bin/.env      Server environment file, editable from the console.
///   - logs/<name>   Server log files, shown read-only.
///   - console.toml  Console settings.
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "console.toml";
/// Name the host uses to select the editable environment file.
pub const ENV_FILE_NAME: &str = ".env";
/// Root-relative path of the environment file.
pub const ENV_FILE_PATH: &str = "bin/.env";
pub const LOGS_DIR_NAME: &str = "logs";

/// Returns the directory holding the running executable, which doubles as the
/// default resource root. Falls back to the working directory when the
/// executable path cannot be determined.
pub fn default_resource_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the root-relative path of the log file `name`: logs/<name>
pub fn log_file_path(name: &str) -> String {
    format!("{LOGS_DIR_NAME}/{name}")
}

/// Returns the absolute logs directory under `root`.
pub fn logs_dir(root: &Path) -> PathBuf {
    root.join(LOGS_DIR_NAME)
}

/// Returns the full path to the settings file under `root`.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}
