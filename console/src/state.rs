/// Whether the current target is the editable environment file or a read-only log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Edit,
    #[default]
    Log,
}

/// Render passes that owe work. Each pass clears its own flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dirty {
    pub content: bool,
    pub form: bool,
}

/// Everything the view controller knows about what should be on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Root-relative path of the file of interest, unset until the host selects one.
    pub target_path: Option<String>,
    pub mode: Mode,
    /// Milliseconds since the epoch of the latest intent change or completed save.
    pub action_timestamp: i64,
    /// Content waiting for the next content pass.
    pub pending_content: Option<String>,
    pub dirty: Dirty,
    /// The target must be read again on the next frame.
    pub read_pending: bool,
    pub auto_scroll: bool,
    pub save_lock: bool,
    /// The editor holds content read (or synthesized) for the current target.
    pub content_loaded: bool,
}

impl ViewState {
    /// Initial state: nothing selected, following the log tail, form owed a render.
    pub fn new() -> Self {
        Self {
            target_path: None,
            mode: Mode::Log,
            action_timestamp: 0,
            pending_content: None,
            dirty: Dirty {
                content: false,
                form: true,
            },
            read_pending: false,
            auto_scroll: true,
            save_lock: false,
            content_loaded: false,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_in_log_mode_following_tail() {
        let s = ViewState::new();
        assert_eq!(s.mode, Mode::Log);
        assert!(s.auto_scroll);
        assert!(s.target_path.is_none());
    }

    #[test]
    fn new_owes_only_a_form_render() {
        let s = ViewState::new();
        assert!(s.dirty.form);
        assert!(!s.dirty.content);
        assert!(!s.read_pending);
        assert!(!s.save_lock);
        assert!(!s.content_loaded);
        assert!(s.pending_content.is_none());
    }
}
