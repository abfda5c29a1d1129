/// Widgets the view controller renders into.
///
/// The controller only talks to the traits; [`TextBuffer`] and
/// [`SettingsForm`] are headless implementations used by the console binary
/// and the tests.
use std::io::Write;

/// Height of one text line in scroll units.
pub const LINE_HEIGHT: f64 = 16.0;

/// Viewport geometry, in the same units the widget scrolls in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInfo {
    pub left: f64,
    pub top: f64,
    /// Full content height.
    pub height: f64,
    /// Visible height.
    pub client_height: f64,
}

impl ScrollInfo {
    pub fn distance_to_bottom(&self) -> f64 {
        self.height - self.top - self.client_height
    }

    /// Within one unit of the bottom edge.
    pub fn is_at_bottom(&self) -> bool {
        self.distance_to_bottom() < 1.0
    }
}

/// A key press delivered by the editor widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPress {
    pub ctrl: bool,
    pub key: char,
}

impl KeyPress {
    pub fn ctrl(key: char) -> Self {
        Self { ctrl: true, key }
    }

    /// Ctrl+S.
    pub fn is_save_chord(&self) -> bool {
        self.ctrl && self.key.eq_ignore_ascii_case(&'s')
    }
}

pub trait EditorSurface {
    /// Replaces the whole buffer.
    fn set_value(&mut self, text: &str);
    fn value(&self) -> String;
    fn clear_history(&mut self);
    fn set_read_only(&mut self, read_only: bool);
    fn focus(&mut self);
    fn scroll_info(&self) -> ScrollInfo;
    fn scroll_to(&mut self, left: f64, top: f64);
    /// Inserts user-typed text at the end of the buffer. Ignored when read-only
    /// or unfocused.
    fn type_text(&mut self, text: &str);
}

/// The two mutually exclusive labels of the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormLabel {
    /// Index 0: hint shown while editing the environment file.
    Edit = 0,
    /// Index 1: the auto-scroll caption shown for logs.
    Log = 1,
}

pub trait FormSurface {
    fn set_auto_scroll(&mut self, checked: bool);
    fn set_label_visible(&mut self, label: FormLabel, visible: bool);
}

// ── Headless editor ──────────────────────────────────────────────────────────

/// Plain-text editor model with undo history and a line-based viewport.
#[derive(Debug)]
pub struct TextBuffer {
    text: String,
    history: Vec<String>,
    read_only: bool,
    focused: bool,
    top: f64,
    viewport_lines: usize,
    echo: bool,
}

impl TextBuffer {
    /// Starts empty and read-only until content is loaded.
    pub fn new(viewport_lines: usize) -> Self {
        Self {
            text: String::new(),
            history: Vec::new(),
            read_only: true,
            focused: false,
            top: 0.0,
            viewport_lines,
            echo: false,
        }
    }

    /// Writes every replaced buffer to stdout.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    #[cfg(test)]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[cfg(test)]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[cfg(test)]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Restores the previous buffer, if any.
    #[cfg(test)]
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.text = previous;
                true
            }
            None => false,
        }
    }

    fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }

    fn max_top(&self) -> f64 {
        let info = self.scroll_info();
        (info.height - info.client_height).max(0.0)
    }
}

impl EditorSurface for TextBuffer {
    fn set_value(&mut self, text: &str) {
        let previous = std::mem::replace(&mut self.text, text.to_string());
        self.history.push(previous);
        self.top = self.top.min(self.max_top());
        if self.echo {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(self.text.as_bytes());
            let _ = out.flush();
        }
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn scroll_info(&self) -> ScrollInfo {
        ScrollInfo {
            left: 0.0,
            top: self.top,
            height: self.line_count() as f64 * LINE_HEIGHT,
            client_height: self.viewport_lines as f64 * LINE_HEIGHT,
        }
    }

    fn scroll_to(&mut self, _left: f64, top: f64) {
        self.top = top.clamp(0.0, self.max_top());
    }

    fn type_text(&mut self, text: &str) {
        if self.read_only || !self.focused {
            return;
        }
        self.history.push(self.text.clone());
        self.text.push_str(text);
        self.text.push('\n');
    }
}

// ── Headless form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsForm {
    pub auto_scroll: bool,
    /// Visibility of the labels, indexed by [`FormLabel`].
    pub labels: [bool; 2],
}

impl SettingsForm {
    #[cfg(test)]
    pub fn is_label_visible(&self, label: FormLabel) -> bool {
        self.labels[label as usize]
    }
}

impl FormSurface for SettingsForm {
    fn set_auto_scroll(&mut self, checked: bool) {
        self.auto_scroll = checked;
    }

    fn set_label_visible(&mut self, label: FormLabel, visible: bool) {
        self.labels[label as usize] = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> String {
        (0..n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn save_chord_needs_ctrl() {
        assert!(KeyPress::ctrl('s').is_save_chord());
        assert!(KeyPress::ctrl('S').is_save_chord());
        assert!(!KeyPress { ctrl: false, key: 's' }.is_save_chord());
        assert!(!KeyPress::ctrl('x').is_save_chord());
    }

    #[test]
    fn at_bottom_is_within_one_unit() {
        let mut info = ScrollInfo {
            left: 0.0,
            top: 84.0,
            height: 100.0,
            client_height: 15.5,
        };
        assert!(info.is_at_bottom());
        info.top = 83.0;
        assert!(!info.is_at_bottom());
    }

    #[test]
    fn set_value_then_clear_history_cannot_undo() {
        let mut ed = TextBuffer::new(10);
        assert!(ed.is_read_only());
        ed.set_value("first");
        ed.set_value("second");
        assert!(ed.can_undo());
        ed.clear_history();
        assert!(!ed.undo());
        assert_eq!(ed.value(), "second");
    }

    #[test]
    fn scroll_to_clamps_to_content() {
        let mut ed = TextBuffer::new(10);
        ed.set_value(&lines(50));
        let info = ed.scroll_info();
        ed.scroll_to(info.left, info.height);
        assert!(ed.scroll_info().is_at_bottom());
        assert_eq!(ed.scroll_info().top, 40.0 * LINE_HEIGHT);

        ed.scroll_to(0.0, -5.0);
        assert_eq!(ed.scroll_info().top, 0.0);
    }

    #[test]
    fn short_content_is_always_at_bottom() {
        let mut ed = TextBuffer::new(10);
        ed.set_value("one line\n");
        assert!(ed.scroll_info().is_at_bottom());
    }

    #[test]
    fn shrinking_content_pulls_viewport_back() {
        let mut ed = TextBuffer::new(10);
        ed.set_value(&lines(50));
        ed.scroll_to(0.0, 1_000.0);
        ed.set_value(&lines(12));
        assert_eq!(ed.scroll_info().top, 2.0 * LINE_HEIGHT);
    }

    #[test]
    fn typing_needs_focus_and_write_access() {
        let mut ed = TextBuffer::new(10);
        ed.focus();
        ed.type_text("nope");
        assert_eq!(ed.value(), "");

        let mut unfocused = TextBuffer::new(10);
        unfocused.set_read_only(false);
        unfocused.type_text("nope");
        assert_eq!(unfocused.value(), "");

        ed.set_read_only(false);
        assert!(ed.is_focused());
        ed.type_text("KEY=1");
        assert_eq!(ed.value(), "KEY=1\n");
        assert!(ed.undo());
        assert_eq!(ed.value(), "");
    }

    #[test]
    fn form_labels_toggle_independently() {
        let mut form = SettingsForm::default();
        form.set_label_visible(FormLabel::Edit, true);
        form.set_label_visible(FormLabel::Log, false);
        assert!(form.is_label_visible(FormLabel::Edit));
        assert!(!form.is_label_visible(FormLabel::Log));
        form.set_auto_scroll(true);
        assert!(form.auto_scroll);
    }
}
