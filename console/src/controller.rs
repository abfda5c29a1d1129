/// View controller: keeps the editor and the settings form in step with the
/// file the host selected.
///
/// Everything runs on one thread. The poll loop, host commands, widget events
/// and saves interleave only at `.await` points, so the state lives in a
/// `RefCell` and no borrow is ever held across an await.
use anyhow::Result;
use std::cell::RefCell;
#[cfg(test)]
use std::cell::Ref;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::command::{HostAction, HostCommand, Target};
use crate::event::{HostSink, ViewInput};
use crate::paths;
use crate::resources::ResourceStore;
use crate::state::{Mode, ViewState};
use crate::surface::{EditorSurface, FormLabel, FormSurface, KeyPress};

/// Content shown when the environment file does not exist yet.
pub const DEFAULT_ENV_TEMPLATE: &str =
    "# https://github.com/rustdesk/rustdesk-server#env-variables\nRUST_LOG=info\n";

/// Time left in the frame budget after an iteration took `elapsed`, never negative.
pub fn frame_delay(budget: Duration, elapsed: Duration) -> Duration {
    budget.saturating_sub(elapsed)
}

pub struct ViewController<E, F, S, H, C> {
    state: RefCell<ViewState>,
    editor: RefCell<E>,
    form: RefCell<F>,
    store: S,
    host: H,
    clock: C,
    frame_interval: Duration,
}

impl<E, F, S, H, C> ViewController<E, F, S, H, C>
where
    E: EditorSurface,
    F: FormSurface,
    S: ResourceStore,
    H: HostSink,
    C: Clock,
{
    pub fn new(editor: E, form: F, store: S, host: H, clock: C, frame_interval: Duration) -> Self {
        Self {
            state: RefCell::new(ViewState::new()),
            editor: RefCell::new(editor),
            form: RefCell::new(form),
            store,
            host,
            clock,
            frame_interval,
        }
    }

    /// Snapshot of the current state.
    #[cfg(test)]
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    pub fn editor(&self) -> Ref<'_, E> {
        self.editor.borrow()
    }

    #[cfg(test)]
    pub fn form(&self) -> Ref<'_, F> {
        self.form.borrow()
    }

    // ── Command intake ────────────────────────────────────────────────────────

    /// Handles a raw `__update__` payload. Malformed payloads are logged and dropped.
    pub fn handle_update(&self, payload: &str) {
        match HostCommand::from_payload(payload) {
            Ok(command) => self.intake(command),
            Err(e) => warn!("{e:#}"),
        }
    }

    pub fn intake(&self, command: HostCommand) {
        match command {
            HostCommand::File(name) => {
                let target = Target::for_file(&name);
                let now = self.clock.now_ms();
                let mut s = self.state.borrow_mut();
                s.target_path = Some(target.path);
                s.mode = target.mode;
                s.action_timestamp = now;
                s.dirty.form = true;
                s.read_pending = true;
                // The editor still shows the previous target until a read lands.
                s.content_loaded = false;
                info!(file = %name, mode = ?target.mode, "Target selected");
            }
            HostCommand::Unrecognized { action } => {
                debug!(%action, "Ignoring unrecognized host command");
            }
        }
    }

    // ── Poll loop ─────────────────────────────────────────────────────────────

    /// Runs the poll loop for the life of the window. Asks the host for the
    /// current selection first.
    pub async fn run(&self) {
        self.host.emit(HostAction::Init);
        loop {
            let started = Instant::now();
            self.tick().await;
            tokio::time::sleep(frame_delay(self.frame_interval, started.elapsed())).await;
        }
    }

    /// One loop iteration: reconcile, then render. Failures are logged and
    /// never escape.
    pub async fn tick(&self) {
        if let Err(e) = self.update().await {
            error!("Update failed: {e:#}");
        }
        self.render();
    }

    /// Reads the target if a read is owed and stages the result for rendering.
    ///
    /// A read is only adopted if no command or save was stamped at or after the
    /// moment it started. A rejected read re-arms itself so the next frame
    /// fetches the now-current target.
    pub async fn update(&self) -> Result<()> {
        let target = {
            let mut s = self.state.borrow_mut();
            if !s.read_pending {
                return Ok(());
            }
            s.read_pending = false;
            s.target_path.clone()
        };
        let Some(target) = target else {
            return Ok(());
        };

        let started = self.clock.now_ms();
        let path = self.store.resolve(&target);

        if self.store.exists(&path).await {
            let content = self.store.read_text(&path).await?;
            let mut s = self.state.borrow_mut();
            if s.action_timestamp < started {
                s.pending_content = Some(content);
                s.dirty.content = true;
            } else {
                s.read_pending = true;
                debug!(path = %path.display(), "Discarding superseded read");
            }
        } else {
            let now = self.clock.now_ms();
            let mut s = self.state.borrow_mut();
            // A re-armed read means a newer command arrived during the check.
            if now >= s.action_timestamp && !s.read_pending {
                if s.mode == Mode::Edit {
                    s.pending_content = Some(DEFAULT_ENV_TEMPLATE.to_string());
                }
                s.dirty.content = true;
            }
            warn!(path = %path.display(), "File is missing");
        }
        Ok(())
    }

    // ── Renderer ──────────────────────────────────────────────────────────────

    pub fn render(&self) {
        self.render_form();
        self.render_content();
        self.render_scroll();
    }

    /// Returns whether the pass did any work.
    pub fn render_form(&self) -> bool {
        let (auto_scroll, mode) = {
            let mut s = self.state.borrow_mut();
            if !s.dirty.form {
                return false;
            }
            s.dirty.form = false;
            (s.auto_scroll, s.mode)
        };
        let mut form = self.form.borrow_mut();
        form.set_auto_scroll(auto_scroll);
        form.set_label_visible(FormLabel::Edit, mode == Mode::Edit);
        form.set_label_visible(FormLabel::Log, mode == Mode::Log);
        true
    }

    pub fn render_content(&self) -> bool {
        let (content, mode) = {
            let mut s = self.state.borrow_mut();
            if !s.dirty.content {
                return false;
            }
            s.dirty.content = false;
            (s.pending_content.take().unwrap_or_default(), s.mode)
        };
        let mut editor = self.editor.borrow_mut();
        editor.set_value(&content);
        // A fresh file must not be undoable into the previous one.
        editor.clear_history();
        editor.set_read_only(mode != Mode::Edit);
        editor.focus();
        self.state.borrow_mut().content_loaded = true;
        true
    }

    /// Keeps a followed log pinned to the bottom. Runs every frame while enabled.
    pub fn render_scroll(&self) -> bool {
        let follow = {
            let s = self.state.borrow();
            s.auto_scroll && s.mode == Mode::Log
        };
        if !follow {
            return false;
        }
        let mut editor = self.editor.borrow_mut();
        let info = editor.scroll_info();
        editor.scroll_to(info.left, info.height);
        true
    }

    // ── Widget events ─────────────────────────────────────────────────────────

    /// Native scroll event: follow the tail only while the viewport is at the bottom.
    pub fn on_scroll(&self) {
        let at_bottom = self.editor.borrow().scroll_info().is_at_bottom();
        let mut s = self.state.borrow_mut();
        if s.auto_scroll != at_bottom {
            s.auto_scroll = at_bottom;
            s.dirty.form = true;
        }
    }

    /// The auto-scroll checkbox was toggled. The form already shows the new value.
    pub fn on_form_change(&self, checked: bool) {
        self.state.borrow_mut().auto_scroll = checked;
    }

    /// Moves the viewport as a user drag would, then reports the scroll.
    pub fn scroll_editor(&self, top: f64) {
        {
            let mut editor = self.editor.borrow_mut();
            let left = editor.scroll_info().left;
            editor.scroll_to(left, top);
        }
        self.on_scroll();
    }

    pub fn type_text(&self, text: &str) {
        self.editor.borrow_mut().type_text(text);
    }

    // ── Edit capture ──────────────────────────────────────────────────────────

    /// Saves on Ctrl+S. Returns whether a save was performed.
    pub async fn on_key(&self, key: KeyPress) -> bool {
        if !key.is_save_chord() {
            return false;
        }
        self.save().await
    }

    /// Writes the editor buffer over the environment file and asks the host to
    /// restart. Ignored outside edit mode, before the file has been loaded into
    /// the editor, or while another save is running.
    pub async fn save(&self) -> bool {
        let Some(_lock) = SaveLock::acquire(&self.state) else {
            debug!("Save ignored: no env file loaded or a save is in progress");
            return false;
        };
        match self.write_buffer().await {
            Ok(path) => {
                self.state.borrow_mut().action_timestamp = self.clock.now_ms();
                info!(path = %path.display(), "Saved; requesting restart");
                self.host.emit(HostAction::Restart);
                true
            }
            Err(e) => {
                error!("Save failed: {e:#}");
                false
            }
        }
    }

    async fn write_buffer(&self) -> Result<PathBuf> {
        let content = self.editor.borrow().value();
        let path = self.store.resolve(paths::ENV_FILE_PATH);
        self.store.write_text(&path, &content).await?;
        Ok(path)
    }
}

impl<E, F, S, H, C> ViewController<E, F, S, H, C>
where
    E: EditorSurface + 'static,
    F: FormSurface + 'static,
    S: ResourceStore + 'static,
    H: HostSink + 'static,
    C: Clock + 'static,
{
    /// Routes one input to its handler. Saves run as local tasks so the poll
    /// loop keeps going while the write is in flight.
    ///
    /// Must be called inside a [`tokio::task::LocalSet`].
    pub fn dispatch(self: &Rc<Self>, input: ViewInput) {
        match input {
            ViewInput::Update(payload) => self.handle_update(&payload),
            ViewInput::Key(key) => {
                let this = Rc::clone(self);
                tokio::task::spawn_local(async move {
                    this.on_key(key).await;
                });
            }
            ViewInput::FormChanged { checked } => self.on_form_change(checked),
            ViewInput::ScrollTo(top) => self.scroll_editor(top),
            ViewInput::Typed(text) => self.type_text(&text),
        }
    }
}

/// Holds `save_lock` for the duration of a save and releases it on drop.
struct SaveLock<'a> {
    state: &'a RefCell<ViewState>,
}

impl<'a> SaveLock<'a> {
    fn acquire(state: &'a RefCell<ViewState>) -> Option<Self> {
        let mut s = state.borrow_mut();
        if s.mode != Mode::Edit || !s.content_loaded || s.save_lock {
            return None;
        }
        s.save_lock = true;
        drop(s);
        Some(Self { state })
    }
}

impl Drop for SaveLock<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().save_lock = false;
    }
}
