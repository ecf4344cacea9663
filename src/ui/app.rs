//! Main TUI application state and logic

use crate::sheet::Sheet;
use crate::ui::editor::Editor;
use crate::ui::panes::{self, DocumentScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default wait between the last keystroke and the next evaluation pass
pub const DEFAULT_DELAY_MS: u64 = 333;

/// How long one event poll blocks before the loop checks its timers
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Rows moved by PageUp / PageDown
const PAGE_ROWS: usize = 20;

/// Actions that throw away unsaved changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guarded {
    Quit,
    New,
    Open,
}

impl Guarded {
    fn warning(self) -> &'static str {
        match self {
            Guarded::Quit => "Unsaved changes! Press Ctrl-Q again to quit",
            Guarded::New => "Unsaved changes! Press Ctrl-N again to discard them",
            Guarded::Open => "Unsaved changes! Press Ctrl-O again to open another file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    SaveAs,
    Open,
}

/// A file name being typed on the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub purpose: PromptPurpose,
    pub input: String,
}

impl Prompt {
    fn new(purpose: PromptPurpose) -> Self {
        Self {
            purpose,
            input: String::new(),
        }
    }

    fn line(&self) -> String {
        let label = match self.purpose {
            PromptPurpose::SaveAs => "Save as: ",
            PromptPurpose::Open => "Open: ",
        };
        format!("{}{}█", label, self.input)
    }
}

/// The main application state
pub struct App {
    pub editor: Editor,

    pub sheet: Sheet<'static>,

    /// Where Ctrl-S writes; `None` for an unnamed document
    pub path: Option<PathBuf>,

    /// Unsaved changes exist
    pub dirty: bool,

    pub scroll: DocumentScrollState,

    /// Debounce delay before re-evaluating
    pub delay: Duration,

    /// Time of the edit that scheduled the next pass, if one is scheduled
    pub pending_since: Option<Instant>,

    /// A guarded action was requested once with unsaved changes
    pub armed: Option<Guarded>,

    /// File name prompt, which takes all keys while open
    pub prompt: Option<Prompt>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether the status message reports a failure
    pub status_is_error: bool,
}

impl App {
    /// Create an app editing `text`, evaluated once up front
    pub fn new(text: &str, path: Option<PathBuf>, delay: Duration) -> Self {
        let mut app = App {
            editor: Editor::from_text(text),
            sheet: Sheet::new(),
            path,
            dirty: false,
            scroll: DocumentScrollState::default(),
            delay,
            pending_since: None,
            armed: None,
            prompt: None,
            should_quit: false,
            status_message: String::from("Ready!"),
            status_is_error: false,
        };
        app.evaluate();
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            if self.evaluation_due() {
                self.evaluate();
            }

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluation_due(&self) -> bool {
        self.pending_since
            .is_some_and(|since| since.elapsed() >= self.delay)
    }

    /// Run a sheet pass over the current text
    pub fn evaluate(&mut self) {
        self.pending_since = None;
        self.sheet.evaluate(self.editor.lines());
    }

    /// Record an edit; a newer edit pushes the pending pass back.
    fn edited(&mut self) {
        self.dirty = true;
        self.pending_since = Some(Instant::now());
    }

    fn file_name(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "untitled".to_string(), |p| p.display().to_string())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Sheet and results on top, status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        panes::render_document_pane(
            frame,
            columns[0],
            columns[1],
            self.editor.lines(),
            self.sheet.outcomes(),
            self.editor.cursor(),
            &mut self.scroll,
        );

        let file_name = self.file_name();
        let prompt_line = self.prompt.as_ref().map(Prompt::line);
        let (message, is_error) = match &prompt_line {
            Some(line) => (line.as_str(), false),
            None => (self.status_message.as_str(), self.status_is_error),
        };
        let error_lines = self
            .sheet
            .outcomes()
            .iter()
            .filter(|o| o.is_error())
            .count();
        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                file_name: &file_name,
                message,
                is_dirty: self.dirty,
                is_error,
                is_pending: self.pending_since.is_some(),
                error_lines,
            },
        );
    }

    fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.status_message = message.into();
        self.status_is_error = is_error;
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        let armed = self.armed.take();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') | KeyCode::Char('S') => self.save(),
                KeyCode::Char('w') | KeyCode::Char('W') => {
                    self.prompt = Some(Prompt::new(PromptPurpose::SaveAs));
                }
                KeyCode::Char('o') | KeyCode::Char('O') => {
                    if self.confirm(Guarded::Open, armed) {
                        self.prompt = Some(Prompt::new(PromptPurpose::Open));
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    if self.confirm(Guarded::New, armed) {
                        self.new_document();
                    }
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    if self.confirm(Guarded::Quit, armed) {
                        self.should_quit = true;
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => {
                self.editor.insert_char(c);
                self.edited();
            }
            KeyCode::Tab => {
                self.editor.insert_char(' ');
                self.edited();
            }
            KeyCode::Enter => {
                self.editor.insert_newline();
                self.edited();
            }
            KeyCode::Backspace => {
                if self.editor.backspace() {
                    self.edited();
                }
            }
            KeyCode::Delete => {
                if self.editor.delete() {
                    self.edited();
                }
            }
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Up => self.editor.move_up(1),
            KeyCode::Down => self.editor.move_down(1),
            KeyCode::PageUp => self.editor.move_up(PAGE_ROWS),
            KeyCode::PageDown => self.editor.move_down(PAGE_ROWS),
            KeyCode::Home => self.editor.home(),
            KeyCode::End => self.editor.end(),
            _ => {}
        }
    }

    /// Whether `action` may go ahead; with unsaved changes the first request
    /// only arms it.
    fn confirm(&mut self, action: Guarded, armed: Option<Guarded>) -> bool {
        if !self.dirty || armed == Some(action) {
            return true;
        }
        self.armed = Some(action);
        self.set_status(action.warning(), true);
        false
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                self.set_status("Cancelled", false);
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.commit_prompt(prompt);
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn commit_prompt(&mut self, prompt: Prompt) {
        let name = prompt.input.trim();
        if name.is_empty() {
            self.set_status("Cancelled", false);
            return;
        }
        let path = PathBuf::from(name);
        match prompt.purpose {
            PromptPurpose::SaveAs => {
                if self.write_to(&path) {
                    self.path = Some(path);
                }
            }
            PromptPurpose::Open => self.open(path),
        }
    }

    fn new_document(&mut self) {
        self.editor.clear();
        self.sheet.reset();
        self.path = None;
        self.dirty = false;
        self.evaluate();
        self.set_status("New document", false);
    }

    /// Replace the document with the contents of `path`
    fn open(&mut self, path: PathBuf) {
        match fs::read_to_string(&path) {
            Ok(text) => {
                self.editor = Editor::from_text(&text);
                self.sheet.reset();
                self.scroll = DocumentScrollState::default();
                self.dirty = false;
                self.evaluate();
                tracing::info!(path = %path.display(), "document opened");
                self.set_status(format!("Opened {}", path.display()), false);
                self.path = Some(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "open failed");
                self.set_status(format!("Cannot open {}: {}", path.display(), e), true);
            }
        }
    }

    /// Save to the current path, asking for a name when there is none
    fn save(&mut self) {
        match self.path.clone() {
            Some(path) => {
                self.write_to(&path);
            }
            None => self.prompt = Some(Prompt::new(PromptPurpose::SaveAs)),
        }
    }

    /// Write the document as UTF-8 with `\n` line endings
    fn write_to(&mut self, path: &Path) -> bool {
        match fs::write(path, self.editor.text()) {
            Ok(()) => {
                self.dirty = false;
                tracing::info!(path = %path.display(), "document saved");
                self.set_status(format!("Saved {}", path.display()), false);
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                self.set_status(format!("Cannot save: {}", e), true);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::LineOutcome;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_initial_text_is_evaluated() {
        let app = App::new("2+3*4", None, Duration::ZERO);
        assert_eq!(app.sheet.outcome(0), Some(&LineOutcome::Value(14.0)));
        assert!(app.pending_since.is_none());
    }

    #[test]
    fn test_edits_schedule_a_pass() {
        let mut app = App::new("", None, Duration::ZERO);
        for c in "1+1".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.dirty);
        assert!(app.evaluation_due());

        app.evaluate();
        assert_eq!(app.sheet.outcome(0), Some(&LineOutcome::Value(2.0)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn scratch_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("textcalc-app-{}-{}.txt", std::process::id(), tag))
    }

    #[test]
    fn test_quit_needs_confirmation_when_dirty() {
        let mut app = App::new("", None, Duration::from_secs(60));
        press(&mut app, KeyCode::Char('1'));

        ctrl(&mut app, 'q');
        assert!(!app.should_quit);
        assert_eq!(app.armed, Some(Guarded::Quit));

        ctrl(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[test]
    fn test_new_document_clears_everything() {
        let mut app = App::new("dim x: 1\nx", None, Duration::ZERO);
        ctrl(&mut app, 'n');
        assert_eq!(app.editor.lines(), [""]);
        assert_eq!(app.sheet.outcomes(), [LineOutcome::Blank]);
        assert!(!app.dirty);
    }

    #[test]
    fn test_new_document_needs_confirmation_when_dirty() {
        let mut app = App::new("", None, Duration::from_secs(60));
        type_text(&mut app, "12");

        ctrl(&mut app, 'n');
        assert_eq!(app.editor.lines(), ["12"]);
        assert_eq!(app.armed, Some(Guarded::New));
        assert!(app.status_is_error);

        // Any other key disarms the guard
        press(&mut app, KeyCode::Left);
        ctrl(&mut app, 'n');
        assert_eq!(app.editor.lines(), ["12"]);

        ctrl(&mut app, 'n');
        assert_eq!(app.editor.lines(), [""]);
        assert!(!app.dirty);
    }

    #[test]
    fn test_guards_do_not_confirm_each_other() {
        let mut app = App::new("", None, Duration::from_secs(60));
        press(&mut app, KeyCode::Char('1'));

        ctrl(&mut app, 'n');
        ctrl(&mut app, 'q');
        assert!(!app.should_quit);
        assert_eq!(app.armed, Some(Guarded::Quit));
    }

    #[test]
    fn test_untitled_save_asks_for_a_name() {
        let path = scratch_file("save-as");
        let mut app = App::new("", None, Duration::from_secs(60));
        type_text(&mut app, "2*3");

        ctrl(&mut app, 's');
        assert_eq!(app.prompt.as_ref().map(|p| p.purpose), Some(PromptPurpose::SaveAs));

        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert!(app.prompt.is_none());
        assert_eq!(app.path.as_deref(), Some(path.as_path()));
        assert!(!app.dirty);
        assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("2*3"));

        // Later saves go to the same file without asking
        press(&mut app, KeyCode::Char('0'));
        ctrl(&mut app, 's');
        assert!(app.prompt.is_none());
        assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("2*30"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_prompt_editing_and_cancel() {
        let mut app = App::new("1", None, Duration::ZERO);
        ctrl(&mut app, 'w');
        type_text(&mut app, "ab");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.prompt.as_ref().map(|p| p.input.as_str()), Some("a"));
        assert_eq!(app.prompt.as_ref().map(Prompt::line).as_deref(), Some("Save as: a█"));

        // Keys go to the prompt, not the document
        assert_eq!(app.editor.lines(), ["1"]);

        press(&mut app, KeyCode::Esc);
        assert!(app.prompt.is_none());
        assert!(app.path.is_none());

        // An empty name cancels as well
        ctrl(&mut app, 'w');
        press(&mut app, KeyCode::Enter);
        assert!(app.prompt.is_none());
        assert!(app.path.is_none());
    }

    #[test]
    fn test_open_loads_and_evaluates() {
        let path = scratch_file("open");
        fs::write(&path, "dim n: 4\r\nn*n\n").expect("write scratch file");

        let mut app = App::new("", None, Duration::from_secs(60));
        press(&mut app, KeyCode::Char('9'));

        ctrl(&mut app, 'o');
        assert!(app.prompt.is_none());
        ctrl(&mut app, 'o');
        assert_eq!(app.prompt.as_ref().map(|p| p.purpose), Some(PromptPurpose::Open));

        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.editor.lines(), ["dim n: 4", "n*n", ""]);
        assert_eq!(app.sheet.outcome(1), Some(&LineOutcome::Value(16.0)));
        assert_eq!(app.path.as_deref(), Some(path.as_path()));
        assert!(!app.dirty);
        assert!(app.pending_since.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_open_failure_keeps_document() {
        let path = scratch_file("missing");
        let _ = fs::remove_file(&path);

        let mut app = App::new("5", None, Duration::ZERO);
        ctrl(&mut app, 'o');
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert!(app.status_is_error);
        assert_eq!(app.editor.lines(), ["5"]);
        assert!(app.path.is_none());
    }
}
