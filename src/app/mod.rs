use std::io::Stdout;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::scheduler::{AppEvent, InputPump, Scheduler};
use crate::storage::NoteStore;
use crate::ui::{self, Hit, ScreenLayout};

pub mod actions;
pub mod dialogs;
pub mod dispatch;
pub mod state;

use self::actions::ActionDispatcher;
use self::dispatch::{dispatch, save_point, translate_key, Command, SaveReason};
pub use self::state::{CachedNote, Focus, NoteKey, ScreenMode, ScreenState};

/// The interactive shell: owns the store, the screen state and the timers.
pub struct App {
    config: Arc<AppConfig>,
    store: NoteStore,
    state: ScreenState,
    scheduler: Scheduler,
    list_state: ListState,
    layout: Option<ScreenLayout>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: NoteStore) -> Result<Self> {
        let rows = store
            .list_all()
            .context("loading notes for initial state")?;
        tracing::info!(notes = rows.len(), "loaded notes");
        let state = ScreenState::load(rows, config.ui.notification_ttl());
        let scheduler = Scheduler::new(&config.autosave);
        Ok(Self {
            config,
            store,
            state,
            scheduler,
            list_state: ListState::default(),
            layout: None,
            should_quit: false,
        })
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Runs the shell until the user quits, then performs the exit sequence.
    ///
    /// The terminal is restored and the exit save attempted even when the
    /// event loop fails; the first error wins.
    pub fn run(mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        let restored = restore_terminal(&mut terminal);
        let shutdown = self.shutdown();
        result.and(restored).and(shutdown)
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut input = InputPump::spawn()?;
        loop {
            terminal
                .draw(|frame| {
                    self.layout = Some(ScreenLayout::compute(
                        frame.size(),
                        self.config.ui.sidebar_width,
                    ));
                    ui::draw_app(frame, &self.state, &mut self.list_state, &self.config.ui);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let event = self
                .scheduler
                .wait(input.events(), self.state.notification_deadline())?;
            self.handle_event(event, Instant::now());
        }
        input.stop();
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        let command = match event {
            AppEvent::AutosaveTick => Some(Command::AutosaveTick),
            AppEvent::NotificationDeadline => Some(Command::ExpireNotification),
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                translate_key(&self.state, key)
            }
            AppEvent::Input(Event::Mouse(mouse)) => self.translate_mouse(mouse),
            AppEvent::Input(_) => None,
        };
        if let Some(command) = command {
            self.handle_command(command, now);
        }
    }

    pub fn handle_command(&mut self, command: Command, now: Instant) {
        let effects = dispatch(&mut self.state, command, now);
        if effects.is_empty() {
            return;
        }
        if ActionDispatcher::new(&self.store).run(&mut self.state, effects, now) {
            tracing::info!("quit requested");
            self.should_quit = true;
        }
    }

    fn translate_mouse(&self, mouse: MouseEvent) -> Option<Command> {
        if self.state.is_float_displaying() {
            return None;
        }
        let hit = self.layout?.hit(mouse.column, mouse.row)?;
        match (mouse.kind, hit) {
            (MouseEventKind::Down(MouseButton::Left), Hit::SidebarRow(row)) => {
                let index = self.list_state.offset() + row as usize;
                if index < self.state.len() {
                    Some(Command::SelectIndex(index))
                } else {
                    Some(Command::Focus(Focus::Sidebar))
                }
            }
            (MouseEventKind::Down(MouseButton::Left), Hit::Editor) => {
                Some(Command::Focus(Focus::Editor))
            }
            (MouseEventKind::ScrollUp, Hit::SidebarRow(_)) => Some(Command::SelectPrevious),
            (MouseEventKind::ScrollDown, Hit::SidebarRow(_)) => Some(Command::SelectNext),
            _ => None,
        }
    }

    /// Exit sequence: stop autosave, save the current note, close the store.
    /// Any failure here is fatal.
    pub fn shutdown(mut self) -> Result<()> {
        self.scheduler.cancel_autosave();
        let effects = save_point(&mut self.state, SaveReason::Exit, Instant::now());
        ActionDispatcher::new(&self.store)
            .run_strict(&mut self.state, effects)
            .context("saving the current note on exit")?;
        self.store.close().context("closing the note database")?;
        tracing::info!("shut down cleanly");
        Ok(())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    // raw mode and the alternate screen are left even if the cursor fails
    let cursor = terminal.show_cursor().context("showing cursor");
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;
    use tempfile::TempDir;

    type TestResult = anyhow::Result<()>;

    fn app_with(store: NoteStore) -> Result<App> {
        let mut app = App::new(Arc::new(AppConfig::default()), store)?;
        app.layout = Some(ScreenLayout::compute(Rect::new(0, 0, 80, 24), 36));
        Ok(app)
    }

    fn key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_event(
            AppEvent::Input(Event::Key(KeyEvent::new(code, modifiers))),
            Instant::now(),
        );
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            key(app, KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    fn click(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        app.handle_event(
            AppEvent::Input(Event::Mouse(MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })),
            Instant::now(),
        );
    }

    #[test]
    fn exit_sequence_persists_unsaved_text() -> TestResult {
        let temp = TempDir::new()?;
        let path = temp.path().join("main.db");
        let options = crate::config::StorageOptions::default();

        let mut app = app_with(NoteStore::open(&path, &options)?)?;
        key(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        type_text(&mut app, "left at exit");
        key(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
        app.shutdown()?;

        let store = NoteStore::open(&path, &options)?;
        let rows = store.list_all()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "left at exit");
        Ok(())
    }

    #[test]
    fn deleting_the_only_note_leaves_an_empty_store() -> TestResult {
        let temp = TempDir::new()?;
        let path = temp.path().join("main.db");
        let options = crate::config::StorageOptions::default();
        NoteStore::open(&path, &options)?.insert("Only", "body", "ts")?;

        let mut app = app_with(NoteStore::open(&path, &options)?)?;
        key(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        key(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
        assert!(app.state().current_note().is_none());
        assert!(app.state().is_empty());
        app.shutdown()?;

        let store = NoteStore::open(&path, &options)?;
        assert_eq!(store.count()?, 0);
        Ok(())
    }

    #[test]
    fn untouched_placeholder_is_not_written_on_exit() -> TestResult {
        let temp = TempDir::new()?;
        let path = temp.path().join("main.db");
        let options = crate::config::StorageOptions::default();

        let app = app_with(NoteStore::open(&path, &options)?)?;
        assert_eq!(app.state().len(), 1);
        app.shutdown()?;

        assert_eq!(NoteStore::open(&path, &options)?.count()?, 0);
        Ok(())
    }

    #[test]
    fn clicking_a_sidebar_row_saves_and_selects() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let first = store.insert("First", "one", "ts")?;
        store.insert("Second", "two", "ts")?;
        let mut app = app_with(store)?;

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 50, 5);
        assert_eq!(app.state().focus(), Focus::Editor);
        type_text(&mut app, "!");

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 4, 2);
        assert_eq!(app.state().focus(), Focus::Sidebar);
        assert_eq!(app.state().selected_index(), Some(1));
        assert_eq!(app.store.get(first)?.text, "one");
        assert_eq!(
            app.store.list_all()?.last().map(|n| n.text.clone()),
            Some("two!".to_string())
        );
        Ok(())
    }

    #[test]
    fn wheel_over_sidebar_navigates_with_wrap() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        store.insert("A", "a", "ts")?;
        store.insert("B", "b", "ts")?;
        let mut app = app_with(store)?;

        click(&mut app, MouseEventKind::ScrollUp, 3, 3);
        assert_eq!(app.state().selected_index(), Some(1));
        click(&mut app, MouseEventKind::ScrollDown, 3, 3);
        assert_eq!(app.state().selected_index(), Some(0));
        click(&mut app, MouseEventKind::ScrollDown, 60, 3);
        assert_eq!(app.state().selected_index(), Some(0));
        Ok(())
    }

    #[test]
    fn autosave_tick_writes_current_note() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let id = store.insert("A", "a", "ts")?;
        let mut app = app_with(store)?;
        key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        type_text(&mut app, "bc");
        app.handle_event(AppEvent::AutosaveTick, Instant::now());
        assert_eq!(app.store.get(id)?.text, "abc");
        assert_eq!(app.state().mode(), ScreenMode::Viewing);
        Ok(())
    }

    #[test]
    fn mouse_is_ignored_while_dialog_is_open() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        store.insert("A", "a", "ts")?;
        store.insert("B", "b", "ts")?;
        let mut app = app_with(store)?;
        key(&mut app, KeyCode::F(1), KeyModifiers::NONE);
        click(&mut app, MouseEventKind::Down(MouseButton::Left), 4, 2);
        assert_eq!(app.state().selected_index(), Some(0));
        assert_eq!(app.state().mode(), ScreenMode::DialogActive);
        key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.state().mode(), ScreenMode::Viewing);
        Ok(())
    }
}
