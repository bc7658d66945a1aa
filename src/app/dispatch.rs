//! Translation of input into commands, and of commands into state changes
//! plus the store writes they require.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::Display;
use uuid::Uuid;

use super::dialogs::{
    ConfirmDialog, ConfirmOutcome, Dialog, DialogOutcome, MessageDialog, Modal, TextInputDialog,
};
use super::state::{DialogPurpose, EditorState, Focus, NoteKey, ScreenState};
use crate::storage::timestamp_now;

pub const HELP_TEXT: &str = "\
Ctrl-S        save the current note
Ctrl-N        create a new note
Ctrl-D        delete the current note
Ctrl-R        rename the current note
Ctrl-C/X/Q    save and quit
Tab           switch between sidebar and editor
Up/Down, j/k  move through notes (sidebar)
Enter         edit the selected note (sidebar)
Esc           back to the sidebar (editor)
F1, ?         show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    WordLeft,
    WordRight,
}

impl EditAction {
    fn apply(self, editor: &mut EditorState) -> bool {
        match self {
            EditAction::Insert(ch) => editor.insert_char(ch),
            EditAction::Newline => editor.insert_newline(),
            EditAction::Backspace => editor.backspace(),
            EditAction::Delete => editor.delete(),
            EditAction::Left => editor.move_left(),
            EditAction::Right => editor.move_right(),
            EditAction::Up => editor.move_up(),
            EditAction::Down => editor.move_down(),
            EditAction::Home => editor.move_home(),
            EditAction::End => editor.move_end(),
            EditAction::WordLeft => editor.move_word_left(),
            EditAction::WordRight => editor.move_word_right(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    NewNote,
    RequestRename,
    RequestDelete,
    ShowHelp,
    FocusNext,
    FocusPrevious,
    Focus(Focus),
    SelectPrevious,
    SelectNext,
    SelectIndex(usize),
    Edit(EditAction),
    Dialog(KeyEvent),
    AutosaveTick,
    ExpireNotification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SaveReason {
    Manual,
    Autosave,
    Switch,
    Exit,
}

/// A store write (or shell request) produced by dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Insert {
        local: Uuid,
        title: String,
        text: String,
        created_at: String,
        reason: SaveReason,
    },
    UpdateText {
        id: i64,
        text: String,
        reason: SaveReason,
    },
    UpdateTitle {
        id: i64,
        title: String,
    },
    Delete {
        id: i64,
    },
    Quit,
}

pub fn translate_key(state: &ScreenState, key: KeyEvent) -> Option<Command> {
    if state.is_float_displaying() {
        return Some(Command::Dialog(key));
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('x') | KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('s') => Some(Command::Save),
            KeyCode::Char('n') => Some(Command::NewNote),
            KeyCode::Char('d') => Some(Command::RequestDelete),
            KeyCode::Char('r') => Some(Command::RequestRename),
            KeyCode::Left if state.focus() == Focus::Editor => {
                Some(Command::Edit(EditAction::WordLeft))
            }
            KeyCode::Right if state.focus() == Focus::Editor => {
                Some(Command::Edit(EditAction::WordRight))
            }
            _ => None,
        };
    }

    match key.code {
        KeyCode::F(1) => return Some(Command::ShowHelp),
        KeyCode::Tab => return Some(Command::FocusNext),
        KeyCode::BackTab => return Some(Command::FocusPrevious),
        _ => {}
    }

    match state.focus() {
        Focus::Sidebar => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrevious),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
            KeyCode::Enter => Some(Command::Focus(Focus::Editor)),
            KeyCode::Char('?') => Some(Command::ShowHelp),
            _ => None,
        },
        Focus::Editor => {
            let action = match key.code {
                KeyCode::Esc => return Some(Command::Focus(Focus::Sidebar)),
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                    EditAction::Insert(ch)
                }
                KeyCode::Enter => EditAction::Newline,
                KeyCode::Backspace => EditAction::Backspace,
                KeyCode::Delete => EditAction::Delete,
                KeyCode::Left => EditAction::Left,
                KeyCode::Right => EditAction::Right,
                KeyCode::Up => EditAction::Up,
                KeyCode::Down => EditAction::Down,
                KeyCode::Home => EditAction::Home,
                KeyCode::End => EditAction::End,
                _ => return None,
            };
            Some(Command::Edit(action))
        }
    }
}

/// Applies a command to the screen state and returns the writes it needs.
pub fn dispatch(state: &mut ScreenState, command: Command, now: Instant) -> Vec<Effect> {
    match command {
        Command::Quit => vec![Effect::Quit],
        Command::Save => save_point(state, SaveReason::Manual, now),
        Command::AutosaveTick => save_point(state, SaveReason::Autosave, now),
        Command::NewNote => {
            let effects = save_point(state, SaveReason::Switch, now);
            let created_at = timestamp_now();
            state.push_pending(created_at.clone(), created_at);
            state.set_focus(Focus::Editor);
            effects
        }
        Command::SelectPrevious => match state.wrapped_index(-1) {
            Some(index) => switch_to(state, index, now),
            None => Vec::new(),
        },
        Command::SelectNext => match state.wrapped_index(1) {
            Some(index) => switch_to(state, index, now),
            None => Vec::new(),
        },
        Command::SelectIndex(index) => {
            state.set_focus(Focus::Sidebar);
            if index < state.len() {
                switch_to(state, index, now)
            } else {
                Vec::new()
            }
        }
        Command::RequestDelete => {
            match state.current_note() {
                Some(note) => {
                    let dialog = ConfirmDialog::new(
                        "Delete note",
                        format!("Delete \"{}\"? This cannot be undone.", note.title),
                        "Delete",
                        "Cancel",
                    )
                    .with_custom_action("Clear text");
                    let purpose = DialogPurpose::DeleteNote(note.key);
                    state.open_dialog(Dialog::Confirm(dialog), purpose);
                }
                None => state.notify("No note selected", now),
            }
            Vec::new()
        }
        Command::RequestRename => {
            match state.current_note() {
                Some(note) => {
                    let dialog = TextInputDialog::new("Rename note", Some(&note.title));
                    let purpose = DialogPurpose::RenameNote(note.key);
                    state.open_dialog(Dialog::TextInput(dialog), purpose);
                }
                None => state.notify("No note selected", now),
            }
            Vec::new()
        }
        Command::ShowHelp => {
            state.open_dialog(
                Dialog::Message(MessageDialog::new("Help", HELP_TEXT)),
                DialogPurpose::Help,
            );
            Vec::new()
        }
        Command::FocusNext | Command::FocusPrevious => {
            state.cycle_focus();
            Vec::new()
        }
        Command::Focus(focus) => {
            state.set_focus(focus);
            Vec::new()
        }
        Command::Edit(action) => {
            if state.focus() == Focus::Editor && !state.is_float_displaying() {
                state.edit_with(|editor| action.apply(editor));
            }
            Vec::new()
        }
        Command::Dialog(key) => {
            let outcome = match state.dialog_mut() {
                Some(active) => active.dialog.handle_key(key),
                None => return Vec::new(),
            };
            let Some(outcome) = outcome else {
                return Vec::new();
            };
            match state.close_dialog() {
                Some(active) => resolve_dialog(state, active.purpose, outcome, now),
                None => Vec::new(),
            }
        }
        Command::ExpireNotification => {
            state.expire_notification(now);
            Vec::new()
        }
    }
}

/// Collects the writes needed to persist the current note.
///
/// Pending notes are only inserted once they hold non-blank text. Stored notes
/// are written when unsaved, and always on a manual save.
pub fn save_point(state: &mut ScreenState, reason: SaveReason, now: Instant) -> Vec<Effect> {
    let manual = reason == SaveReason::Manual;
    let Some(note) = state.current_note() else {
        if manual {
            state.notify("Nothing to save", now);
        }
        return Vec::new();
    };

    match note.key {
        NoteKey::Pending(local) => {
            if note.text.trim().is_empty() {
                if manual {
                    state.notify("No text entered", now);
                }
                return Vec::new();
            }
            vec![Effect::Insert {
                local,
                title: note.title.clone(),
                text: note.text.clone(),
                created_at: note.created_at.clone(),
                reason,
            }]
        }
        NoteKey::Stored(id) if note.unsaved || manual => vec![Effect::UpdateText {
            id,
            text: note.text.clone(),
            reason,
        }],
        NoteKey::Stored(_) => Vec::new(),
    }
}

fn switch_to(state: &mut ScreenState, index: usize, now: Instant) -> Vec<Effect> {
    if state.selected_index() == Some(index) {
        return Vec::new();
    }
    let effects = save_point(state, SaveReason::Switch, now);
    state.select(index);
    effects
}

fn resolve_dialog(
    state: &mut ScreenState,
    purpose: DialogPurpose,
    outcome: DialogOutcome,
    now: Instant,
) -> Vec<Effect> {
    match (purpose, outcome) {
        (DialogPurpose::DeleteNote(key), DialogOutcome::Confirm(ConfirmOutcome::Accepted)) => {
            if state.remove(key).is_none() {
                return Vec::new();
            }
            match key {
                NoteKey::Stored(id) => vec![Effect::Delete { id }],
                NoteKey::Pending(_) => {
                    state.notify("Deleted the note", now);
                    Vec::new()
                }
            }
        }
        (DialogPurpose::RenameNote(key), DialogOutcome::Input(Some(value))) => {
            let title = value.trim();
            if title.is_empty() {
                state.notify("No text entered", now);
                return Vec::new();
            }
            match key {
                // cache follows once the store accepts the new title
                NoteKey::Stored(id) if state.position_of(key).is_some() => {
                    vec![Effect::UpdateTitle {
                        id,
                        title: title.to_string(),
                    }]
                }
                NoteKey::Stored(_) => Vec::new(),
                NoteKey::Pending(_) => {
                    state.set_title(key, title.to_string());
                    Vec::new()
                }
            }
        }
        (DialogPurpose::DeleteNote(key), DialogOutcome::Confirm(ConfirmOutcome::Custom)) => {
            if state.clear_text(key) {
                state.notify("Cleared the note", now);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}
