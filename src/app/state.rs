use std::time::{Duration, Instant};

use strum::Display;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use super::dialogs::{Dialog, Modal};
use crate::storage::{timestamp_now, Note};

/// Identity of a cached note: a store id once persisted, a local key before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKey {
    Pending(Uuid),
    Stored(i64),
}

impl NoteKey {
    pub fn stored_id(self) -> Option<i64> {
        match self {
            NoteKey::Stored(id) => Some(id),
            NoteKey::Pending(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedNote {
    pub key: NoteKey,
    pub title: String,
    pub text: String,
    pub created_at: String,
    /// In-memory text differs from what was last persisted.
    pub unsaved: bool,
}

impl CachedNote {
    pub fn pending(title: String, created_at: String) -> Self {
        Self {
            key: NoteKey::Pending(Uuid::new_v4()),
            title,
            text: String::new(),
            created_at,
            unsaved: true,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.key, NoteKey::Pending(_))
    }
}

impl From<Note> for CachedNote {
    fn from(note: Note) -> Self {
        Self {
            key: NoteKey::Stored(note.id),
            title: note.title,
            text: note.text,
            created_at: note.created_at,
            unsaved: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Focus {
    Sidebar,
    Editor,
}

/// Whatever currently receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FocusTarget {
    Sidebar,
    Editor,
    Dialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScreenMode {
    Empty,
    Viewing,
    Editing,
    DialogActive,
}

/// What a dialog was opened for, so its outcome can be applied on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPurpose {
    DeleteNote(NoteKey),
    RenameNote(NoteKey),
    Help,
}

impl DialogPurpose {
    fn rekeyed(self, from: NoteKey, to: NoteKey) -> Self {
        match self {
            DialogPurpose::DeleteNote(key) if key == from => DialogPurpose::DeleteNote(to),
            DialogPurpose::RenameNote(key) if key == from => DialogPurpose::RenameNote(to),
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActiveDialog {
    pub dialog: Dialog,
    pub purpose: DialogPurpose,
    restore_focus: Focus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    key: NoteKey,
    buffer: String,
    cursor: usize,
    preferred_column: Option<usize>,
    revision: u64,
}

impl EditorState {
    fn new(key: NoteKey, buffer: String) -> Self {
        let cursor = buffer.len();
        Self {
            key,
            buffer,
            cursor,
            preferred_column: None,
            revision: 0,
        }
    }

    pub fn key(&self) -> NoteKey {
        self.key
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Bumped on every change to the buffer contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Zero-based line and grapheme column of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let start = line_start(&self.buffer, self.cursor);
        let line = self.buffer[..start].matches('\n').count();
        (line, column_at(&self.buffer, start, self.cursor))
    }

    /// Display width of the text between the line start and the cursor.
    pub fn cursor_display_column(&self) -> usize {
        let start = line_start(&self.buffer, self.cursor);
        unicode_width::UnicodeWidthStr::width(&self.buffer[start..self.cursor])
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        let mut scratch = [0u8; 4];
        let encoded = ch.encode_utf8(&mut scratch);
        self.buffer.insert_str(self.cursor, encoded);
        self.cursor += encoded.len();
        self.preferred_column = None;
        self.revision += 1;
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.buffer.insert(self.cursor, '\n');
        self.cursor += 1;
        self.preferred_column = Some(0);
        self.revision += 1;
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.buffer, self.cursor);
        self.buffer.drain(prev..self.cursor);
        self.cursor = prev;
        self.preferred_column = None;
        self.revision += 1;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.buffer, self.cursor);
        if next == self.cursor {
            return false;
        }
        self.buffer.drain(self.cursor..next);
        self.preferred_column = None;
        self.revision += 1;
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = prev_grapheme_boundary(&self.buffer, self.cursor);
        self.preferred_column = None;
        true
    }

    pub fn move_right(&mut self) -> bool {
        let next = next_grapheme_boundary(&self.buffer, self.cursor);
        if next == self.cursor {
            return false;
        }
        self.cursor = next;
        self.preferred_column = None;
        true
    }

    pub fn move_home(&mut self) -> bool {
        let start = line_start(&self.buffer, self.cursor);
        if self.cursor == start {
            return false;
        }
        self.cursor = start;
        self.preferred_column = Some(0);
        true
    }

    pub fn move_end(&mut self) -> bool {
        let end = line_end(&self.buffer, self.cursor);
        if self.cursor == end {
            return false;
        }
        self.cursor = end;
        self.preferred_column = Some(column_at(
            &self.buffer,
            line_start(&self.buffer, self.cursor),
            self.cursor,
        ));
        true
    }

    pub fn move_up(&mut self) -> bool {
        let current_line_start = line_start(&self.buffer, self.cursor);
        let column = self
            .preferred_column
            .unwrap_or_else(|| column_at(&self.buffer, current_line_start, self.cursor));
        if current_line_start == 0 {
            if self.cursor == 0 {
                return false;
            }
            self.cursor = 0;
            self.preferred_column = Some(column);
            return true;
        }
        let prev_line_start = line_start(&self.buffer, current_line_start - 1);
        self.cursor = position_for_column(&self.buffer, prev_line_start, column);
        self.preferred_column = Some(column);
        true
    }

    pub fn move_down(&mut self) -> bool {
        let current_line_start = line_start(&self.buffer, self.cursor);
        let column = self
            .preferred_column
            .unwrap_or_else(|| column_at(&self.buffer, current_line_start, self.cursor));
        let current_line_end = line_end(&self.buffer, self.cursor);
        if current_line_end == self.buffer.len() {
            if self.cursor == self.buffer.len() {
                return false;
            }
            self.cursor = self.buffer.len();
            self.preferred_column = Some(column);
            return true;
        }
        self.cursor = position_for_column(&self.buffer, current_line_end + 1, column);
        self.preferred_column = Some(column);
        true
    }

    pub fn move_word_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let mut idx = self.cursor;
        while idx > 0 {
            let prev = prev_grapheme_boundary(&self.buffer, idx);
            if !self.buffer[prev..idx].trim().is_empty() {
                break;
            }
            idx = prev;
        }
        while idx > 0 {
            let prev = prev_grapheme_boundary(&self.buffer, idx);
            if self.buffer[prev..idx].trim().is_empty() {
                break;
            }
            idx = prev;
        }
        self.cursor = idx;
        self.preferred_column = None;
        true
    }

    pub fn move_word_right(&mut self) -> bool {
        let len = self.buffer.len();
        if self.cursor >= len {
            return false;
        }
        let mut idx = self.cursor;
        let mut seen_word = false;
        while idx < len {
            let next = next_grapheme_boundary(&self.buffer, idx);
            let blank = self.buffer[idx..next].trim().is_empty();
            if blank && seen_word {
                break;
            }
            seen_word |= !blank;
            idx = next;
        }
        while idx < len {
            let next = next_grapheme_boundary(&self.buffer, idx);
            if !self.buffer[idx..next].trim().is_empty() {
                break;
            }
            idx = next;
        }
        self.cursor = idx;
        self.preferred_column = None;
        true
    }
}

/// In-memory view model behind the interactive screen.
///
/// Holds the ordered note cache (newest first), the selection, focus, the
/// active dialog and the transient status notification. Nothing here touches
/// the store; writes are requested through effects.
#[derive(Debug)]
pub struct ScreenState {
    notes: Vec<CachedNote>,
    selected: usize,
    focus: Focus,
    editor: Option<EditorState>,
    dialog: Option<ActiveDialog>,
    notification: Option<Notification>,
    notification_ttl: Duration,
}

impl ScreenState {
    /// Builds the startup state from store rows in id order.
    ///
    /// An empty store yields a single pending placeholder so the editor always
    /// has a target.
    pub fn load(rows: Vec<Note>, notification_ttl: Duration) -> Self {
        let mut notes: Vec<CachedNote> = rows.into_iter().rev().map(CachedNote::from).collect();
        if notes.is_empty() {
            let created_at = timestamp_now();
            notes.push(CachedNote::pending(created_at.clone(), created_at));
        }
        let mut state = Self {
            notes,
            selected: 0,
            focus: Focus::Sidebar,
            editor: None,
            dialog: None,
            notification: None,
            notification_ttl,
        };
        state.load_editor();
        state
    }

    pub fn notes(&self) -> &[CachedNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.notes.is_empty()).then_some(self.selected)
    }

    pub fn current_note(&self) -> Option<&CachedNote> {
        self.notes.get(self.selected)
    }

    pub fn position_of(&self, key: NoteKey) -> Option<usize> {
        self.notes.iter().position(|note| note.key == key)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn focused_target(&self) -> FocusTarget {
        if self.dialog.is_some() {
            return FocusTarget::Dialog;
        }
        match self.focus {
            Focus::Sidebar => FocusTarget::Sidebar,
            Focus::Editor => FocusTarget::Editor,
        }
    }

    pub fn is_float_displaying(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn mode(&self) -> ScreenMode {
        if self.dialog.is_some() {
            return ScreenMode::DialogActive;
        }
        self.underlying_mode()
    }

    /// Mode beneath any open dialog.
    pub fn underlying_mode(&self) -> ScreenMode {
        match self.current_note() {
            None => ScreenMode::Empty,
            Some(note) if note.unsaved && !note.text.is_empty() => ScreenMode::Editing,
            Some(_) => ScreenMode::Viewing,
        }
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.dialog.is_some() {
            return;
        }
        self.focus = match focus {
            Focus::Editor if self.editor.is_none() => Focus::Sidebar,
            other => other,
        };
    }

    pub fn cycle_focus(&mut self) {
        let next = match self.focus {
            Focus::Sidebar => Focus::Editor,
            Focus::Editor => Focus::Sidebar,
        };
        self.set_focus(next);
    }

    pub fn editor(&self) -> Option<&EditorState> {
        self.editor.as_ref()
    }

    /// Runs an editor operation and mirrors any text change into the cache.
    pub fn edit_with(&mut self, op: impl FnOnce(&mut EditorState) -> bool) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let before = editor.revision();
        let handled = op(editor);
        if editor.revision() != before {
            let text = editor.buffer().to_string();
            let key = editor.key();
            if let Some(note) = self.notes.iter_mut().find(|note| note.key == key) {
                note.text = text;
                note.unsaved = true;
            }
        }
        handled
    }

    /// Index reached by stepping `delta` from the selection, wrapping around.
    pub fn wrapped_index(&self, delta: isize) -> Option<usize> {
        let len = self.notes.len() as isize;
        if len == 0 {
            return None;
        }
        Some((self.selected as isize + delta).rem_euclid(len) as usize)
    }

    /// Moves the selection and loads that note into the editor.
    pub fn select(&mut self, index: usize) {
        if index >= self.notes.len() {
            return;
        }
        self.selected = index;
        self.load_editor();
    }

    pub fn push_pending(&mut self, title: String, created_at: String) -> NoteKey {
        let note = CachedNote::pending(title, created_at);
        let key = note.key;
        self.notes.insert(0, note);
        self.selected = 0;
        self.load_editor();
        key
    }

    /// Drops a note from the cache, clamping the selection to a neighbour.
    pub fn remove(&mut self, key: NoteKey) -> Option<CachedNote> {
        let index = self.position_of(key)?;
        let removed = self.notes.remove(index);
        if self.notes.is_empty() {
            self.selected = 0;
        } else if self.selected > index || self.selected >= self.notes.len() {
            self.selected = self.selected.saturating_sub(1).min(self.notes.len() - 1);
        }
        self.load_editor();
        Some(removed)
    }

    pub fn set_title(&mut self, key: NoteKey, title: String) -> bool {
        match self.notes.iter_mut().find(|note| note.key == key) {
            Some(note) => {
                note.title = title;
                true
            }
            None => false,
        }
    }

    /// Replaces a pending key with the store id the note was inserted under.
    pub fn adopt_id(&mut self, local: NoteKey, id: i64, saved_text: &str) {
        let stored = NoteKey::Stored(id);
        if let Some(note) = self.notes.iter_mut().find(|note| note.key == local) {
            note.key = stored;
            note.unsaved = note.text != saved_text;
        }
        if let Some(editor) = self.editor.as_mut().filter(|editor| editor.key == local) {
            editor.key = stored;
        }
        if let Some(active) = self.dialog.as_mut() {
            active.purpose = active.purpose.rekeyed(local, stored);
        }
    }

    /// Empties a note's text, keeping the note itself.
    pub fn clear_text(&mut self, key: NoteKey) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| note.key == key) else {
            return false;
        };
        note.text.clear();
        note.unsaved = true;
        if self.editor.as_ref().is_some_and(|editor| editor.key == key) {
            self.editor = Some(EditorState::new(key, String::new()));
        }
        true
    }

    pub fn mark_saved(&mut self, id: i64, saved_text: &str) {
        if let Some(note) = self
            .notes
            .iter_mut()
            .find(|note| note.key == NoteKey::Stored(id))
        {
            note.unsaved = note.text != saved_text;
        }
    }

    pub fn open_dialog(&mut self, dialog: Dialog, purpose: DialogPurpose) {
        tracing::debug!(title = dialog.title(), "opening dialog");
        self.dialog = Some(ActiveDialog {
            dialog,
            purpose,
            restore_focus: self.focus,
        });
    }

    pub fn dialog(&self) -> Option<&ActiveDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut ActiveDialog> {
        self.dialog.as_mut()
    }

    /// Closes the active dialog and gives focus back to where it was.
    pub fn close_dialog(&mut self) -> Option<ActiveDialog> {
        let active = self.dialog.take()?;
        self.set_focus(active.restore_focus);
        Some(active)
    }

    pub fn notify(&mut self, text: impl Into<String>, now: Instant) {
        self.notification = Some(Notification {
            text: text.into(),
            expires_at: now + self.notification_ttl,
        });
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification.as_ref().map(|n| n.expires_at)
    }

    pub fn expire_notification(&mut self, now: Instant) -> bool {
        match &self.notification {
            Some(notification) if notification.expires_at <= now => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    fn load_editor(&mut self) {
        self.editor = self
            .notes
            .get(self.selected)
            .map(|note| EditorState::new(note.key, note.text.clone()));
        if self.editor.is_none() {
            self.focus = Focus::Sidebar;
        }
    }
}

fn prev_grapheme_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .grapheme_indices(true)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_grapheme_boundary(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .graphemes(true)
        .next()
        .map(|grapheme| cursor + grapheme.len())
        .unwrap_or(text.len())
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|idx| idx + 1).unwrap_or(0)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .find('\n')
        .map(|idx| cursor + idx)
        .unwrap_or(text.len())
}

fn column_at(text: &str, line_start: usize, cursor: usize) -> usize {
    text[line_start..cursor].graphemes(true).count()
}

fn position_for_column(text: &str, line_start: usize, column: usize) -> usize {
    let end = line_end(text, line_start);
    text[line_start..end]
        .grapheme_indices(true)
        .nth(column)
        .map(|(idx, _)| line_start + idx)
        .unwrap_or(end)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::dialogs::MessageDialog;

    pub(crate) fn note(id: i64, title: &str, text: &str) -> Note {
        Note {
            id,
            title: title.into(),
            text: text.into(),
            created_at: "Fri Oct 16 14:03:22 2026".into(),
        }
    }

    pub(crate) fn state_with(rows: Vec<Note>) -> ScreenState {
        ScreenState::load(rows, Duration::from_millis(1500))
    }

    #[test]
    fn startup_orders_newest_first() {
        let state = state_with(vec![note(1, "A", "a"), note(2, "B", "b")]);
        let titles: Vec<_> = state.notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert_eq!(state.selected_index(), Some(0));
        assert_eq!(state.focused_target(), FocusTarget::Sidebar);
        assert_eq!(state.editor().map(EditorState::buffer), Some("b"));
    }

    #[test]
    fn empty_store_gets_pending_placeholder() {
        let state = state_with(Vec::new());
        assert_eq!(state.len(), 1);
        let placeholder = state.current_note().expect("placeholder");
        assert!(placeholder.is_pending());
        assert!(placeholder.text.is_empty());
        assert_eq!(placeholder.title, placeholder.created_at);
        assert_eq!(state.mode(), ScreenMode::Viewing);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let state = state_with(vec![note(1, "A", ""), note(2, "B", ""), note(3, "C", "")]);
        assert_eq!(state.wrapped_index(-1), Some(2));
        assert_eq!(state.wrapped_index(1), Some(1));
        assert_eq!(state.wrapped_index(3), Some(0));
    }

    #[test]
    fn removing_last_note_leaves_empty_state() {
        let mut state = state_with(vec![note(1, "A", "a")]);
        state.set_focus(Focus::Editor);
        state.remove(NoteKey::Stored(1));
        assert!(state.current_note().is_none());
        assert_eq!(state.selected_index(), None);
        assert!(state.editor().is_none());
        assert_eq!(state.mode(), ScreenMode::Empty);
        assert_eq!(state.focus(), Focus::Sidebar);
    }

    #[test]
    fn removing_tail_clamps_selection() {
        let mut state = state_with(vec![note(1, "A", ""), note(2, "B", ""), note(3, "C", "")]);
        state.select(2);
        state.remove(NoteKey::Stored(1));
        assert_eq!(state.selected_index(), Some(1));
        assert_eq!(state.current_note().map(|n| n.title.as_str()), Some("B"));
    }

    #[test]
    fn edits_mark_cached_note_unsaved() {
        let mut state = state_with(vec![note(1, "A", "hi")]);
        assert!(state.edit_with(|editor| editor.insert_char('!')));
        let current = state.current_note().expect("note");
        assert_eq!(current.text, "hi!");
        assert!(current.unsaved);
        assert_eq!(state.mode(), ScreenMode::Editing);

        state.mark_saved(1, "hi!");
        assert!(!state.current_note().expect("note").unsaved);
    }

    #[test]
    fn cursor_motion_does_not_dirty_note() {
        let mut state = state_with(vec![note(1, "A", "hi")]);
        assert!(state.edit_with(EditorState::move_left));
        assert!(!state.current_note().expect("note").unsaved);
    }

    #[test]
    fn adopt_id_rekeys_cache_and_editor() {
        let mut state = state_with(Vec::new());
        let local = state.current_note().expect("placeholder").key;
        state.edit_with(|editor| editor.insert_char('x'));
        state.adopt_id(local, 9, "x");
        assert_eq!(state.current_note().map(|n| n.key), Some(NoteKey::Stored(9)));
        assert_eq!(state.editor().map(EditorState::key), Some(NoteKey::Stored(9)));
        assert!(!state.current_note().expect("note").unsaved);
    }

    #[test]
    fn adopt_id_rekeys_an_open_dialog() {
        let mut state = state_with(Vec::new());
        let local = state.current_note().expect("placeholder").key;
        state.open_dialog(
            Dialog::Message(MessageDialog::new("Delete", "body")),
            DialogPurpose::DeleteNote(local),
        );
        state.adopt_id(local, 4, "");
        assert_eq!(
            state.dialog().map(|active| active.purpose),
            Some(DialogPurpose::DeleteNote(NoteKey::Stored(4)))
        );
    }

    #[test]
    fn clear_text_resets_the_editor() {
        let mut state = state_with(vec![note(1, "A", "body")]);
        assert!(state.clear_text(NoteKey::Stored(1)));
        assert_eq!(state.editor().map(EditorState::buffer), Some(""));
        assert!(state.current_note().expect("note").unsaved);
        assert!(!state.clear_text(NoteKey::Stored(2)));
    }

    #[test]
    fn dialog_restores_previous_focus() {
        let mut state = state_with(vec![note(1, "A", "")]);
        state.set_focus(Focus::Editor);
        state.open_dialog(
            Dialog::Message(MessageDialog::new("Help", "body")),
            DialogPurpose::Help,
        );
        assert!(state.is_float_displaying());
        assert_eq!(state.focused_target(), FocusTarget::Dialog);
        assert_eq!(state.mode(), ScreenMode::DialogActive);

        state.cycle_focus();
        assert_eq!(state.focus(), Focus::Editor);

        state.close_dialog();
        assert!(!state.is_float_displaying());
        assert_eq!(state.focused_target(), FocusTarget::Editor);
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut state = state_with(vec![note(1, "A", "")]);
        let now = Instant::now();
        state.notify("Saved the note!", now);
        assert!(!state.expire_notification(now + Duration::from_millis(1000)));
        assert!(state.notification().is_some());
        assert!(state.expire_notification(now + Duration::from_millis(1500)));
        assert!(state.notification().is_none());
    }

    #[test]
    fn editor_word_navigation_skips_whitespace() {
        let mut editor = EditorState::new(NoteKey::Stored(1), "alpha  beta".to_string());
        assert!(editor.move_word_left());
        assert_eq!(editor.cursor(), 7);
        assert!(editor.move_word_left());
        assert_eq!(editor.cursor(), 0);
        assert!(editor.move_word_right());
        assert_eq!(editor.cursor(), 7);
    }

    #[test]
    fn editor_vertical_motion_keeps_column() {
        let mut editor = EditorState::new(NoteKey::Stored(1), "abcdef\nab\nabcdef".to_string());
        assert_eq!(editor.cursor_line_col(), (2, 6));
        editor.move_up();
        assert_eq!(editor.cursor_line_col(), (1, 2));
        editor.move_up();
        assert_eq!(editor.cursor_line_col(), (0, 6));
    }

    #[test]
    fn editor_backspace_removes_grapheme_cluster() {
        let mut editor = EditorState::new(NoteKey::Stored(1), "ne\u{301}".to_string());
        assert!(editor.backspace());
        assert_eq!(editor.buffer(), "n");
        assert_eq!(editor.revision(), 1);
    }
}
