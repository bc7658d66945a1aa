//! Modal overlays that own keyboard input until they resolve.
//!
//! Every dialog resolves at most once. After a dialog has produced an outcome
//! it ignores further keys and the caller discards it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;

const MAX_INPUT_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Accepted,
    Declined,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirm(ConfirmOutcome),
    Input(Option<String>),
    Acknowledged,
}

/// Shared behaviour of the modal variants.
pub trait Modal {
    fn title(&self) -> &str;

    /// Feeds a key to the dialog, returning the outcome once it resolves.
    fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome>;

    fn is_resolved(&self) -> bool;
}

#[derive(Debug, Clone)]
pub enum Dialog {
    Confirm(ConfirmDialog),
    TextInput(TextInputDialog),
    Message(MessageDialog),
}

impl Modal for Dialog {
    fn title(&self) -> &str {
        match self {
            Dialog::Confirm(dialog) => dialog.title(),
            Dialog::TextInput(dialog) => dialog.title(),
            Dialog::Message(dialog) => dialog.title(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        match self {
            Dialog::Confirm(dialog) => dialog.handle_key(key),
            Dialog::TextInput(dialog) => dialog.handle_key(key),
            Dialog::Message(dialog) => dialog.handle_key(key),
        }
    }

    fn is_resolved(&self) -> bool {
        match self {
            Dialog::Confirm(dialog) => dialog.is_resolved(),
            Dialog::TextInput(dialog) => dialog.is_resolved(),
            Dialog::Message(dialog) => dialog.is_resolved(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmButton {
    pub label: String,
    pub outcome: ConfirmOutcome,
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    title: String,
    body: String,
    buttons: Vec<ConfirmButton>,
    focused: usize,
    resolved: bool,
}

impl ConfirmDialog {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        yes_label: impl Into<String>,
        no_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            buttons: vec![
                ConfirmButton {
                    label: yes_label.into(),
                    outcome: ConfirmOutcome::Accepted,
                },
                ConfirmButton {
                    label: no_label.into(),
                    outcome: ConfirmOutcome::Declined,
                },
            ],
            focused: 0,
            resolved: false,
        }
    }

    /// Adds a third button between the accept and decline buttons.
    pub fn with_custom_action(mut self, label: impl Into<String>) -> Self {
        self.buttons.insert(
            1,
            ConfirmButton {
                label: label.into(),
                outcome: ConfirmOutcome::Custom,
            },
        );
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn buttons(&self) -> &[ConfirmButton] {
        &self.buttons
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    fn resolve(&mut self, outcome: ConfirmOutcome) -> Option<DialogOutcome> {
        self.resolved = true;
        Some(DialogOutcome::Confirm(outcome))
    }
}

impl Modal for ConfirmDialog {
    fn title(&self) -> &str {
        &self.title
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        if self.resolved {
            return None;
        }
        let count = self.buttons.len();
        match key.code {
            KeyCode::Left | KeyCode::BackTab => {
                self.focused = (self.focused + count - 1) % count;
                None
            }
            KeyCode::Right | KeyCode::Tab => {
                self.focused = (self.focused + 1) % count;
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let outcome = self.buttons[self.focused].outcome;
                self.resolve(outcome)
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => self.resolve(ConfirmOutcome::Accepted),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.resolve(ConfirmOutcome::Declined)
            }
            _ => None,
        }
    }

    fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[derive(Debug, Clone)]
pub struct TextInputDialog {
    title: String,
    value: String,
    cursor: usize,
    resolved: bool,
}

impl TextInputDialog {
    pub fn new(title: impl Into<String>, default_value: Option<&str>) -> Self {
        let value = default_value.unwrap_or_default().to_string();
        Self {
            title: title.into(),
            cursor: value.len(),
            value,
            resolved: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset of the caret inside `value`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
            .unwrap_or(self.value.len())
    }
}

impl Modal for TextInputDialog {
    fn title(&self) -> &str {
        &self.title
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        if self.resolved {
            return None;
        }
        match key.code {
            KeyCode::Enter => {
                self.resolved = true;
                return Some(DialogOutcome::Input(Some(self.value.clone())));
            }
            KeyCode::Esc => {
                self.resolved = true;
                return Some(DialogOutcome::Input(None));
            }
            KeyCode::Backspace => {
                let prev = self.prev_boundary();
                self.value.drain(prev..self.cursor);
                self.cursor = prev;
            }
            KeyCode::Delete => {
                let next = self.next_boundary();
                self.value.drain(self.cursor..next);
            }
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                if self.value.chars().count() < MAX_INPUT_LEN {
                    self.value.insert(self.cursor, ch);
                    self.cursor += ch.len_utf8();
                }
            }
            _ => {}
        }
        None
    }

    fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[derive(Debug, Clone)]
pub struct MessageDialog {
    title: String,
    body: String,
    scroll: u16,
    resolved: bool,
}

impl MessageDialog {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            scroll: 0,
            resolved: false,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }
}

impl Modal for MessageDialog {
    fn title(&self) -> &str {
        &self.title
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        if self.resolved {
            return None;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q') => {
                self.resolved = true;
                Some(DialogOutcome::Acknowledged)
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                let max = self.body.lines().count().saturating_sub(1) as u16;
                self.scroll = (self.scroll + 1).min(max);
                None
            }
            _ => None,
        }
    }

    fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn confirm_resolves_once() {
        let mut dialog = ConfirmDialog::new("Delete", "Really?", "Yes", "No");
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('y'))),
            Some(DialogOutcome::Confirm(ConfirmOutcome::Accepted))
        );
        assert!(dialog.is_resolved());
        assert_eq!(dialog.handle_key(key(KeyCode::Char('n'))), None);
    }

    #[test]
    fn confirm_buttons_cycle_and_activate() {
        let mut dialog =
            ConfirmDialog::new("Delete", "Really?", "Yes", "No").with_custom_action("Later");
        let labels: Vec<_> = dialog.buttons().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "Later", "No"]);

        assert_eq!(dialog.handle_key(key(KeyCode::Right)), None);
        assert_eq!(dialog.focused(), 1);
        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter)),
            Some(DialogOutcome::Confirm(ConfirmOutcome::Custom))
        );
    }

    #[test]
    fn confirm_focus_wraps_left_and_escape_declines() {
        let mut dialog = ConfirmDialog::new("Delete", "Really?", "Yes", "No");
        dialog.handle_key(key(KeyCode::Left));
        assert_eq!(dialog.focused(), 1);
        assert_eq!(
            dialog.handle_key(key(KeyCode::Esc)),
            Some(DialogOutcome::Confirm(ConfirmOutcome::Declined))
        );
    }

    #[test]
    fn text_input_edits_and_submits() {
        let mut dialog = TextInputDialog::new("Rename", Some("Draft"));
        assert_eq!(dialog.cursor(), 5);
        dialog.handle_key(key(KeyCode::Backspace));
        dialog.handle_key(key(KeyCode::Home));
        dialog.handle_key(key(KeyCode::Char('>')));
        assert_eq!(dialog.value(), ">Draf");
        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter)),
            Some(DialogOutcome::Input(Some(">Draf".into())))
        );
        assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), None);
        assert_eq!(dialog.value(), ">Draf");
    }

    #[test]
    fn text_input_cancel_yields_none() {
        let mut dialog = TextInputDialog::new("Rename", None);
        dialog.handle_key(key(KeyCode::Char('a')));
        assert_eq!(
            dialog.handle_key(key(KeyCode::Esc)),
            Some(DialogOutcome::Input(None))
        );
    }

    #[test]
    fn text_input_ignores_control_chords() {
        let mut dialog = TextInputDialog::new("Rename", None);
        dialog.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(dialog.value(), "");
    }

    #[test]
    fn text_input_backspace_removes_whole_grapheme() {
        let mut dialog = TextInputDialog::new("Rename", Some("cafe\u{301}"));
        dialog.handle_key(key(KeyCode::Backspace));
        assert_eq!(dialog.value(), "caf");
    }

    #[test]
    fn message_scrolls_then_acknowledges() {
        let mut dialog = MessageDialog::new("Help", "one\ntwo\nthree");
        dialog.handle_key(key(KeyCode::Down));
        dialog.handle_key(key(KeyCode::Down));
        dialog.handle_key(key(KeyCode::Down));
        assert_eq!(dialog.scroll(), 2);
        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter)),
            Some(DialogOutcome::Acknowledged)
        );
        assert!(dialog.is_resolved());
    }
}
