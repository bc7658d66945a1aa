use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::dialogs::{ConfirmDialog, Dialog, MessageDialog, Modal, TextInputDialog};
use crate::app::state::{EditorState, FocusTarget, ScreenState};
use crate::config::UiConfig;

pub const DEFAULT_HINT: &str =
    "Press Ctrl-S to save the note, Ctrl-N to create new and Ctrl-D to delete.";

const HIGHLIGHT_SYMBOL: &str = "▸ ";

/// Screen regions, shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub titlebar: Rect,
    pub sidebar: Rect,
    pub editor: Rect,
    pub status: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Row offset from the top of the visible sidebar list.
    SidebarRow(u16),
    Editor,
}

impl ScreenLayout {
    pub fn compute(area: Rect, sidebar_width: u16) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(vertical[1]);
        Self {
            titlebar: vertical[0],
            sidebar: columns[0],
            editor: columns[1],
            status: vertical[2],
        }
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<Hit> {
        if contains(self.sidebar, column, row) {
            Some(Hit::SidebarRow(row - self.sidebar.y))
        } else if contains(self.editor, column, row) {
            Some(Hit::Editor)
        } else {
            None
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

pub fn draw_app(frame: &mut Frame, state: &ScreenState, list_state: &mut ListState, ui: &UiConfig) {
    let layout = ScreenLayout::compute(frame.size(), ui.sidebar_width);

    let titlebar = Paragraph::new(Line::from(Span::styled(
        "Notes",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(titlebar, layout.titlebar);

    draw_sidebar(frame, state, list_state, layout.sidebar);
    draw_editor(frame, state, layout.editor, ui.line_numbers);
    draw_status(frame, state, layout.status);

    if let Some(active) = state.dialog() {
        draw_dialog(frame, &active.dialog);
    }
}

fn draw_sidebar(frame: &mut Frame, state: &ScreenState, list_state: &mut ListState, area: Rect) {
    let border_style = if state.focused_target() == FocusTarget::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    // right border plus highlight symbol plus unsaved marker
    let available = (area.width as usize).saturating_sub(1 + HIGHLIGHT_SYMBOL.width() + 2);

    let items: Vec<ListItem> = state
        .notes()
        .iter()
        .map(|note| {
            let mut spans = vec![Span::raw(truncate_title(&note.title, available))];
            if note.unsaved && !note.text.is_empty() {
                spans.push(Span::styled(" *", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    list_state.select(state.selected_index());
    frame.render_stateful_widget(list, area, list_state);
}

fn draw_editor(frame: &mut Frame, state: &ScreenState, area: Rect, line_numbers: bool) {
    frame.render_widget(Clear, area);
    let Some(editor) = state.editor() else {
        let empty = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No notes yet. Press Ctrl-N to create one.",
                Style::default().fg(Color::Gray),
            )),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    };

    let buffer = editor.buffer();
    let line_count = buffer.split('\n').count();
    let gutter = if line_numbers {
        gutter_width(line_count)
    } else {
        0
    };
    let gutter_style = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = buffer
        .split('\n')
        .enumerate()
        .map(|(idx, text)| {
            let mut spans = Vec::with_capacity(2);
            if line_numbers {
                spans.push(Span::styled(
                    format!("{:>width$} │ ", idx + 1, width = gutter as usize - 3),
                    gutter_style,
                ));
            }
            spans.push(Span::raw(text.to_string()));
            Line::from(spans)
        })
        .collect();

    let (row, _) = editor.cursor_line_col();
    let scroll = (row as u16).saturating_sub(area.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);

    if state.focused_target() == FocusTarget::Editor {
        if let Some((x, y)) = editor_cursor_screen_position(editor, area, gutter, scroll) {
            frame.set_cursor(x, y);
        }
    }
}

fn gutter_width(line_count: usize) -> u16 {
    line_count.max(1).to_string().len() as u16 + 3
}

fn editor_cursor_screen_position(
    editor: &EditorState,
    area: Rect,
    gutter: u16,
    scroll: u16,
) -> Option<(u16, u16)> {
    if area.width <= gutter || area.height == 0 {
        return None;
    }
    let (row, _) = editor.cursor_line_col();
    let col = editor.cursor_display_column() as u16;
    let max_col = area.width - gutter - 1;
    let x = area.x + gutter + col.min(max_col);
    let y = area.y + (row as u16).saturating_sub(scroll).min(area.height - 1);
    Some((x, y))
}

fn draw_status(frame: &mut Frame, state: &ScreenState, area: Rect) {
    let style = Style::default().bg(Color::Gray).fg(Color::Black);
    let message = state
        .notification()
        .map(|notification| notification.text.as_str())
        .unwrap_or(DEFAULT_HINT);
    let position = state
        .editor()
        .map(|editor| {
            let (row, col) = editor.cursor_line_col();
            format!(" {}:{} ", row + 1, col + 1)
        })
        .unwrap_or_default();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(position.width() as u16),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new(format!(" {message}")).style(style),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(position)
            .alignment(Alignment::Right)
            .style(style),
        columns[1],
    );
}

fn draw_dialog(frame: &mut Frame, dialog: &Dialog) {
    match dialog {
        Dialog::Confirm(confirm) => draw_confirm(frame, confirm),
        Dialog::TextInput(input) => draw_text_input(frame, input),
        Dialog::Message(message) => draw_message(frame, message),
    }
}

fn dialog_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn draw_confirm(frame: &mut Frame, dialog: &ConfirmDialog) {
    let area = centered_rect(60, 30, frame.size());
    frame.render_widget(Clear, area);

    let mut buttons = Vec::new();
    for (idx, button) in dialog.buttons().iter().enumerate() {
        if idx > 0 {
            buttons.push(Span::raw("  "));
        }
        let style = if idx == dialog.focused() {
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        buttons.push(Span::styled(format!("< {} >", button.label), style));
    }

    let block = dialog_block(dialog.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(dialog.body()).wrap(Wrap { trim: true }),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(buttons)).alignment(Alignment::Center),
        rows[1],
    );
}

fn draw_text_input(frame: &mut Frame, dialog: &TextInputDialog) {
    let area = centered_rect(60, 20, frame.size());
    frame.render_widget(Clear, area);
    let block = dialog_block(dialog.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(vec![
        Line::from(dialog.value().to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to confirm • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(paragraph, inner);

    if inner.width > 0 && inner.height > 0 {
        let before = dialog.value()[..dialog.cursor()].width() as u16;
        frame.set_cursor(inner.x + before.min(inner.width - 1), inner.y);
    }
}

fn draw_message(frame: &mut Frame, dialog: &MessageDialog) {
    let area = centered_rect(60, 60, frame.size());
    frame.render_widget(Clear, area);
    let block = dialog_block(dialog.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(dialog.body()).scroll((dialog.scroll(), 0)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "< OK >",
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );
}

/// Shortens a title to `max_width` columns, ending in "..." when cut.
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for grapheme in title.graphemes(true) {
        let width = grapheme.width();
        if used + width > budget {
            break;
        }
        used += width;
        out.push_str(grapheme);
    }
    out.push_str("...");
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dispatch::{dispatch, Command};
    use crate::app::state::tests::{note, state_with};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn render(state: &ScreenState, width: u16, height: u16) -> anyhow::Result<Vec<String>> {
        let mut terminal = Terminal::new(TestBackend::new(width, height))?;
        let mut list_state = ListState::default();
        let ui = UiConfig::default();
        terminal.draw(|frame| draw_app(frame, state, &mut list_state, &ui))?;
        let buffer = terminal.backend().buffer();
        let rows = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect();
        Ok(rows)
    }

    #[test]
    fn sidebar_lists_titles_newest_first() -> anyhow::Result<()> {
        let state = state_with(vec![note(1, "Older", "a"), note(2, "Newer", "b")]);
        let rows = render(&state, 80, 10)?;
        assert!(rows[0].contains("Notes"));
        assert!(rows[1].contains("▸ Newer"));
        assert!(rows[2].contains("Older"));
        assert!(rows[9].contains(DEFAULT_HINT.split(',').next().unwrap_or_default()));
        Ok(())
    }

    #[test]
    fn empty_state_replaces_editor() -> anyhow::Result<()> {
        let mut state = state_with(vec![note(1, "Only", "a")]);
        state.remove(crate::app::state::NoteKey::Stored(1));
        let rows = render(&state, 80, 8)?;
        assert!(rows.iter().any(|row| row.contains("No notes yet")));
        Ok(())
    }

    #[test]
    fn editor_shows_line_numbers_and_position() -> anyhow::Result<()> {
        let state = state_with(vec![note(1, "A", "first\nsecond")]);
        let rows = render(&state, 80, 8)?;
        assert!(rows[1].contains("1 │ first"));
        assert!(rows[2].contains("2 │ second"));
        assert!(rows[7].trim_end().ends_with("2:7"));
        Ok(())
    }

    #[test]
    fn notification_replaces_default_hint() -> anyhow::Result<()> {
        let mut state = state_with(vec![note(1, "A", "a")]);
        state.notify("Saved the note!", Instant::now());
        let rows = render(&state, 80, 6)?;
        assert!(rows[5].contains("Saved the note!"));
        assert!(!rows[5].contains("Ctrl-N"));
        Ok(())
    }

    #[test]
    fn confirm_dialog_draws_buttons() -> anyhow::Result<()> {
        let mut state = state_with(vec![note(1, "A", "a")]);
        dispatch(&mut state, Command::RequestDelete, Instant::now());
        let rows = render(&state, 80, 24)?;
        assert!(rows.iter().any(|row| row.contains("< Delete >")));
        assert!(rows.iter().any(|row| row.contains("< Clear text >")));
        assert!(rows.iter().any(|row| row.contains("< Cancel >")));
        Ok(())
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "x".repeat(40);
        let cut = truncate_title(&title, 33);
        assert_eq!(cut.len(), 33);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_title("short", 33), "short");
    }

    #[test]
    fn layout_hit_testing() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 24), 36);
        assert_eq!(layout.hit(3, 4), Some(Hit::SidebarRow(3)));
        assert_eq!(layout.hit(50, 4), Some(Hit::Editor));
        assert_eq!(layout.hit(50, 0), None);
        assert_eq!(layout.hit(50, 23), None);
    }
}
