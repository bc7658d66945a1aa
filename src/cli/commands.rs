use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use crate::app::App;
use crate::config::AppConfig;
use crate::error::NoteError;
use crate::storage::{timestamp_now, Note, NoteStore};

const PREVIEW_CHARS: usize = 96;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Print only the note with this id
    pub id: Option<i64>,
    /// Print notes as plain text instead of opening the shell
    #[arg(short = 'n', long)]
    pub no_window: bool,
    /// Print notes as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn opens_shell(&self) -> bool {
        self.id.is_none() && !self.no_window && !self.json
    }
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Title for the note (defaults to the current date and time)
    #[arg(long)]
    pub title: Option<String>,
    /// Note text. If omitted, read from stdin or prompted for.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Note identifier
    pub id: i64,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New text. If neither flag is given, text is read from stdin.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Note identifier
    pub id: i64,
}

pub fn run_tui(config: Arc<AppConfig>, store: NoteStore) -> Result<()> {
    App::new(config, store)?.run()
}

/// Runs a one-shot command and closes the store whichever way it ends.
pub fn finish<T>(store: NoteStore, op: impl FnOnce(&NoteStore) -> Result<T>) -> Result<T> {
    let result = op(&store);
    let closed = store.close().context("closing the note database");
    let value = result?;
    closed?;
    Ok(value)
}

pub fn list_notes(store: &NoteStore, args: &ListArgs, out: &mut impl Write) -> Result<()> {
    let notes = match args.id {
        Some(id) => vec![fetch(store, id)?],
        None => {
            let mut notes = store.list_all().context("listing notes")?;
            notes.reverse();
            notes
        }
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &notes).context("encoding notes as json")?;
        writeln!(out)?;
    } else {
        out.write_all(format_listing(&notes).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

pub fn format_listing(notes: &[Note]) -> String {
    let mut output = String::new();
    for note in notes {
        output.push_str(&format!("[{}] {}\n", note.id, note.title));
        output.push_str(&format!("Date: {}\n", note.created_at));
        output.push_str(&format!("\n    {}\n\n", preview(&note.text)));
    }
    output
}

fn preview(text: &str) -> String {
    let indented = text.trim().split('\n').collect::<Vec<_>>().join("\n    ");
    let mut preview: String = indented.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

pub fn create_note(store: &NoteStore, args: CreateArgs, out: &mut impl Write) -> Result<i64> {
    let text = match args.text {
        Some(text) => text,
        None => match read_stdin()? {
            Some(text) => text,
            None => prompt("Text")?,
        },
    };
    if text.trim().is_empty() {
        bail!("No text entered");
    }
    let created_at = timestamp_now();
    let title = args
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| created_at.clone());

    let id = store
        .insert(&title, &text, &created_at)
        .context("creating note")?;
    writeln!(out, "Created note #{id}")?;
    Ok(id)
}

pub fn edit_note(store: &NoteStore, args: EditArgs, out: &mut impl Write) -> Result<()> {
    let id = args.id;
    fetch(store, id)?;

    let text = match (&args.title, args.text) {
        (_, Some(text)) => Some(text),
        (None, None) => read_stdin()?,
        (Some(_), None) => None,
    };
    if args.title.is_none() && text.is_none() {
        bail!("nothing to change; pass --title, --text or pipe text on stdin");
    }

    if let Some(title) = &args.title {
        store
            .update_title(id, title)
            .map_err(|err| not_found_message(id, err))?;
    }
    if let Some(text) = &text {
        store
            .update_text(id, text)
            .map_err(|err| not_found_message(id, err))?;
    }
    writeln!(out, "Note with ID {id} was successfully saved!")?;
    Ok(())
}

pub fn delete_note(store: &NoteStore, args: &DeleteArgs, out: &mut impl Write) -> Result<()> {
    if store.delete(args.id).context("deleting note")? {
        writeln!(out, "Deleted note #{}", args.id)?;
    } else {
        writeln!(out, "Note with ID {} was not found", args.id)?;
    }
    Ok(())
}

fn fetch(store: &NoteStore, id: i64) -> Result<Note> {
    store.get(id).map_err(|err| not_found_message(id, err))
}

fn not_found_message(id: i64, err: NoteError) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!("Note with ID {id} was not found")
    } else {
        anyhow::Error::new(err)
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult<T = ()> = Result<T>;

    fn note(id: i64, title: &str, text: &str) -> Note {
        Note {
            id,
            title: title.into(),
            text: text.into(),
            created_at: "Fri Oct 16 14:03:22 2026".into(),
        }
    }

    #[test]
    fn listing_format_matches_layout() {
        let output = format_listing(&[note(3, "Groceries", "  milk\neggs\n")]);
        assert_eq!(
            output,
            "[3] Groceries\nDate: Fri Oct 16 14:03:22 2026\n\n    milk\n    eggs\n\n"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "a".repeat(120);
        let output = format_listing(&[note(1, "Long", &body)]);
        let expected = format!("    {}...\n", "a".repeat(PREVIEW_CHARS));
        assert!(output.contains(&expected));
    }

    #[test]
    fn list_prints_newest_first() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        store.insert("Older", "a", "ts")?;
        store.insert("Newer", "b", "ts")?;
        let args = ListArgs {
            id: None,
            no_window: true,
            json: false,
        };
        let mut out = Vec::new();
        list_notes(&store, &args, &mut out)?;
        let text = String::from_utf8(out)?;
        let newer = text.find("Newer").unwrap_or(usize::MAX);
        let older = text.find("Older").unwrap_or(0);
        assert!(newer < older);
        Ok(())
    }

    #[test]
    fn list_json_round_trips_fields() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let id = store.insert("Json", "body", "ts")?;
        let args = ListArgs {
            id: Some(id),
            no_window: false,
            json: true,
        };
        let mut out = Vec::new();
        list_notes(&store, &args, &mut out)?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(value[0]["title"], "Json");
        assert_eq!(value[0]["created_at"], "ts");
        Ok(())
    }

    #[test]
    fn create_defaults_title_to_timestamp() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let args = CreateArgs {
            title: None,
            text: Some("hello".into()),
        };
        let mut out = Vec::new();
        let id = create_note(&store, args, &mut out)?;
        let note = store.get(id)?;
        assert_eq!(note.title, note.created_at);
        assert_eq!(String::from_utf8(out)?, format!("Created note #{id}\n"));
        Ok(())
    }

    #[test]
    fn create_rejects_blank_text() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let args = CreateArgs {
            title: Some("T".into()),
            text: Some("  \n".into()),
        };
        let err = create_note(&store, args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No text entered");
        assert_eq!(store.count()?, 0);
        Ok(())
    }

    #[test]
    fn edit_updates_title_and_text() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let id = store.insert("Old", "old", "ts")?;
        let args = EditArgs {
            id,
            title: Some("New".into()),
            text: Some("new".into()),
        };
        let mut out = Vec::new();
        edit_note(&store, args, &mut out)?;
        let note = store.get(id)?;
        assert_eq!((note.title.as_str(), note.text.as_str()), ("New", "new"));
        assert!(String::from_utf8(out)?.contains("successfully saved"));
        Ok(())
    }

    #[test]
    fn edit_missing_note_reports_id() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let args = EditArgs {
            id: 41,
            title: None,
            text: Some("x".into()),
        };
        let err = edit_note(&store, args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Note with ID 41 was not found");
        Ok(())
    }

    #[test]
    fn delete_is_idempotent() -> TestResult {
        let store = NoteStore::open_in_memory()?;
        let id = store.insert("Gone", "x", "ts")?;
        let args = DeleteArgs { id };
        let mut out = Vec::new();
        delete_note(&store, &args, &mut out)?;
        delete_note(&store, &args, &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains(&format!("Deleted note #{id}")));
        assert!(text.contains(&format!("Note with ID {id} was not found")));
        Ok(())
    }

    #[test]
    fn finish_closes_store_after_failure() {
        let store = NoteStore::open_in_memory().expect("store");
        let result: Result<()> = finish(store, |_| bail!("boom"));
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
