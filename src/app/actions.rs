use std::time::Instant;

use uuid::Uuid;

use super::dispatch::{Effect, SaveReason};
use super::state::{NoteKey, ScreenState};
use crate::error::{NoteError, NoteResult};
use crate::storage::NoteStore;

/// What a store write produced, fed back into the screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Inserted {
        local: Uuid,
        id: i64,
        text: String,
        reason: SaveReason,
    },
    TextSaved {
        id: i64,
        text: String,
        reason: SaveReason,
    },
    TitleSaved {
        id: i64,
        title: String,
    },
    Deleted {
        id: i64,
        existed: bool,
    },
    Quit,
}

/// Executes effects against the store.
pub struct ActionDispatcher<'a> {
    store: &'a NoteStore,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(store: &'a NoteStore) -> Self {
        Self { store }
    }

    pub fn execute(&self, effect: &Effect) -> NoteResult<Applied> {
        tracing::debug!(?effect, "applying effect");
        match effect {
            Effect::Insert {
                local,
                title,
                text,
                created_at,
                reason,
            } => {
                let id = self.store.insert(title, text, created_at)?;
                tracing::info!(id, %reason, "note inserted");
                Ok(Applied::Inserted {
                    local: *local,
                    id,
                    text: text.clone(),
                    reason: *reason,
                })
            }
            Effect::UpdateText { id, text, reason } => {
                self.store.update_text(*id, text)?;
                tracing::debug!(id, %reason, "note text saved");
                Ok(Applied::TextSaved {
                    id: *id,
                    text: text.clone(),
                    reason: *reason,
                })
            }
            Effect::UpdateTitle { id, title } => {
                self.store.update_title(*id, title)?;
                Ok(Applied::TitleSaved {
                    id: *id,
                    title: title.clone(),
                })
            }
            Effect::Delete { id } => {
                let existed = self.store.delete(*id)?;
                tracing::info!(id, existed, "note deleted");
                Ok(Applied::Deleted { id: *id, existed })
            }
            Effect::Quit => Ok(Applied::Quit),
        }
    }

    /// Runs effects during interactive use. Failures are logged and surfaced
    /// as notifications; the affected note stays unsaved. Returns whether a
    /// quit was requested.
    pub fn run(&self, state: &mut ScreenState, effects: Vec<Effect>, now: Instant) -> bool {
        let mut quit = false;
        for effect in effects {
            match self.execute(&effect) {
                Ok(Applied::Quit) => quit = true,
                Ok(applied) => record(state, applied, now),
                Err(err) => {
                    tracing::error!(?err, ?effect, "store write failed");
                    state.notify(failure_message(&effect, &err), now);
                }
            }
        }
        quit
    }

    /// Runs effects on the exit path, stopping at the first failure.
    pub fn run_strict(&self, state: &mut ScreenState, effects: Vec<Effect>) -> NoteResult<()> {
        let now = Instant::now();
        for effect in effects {
            match self.execute(&effect)? {
                Applied::Quit => {}
                applied => record(state, applied, now),
            }
        }
        Ok(())
    }
}

fn record(state: &mut ScreenState, applied: Applied, now: Instant) {
    match applied {
        Applied::Inserted {
            local,
            id,
            text,
            reason,
        } => {
            state.adopt_id(NoteKey::Pending(local), id, &text);
            if reason == SaveReason::Manual {
                state.notify("Saved the note!", now);
            }
        }
        Applied::TextSaved { id, text, reason } => {
            state.mark_saved(id, &text);
            if reason == SaveReason::Manual {
                state.notify("Saved the note!", now);
            }
        }
        Applied::TitleSaved { id, title } => {
            state.set_title(NoteKey::Stored(id), title);
            state.notify("Renamed the note", now);
        }
        Applied::Deleted { .. } => state.notify("Deleted the note", now),
        Applied::Quit => {}
    }
}

fn failure_message(effect: &Effect, err: &NoteError) -> String {
    match (effect, err) {
        (_, NoteError::NotFound(id)) => format!("Note with ID {id} was not found"),
        (_, NoteError::Validation(_)) => "No text entered".to_string(),
        (Effect::Delete { .. }, _) => "Failed to delete the note".to_string(),
        (Effect::UpdateTitle { .. }, _) => "Failed to rename the note".to_string(),
        _ => "Failed to save the note".to_string(),
    }
}
