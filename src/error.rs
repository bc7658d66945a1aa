use thiserror::Error;

/// Failures surfaced by the note store.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note #{0} not found")]
    NotFound(i64),
    #[error("storage failure while {context}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl NoteError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        NoteError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound(_))
    }
}

pub type NoteResult<T> = Result<T, NoteError>;

/// Attaches an operation label to raw SQLite errors.
pub(crate) trait StorageContext<T> {
    fn storage(self, context: &'static str) -> NoteResult<T>;
}

impl<T> StorageContext<T> for Result<T, rusqlite::Error> {
    fn storage(self, context: &'static str) -> NoteResult<T> {
        self.map_err(|source| NoteError::Storage { context, source })
    }
}
