pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use error::{NoteError, NoteResult};
pub use storage::{Note, NoteStore};
