pub mod chapter_service;
pub mod config;
pub mod database;
pub mod errors;
pub mod flashcard_service;
pub mod logging;
pub mod models;
pub mod scheduler;

pub use chapter_service::{ChapterService, ChapterSource};
pub use config::Config;
pub use database::Database;
pub use errors::{Error, Result};
pub use flashcard_service::FlashcardService;
pub use models::*;
pub use scheduler::{ReviewScheduler, MAX_GRADE, MIN_GRADE};
