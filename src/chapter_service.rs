use async_trait::async_trait;
use regex::RegexBuilder;
use tracing::warn;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{Error, Result};
use crate::models::*;

/// Hard cap on listing results.
const LIST_LIMIT: i64 = 100;

/// Lookup seam used by flashcard generation, so card generation only depends
/// on being able to resolve a chapter, not on the whole chapter API.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    async fn chapter_by_id(&self, chapter_id: Uuid) -> Result<Option<Chapter>>;
}

#[async_trait]
impl ChapterSource for Database {
    async fn chapter_by_id(&self, chapter_id: Uuid) -> Result<Option<Chapter>> {
        self.get_chapter(chapter_id).await
    }
}

/// Chapter metadata operations: lookup, filtered listing, concept access.
#[derive(Clone)]
pub struct ChapterService {
    db: Database,
}

impl ChapterService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_chapter(&self, request: CreateChapterRequest) -> Result<Chapter> {
        self.db
            .insert_chapter(request)
            .await
            .map_err(|e| e.trace("create_chapter"))
    }

    /// Resolve a chapter by its string id. A malformed id reads the same as
    /// an unknown one.
    pub async fn get_chapter(&self, chapter_id: &str) -> Result<Chapter> {
        let id = Uuid::parse_str(chapter_id).map_err(|_| Error::not_found("chapter"))?;
        self.db
            .get_chapter(id)
            .await
            .map_err(|e| e.trace("get_chapter"))?
            .ok_or_else(|| Error::not_found("chapter"))
    }

    /// List chapters matching the filter, at most 100. Subject matches the
    /// whole field case-insensitively; `search` is a case-insensitive regex
    /// over the title. An invalid search pattern matches nothing.
    ///
    /// With a search pattern the store query runs unbounded and the cap is
    /// applied to the *matching* chapters, so a match is never lost behind
    /// non-matching rows that merely sort earlier.
    pub async fn list_chapters(&self, filter: &ChapterFilter) -> Result<Vec<Chapter>> {
        let Some(pattern) = filter.search.as_deref() else {
            return self
                .db
                .list_chapters(filter.subject.as_deref(), filter.class_number, LIST_LIMIT)
                .await
                .map_err(|e| e.trace("list_chapters"));
        };

        let regex = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => regex,
            Err(err) => {
                warn!(pattern, error = %err, "Invalid chapter search pattern");
                return Ok(Vec::new());
            }
        };

        let chapters = self
            .db
            .list_chapters(filter.subject.as_deref(), filter.class_number, -1)
            .await
            .map_err(|e| e.trace("list_chapters"))?;

        Ok(chapters
            .into_iter()
            .filter(|c| regex.is_match(&c.title))
            .take(LIST_LIMIT as usize)
            .collect())
    }

    pub async fn get_chapter_concepts(&self, chapter_id: &str) -> Result<Vec<ChapterConcept>> {
        Ok(self.get_chapter(chapter_id).await?.concepts)
    }
}
