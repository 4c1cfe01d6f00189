use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chapter_service::ChapterSource;
use crate::database::Database;
use crate::errors::{Error, Result};
use crate::models::*;
use crate::scheduler::ReviewScheduler;
use crate::{log_service_start, log_service_success};

/// Smallest and largest batch a generation request may produce.
const MIN_GENERATED: i64 = 1;
const MAX_GENERATED: i64 = 20;

/// Hard cap on listing results.
const LIST_LIMIT: i64 = 100;

/// Flashcard lifecycle: batch generation from a chapter, due listing, and
/// grade-driven review. Every operation takes `now` explicitly; nothing here
/// reads the wall clock.
#[derive(Clone)]
pub struct FlashcardService {
    db: Database,
    chapters: Arc<dyn ChapterSource>,
    scheduler: ReviewScheduler,
}

impl FlashcardService {
    pub fn new(db: Database) -> Self {
        let chapters: Arc<dyn ChapterSource> = Arc::new(db.clone());
        Self {
            db,
            chapters,
            scheduler: ReviewScheduler::new(),
        }
    }

    /// Substitute the chapter lookup collaborator.
    pub fn with_chapter_source(mut self, chapters: Arc<dyn ChapterSource>) -> Self {
        self.chapters = chapters;
        self
    }

    /// Generate a batch of placeholder cards from a chapter's title stem.
    ///
    /// The requested count is clamped into [1, 20]. Card i (0-indexed) comes
    /// due `(i mod 3) + 1` days after `now`. Fails with `NotFound` when the
    /// chapter id is malformed or unknown.
    pub async fn generate_flashcards(
        &self,
        request: &GenerateFlashcardsRequest,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Flashcard>> {
        log_service_start!("flashcard_service", "generate_flashcards", owner_id = owner_id);

        let chapter_id = Uuid::parse_str(&request.chapter_id)
            .map_err(|_| Error::not_found("chapter"))?;
        let chapter = self
            .chapters
            .chapter_by_id(chapter_id)
            .await?
            .ok_or_else(|| Error::not_found("chapter"))?;

        let stem = title_stem(&chapter.title);
        let count = request.count.clamp(MIN_GENERATED, MAX_GENERATED);

        let cards: Vec<Flashcard> = (0..count as usize)
            .map(|i| Flashcard {
                id: Uuid::new_v4(),
                owner_id,
                front: format!("What is {} concept {}?", stem, i + 1),
                back: format!("Explanation for {} concept {}.", stem, i + 1),
                blooms_level: Some(BloomsLevel::Remember),
                due_at: self.scheduler.initial_due_at(i, now),
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.db
            .insert_flashcards(&cards)
            .await
            .map_err(|e| e.trace("generate_flashcards"))?;

        log_service_success!(
            "flashcard_service",
            "generate_flashcards",
            count = cards.len()
        );
        Ok(cards)
    }

    /// List the owner's cards, at most 100, ordered by due date. With
    /// `only_due` set, cards due after `now` are excluded.
    pub async fn list_flashcards(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
        only_due: bool,
    ) -> Result<Vec<Flashcard>> {
        let due_before = only_due.then_some(now);
        self.db
            .list_flashcards(owner_id, due_before, LIST_LIMIT)
            .await
            .map_err(|e| e.trace("list_flashcards"))
    }

    /// Grade a card and reschedule it. Returns the new due timestamp.
    ///
    /// A malformed id, an unknown card, and a card owned by someone else all
    /// fail with the same `NotFound`.
    pub async fn review_flashcard(
        &self,
        card_id: &str,
        owner_id: Uuid,
        grade: i32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        log_service_start!("flashcard_service", "review_flashcard", owner_id = owner_id);

        let id = Uuid::parse_str(card_id).map_err(|_| Error::not_found("flashcard"))?;
        let next_due = self.scheduler.next_due_at(grade, now);

        let updated = self
            .db
            .update_flashcard_review(id, owner_id, next_due, now)
            .await
            .map_err(|e| e.trace("review_flashcard"))?;
        if !updated {
            return Err(Error::not_found("flashcard"));
        }

        log_service_success!(
            "flashcard_service",
            "review_flashcard",
            "card rescheduled"
        );
        Ok(next_due)
    }
}

/// First whitespace-delimited token of the chapter title, used as a naming
/// stem for generated cards.
fn title_stem(title: &str) -> &str {
    title.split_whitespace().next().unwrap_or("Chapter")
}
