use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::Result;
use crate::log_db_operation;
use crate::models::*;

/// SQLite-backed document store for flashcards and chapters.
///
/// Review updates are single-statement writes keyed by id, so concurrent
/// reviews of the same card resolve last-write-wins.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS flashcards (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                blooms_level TEXT,
                due_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_flashcards_owner_due ON flashcards (owner_id, due_at);",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chapters (
                id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                class_number INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                concepts TEXT NOT NULL DEFAULT '[]',
                prerequisites TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        log_db_operation!(info, "migration", "database schema initialized");
        Ok(())
    }

    // Flashcard operations

    /// Insert a generated batch in one transaction.
    pub async fn insert_flashcards(&self, cards: &[Flashcard]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for card in cards {
            sqlx::query(
                r#"
                INSERT INTO flashcards (id, owner_id, front, back, blooms_level,
                                        due_at, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(card.id.to_string())
            .bind(card.owner_id.to_string())
            .bind(&card.front)
            .bind(&card.back)
            .bind(card.blooms_level.map(|l| l.as_str()))
            .bind(card.due_at.to_rfc3339())
            .bind(card.created_at.to_rfc3339())
            .bind(card.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        log_db_operation!(debug, "insert_flashcards", count = cards.len());
        Ok(())
    }

    /// Fetch a card only if it is owned by `owner_id`. A card owned by
    /// someone else comes back as `None`, same as a missing card.
    pub async fn get_flashcard(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Flashcard>> {
        let row = sqlx::query("SELECT * FROM flashcards WHERE id = ?1 AND owner_id = ?2")
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_flashcard).transpose()
    }

    /// List an owner's cards, optionally only those due at or before
    /// `due_before`. Ordered by due_at then id so results are deterministic.
    pub async fn list_flashcards(
        &self,
        owner_id: Uuid,
        due_before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Flashcard>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM flashcards
            WHERE owner_id = ?1 AND (?2 IS NULL OR due_at <= ?2)
            ORDER BY due_at ASC, id ASC
            LIMIT ?3
            "#,
        )
        .bind(owner_id.to_string())
        .bind(due_before.map(|t| t.to_rfc3339()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        log_db_operation!(debug, "list_flashcards", count = rows.len());
        rows.into_iter().map(row_to_flashcard).collect()
    }

    /// Persist a review outcome in one statement. Returns false when no
    /// owned card matched.
    pub async fn update_flashcard_review(
        &self,
        id: Uuid,
        owner_id: Uuid,
        due_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE flashcards
            SET due_at = ?1, updated_at = ?2
            WHERE id = ?3 AND owner_id = ?4
            "#,
        )
        .bind(due_at.to_rfc3339())
        .bind(updated_at.to_rfc3339())
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // Chapter operations

    pub async fn insert_chapter(&self, request: CreateChapterRequest) -> Result<Chapter> {
        let chapter = Chapter {
            id: Uuid::new_v4(),
            subject: request.subject,
            class_number: request.class_number,
            title: request.title,
            content: request.content,
            concepts: request.concepts,
            prerequisites: request.prerequisites,
        };

        sqlx::query(
            r#"
            INSERT INTO chapters (id, subject, class_number, title, content, concepts, prerequisites)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(&chapter.subject)
        .bind(chapter.class_number)
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(serde_json::to_string(&chapter.concepts)?)
        .bind(serde_json::to_string(&chapter.prerequisites)?)
        .execute(&self.pool)
        .await?;

        Ok(chapter)
    }

    pub async fn get_chapter(&self, id: Uuid) -> Result<Option<Chapter>> {
        let row = sqlx::query("SELECT * FROM chapters WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_chapter).transpose()
    }

    /// List chapters matching the subject (case-insensitive, whole field)
    /// and class number filters. Title search happens above the store; pass
    /// a negative `limit` for no cap (SQLite treats LIMIT -1 as unbounded)
    /// so a caller filtering further can still see every candidate.
    pub async fn list_chapters(
        &self,
        subject: Option<&str>,
        class_number: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM chapters
            WHERE (?1 IS NULL OR LOWER(subject) = LOWER(?1))
              AND (?2 IS NULL OR class_number = ?2)
            ORDER BY class_number ASC, title ASC, id ASC
            LIMIT ?3
            "#,
        )
        .bind(subject)
        .bind(class_number)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        log_db_operation!(debug, "list_chapters", count = rows.len());
        rows.into_iter().map(row_to_chapter).collect()
    }
}

fn row_to_flashcard(row: sqlx::sqlite::SqliteRow) -> Result<Flashcard> {
    Ok(Flashcard {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        owner_id: Uuid::parse_str(&row.get::<String, _>("owner_id"))?,
        front: row.get("front"),
        back: row.get("back"),
        blooms_level: row
            .get::<Option<String>, _>("blooms_level")
            .as_deref()
            .and_then(BloomsLevel::parse),
        due_at: parse_timestamp(&row.get::<String, _>("due_at"))?,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn row_to_chapter(row: sqlx::sqlite::SqliteRow) -> Result<Chapter> {
    Ok(Chapter {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        subject: row.get("subject"),
        class_number: row.get("class_number"),
        title: row.get("title"),
        content: row.get("content"),
        concepts: serde_json::from_str(&row.get::<String, _>("concepts"))?,
        prerequisites: serde_json::from_str(&row.get::<String, _>("prerequisites"))?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
