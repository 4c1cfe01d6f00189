use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bloom's taxonomy level targeted by a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BloomsLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomsLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloomsLevel::Remember => "remember",
            BloomsLevel::Understand => "understand",
            BloomsLevel::Apply => "apply",
            BloomsLevel::Analyze => "analyze",
            BloomsLevel::Evaluate => "evaluate",
            BloomsLevel::Create => "create",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "remember" => Some(BloomsLevel::Remember),
            "understand" => Some(BloomsLevel::Understand),
            "apply" => Some(BloomsLevel::Apply),
            "analyze" => Some(BloomsLevel::Analyze),
            "evaluate" => Some(BloomsLevel::Evaluate),
            "create" => Some(BloomsLevel::Create),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub front: String,
    pub back: String,
    pub blooms_level: Option<BloomsLevel>,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterConcept {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub subject: String,
    pub class_number: i32,
    pub title: String,
    pub content: Option<String>,
    pub concepts: Vec<ChapterConcept>,
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChapterRequest {
    pub subject: String,
    pub class_number: i32,
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub concepts: Vec<ChapterConcept>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFlashcardsRequest {
    pub chapter_id: String,
    #[serde(default = "default_flashcard_count")]
    pub count: i64,
}

fn default_flashcard_count() -> i64 {
    5
}

/// Filters for chapter listing. Absent fields match any chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterFilter {
    pub subject: Option<String>,
    pub class_number: Option<i32>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blooms_level_round_trip() {
        for level in [
            BloomsLevel::Remember,
            BloomsLevel::Understand,
            BloomsLevel::Apply,
            BloomsLevel::Analyze,
            BloomsLevel::Evaluate,
            BloomsLevel::Create,
        ] {
            assert_eq!(BloomsLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(BloomsLevel::parse("memorize"), None);
    }

    #[test]
    fn test_blooms_level_serde_lowercase() {
        let json = serde_json::to_string(&BloomsLevel::Remember).unwrap();
        assert_eq!(json, "\"remember\"");
        let parsed: BloomsLevel = serde_json::from_str("\"analyze\"").unwrap();
        assert_eq!(parsed, BloomsLevel::Analyze);
    }

    #[test]
    fn test_generate_request_default_count() {
        let request: GenerateFlashcardsRequest =
            serde_json::from_str(r#"{"chapter_id": "abc"}"#).unwrap();
        assert_eq!(request.count, 5);
    }
}
