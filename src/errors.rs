use tracing::error;

/// Domain errors surfaced by the core services.
///
/// `NotFound` deliberately covers four cases with one shape: absent chapter,
/// absent card, a card owned by a different user, and a malformed identifier.
/// Callers must not be able to tell which of these occurred, so another
/// user's card is indistinguishable from a nonexistent one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn not_found(resource: &'static str) -> Self {
        Error::NotFound { resource }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Log the error with operation context before handing it back.
    /// `NotFound` is an expected outcome and is left to the caller.
    pub fn trace(self, operation: &str) -> Self {
        if !self.is_not_found() {
            error!(operation, error = %self, "Core operation failed");
        }
        self
    }
}

// A stored record that no longer decodes (bad JSON, timestamp, or id text)
// is a database-class failure, same as any other decode error.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Database(sqlx::Error::Decode(Box::new(err)))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Database(sqlx::Error::Decode(Box::new(err)))
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::Database(sqlx::Error::Decode(Box::new(err)))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("flashcard");
        assert_eq!(err.to_string(), "flashcard not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_found_shape_is_uniform() {
        // A foreign-owner card and a nonexistent card must produce the same
        // observable error.
        let missing = Error::not_found("flashcard");
        let foreign = Error::not_found("flashcard");
        assert_eq!(missing.to_string(), foreign.to_string());
    }

    #[test]
    fn test_database_error_is_not_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_bad_stored_json_is_database_class() {
        let bad = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err = Error::from(bad);
        assert!(matches!(err, Error::Database(sqlx::Error::Decode(_))));
        assert!(!err.is_not_found());
    }
}
