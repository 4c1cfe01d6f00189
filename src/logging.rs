use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with console output and a daily-rolling
/// log file, per the loaded configuration. The returned guard must be held
/// for the life of the process so buffered file output is flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
    });

    let (file_layer, guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.log_directory)?;
        let file_appender =
            tracing_appender::rolling::daily(&config.log_directory, "skylearn-core.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(non_blocking_file);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    Ok(guard)
}

// ============================================================================
// Service Layer Logging Macros
// ============================================================================

/// Log service operation start with context
#[macro_export]
macro_rules! log_service_start {
    ($service:expr, $operation:expr, owner_id = $owner_id:expr) => {
        tracing::debug!(
            service = $service,
            operation = $operation,
            owner_id = %$owner_id,
            "Service operation started"
        );
    };
    ($service:expr, $operation:expr) => {
        tracing::debug!(
            service = $service,
            operation = $operation,
            "Service operation started"
        );
    };
}

/// Log service operation success
#[macro_export]
macro_rules! log_service_success {
    ($service:expr, $operation:expr, count = $count:expr) => {
        tracing::info!(
            service = $service,
            operation = $operation,
            count = $count,
            "Service operation completed"
        );
    };
    ($service:expr, $operation:expr, $msg:expr) => {
        tracing::info!(
            service = $service,
            operation = $operation,
            "Service operation completed: {}", $msg
        );
    };
}

// ============================================================================
// Database Operation Logging Macros
// ============================================================================

/// Log database operation results with consistent fields
#[macro_export]
macro_rules! log_db_operation {
    (debug, $operation:expr, count = $count:expr) => {
        tracing::debug!(
            component = "database",
            operation = $operation,
            result_count = $count,
            "Database operation completed"
        );
    };
    (info, $operation:expr, $msg:expr) => {
        tracing::info!(
            component = "database",
            operation = $operation,
            "Database operation: {}", $msg
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log configuration and lifecycle events
#[macro_export]
macro_rules! log_system_event {
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    #[test]
    fn test_logging_macros_compile() {
        let owner_id = Uuid::new_v4();
        let error = anyhow::anyhow!("test error");

        log_service_start!("flashcard_service", "generate_flashcards", owner_id = owner_id);
        log_service_start!("chapter_service", "list_chapters");

        log_service_success!("flashcard_service", "generate_flashcards", count = 5);
        log_service_success!("flashcard_service", "review_flashcard", "card rescheduled");

        log_db_operation!(debug, "list_flashcards", count = 3);
        log_db_operation!(info, "migration", "database schema initialized");

        log_system_event!(config, "configuration loaded");

        log_validation!(success, "configuration", "validated");
        log_validation!(failure, "configuration", error = error);
    }
}
