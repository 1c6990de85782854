//! Startup helpers for the chat state server.
//!
//! Configuration comes from defaults overridden by environment variables:
//! `CHATROOM_DB_PATH` (`SQLite` file) and `CHATROOM_PORT`.

use std::process::ExitCode;
use std::sync::Arc;

use crate::chat::{ChatConfig, ChatResult};
use crate::server::{self, AppState};

/// Environment variable overriding the `SQLite` file path.
pub const DB_PATH_ENV: &str = "CHATROOM_DB_PATH";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "CHATROOM_PORT";

/// Run the server (used by the `chatroom-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting chatroom server v{}", env!("CARGO_PKG_VERSION"));

    let config = config_from_env();
    let state = match initialize(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server(state, config.server.port)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the configuration is invalid or storage cannot be
/// opened.
pub fn initialize(config: &ChatConfig) -> ChatResult<Arc<AppState>> {
    tracing::info!(
        path = %config.storage.sqlite_path.display(),
        port = config.server.port,
        "Chat storage configured"
    );
    AppState::new(config)
}

/// Default configuration with environment overrides applied.
#[must_use]
pub fn config_from_env() -> ChatConfig {
    apply_overrides(
        ChatConfig::new(),
        std::env::var(DB_PATH_ENV).ok(),
        std::env::var(PORT_ENV).ok(),
    )
}

fn apply_overrides(mut config: ChatConfig, db_path: Option<String>, port: Option<String>) -> ChatConfig {
    if let Some(path) = db_path.filter(|p| !p.trim().is_empty()) {
        config = config.with_sqlite_path(path);
    }
    match port.map(|p| p.parse::<u16>()) {
        Some(Ok(parsed)) => config = config.with_port(parsed),
        Some(Err(e)) => tracing::warn!(%e, "Ignoring invalid {PORT_ENV}"),
        None => {}
    }
    config
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_defaults_without_overrides() {
        let config = apply_overrides(ChatConfig::new(), None, None);
        assert_eq!(config.server.port, server::DEFAULT_PORT);
        assert_eq!(config.storage.sqlite_path, Path::new("chatroom.sqlite"));
    }

    #[test]
    fn test_overrides_applied() {
        let config = apply_overrides(
            ChatConfig::new(),
            Some("/tmp/chat/state.sqlite".to_owned()),
            Some("8081".to_owned()),
        );
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.storage.sqlite_path, Path::new("/tmp/chat/state.sqlite"));
    }

    #[test]
    fn test_invalid_port_ignored() {
        let config = apply_overrides(ChatConfig::new(), Some("  ".to_owned()), Some("http".to_owned()));
        assert_eq!(config.server.port, server::DEFAULT_PORT);
        assert_eq!(config.storage.sqlite_path, Path::new("chatroom.sqlite"));
    }

    #[test]
    fn test_initialize_opens_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChatConfig::new().with_sqlite_path(dir.path().join("nested/chat.sqlite"));
        assert!(initialize(&config).is_ok());
        assert!(dir.path().join("nested/chat.sqlite").exists());
    }
}
