//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::create_router;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::repositories::select_user_repository;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    force_in_memory: bool,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            force_in_memory: false,
        }
    }

    /// Serve from the in-memory list even when a database is configured.
    pub fn force_in_memory(mut self, force: bool) -> Self {
        self.force_in_memory = force;
        self
    }

    /// Bind to the configured address and run until a shutdown signal.
    ///
    /// # Errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> AppResult<()> {
        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            AppError::Internal {
                source: anyhow::anyhow!("Failed to bind to {}: {}", address, e),
            }
        })?;

        self.serve(listener).await
    }

    /// Run on an already bound listener.
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Selects the storage backend
    /// 3. Creates application state and the router
    /// 4. Serves with graceful shutdown
    pub async fn serve(self, listener: TcpListener) -> AppResult<()> {
        self.log_configuration();

        let users = select_user_repository(&self.settings.database, self.force_in_memory).await;
        tracing::info!(storage = %users.backend(), "Storage backend selected");

        let state = AppState::new(users, self.settings.application.version.clone());
        let router = create_router(state, &self.settings.server);

        let address = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.settings.server.address());
        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn log_configuration(&self) {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.settings.application.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = self.settings.server.port,
            allowed_origins = ?self.settings.server.allowed_origins,
            body_limit = self.settings.server.body_limit,
            "Server configuration loaded"
        );

        // The URL may carry credentials and is never logged
        tracing::info!(
            enabled = self.settings.database.enabled,
            max_connections = self.settings.database.max_connections,
            min_connections = self.settings.database.min_connections,
            connection_timeout = self.settings.database.connection_timeout,
            auto_migrate = self.settings.database.auto_migrate,
            force_in_memory = self.force_in_memory,
            "Database configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = self.settings.logger.console.enabled,
            file_enabled = self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
