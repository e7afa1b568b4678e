pub mod config;
pub mod request_logger;

use crate::{
    auth::{
        jwt::{JwtService, JwtServiceImpl, parse_algorithm},
        password::PasswordService,
    },
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
    health::HealthService,
    routes::{create_api_routes, create_health_routes},
    server::request_logger::request_response_logger,
    shutdown::{DatabaseShutdown, ShutdownCoordinator, ShutdownManager},
};
use axum::{Router, middleware};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub jwt_service: Arc<dyn JwtService>,
    pub password_service: PasswordService,
    pub health_service: Arc<HealthService>,
    pub database: Arc<dyn DatabaseManager>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let jwt_algorithm = parse_algorithm(&config.jwt.algorithm)?;
        let jwt_service_impl = JwtServiceImpl::new(&config.jwt.secret, jwt_algorithm)?;

        let database_impl = Arc::new(
            DatabaseManagerImpl::new_from_config(&config)
                .await
                .map_err(AppError::Database)?,
        );

        let health_service = Arc::new(HealthService::new());
        health_service.register(database_impl.clone()).await;
        health_service
            .register(jwt_service_impl.health_checker())
            .await;

        let jwt_service: Arc<dyn JwtService> = Arc::new(jwt_service_impl);
        let database: Arc<dyn DatabaseManager> = database_impl;

        Ok(Self {
            config: Arc::new(config),
            jwt_service,
            password_service: PasswordService::new(),
            health_service,
            database,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        })
    }

    /// Replace the password hasher, e.g. with cheaper parameters
    pub fn with_password_service(mut self, password_service: PasswordService) -> Self {
        self.password_service = password_service;
        self
    }

    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.database.migration_on_startup {
            info!("Running database migrations");
            self.database.migrate().await.map_err(AppError::Database)?;
            info!("Database migrations completed successfully");
        }

        let mut shutdown_manager = ShutdownManager::new(SHUTDOWN_TIMEOUT);
        shutdown_manager.register(DatabaseShutdown::new(self.database.clone()));

        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Server listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let mut shutdown_rx = self.shutdown_coordinator.subscribe();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Graceful shutdown initiated");
        })
        .await;

        if let Err(e) = &result {
            error!("Server error: {}", e);
        }

        shutdown_manager.shutdown_all().await;
        info!("Server shutdown complete");

        result.map_err(|e| AppError::Internal(format!("Server error: {}", e)))
    }

    pub fn create_app(&self) -> Router {
        let mut app = Router::new()
            .nest("/health", create_health_routes())
            .nest("/api", create_api_routes(self))
            .with_state(self.clone());

        if self.config.logging.log_request {
            app = app.layer(middleware::from_fn(request_response_logger));
        }
        app
    }
}
