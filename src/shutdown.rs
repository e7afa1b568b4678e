use crate::database::DatabaseManager;
use async_trait::async_trait;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{signal, sync::watch, time::timeout};
use tracing::{error, info, warn};

/// Broadcasts a one-shot shutdown request to every subscriber
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_requested: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Receiver whose value flips to `true` once shutdown starts
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Idempotent; only the first call notifies subscribers
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            info!("Initiating graceful shutdown...");
            if let Err(e) = self.shutdown_tx.send(true) {
                error!("Failed to broadcast shutdown signal: {}", e);
            }
        }
    }

    /// Wait for Ctrl+C or SIGTERM, then initiate shutdown
    pub async fn wait_for_shutdown_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C signal");
            },
            _ = terminate => {
                info!("Received terminate signal");
            },
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// A component released after the HTTP server stops
#[async_trait]
pub trait GracefulShutdown {
    fn name(&self) -> &str;

    async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Shuts registered components down in registration order
pub struct ShutdownManager {
    components: Vec<Box<dyn GracefulShutdown + Send + Sync>>,
    timeout_duration: Duration,
}

impl ShutdownManager {
    pub fn new(timeout_duration: Duration) -> Self {
        Self {
            components: Vec::new(),
            timeout_duration,
        }
    }

    pub fn register<T>(&mut self, component: T)
    where
        T: GracefulShutdown + Send + Sync + 'static,
    {
        self.components.push(Box::new(component));
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub async fn shutdown_all(&self) {
        info!("Shutting down {} components...", self.components.len());

        for component in &self.components {
            let component_name = component.name();

            match timeout(self.timeout_duration, component.shutdown()).await {
                Ok(Ok(())) => {
                    info!("Successfully shut down component: {}", component_name);
                }
                Ok(Err(e)) => {
                    error!("Error shutting down component {}: {}", component_name, e);
                }
                Err(_) => {
                    warn!("Timeout shutting down component: {}", component_name);
                }
            }
        }

        info!("Shutdown complete");
    }
}

/// Closes the connection pool
pub struct DatabaseShutdown {
    database: Arc<dyn DatabaseManager>,
}

impl DatabaseShutdown {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl GracefulShutdown for DatabaseShutdown {
    fn name(&self) -> &str {
        "Database"
    }

    async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.database.connection().clone().close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingComponent {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    #[async_trait]
    impl GracefulShutdown for CountingComponent {
        fn name(&self) -> &str {
            "counting"
        }

        async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            tokio::time::sleep(self.delay).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_initiate_shutdown_notifies_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();
        assert!(!coordinator.is_shutdown_requested());

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
        assert!(coordinator.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_shutdown_all_runs_each_component() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = ShutdownManager::new(Duration::from_secs(1));
        assert!(manager.is_empty());

        for _ in 0..2 {
            manager.register(CountingComponent {
                calls: calls.clone(),
                delay: Duration::ZERO,
            });
        }

        manager.shutdown_all().await;
        assert_eq!(manager.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_component_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = ShutdownManager::new(Duration::from_millis(10));
        manager.register(CountingComponent {
            calls: calls.clone(),
            delay: Duration::from_secs(5),
        });

        manager.shutdown_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_database_shutdown_closes_pool() {
        let server = crate::test_utils::TestServerBuilder::new().build().await;
        let component = DatabaseShutdown::new(server.database.clone());

        assert_eq!(component.name(), "Database");
        assert!(component.shutdown().await.is_ok());
    }
}
