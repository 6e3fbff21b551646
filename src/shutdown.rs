//! Graceful shutdown coordination
//!
//! A [`ShutdownCoordinator`] turns SIGINT/SIGTERM into a cancelled
//! [`CancellationToken`]. The HTTP server stops accepting connections once the
//! token fires and in-flight requests are given [`ShutdownCoordinator::drain_timeout`]
//! to finish before the server is abandoned.
//!
//! ```rust,no_run
//! use qrcode_api::shutdown::ShutdownCoordinator;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! let token = coordinator.token();
//!
//! tokio::spawn(async move { coordinator.wait_for_signal().await });
//! token.cancelled().await;
//! # }
//! ```

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    drain_timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            drain_timeout,
        }
    }

    /// Token cancelled once shutdown begins
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Begins shutdown without waiting for a signal.
    pub fn trigger(&self) {
        if !self.is_shutdown_initiated() {
            info!("initiating graceful shutdown");
            self.token.cancel();
        }
    }

    /// Waits for SIGINT or SIGTERM, then begins shutdown.
    ///
    /// Returns early if shutdown was already triggered elsewhere.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    error!(error = %err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("received SIGINT (Ctrl+C)");
            },
            _ = terminate => {
                info!("received SIGTERM");
            },
            _ = self.token.cancelled() => {
                return;
            },
        }

        self.trigger();
    }

    /// Resolves once shutdown has begun and the drain timeout has elapsed.
    pub async fn drain_deadline(&self) {
        self.token.cancelled().await;
        tokio::time::sleep(self.drain_timeout).await;
    }
}
