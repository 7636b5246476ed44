//! Graceful shutdown plumbing
//!
//! One broadcast-backed signal, cloned into the HTTP server and any
//! background tasks. The first trigger wins; later triggers are no-ops
//! and late waiters return immediately, so the drain runs exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once any clone has triggered.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Fire the signal. Only the first call notifies waiters.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("🛑 Shutdown requested");
            let _ = self.sender.send(());
        }
    }

    /// Resolve when the signal fires; immediately if it already has.
    pub async fn wait(&self) {
        // Subscribe before re-checking so a trigger between the check
        // and the recv cannot be missed.
        let mut rx = self.sender.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Spawn a task that fires this signal on SIGTERM or SIGINT.
    pub fn spawn_os_listener(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal.trigger();
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler install failed");
    let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler install failed");

    tokio::select! {
        _ = sigterm.recv() => info!("📡 SIGTERM received"),
        _ = sigint.recv() => info!("📡 SIGINT received (Ctrl+C)"),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Ctrl+C handler install failed");
    info!("📡 Ctrl+C received");
}
