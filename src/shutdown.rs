use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;
use tracing::{info, warn};

/// One-shot shutdown signal shared between the signal listener and the server.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Resolves once `trigger` has been called, including calls made before this future existed.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }

    /// Triggers on SIGINT or SIGTERM.
    pub fn listen_for_os_signals(&self) {
        let signal = self.clone();
        tokio::spawn(async move { signal.on_os_signal(wait_for_os_signal().await) });
    }

    /// A listener that could not be installed leaves the server running.
    fn on_os_signal(&self, received: std::io::Result<&'static str>) {
        match received {
            Ok(name) => {
                info!(signal = name, "received shutdown signal");
                self.trigger();
            },
            Err(e) => warn!(error = %e, "failed to listen for shutdown signals"),
        }
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}
