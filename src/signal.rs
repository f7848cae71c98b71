//! Interrupt handling.
//!
//! [`cancel_on_interrupt`] starts a background thread that waits for SIGINT
//! or SIGTERM (Ctrl+C on other platforms) and cancels a
//! [`CancellationToken`]. The batch notices at its next poll, stops
//! collecting, and prints its summary instead of dying mid-run.

use std::io;
use std::thread;

use tokio::runtime::{Builder, Runtime};

use crate::progress::CancellationToken;

/// Cancel `token` when the process is asked to stop.
///
/// Signal handlers are registered before this returns, so an interrupt
/// arriving right after the call is not lost.
pub fn cancel_on_interrupt(token: CancellationToken) -> io::Result<()> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    let waiter = SignalWaiter::register(&runtime)?;

    thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            if runtime.block_on(waiter.wait()) {
                token.cancel();
            }
        })?;

    Ok(())
}

#[cfg(unix)]
struct SignalWaiter {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalWaiter {
    fn register(runtime: &Runtime) -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        let _guard = runtime.enter();
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    async fn wait(mut self) -> bool {
        tokio::select! {
            _ = self.terminate.recv() => log::warn!("Received SIGTERM signal"),
            _ = self.interrupt.recv() => log::warn!("Received SIGINT signal (Ctrl+C)"),
        }
        true
    }
}

#[cfg(not(unix))]
struct SignalWaiter;

#[cfg(not(unix))]
impl SignalWaiter {
    fn register(_runtime: &Runtime) -> io::Result<Self> {
        Ok(Self)
    }

    async fn wait(self) -> bool {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("Received Ctrl+C signal");
                true
            }
            Err(error) => {
                log::error!("Failed to listen for Ctrl+C signal: {error}");
                false
            }
        }
    }
}
