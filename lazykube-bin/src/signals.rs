//! Termination signals end the session the same way `q` does, so running
//! `kubectl logs -f` children get killed instead of orphaned.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};
use tokio::runtime::Builder;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Raise `exit_requested` on the first SIGINT, SIGTERM or SIGHUP.
///
/// Handlers are installed before this returns.
pub fn watch_termination(exit_requested: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    let signals = {
        let _guard = runtime.enter();
        Signals::install()?
    };

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            let name = runtime.block_on(signals.recv());
            log::info!("Received {}, shutting down", name);
            exit_requested.store(true, Ordering::Release);
        })?;
    Ok(())
}

#[cfg(unix)]
struct Signals {
    interrupt: Signal,
    terminate: Signal,
    hangup: Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl-C"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::{
        process::Command,
        time::{Duration, Instant},
    };

    #[test]
    fn test_sigterm_requests_exit() {
        let exit_requested = Arc::new(AtomicBool::new(false));
        watch_termination(exit_requested.clone()).unwrap();

        let status = Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !exit_requested.load(Ordering::Acquire) {
            assert!(Instant::now() < deadline, "signal was not observed");
            thread::sleep(Duration::from_millis(5));
        }
    }
}
