//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for every termination signal at once
//! - Report which one arrived
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Synchronous fault signals (SIGSEGV, SIGBUS, ...) cannot be handled
//!   here and keep their default action

use std::io;

/// Signals that terminate the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    Hangup,
    Interrupt,
    Quit,
    User1,
    User2,
    Terminate,
}

impl TerminationSignal {
    pub const ALL: [TerminationSignal; 6] = [
        TerminationSignal::Hangup,
        TerminationSignal::Interrupt,
        TerminationSignal::Quit,
        TerminationSignal::User1,
        TerminationSignal::User2,
        TerminationSignal::Terminate,
    ];

    /// Conventional name, e.g. `SIGTERM`.
    pub fn name(self) -> &'static str {
        match self {
            TerminationSignal::Hangup => "SIGHUP",
            TerminationSignal::Interrupt => "SIGINT",
            TerminationSignal::Quit => "SIGQUIT",
            TerminationSignal::User1 => "SIGUSR1",
            TerminationSignal::User2 => "SIGUSR2",
            TerminationSignal::Terminate => "SIGTERM",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;
        match self {
            TerminationSignal::Hangup => SignalKind::hangup(),
            TerminationSignal::Interrupt => SignalKind::interrupt(),
            TerminationSignal::Quit => SignalKind::quit(),
            TerminationSignal::User1 => SignalKind::user_defined1(),
            TerminationSignal::User2 => SignalKind::user_defined2(),
            TerminationSignal::Terminate => SignalKind::terminate(),
        }
    }
}

impl std::fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wait for the first termination signal.
///
/// Handlers are installed before the first await, so a signal arriving after
/// this future is first polled is never lost.
#[cfg(unix)]
pub async fn wait_for_termination() -> io::Result<TerminationSignal> {
    use futures_util::future::select_all;
    use tokio::signal::unix::signal;

    let mut streams = Vec::with_capacity(TerminationSignal::ALL.len());
    for sig in TerminationSignal::ALL {
        streams.push((sig, signal(sig.kind())?));
    }

    let waits = streams.iter_mut().map(|(sig, stream)| {
        let sig = *sig;
        Box::pin(async move {
            stream.recv().await;
            sig
        })
    });
    let (sig, _, _) = select_all(waits).await;
    Ok(sig)
}

#[cfg(not(unix))]
pub async fn wait_for_termination() -> io::Result<TerminationSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(TerminationSignal::Interrupt)
}
