//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Env overrides → Validate → Assets → Template → Routes → Locales → Bind
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGHUP/SIGINT/SIGQUIT/SIGUSR1/SIGUSR2/SIGTERM → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then render state, then listeners
//! - Fail fast: any startup error is fatal and nothing is bound
//! - A termination signal always ends the process with a failure status

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{serve_until_signal, Shutdown};
pub use signals::{wait_for_termination, TerminationSignal};
pub use startup::{bootstrap, launch, prepare_config, StartupError};
