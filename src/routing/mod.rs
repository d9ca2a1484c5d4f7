//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request target (path + query)
//!     → router.rs (ordered table scan)
//!     → matcher.rs (decode segments, evaluate patterns)
//!     → Return: Error | Redirect | Render(RenderProps) | NotFound
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile patterns and redirect targets
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)
//! - No I/O during matching

pub mod matcher;
pub mod router;

use thiserror::Error;

pub use matcher::{Params, Pattern};
pub use router::{Location, MatchOutcome, RenderProps, RouteTable};

/// Errors raised while compiling the routing table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route `{0}` must set exactly one of `view` or `redirect`")]
    AmbiguousTarget(String),

    #[error("redirect from `{pattern}` references unknown parameter `{param}`")]
    UnknownRedirectParam { pattern: String, param: String },
}
