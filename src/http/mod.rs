//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign request ID)
//!     → statics.rs (public root, then static root)
//!     → handler.rs (route match → error | redirect | render | 404)
//!         → context.rs (locale + bot flag for the render)
//!     → Send to client
//! ```

pub mod context;
pub mod handler;
pub mod request;
pub mod server;
pub mod statics;

pub use context::{BotDetector, RequestContext};
pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
