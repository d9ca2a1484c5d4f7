//! Localization subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     LocaleConfig.available
//!     → store.rs (read <dir>/<id>.json concurrently, flatten to dotted keys)
//!     → LocaleStore (immutable, shared via Arc)
//!
//! Per request:
//!     query / cookie / Accept-Language
//!     → resolve.rs (pick best supported locale, else default)
//!     → locale id used by the renderer and the cache key
//! ```
//!
//! # Design Decisions
//! - Every configured locale must load before the listener binds
//! - Missing translation keys render as the key itself (logged)
//! - Resolution is a pure function of the request headers and URL

pub mod resolve;
pub mod store;

pub use store::{Locale, LocaleError, LocaleStore};
