//! tabsh-core: Shared types for the Tab Shell session engine.
//!
//! Provides the error taxonomy, spawn configuration, and the host-facing
//! event types delivered by the session engine.

pub mod config;
pub mod error;
pub mod events;

// Re-export commonly used items at crate root.
pub use config::{SpawnConfig, DEFAULT_STATUS_PATTERN};
pub use error::{TabshError, TabshResult};
pub use events::{CloseReason, HistoryDirection, OutputLine, OutputStream, SessionEvent, TabId};
