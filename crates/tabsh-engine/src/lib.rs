//! tabsh-engine: tab-scoped interactive subprocess sessions.
//!
//! Binds one interactive child process to each host tab, turning its raw
//! output into ordered line events and routing submitted input back to it.
//! The host (an editor plugin, a REPL front end) drives the engine through
//! [`SessionManager`] and consumes [`tabsh_core::SessionEvent`]s.

pub mod session;

// Re-export the main entry points at crate root.
pub use session::manager::{SessionManager, SessionState};
