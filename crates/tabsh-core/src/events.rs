//! Host-facing session events.
//!
//! The engine delivers these over a bounded channel, in per-session
//! production order. No ordering is guaranteed across different tabs.

use serde::Serialize;

/// Host-assigned identifier of one editor tab.
pub type TabId = u64;

/// Which output stream of the child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One decoded line of child output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub text: String,
    pub stream: OutputStream,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseReason {
    /// The host closed the tab.
    UserClosed,
    /// The child exited on its own (e.g. the user typed `exit`).
    ProcessExited,
    /// The session died because a write found the child gone.
    Error,
}

/// Direction of a history navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Previous,
    Next,
}

/// Events delivered from the engine to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    /// A line of child output to append to the tab's buffer.
    OutputLine { tab: TabId, line: OutputLine },
    /// The scraped connection-status string changed.
    ConnectionStatusChanged { tab: TabId, status: String },
    /// The session ended. Emitted exactly once per session.
    SessionClosed { tab: TabId, reason: CloseReason },
}
