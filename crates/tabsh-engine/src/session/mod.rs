//! Session management: child process lifecycle, line multiplexing, history,
//! filename completion, and the manager binding one of each to a tab.

pub mod completion;
pub mod history;
pub mod manager;
pub mod multiplexer;
pub mod process;

pub use history::HistoryBuffer;
pub use manager::{Session, SessionManager, SessionState};
pub use multiplexer::{LineAssembler, StatusPattern};
pub use process::ProcessHandle;
