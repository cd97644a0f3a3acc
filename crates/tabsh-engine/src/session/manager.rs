//! Session lifecycle management.
//!
//! Tracks one interactive subprocess per tab, routes submitted input to it,
//! pumps its output back as ordered line events, and tears sessions down on
//! tab close or child exit. Each session ends with exactly one
//! `SessionClosed` event; whichever path removes the session from the map
//! owns that notification.
//!
//! The session map's lock is scoped to lookup, creation, and removal. Stdin
//! writes go through a per-session mutex outside it, so one tab's stalled
//! pipe never blocks another tab.

use crate::session::completion;
use crate::session::history::HistoryBuffer;
use crate::session::multiplexer::{LineAssembler, StatusPattern};
use crate::session::process::ProcessHandle;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tabsh_core::{
    CloseReason, HistoryDirection, OutputLine, OutputStream, SessionEvent, SpawnConfig, TabId,
    TabshError, TabshResult,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Capacity of the host-facing event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Read buffer size for the output pumps.
const READ_BUF_SIZE: usize = 8192;

/// Lifecycle state of a tab's session.
///
/// `Uninitialized` covers both "no submit yet" and "session already gone";
/// `Terminating` and `Closed` are transient, observed only in teardown logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Running,
    Terminating,
    Closed,
}

/// One tab's bound subprocess plus its history and scraped status.
pub struct Session {
    /// Tab this session belongs to.
    pub tab: TabId,
    /// Child handle behind its own lock, so writes serialize per session
    /// without holding the session map.
    process: Arc<Mutex<ProcessHandle>>,
    history: HistoryBuffer,
    /// Connection status scraped from recognized output lines.
    status: Option<String>,
    state: SessionState,
    created_at: Instant,
    /// Abort handles for the output pump tasks.
    pumps: Vec<AbortHandle>,
}

impl Session {
    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }
}

struct Inner {
    sessions: RwLock<HashMap<TabId, Session>>,
    config: SpawnConfig,
    pattern: Option<StatusPattern>,
    events: mpsc::Sender<SessionEvent>,
}

/// Manages all active sessions, at most one per tab.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Create a manager and the channel on which it delivers session events.
    pub fn new(config: SpawnConfig) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let pattern = StatusPattern::parse(&config.status_pattern);
        if pattern.is_none() {
            warn!(
                pattern = %config.status_pattern,
                "status pattern has no delimiter, scraping disabled"
            );
        }
        let inner = Arc::new(Inner {
            sessions: RwLock::new(HashMap::new()),
            config,
            pattern,
            events,
        });
        (Self { inner }, rx)
    }

    /// Send `text` to the tab's subprocess, creating the session on first
    /// use.
    ///
    /// The text is recorded in the tab's history and written as one input
    /// line. A write that finds the child gone tears the session down and
    /// fails with `SessionDead`; a `WriteTimeout` leaves the session alive.
    pub async fn submit(&self, tab: TabId, text: &str) -> TabshResult<()> {
        // Map lock only for lookup/creation; the write happens outside it.
        let process = {
            let mut sessions = self.inner.sessions.write().await;
            if !sessions.contains_key(&tab) {
                let session = self.create_session(tab)?;
                sessions.insert(tab, session);
            }
            let session = sessions
                .get_mut(&tab)
                .ok_or(TabshError::SessionNotFound(tab))?;
            session.history.push(text.trim_matches('\n'));
            session.process.clone()
        };

        let result = match process.lock().await.write_line(text).await {
            Ok(()) => Ok(()),
            Err(TabshError::ProcessNotRunning) => {
                self.inner.finish(tab, CloseReason::Error, true).await;
                Err(TabshError::SessionDead(tab))
            }
            Err(TabshError::WriteTimeout) => {
                warn!(tab, "input write timed out, session kept alive");
                Err(TabshError::WriteTimeout)
            }
            Err(e) => Err(e),
        };
        result
    }

    /// Move the tab's history cursor, returning the text the host should
    /// place in the input area. `draft` is the user's in-progress input; it
    /// is stashed on the first backward step and restored when navigating
    /// forward past the newest entry. Navigation past either boundary clamps.
    pub async fn navigate_history(
        &self,
        tab: TabId,
        direction: HistoryDirection,
        draft: &str,
    ) -> TabshResult<String> {
        let mut sessions = self.inner.sessions.write().await;
        let session = sessions
            .get_mut(&tab)
            .ok_or(TabshError::SessionNotFound(tab))?;
        let text = match direction {
            HistoryDirection::Previous => session.history.previous(draft),
            HistoryDirection::Next => session.history.next(),
        };
        Ok(text.unwrap_or_else(|| draft.to_string()))
    }

    /// Filename completions for the configured working directory.
    pub async fn request_completion(&self, tab: TabId, partial: &str) -> Vec<String> {
        debug!(tab, partial, "completion requested");
        completion::complete(&self.inner.config.workdir, partial)
    }

    /// Tear down the tab's session, cancelling in-flight reads. A no-op when
    /// no session exists (or it was already closed).
    pub async fn close_tab(&self, tab: TabId) {
        self.inner.finish(tab, CloseReason::UserClosed, true).await;
    }

    /// Close every open session (host shutdown).
    pub async fn shutdown(&self) {
        let tabs: Vec<TabId> = self.inner.sessions.read().await.keys().copied().collect();
        for tab in tabs {
            self.close_tab(tab).await;
        }
    }

    /// Lifecycle state of the tab's session. Tabs with no live session
    /// (never used, or already torn down) report `Uninitialized`.
    pub async fn session_state(&self, tab: TabId) -> SessionState {
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(&tab)
            .map(Session::state)
            .unwrap_or(SessionState::Uninitialized)
    }

    /// Last connection status scraped for the tab, if any.
    pub async fn connection_status(&self, tab: TabId) -> Option<String> {
        let sessions = self.inner.sessions.read().await;
        sessions.get(&tab).and_then(|s| s.status.clone())
    }

    /// Number of history entries recorded for the tab.
    pub async fn history_len(&self, tab: TabId) -> TabshResult<usize> {
        let sessions = self.inner.sessions.read().await;
        let session = sessions.get(&tab).ok_or(TabshError::SessionNotFound(tab))?;
        Ok(session.history.len())
    }

    /// Number of active sessions.
    pub async fn count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Spawn the child and its output pumps for a new session.
    ///
    /// The stdout pump receives the stderr pump's join handle so it can wait
    /// for the stderr drain before reporting the child gone.
    fn create_session(&self, tab: TabId) -> TabshResult<Session> {
        let mut process = ProcessHandle::spawn(&self.inner.config)?;
        let stdout = process.take_stdout();
        let stderr = process.take_stderr();

        let mut pumps = Vec::with_capacity(2);
        let stderr_pump =
            stderr.map(|reader| self.spawn_pump(tab, reader, OutputStream::Stderr, None));
        if let Some(handle) = &stderr_pump {
            pumps.push(handle.abort_handle());
        }
        if let Some(reader) = stdout {
            let handle = self.spawn_pump(tab, reader, OutputStream::Stdout, stderr_pump);
            pumps.push(handle.abort_handle());
        }

        info!(tab, pid = process.id().unwrap_or(0), "session created");
        Ok(Session {
            tab,
            process: Arc::new(Mutex::new(process)),
            history: HistoryBuffer::new(),
            status: None,
            state: SessionState::Running,
            created_at: Instant::now(),
            pumps,
        })
    }

    /// Run one output stream: read chunks, assemble lines, deliver events.
    ///
    /// Stdout EOF means the child is gone and drives teardown — after
    /// `drain_first` (the stderr pump) has delivered its remaining lines,
    /// so nothing buffered trails the close event. Stderr only drains.
    fn spawn_pump<R>(
        &self,
        tab: TabId,
        reader: R,
        stream: OutputStream,
        drain_first: Option<JoinHandle<()>>,
    ) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut reader = reader;
            let mut assembler = LineAssembler::new();
            let mut buf = [0u8; READ_BUF_SIZE];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        for line in assembler.push(&buf[..n]) {
                            inner.deliver_line(tab, line, stream).await;
                        }
                    }
                    Err(e) => {
                        debug!(tab, ?stream, error = %e, "output read failed");
                        break;
                    }
                }
            }
            if let Some(tail) = assembler.finish() {
                inner.deliver_line(tab, tail, stream).await;
            }
            if stream == OutputStream::Stdout {
                if let Some(drain) = drain_first {
                    let _ = drain.await;
                }
                inner.finish(tab, CloseReason::ProcessExited, false).await;
            }
        })
    }
}

impl Inner {
    /// Deliver one output line, scraping it for a status marker first. The
    /// raw line is always delivered unmodified.
    async fn deliver_line(&self, tab: TabId, text: String, stream: OutputStream) {
        if let Some(pattern) = &self.pattern {
            if let Some(status) = pattern.extract(&text) {
                self.update_status(tab, status).await;
            }
        }
        let line = OutputLine { text, stream };
        if self
            .events
            .send(SessionEvent::OutputLine { tab, line })
            .await
            .is_err()
        {
            debug!(tab, "event receiver dropped, line discarded");
        }
    }

    async fn update_status(&self, tab: TabId, status: String) {
        {
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(&tab) {
                Some(session) => session.status = Some(status.clone()),
                None => return,
            }
        }
        info!(tab, status = %status, "connection status changed");
        let _ = self
            .events
            .send(SessionEvent::ConnectionStatusChanged { tab, status })
            .await;
    }

    /// Remove the session and run its teardown. Removal from the map is the
    /// linearization point: only the caller that actually removed the
    /// session emits its close event.
    async fn finish(&self, tab: TabId, reason: CloseReason, abort_pumps: bool) {
        let session = self.sessions.write().await.remove(&tab);
        let Some(session) = session else { return };
        self.teardown(session, reason, abort_pumps).await;
    }

    /// Stop the pumps (unless the caller is one of them), terminate the
    /// child within the configured grace, and emit the single close event.
    async fn teardown(&self, mut session: Session, reason: CloseReason, abort_pumps: bool) {
        let tab = session.tab;
        debug!(tab, ?reason, state = ?session.state, "tearing down session");
        session.state = SessionState::Terminating;
        if abort_pumps {
            for pump in &session.pumps {
                pump.abort();
            }
        }
        let grace = self.config.terminate_grace();
        if let Err(e) = session.process.lock().await.terminate(grace).await {
            warn!(tab, error = %e, "terminate failed");
        }
        session.state = SessionState::Closed;
        info!(
            tab,
            ?reason,
            uptime_s = session.created_at.elapsed().as_secs(),
            "session closed"
        );
        let _ = self
            .events
            .send(SessionEvent::SessionClosed { tab, reason })
            .await;
    }
}
