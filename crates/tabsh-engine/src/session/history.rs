//! Submitted-command history with a bounded length and a navigation cursor.

use std::collections::VecDeque;

/// Maximum number of retained entries by default.
const DEFAULT_CAPACITY: usize = 999;

/// Append-only log of submitted commands, oldest first, with one cursor for
/// backward/forward navigation.
///
/// Empty input and immediate repeats are not recorded. When the buffer is
/// full the oldest entry is evicted. Entries are never mutated; the whole
/// buffer lives and dies with its session.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: Cursor,
}

/// Navigation state. `index == None` means "at end", i.e. no navigation in
/// progress.
#[derive(Debug, Default)]
struct Cursor {
    index: Option<usize>,
    /// Draft input stashed when navigation begins, restored when the cursor
    /// walks forward past the newest entry.
    stash: Option<String>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            cursor: Cursor::default(),
        }
    }

    /// Record a submitted command and reset any navigation in progress.
    ///
    /// Empty text and text identical to the newest entry are dropped.
    pub fn push(&mut self, text: &str) {
        self.cursor = Cursor::default();
        if text.is_empty() || self.entries.back().map(String::as_str) == Some(text) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(text.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` (0 = oldest), if in range.
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Step backward, clamping at the oldest entry.
    ///
    /// The first backward step stashes `draft` (the text the user was
    /// typing) so a later forward walk can restore it. Returns `None` when
    /// the history is empty.
    pub fn previous(&mut self, draft: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor.index {
            None => {
                self.cursor.stash = Some(draft.to_string());
                self.entries.len() - 1
            }
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor.index = Some(index);
        self.entries.get(index).cloned()
    }

    /// Step forward. Past the newest entry, navigation ends and the stashed
    /// draft is returned. Returns `None` when no navigation is in progress.
    pub fn next(&mut self) -> Option<String> {
        let index = self.cursor.index?;
        if index + 1 >= self.entries.len() {
            self.cursor.index = None;
            return Some(self.cursor.stash.take().unwrap_or_default());
        }
        self.cursor.index = Some(index + 1);
        self.entries.get(index + 1).cloned()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
