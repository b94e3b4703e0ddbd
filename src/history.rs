//! # Snapshot History
//!
//! Linear undo/redo over full snapshots. The cursor points at the snapshot
//! that represents the current state; pushing after an undo discards the
//! undone branch.
//!
//! ```text
//! push A, push B, push C      [A, B, C]   cursor=2
//! undo, undo                  [A, B, C]   cursor=0  -> returns B, then A
//! push D                      [A, D]      cursor=1
//! ```

/// Linear snapshot history with truncate-on-push.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    snapshots: Vec<T>,
    cursor: usize,
    limit: Option<usize>,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryStack<T> {
    /// Unbounded history.
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            limit: None,
        }
    }

    /// History that keeps at most `limit` snapshots (minimum 1), dropping the
    /// oldest first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new()
        }
    }

    /// Record `snapshot` as the new current state.
    pub fn push(&mut self, snapshot: T) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);

        if let Some(limit) = self.limit
            && self.snapshots.len() > limit
        {
            let excess = self.snapshots.len() - limit;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` (cursor unchanged) when already at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward one snapshot. `None` (cursor unchanged) when already at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
