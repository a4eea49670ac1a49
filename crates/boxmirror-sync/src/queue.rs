//! Traversal queue
//!
//! An arena of discovered containers, drained front to back. Entries are
//! never removed: the cursor advances past consumed entries and each entry
//! remembers the index of the container whose listing produced it, so the
//! discovery tree is recoverable without a recursive call stack.

use std::path::PathBuf;

use boxmirror_core::domain::RemoteId;

/// A container discovered but not yet listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContainer {
    pub id: RemoteId,
    pub local_path: PathBuf,
    /// Distance from the root, which sits at depth 0
    pub depth: usize,
    /// Arena index of the parent; `None` only for the root
    pub parent: Option<usize>,
}

/// Append-while-draining work list of containers
#[derive(Debug)]
pub struct TraversalQueue {
    entries: Vec<PendingContainer>,
    cursor: usize,
}

impl TraversalQueue {
    /// Seeds the queue with the root container
    pub fn new(root_id: RemoteId, root_path: PathBuf) -> Self {
        Self {
            entries: vec![PendingContainer {
                id: root_id,
                local_path: root_path,
                depth: 0,
                parent: None,
            }],
            cursor: 0,
        }
    }

    /// Appends a container discovered by the listing of `parent`
    ///
    /// Returns the arena index of the new entry.
    pub fn push(&mut self, id: RemoteId, local_path: PathBuf, parent: usize) -> usize {
        let depth = self.entries.get(parent).map_or(0, |p| p.depth) + 1;
        self.entries.push(PendingContainer {
            id,
            local_path,
            depth,
            parent: Some(parent),
        });
        self.entries.len() - 1
    }

    /// Takes the next pending container in discovery order
    pub fn take_next(&mut self) -> Option<(usize, PendingContainer)> {
        let entry = self.entries.get(self.cursor)?.clone();
        let index = self.cursor;
        self.cursor += 1;
        Some((index, entry))
    }

    /// Entry at an arena index
    pub fn get(&self, index: usize) -> Option<&PendingContainer> {
        self.entries.get(index)
    }

    /// Containers discovered so far, the root included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Containers discovered but not yet taken
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn is_drained(&self) -> bool {
        self.remaining() == 0
    }
}
