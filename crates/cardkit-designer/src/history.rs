//! Undo/redo history over immutable document snapshots

use std::collections::VecDeque;
use std::sync::Arc;

use crate::document::Document;

/// One undoable checkpoint
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Monotonic commit number
    pub sequence: u64,
    /// Human-readable description of the edit that produced this state
    pub label: String,
    /// Snapshot; shared, never mutated
    pub document: Arc<Document>,
}

/// Past/current/future stacks of document snapshots
#[derive(Clone, Debug)]
pub struct History {
    past: VecDeque<HistoryEntry>,
    current: HistoryEntry,
    future: Vec<HistoryEntry>,
    max_depth: Option<usize>,
    next_sequence: u64,
}

impl History {
    /// Create an unbounded history starting at `document`
    pub fn new(document: Document) -> Self {
        Self::with_max_depth(document, None)
    }

    /// Create with an optional cap on the number of undo steps
    pub fn with_max_depth(document: Document, max_depth: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            current: HistoryEntry {
                sequence: 0,
                label: "Open".to_string(),
                document: Arc::new(document),
            },
            future: Vec::new(),
            max_depth,
            next_sequence: 1,
        }
    }

    /// Current document
    pub fn current(&self) -> &Arc<Document> {
        &self.current.document
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.current
    }

    /// Make `document` current; clears the redo stack
    pub fn commit(&mut self, document: Document, label: impl Into<String>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = HistoryEntry {
            sequence,
            label: label.into(),
            document: Arc::new(document),
        };
        let previous = std::mem::replace(&mut self.current, entry);
        self.past.push_back(previous);
        self.future.clear();

        if let Some(max) = self.max_depth {
            while self.past.len() > max {
                self.past.pop_front();
            }
        }

        tracing::debug!(sequence, label = %self.current.label, "history commit");
        sequence
    }

    /// Step back; `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let undone = std::mem::replace(&mut self.current, previous);
        tracing::debug!(label = %undone.label, "undo");
        self.future.push(undone);
        true
    }

    /// Step forward; `false` when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let previous = std::mem::replace(&mut self.current, next);
        self.past.push_back(previous);
        tracing::debug!(label = %self.current.label, "redo");
        true
    }

    /// Drop all past and future entries, keeping the current document
    pub fn reset(&mut self, document: Document, label: impl Into<String>) {
        self.past.clear();
        self.future.clear();
        self.current = HistoryEntry {
            sequence: self.next_sequence,
            label: label.into(),
            document: Arc::new(document),
        };
        self.next_sequence += 1;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    /// Labels of the edits `undo` would revert, most recent first
    pub fn undo_labels(&self) -> Vec<&str> {
        let mut labels = Vec::with_capacity(self.past.len());
        if !self.past.is_empty() {
            labels.push(self.current.label.as_str());
            labels.extend(self.past.iter().skip(1).rev().map(|e| e.label.as_str()));
        }
        labels
    }

    /// Labels of the edits `redo` would reapply, next first
    pub fn redo_labels(&self) -> Vec<&str> {
        self.future.iter().rev().map(|e| e.label.as_str()).collect()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}
