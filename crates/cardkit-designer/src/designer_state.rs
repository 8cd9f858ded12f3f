//! Designer state manager.
//! Owns the document history and applies editor commands to it.
//!
//! Every command validates against the visible document before touching
//! anything: it either commits exactly one history entry or returns an
//! error and leaves the state as it was. Continuous edits (drag, resize)
//! are bracketed by [`DesignerState::begin_gesture`] /
//! [`DesignerState::end_gesture`] and commit once per gesture.

use cardkit_core::{DocumentError, Error, PrintSpec, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use crate::background::Background;
use crate::document::{Document, Orientation};
use crate::history::History;
use crate::model::{LayerNode, LayerPatch};
use crate::serialization::{DesignFile, DesignMetadata};
use crate::store::{DocumentStore, SaveReceipt};

/// Detects whether the document changed after a point in time.
///
/// Taken before a long-running operation (an export waiting on image
/// decodes) and checked before its result is used.
#[derive(Debug, Clone)]
pub struct RevisionGuard {
    rx: watch::Receiver<u64>,
    revision: u64,
}

impl RevisionGuard {
    /// Revision the guard was taken at.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while no edit, undo, redo or load has happened since.
    pub fn is_current(&self) -> bool {
        *self.rx.borrow() == self.revision
    }
}

/// An in-progress coalesced edit.
#[derive(Debug, Clone)]
struct Gesture {
    label: String,
    preview: Document,
    dirty: bool,
}

/// Designer state for editor integration
pub struct DesignerState {
    history: History,
    gesture: Option<Gesture>,
    revision: watch::Sender<u64>,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    file_metadata: Option<DesignMetadata>,
    file_print: Option<PrintSpec>,
}

impl Default for DesignerState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DesignerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignerState")
            .field("document", &self.document().id)
            .field("revision", &self.revision())
            .field("undo", &self.history.undo_count())
            .field("redo", &self.history.redo_count())
            .field("gesture", &self.gesture.as_ref().map(|g| &g.label))
            .finish()
    }
}

impl DesignerState {
    /// Creates a new designer state with a blank business card.
    pub fn new() -> Self {
        Self::with_document(Document::business_card())
    }

    pub fn with_document(document: Document) -> Self {
        Self::with_max_depth(document, None)
    }

    /// History keeps at most `max_depth` undo steps when set.
    pub fn with_max_depth(document: Document, max_depth: Option<usize>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            history: History::with_max_depth(document, max_depth),
            gesture: None,
            revision,
            current_file_path: None,
            is_modified: false,
            file_metadata: None,
            file_print: None,
        }
    }

    /// The document as currently displayed, including any gesture preview.
    pub fn document(&self) -> &Document {
        match &self.gesture {
            Some(g) => &g.preview,
            None => self.history.current(),
        }
    }

    /// Shared snapshot of the visible document.
    pub fn snapshot(&self) -> Arc<Document> {
        match &self.gesture {
            Some(g) => Arc::new(g.preview.clone()),
            None => Arc::clone(self.history.current()),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn revision_guard(&self) -> RevisionGuard {
        RevisionGuard {
            rx: self.revision.subscribe(),
            revision: self.revision(),
        }
    }

    fn bump_revision(&mut self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn commit(&mut self, document: Document, label: impl Into<String>) {
        self.history.commit(document, label);
        self.is_modified = true;
        self.bump_revision();
    }

    /// Commit a discrete edit computed from the visible document. A pending
    /// gesture is committed first so it stays a separate undo step.
    fn commit_discrete(&mut self, document: Document, label: impl Into<String>) {
        self.end_gesture();
        self.commit(document, label);
    }

    /// Append a layer on top and return its id.
    pub fn add_layer(&mut self, node: LayerNode) -> Result<String, DocumentError> {
        let kind = node.layer_type();
        let (next, id) = self.document().with_layer_added(node)?;
        self.commit_discrete(next, format!("Add {} layer", kind));
        tracing::debug!(id = %id, "added layer");
        Ok(id)
    }

    /// Merge `patch` into layer `id`. Inside a gesture the change only
    /// updates the preview.
    pub fn update_layer(&mut self, id: &str, patch: &LayerPatch) -> Result<(), DocumentError> {
        let next = self.document().with_layer_updated(id, patch)?;
        match &mut self.gesture {
            Some(gesture) => {
                gesture.preview = next;
                gesture.dirty = true;
                self.bump_revision();
            }
            None => self.commit(next, "Edit layer"),
        }
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<LayerNode, DocumentError> {
        let (next, removed) = self.document().with_layer_removed(id)?;
        self.commit_discrete(next, format!("Remove {} layer", removed.layer_type()));
        Ok(removed)
    }

    /// Move layer `id` in the stack; returns the clamped index.
    pub fn reorder_layer(&mut self, id: &str, new_index: usize) -> Result<usize, DocumentError> {
        let (next, index) = self.document().with_layer_moved(id, new_index)?;
        self.commit_discrete(next, "Reorder layer");
        Ok(index)
    }

    pub fn set_background(&mut self, background: Background) -> Result<(), DocumentError> {
        let next = self.document().with_background(background)?;
        self.commit_discrete(next, "Change background");
        Ok(())
    }

    /// Returns `false` (and commits nothing) when already in `orientation`.
    pub fn set_orientation(&mut self, orientation: Orientation) -> bool {
        if self.document().orientation == orientation {
            return false;
        }
        let next = self.document().with_orientation(orientation);
        self.commit_discrete(next, "Change orientation");
        true
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        let next = self.document().with_name(name);
        self.commit_discrete(next, "Rename design");
    }

    /// Step back one entry. A pending gesture that changed something is
    /// committed first, so this undo reverts exactly that gesture and
    /// `redo` brings it back.
    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        let undone = self.history.undo();
        if undone {
            self.is_modified = true;
            self.bump_revision();
        } else {
            tracing::debug!("cannot undo");
        }
        undone
    }

    /// Step forward one entry. A pending gesture is committed first; since
    /// that is a new commit, the redo stack is gone afterwards.
    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let redone = self.history.redo();
        if redone {
            self.is_modified = true;
            self.bump_revision();
        } else {
            tracing::debug!("cannot redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_labels(&self) -> Vec<String> {
        self.history.undo_labels().into_iter().map(String::from).collect()
    }

    pub fn redo_labels(&self) -> Vec<String> {
        self.history.redo_labels().into_iter().map(String::from).collect()
    }

    /// Start coalescing layer updates. An active gesture is ended first.
    pub fn begin_gesture(&mut self, label: impl Into<String>) {
        self.end_gesture();
        let label = label.into();
        tracing::debug!(label = %label, "begin gesture");
        self.gesture = Some(Gesture {
            label,
            preview: self.history.current().as_ref().clone(),
            dirty: false,
        });
    }

    /// Commit the gesture as one entry. Returns `false` when there was no
    /// gesture or it changed nothing.
    pub fn end_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if !gesture.dirty || gesture.preview == **self.history.current() {
            if gesture.dirty {
                self.bump_revision();
            }
            return false;
        }
        // Preview is already visible, so the revision stays put.
        self.history.commit(gesture.preview, gesture.label);
        self.is_modified = true;
        true
    }

    /// Drop the gesture preview. Returns whether a gesture was active.
    pub fn cancel_gesture(&mut self) -> bool {
        match self.gesture.take() {
            Some(gesture) => {
                if gesture.dirty {
                    self.bump_revision();
                }
                tracing::debug!(label = %gesture.label, "cancel gesture");
                true
            }
            None => false,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Replace the document and clear history.
    pub fn load_document(&mut self, mut document: Document) -> Result<(), DocumentError> {
        for layer in &mut document.layers {
            layer.assign_missing_ids();
        }
        document.validate()?;
        self.gesture = None;
        self.file_metadata = None;
        self.file_print = None;
        self.history.reset(document, "Open");
        self.is_modified = false;
        self.bump_revision();
        Ok(())
    }

    /// Start over with a blank business card.
    pub fn new_design(&mut self) {
        self.gesture = None;
        self.history.reset(Document::business_card(), "New design");
        self.current_file_path = None;
        self.file_metadata = None;
        self.file_print = None;
        self.is_modified = false;
        self.bump_revision();
    }

    /// Save design to file. Metadata and print settings read from the
    /// design file are written back; only `modified` changes.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.end_gesture();
        let mut file = DesignFile::new(self.document().clone());
        if let Some(previous) = &self.file_metadata {
            file = file.with_previous_metadata(previous);
        }
        file.print = self.file_print;
        file.save_to_file(&path)?;
        self.file_metadata = Some(file.metadata);
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let design = DesignFile::load_from_file(&path)?;
        let (metadata, print) = (design.metadata.clone(), design.print);
        self.load_document(design.into_document())?;
        self.file_metadata = Some(metadata);
        self.file_print = print;
        self.current_file_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Metadata of the design file last loaded or saved.
    pub fn file_metadata(&self) -> Option<&DesignMetadata> {
        self.file_metadata.as_ref()
    }

    /// Save the committed document under its id.
    pub async fn save_to_store(&mut self, store: &dyn DocumentStore) -> Result<SaveReceipt, Error> {
        self.end_gesture();
        let document = self.history.current();
        let data = serde_json::to_value(document.as_ref()).map_err(StoreError::from)?;
        let receipt = store.save(&document.id, data).await?;
        if receipt.success {
            self.is_modified = false;
        }
        Ok(receipt)
    }

    /// Load document `id` from the store, replacing the current one.
    pub async fn open_from_store(&mut self, store: &dyn DocumentStore, id: &str) -> Result<(), Error> {
        let data = store.load(id).await?;
        let document: Document = serde_json::from_value(data).map_err(StoreError::from)?;
        self.load_document(document)?;
        self.current_file_path = None;
        Ok(())
    }
}
