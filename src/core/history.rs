// src/core/history.rs — Linear undo/redo history over image snapshots
//
// Every edit is a full replacement image, so the history is a flat list of
// snapshots with a cursor rather than a command log. Committing after an
// undo drops the redo branch.

use crate::core::snapshot::{ImageData, Snapshot};
use crate::infra::errors::PixshopError;

#[derive(Debug, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
    /// Index of the current snapshot. Meaningless while `snapshots` is empty.
    cursor: usize,
    /// Next sequence position. Never reset, not even by `load` or `clear`.
    next_seq: u64,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from a single original image.
    pub fn load(&mut self, image: ImageData) -> Result<&Snapshot, PixshopError> {
        if !image.is_image() {
            return Err(PixshopError::invalid_input(
                "Please select a valid image file.",
            ));
        }

        let snapshot = self.stamp(image);
        tracing::debug!(seq = snapshot.seq(), media_type = snapshot.media_type(), "History loaded");
        self.snapshots.clear();
        self.snapshots.push(snapshot);
        self.cursor = 0;
        Ok(&self.snapshots[0])
    }

    /// Append an edit after the cursor, discarding anything that was redoable.
    pub fn commit(&mut self, image: ImageData) -> Result<&Snapshot, PixshopError> {
        if self.snapshots.is_empty() {
            return Err(PixshopError::IllegalState(
                "cannot commit an edit to an empty history".into(),
            ));
        }

        let dropped = self.snapshots.len() - (self.cursor + 1);
        self.snapshots.truncate(self.cursor + 1);
        let snapshot = self.stamp(image);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;

        tracing::debug!(
            seq = self.snapshots[self.cursor].seq(),
            cursor = self.cursor,
            dropped,
            "History commit"
        );
        Ok(&self.snapshots[self.cursor])
    }

    /// Step back one version. Returns `false` when already at the original.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "Undo");
        true
    }

    /// Step forward one version. Returns `false` when already at the newest.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "Redo");
        true
    }

    /// Drop every edit and go back to the originally loaded image.
    pub fn reset_to_original(&mut self) -> bool {
        if self.snapshots.len() <= 1 {
            return false;
        }
        let dropped = self.snapshots.len() - 1;
        self.snapshots.truncate(1);
        self.cursor = 0;
        tracing::debug!(dropped, "Reset to original");
        true
    }

    /// Forget everything, e.g. before uploading a different image.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn original(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor < self.snapshots.len() - 1
    }

    /// `None` while empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.snapshots.is_empty()).then_some(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    fn stamp(&mut self, image: ImageData) -> Snapshot {
        let seq = self.next_seq;
        self.next_seq += 1;
        Snapshot::new(seq, image)
    }
}
