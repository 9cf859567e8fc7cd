//! Undo/redo history and an edit session that owns it.
//!
//! A [`History`] is two LIFO stacks of [`UndoEntry`] values. Entries are
//! never edited in place: undo pops an entry and pushes a swapped entry onto
//! the redo stack, and redo does the reverse. The swapped entry carries the
//! inverse computed during that step, not the one stored earlier, so it stays
//! valid when the redo stack survives new edits.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::apply::apply_many;
use crate::classify::{Classifier, RiskTier};
use crate::types::{BatchError, Operation};

// ── Entries ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub description: String,
    /// Operations that take the document back across this entry.
    pub inverse_ops: Vec<Operation>,
    /// Operations that take the document forward across this entry.
    pub original_ops: Vec<Operation>,
}

impl UndoEntry {
    pub fn new(description: impl Into<String>, inverse_ops: Vec<Operation>, original_ops: Vec<Operation>) -> Self {
        Self {
            description: description.into(),
            inverse_ops,
            original_ops,
        }
    }

    /// The entry for the opposite stack once `inverse_ops` has been applied.
    ///
    /// `reapply` is the inverse computed while applying `inverse_ops`, so it
    /// is valid against the document as it is now.
    pub fn swapped(self, reapply: Vec<Operation>) -> Self {
        Self {
            description: self.description,
            inverse_ops: reapply,
            original_ops: self.inverse_ops,
        }
    }
}

/// What a new forward edit does to the redo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedoPolicy {
    #[default]
    ClearOnEdit,
    Keep,
}

// ── History ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<UndoEntry>,
    redo: Vec<UndoEntry>,
    policy: RedoPolicy,
}

impl History {
    pub fn new(policy: RedoPolicy) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> RedoPolicy {
        self.policy
    }

    /// Record a forward edit.
    pub fn record(&mut self, entry: UndoEntry) {
        if self.policy == RedoPolicy::ClearOnEdit {
            self.redo.clear();
        }
        self.undo.push(entry);
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&UndoEntry> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoEntry> {
        self.redo.last()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

// ── Session ───────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("approval required: batch is {required}, granted {granted}")]
    ApprovalRequired { required: RiskTier, granted: RiskTier },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// A document together with its undo/redo history.
///
/// Every edit goes through `&mut self`, so one session admits one edit at a
/// time.
#[derive(Debug, Clone)]
pub struct EditSession {
    doc: Value,
    history: History,
    classifier: Classifier,
}

impl EditSession {
    pub fn new(doc: Value) -> Self {
        Self::with_classifier(doc, Classifier::default())
    }

    pub fn with_classifier(doc: Value, classifier: Classifier) -> Self {
        Self {
            doc,
            history: History::default(),
            classifier,
        }
    }

    pub fn with_policy(mut self, policy: RedoPolicy) -> Self {
        self.history = History::new(policy);
        self
    }

    pub fn document(&self) -> &Value {
        &self.doc
    }

    pub fn into_document(self) -> Value {
        self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Tier the batch would need to be approved at.
    pub fn classify(&self, ops: &[Operation]) -> RiskTier {
        self.classifier.classify_batch_max(ops)
    }

    /// Apply a batch if `granted` covers its tier, and record it for undo.
    ///
    /// Returns the tier the batch was classified at.
    pub fn apply(
        &mut self,
        description: impl Into<String>,
        ops: Vec<Operation>,
        granted: RiskTier,
    ) -> Result<RiskTier, SessionError> {
        let required = self.classify(&ops);
        if required > granted {
            warn!(%required, %granted, "edit needs a higher approval tier");
            return Err(SessionError::ApprovalRequired { required, granted });
        }
        let result = apply_many(&self.doc, &ops)?;
        self.doc = result.doc;
        let entry = UndoEntry::new(description, result.inverse, ops);
        debug!(description = %entry.description, tier = %required, "recorded edit");
        self.history.record(entry);
        Ok(required)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Undo the latest edit and return its description.
    ///
    /// On failure the entry goes back on the undo stack and the document is
    /// left as it was.
    pub fn undo(&mut self) -> Result<String, SessionError> {
        let entry = self.history.undo.pop().ok_or(SessionError::NothingToUndo)?;
        match apply_many(&self.doc, &entry.inverse_ops) {
            Ok(result) => {
                self.doc = result.doc;
                let description = entry.description.clone();
                info!(%description, "undo");
                self.history.redo.push(entry.swapped(result.inverse));
                Ok(description)
            }
            Err(err) => {
                warn!(description = %entry.description, error = %err, "undo failed");
                self.history.undo.push(entry);
                Err(err.into())
            }
        }
    }

    /// Re-apply the latest undone edit and return its description.
    ///
    /// On failure the entry goes back on the redo stack and the document is
    /// left as it was.
    pub fn redo(&mut self) -> Result<String, SessionError> {
        let entry = self.history.redo.pop().ok_or(SessionError::NothingToRedo)?;
        match apply_many(&self.doc, &entry.inverse_ops) {
            Ok(result) => {
                self.doc = result.doc;
                let description = entry.description.clone();
                info!(%description, "redo");
                self.history.undo.push(entry.swapped(result.inverse));
                Ok(description)
            }
            Err(err) => {
                warn!(description = %entry.description, error = %err, "redo failed");
                self.history.redo.push(entry);
                Err(err.into())
            }
        }
    }
}
