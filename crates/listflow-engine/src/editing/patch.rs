use serde::Serialize;

use crate::models::{BlockId, Selection};

/// List command that actually ran while applying a [`crate::editing::Cmd`]
///
/// `Cmd::Enter` delegates to outdent or split, so callers look here rather
/// than at the command they issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListCommand {
    Indent,
    Outdent,
    SplitItem,
    RemoveList,
    SetListType,
    ToggleChecked,
    InsertContent,
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch {
    /// Blocks the command structurally altered, in document order
    pub changed: Vec<BlockId>,
    /// Blocks the consistency fixer repaired when the transaction closed
    pub fixed: Vec<BlockId>,
    pub executed: Option<ListCommand>,
    pub new_selection: Selection,
    /// Version after the last transaction the command closed; `Cmd::Enter`
    /// may close two
    pub version: u64,
}

impl Patch {
    /// True when neither the command nor the fixer touched anything
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty() && self.fixed.is_empty() && self.executed.is_none()
    }
}

/// What a command reports back to `apply` before the patch is assembled
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub(crate) executed: Option<ListCommand>,
    pub(crate) changed: Vec<BlockId>,
}

impl Outcome {
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn executed(command: ListCommand, changed: Vec<BlockId>) -> Self {
        Self {
            executed: Some(command),
            changed,
        }
    }
}
