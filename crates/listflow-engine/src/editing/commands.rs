use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::editing::content;
use crate::editing::document::{Document, DocumentEvent};
use crate::editing::indent::{indent, outdent};
use crate::editing::insert::{Fragment, insert_content, reconcile_inserted};
use crate::editing::list_type::{remove_list, set_list_type, toggle_checked};
use crate::editing::patch::{Outcome, Patch};
use crate::editing::split::{SplitDirection, enter, split_item};
use crate::models::{InsertionPoint, ListKind, Position, Selection};

/// Editing commands
///
/// `blocks` restricts a list command to an explicit block range instead of
/// the blocks the selection touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cmd {
    SplitItem {
        direction: SplitDirection,
        blocks: Option<Range<usize>>,
    },
    Indent {
        blocks: Option<Range<usize>>,
    },
    Outdent {
        blocks: Option<Range<usize>>,
    },
    RemoveList {
        blocks: Option<Range<usize>>,
    },
    SetListType {
        kind: ListKind,
        blocks: Option<Range<usize>>,
    },
    ToggleChecked {
        blocks: Option<Range<usize>>,
    },
    /// Structural break at the selection. When the break leaves a new
    /// block that becomes its own item, the break and the promotion close
    /// as separate transactions, so the version moves by two.
    Enter,
    /// Paste; without `at` the selection is replaced
    InsertContent {
        fragment: Fragment,
        at: Option<InsertionPoint>,
    },
    InsertText {
        at: Position,
        text: String,
    },
    /// Delete a range merging its edge blocks, as backspace over a selection does
    DeleteRange {
        range: Selection,
    },
}

/// Something the host did that the list logic has to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// The user asked for a block break
    BreakRequested,
    /// The host put these blocks into the document on its own
    ContentInserted { blocks: Range<usize> },
}

impl Document {
    /// Apply a command and report what it did
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        debug!("apply {cmd:?}");
        self.fixed_log.clear();
        let outcome = match cmd {
            Cmd::Enter => enter(self),
            Cmd::SplitItem { direction, blocks } => {
                self.change(|w| split_item(w, direction, blocks))
            }
            Cmd::Indent { blocks } => self.change(|w| indent(w, blocks)),
            Cmd::Outdent { blocks } => self.change(|w| outdent(w, blocks)),
            Cmd::RemoveList { blocks } => self.change(|w| remove_list(w, blocks)),
            Cmd::SetListType { kind, blocks } => self.change(|w| set_list_type(w, kind, blocks)),
            Cmd::ToggleChecked { blocks } => self.change(|w| toggle_checked(w, blocks)),
            Cmd::InsertContent { fragment, at } => {
                self.change(|w| insert_content(w, &fragment, at))
            }
            Cmd::InsertText { at, text } => {
                self.change(|w| content::insert_text(w, at, &text));
                Outcome::none()
            }
            Cmd::DeleteRange { range } => {
                self.change(|w| content::delete_content(w, range, false));
                Outcome::none()
            }
        };
        self.finish(outcome)
    }

    /// React to a host event
    pub fn handle(&mut self, event: HostEvent) -> Patch {
        debug!("handle {event:?}");
        self.fixed_log.clear();
        let outcome = match event {
            HostEvent::BreakRequested => enter(self),
            HostEvent::ContentInserted { blocks } => {
                self.change(|w| reconcile_inserted(w, blocks))
            }
        };
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: Outcome) -> Patch {
        let changed = self.in_document_order(outcome.changed);
        let fixed = std::mem::take(&mut self.fixed_log);
        if let Some(command) = outcome.executed {
            self.push_event(DocumentEvent::CommandExecuted {
                command,
                changed: changed.clone(),
            });
        }
        Patch {
            changed,
            fixed: self.in_document_order(fixed),
            executed: outcome.executed,
            new_selection: self.selection,
            version: self.version,
        }
    }
}
