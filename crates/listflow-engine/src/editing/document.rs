use std::collections::{BTreeSet, HashSet};
use std::fmt;

use log::{debug, trace};
use serde::Serialize;

use crate::editing::ListCommand;
use crate::editing::fixer;
use crate::editing::ids::{IdSource, UuidIds};
use crate::editing::writer::Writer;
use crate::models::{Block, BlockId, ListItemId, Position, Selection};

/// Notification queued for observers; drained with [`Document::take_events`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DocumentEvent {
    /// A transaction altered content. `blocks` lists the surviving blocks it
    /// touched, fixer repairs included, in document order.
    ContentChanged { version: u64, blocks: Vec<BlockId> },
    SelectionChanged { selection: Selection },
    /// A list command ran; carries the same report as [`crate::editing::Patch::changed`]
    CommandExecuted {
        command: ListCommand,
        changed: Vec<BlockId>,
    },
}

/// Bookkeeping for the transaction currently open on a document
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    pub(crate) depth: usize,
    /// Any content mutation, including block removal
    pub(crate) dirty: bool,
    pub(crate) force_fix: bool,
    pub(crate) touched: BTreeSet<BlockId>,
    pub(crate) selection_changed: bool,
    /// Ids handed out but possibly not written to a block yet
    pub(crate) minted: HashSet<ListItemId>,
}

/// Flat block sequence with list annotations, plus selection and history state
///
/// Every mutation goes through [`Document::change`]. When the outermost
/// change closes, the consistency fixer repairs list attributes, the version
/// is bumped if anything changed, and events are queued, in that order, so an
/// observer never sees an inconsistent list.
///
/// ```rust
/// # use listflow_engine::editing::{Cmd, Document, SequenceIds};
/// # use listflow_engine::models::{Block, ListType, Position, Selection};
/// let mut doc = Document::with_id_source(
///     vec![
///         Block::list_item("a", ListType::Bulleted, 0, "x"),
///         Block::list_item("b", ListType::Bulleted, 0, "y"),
///     ],
///     SequenceIds::default(),
/// );
/// doc.set_selection(Selection::collapsed(Position::new(1, 0)));
/// let patch = doc.apply(Cmd::Indent { blocks: None });
/// assert_eq!(patch.changed.len(), 1);
/// assert_eq!(doc.blocks()[1].indent(), Some(1));
/// ```
pub struct Document {
    pub(crate) blocks: Vec<Block>,
    /// Parallel to `blocks`
    pub(crate) handles: Vec<BlockId>,
    pub(crate) selection: Selection,
    pub(crate) version: u64,
    pub(crate) ids: Box<dyn IdSource>,
    pub(crate) txn: Transaction,
    next_handle: u64,
    /// Fixer repairs since the last `apply`, accumulated across transactions
    pub(crate) fixed_log: Vec<BlockId>,
    events: Vec<DocumentEvent>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("blocks", &self.blocks)
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Document minting uuid item ids. The blocks are taken as they are; call
    /// [`Document::normalize`] to repair malformed input.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self::with_id_source(blocks, UuidIds)
    }

    pub fn with_id_source(blocks: Vec<Block>, ids: impl IdSource + 'static) -> Self {
        let mut blocks = blocks;
        if blocks.is_empty() {
            blocks.push(Block::paragraph(""));
        }
        let handles = (0..blocks.len() as u64).map(BlockId).collect();
        Self {
            next_handle: blocks.len() as u64,
            blocks,
            handles,
            selection: Selection::collapsed(Position::new(0, 0)),
            version: 0,
            ids: Box::new(ids),
            txn: Transaction::default(),
            fixed_log: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Swap the id source, e.g. after loading configuration
    pub fn set_id_source(&mut self, ids: impl IdSource + 'static) {
        self.ids = Box::new(ids);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_ids(&self) -> &[BlockId] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: a document keeps at least one block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.handles.iter().position(|handle| *handle == id)
    }

    pub fn block_by_id(&self, id: BlockId) -> Option<&Block> {
        self.index_of(id).map(|index| &self.blocks[index])
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Move the selection; out of range positions are clamped
    pub fn set_selection(&mut self, selection: Selection) {
        self.change(|writer| writer.set_selection(selection));
    }

    /// Run the fixer over the whole document as its own transaction and
    /// return the repaired blocks
    pub fn normalize(&mut self) -> Vec<BlockId> {
        self.fixed_log.clear();
        self.change(|writer| writer.request_fix());
        std::mem::take(&mut self.fixed_log)
    }

    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: DocumentEvent) {
        self.events.push(event);
    }

    /// Open a transaction. Nested calls (also through [`Writer::change`])
    /// join the enclosing one; the fixer runs when the outermost one closes.
    pub fn change<R>(&mut self, f: impl FnOnce(&mut Writer<'_>) -> R) -> R {
        self.txn.depth += 1;
        let result = {
            let mut writer = Writer::new(self);
            f(&mut writer)
        };
        self.txn.depth -= 1;
        if self.txn.depth == 0 {
            self.close_transaction();
        }
        result
    }

    fn close_transaction(&mut self) {
        let txn = std::mem::take(&mut self.txn);
        let mut touched = txn.touched;
        let mut dirty = txn.dirty;

        if self.blocks.is_empty() {
            let handle = self.allocate_handle();
            self.blocks.push(Block::paragraph(""));
            self.handles.push(handle);
            touched.insert(handle);
            dirty = true;
        }

        if dirty || txn.force_fix {
            // Repairs run in a fresh transaction record so they do not
            // reopen this one
            self.txn.depth = 1;
            let fixed = fixer::fix(&mut Writer::new(self));
            self.txn = Transaction::default();
            if !fixed.is_empty() {
                debug!("fixer repaired {} block(s)", fixed.len());
                dirty = true;
            }
            touched.extend(fixed.iter().copied());
            self.fixed_log.extend(fixed);
        }

        let clamped = self.clamp_selection(self.selection);
        let selection_changed = txn.selection_changed || clamped != self.selection;
        self.selection = clamped;

        if dirty {
            self.version += 1;
            let blocks = self.in_document_order(touched);
            trace!("version {} touched {:?}", self.version, blocks);
            self.events.push(DocumentEvent::ContentChanged {
                version: self.version,
                blocks,
            });
        }
        if selection_changed {
            self.events.push(DocumentEvent::SelectionChanged {
                selection: self.selection,
            });
        }
    }

    pub(crate) fn allocate_handle(&mut self) -> BlockId {
        let handle = BlockId(self.next_handle);
        self.next_handle += 1;
        handle
    }

    pub(crate) fn clamp_position(&self, position: Position) -> Position {
        let block = position.block.min(self.blocks.len().saturating_sub(1));
        let offset = self
            .blocks
            .get(block)
            .map_or(0, |b| position.offset.min(b.len()));
        Position::new(block, offset)
    }

    pub(crate) fn clamp_selection(&self, selection: Selection) -> Selection {
        Selection::range(
            self.clamp_position(selection.anchor),
            self.clamp_position(selection.focus),
        )
    }

    /// Keep the handles that still exist, ordered as the blocks are
    pub(crate) fn in_document_order(&self, ids: impl IntoIterator<Item = BlockId>) -> Vec<BlockId> {
        let wanted: HashSet<BlockId> = ids.into_iter().collect();
        self.handles
            .iter()
            .copied()
            .filter(|handle| wanted.contains(handle))
            .collect()
    }
}
