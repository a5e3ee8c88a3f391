use std::ops::Range;

use log::debug;

use crate::editing::document::Document;
use crate::editing::ids::{IdSource, UuidIds};
use crate::models::block::byte_index;
use crate::models::{Block, BlockId, BlockKind, ListAttributes, ListItemId, ListType, Position, Selection};

/// Give up on a source that keeps returning taken ids after this many tries
const MINT_ATTEMPTS: usize = 64;

/// Mutation handle passed into [`Document::change`]
///
/// Every primitive records which blocks it touched so the transaction can
/// report them; list attributes written here are not validated until the
/// outermost transaction closes.
pub struct Writer<'a> {
    doc: &'a mut Document,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(doc: &'a mut Document) -> Self {
        Self { doc }
    }

    /// Nested transaction; joins the one this writer belongs to
    pub fn change<R>(&mut self, f: impl FnOnce(&mut Writer<'_>) -> R) -> R {
        self.doc.change(f)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.doc.blocks
    }

    pub fn len(&self) -> usize {
        self.doc.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.blocks.is_empty()
    }

    pub fn block_id(&self, index: usize) -> Option<BlockId> {
        self.doc.handles.get(index).copied()
    }

    pub(crate) fn handles_of(&self, indices: impl IntoIterator<Item = usize>) -> Vec<BlockId> {
        indices
            .into_iter()
            .filter_map(|index| self.block_id(index))
            .collect()
    }

    pub fn selection(&self) -> Selection {
        self.doc.selection
    }

    pub fn clamp_position(&self, position: Position) -> Position {
        self.doc.clamp_position(position)
    }

    fn touch(&mut self, index: usize) {
        self.doc.txn.dirty = true;
        if let Some(handle) = self.doc.handles.get(index) {
            self.doc.txn.touched.insert(*handle);
        }
    }

    pub(crate) fn request_fix(&mut self) {
        self.doc.txn.force_fix = true;
    }

    /// Replace the list attributes of a block; returns whether anything changed
    pub fn set_list(&mut self, index: usize, list: Option<ListAttributes>) -> bool {
        let Some(block) = self.doc.blocks.get_mut(index) else {
            return false;
        };
        if block.list == list {
            return false;
        }
        block.list = list;
        self.touch(index);
        true
    }

    pub fn remove_list(&mut self, index: usize) -> bool {
        self.set_list(index, None)
    }

    pub fn set_indent(&mut self, index: usize, indent: usize) -> bool {
        self.update_list(index, |list| list.indent = indent)
    }

    pub fn set_item_id(&mut self, index: usize, item_id: ListItemId) -> bool {
        self.update_list(index, |list| list.item_id = item_id)
    }

    pub fn set_list_type(&mut self, index: usize, list_type: ListType) -> bool {
        self.update_list(index, |list| list.list_type = list_type)
    }

    /// Edit the attributes of a list block; plain blocks are left alone
    fn update_list(&mut self, index: usize, edit: impl FnOnce(&mut ListAttributes)) -> bool {
        let Some(current) = self.doc.blocks.get(index).and_then(|b| b.list.clone()) else {
            return false;
        };
        let mut updated = current.clone();
        edit(&mut updated);
        if updated == current {
            return false;
        }
        self.set_list(index, Some(updated))
    }

    pub fn insert_block(&mut self, index: usize, block: Block) -> BlockId {
        let index = index.min(self.doc.blocks.len());
        let handle = self.doc.allocate_handle();
        self.doc.blocks.insert(index, block);
        self.doc.handles.insert(index, handle);
        self.touch(index);
        handle
    }

    pub fn remove_blocks(&mut self, range: Range<usize>) {
        let end = range.end.min(self.doc.blocks.len());
        let start = range.start.min(end);
        if start == end {
            return;
        }
        self.doc.blocks.drain(start..end);
        self.doc.handles.drain(start..end);
        self.doc.txn.dirty = true;
    }

    pub fn insert_text(&mut self, at: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = self.doc.clamp_position(at);
        let block = &mut self.doc.blocks[at.block];
        if !block.is_listable() {
            return;
        }
        let idx = byte_index(&block.text, at.offset);
        block.text.insert_str(idx, text);
        self.touch(at.block);
    }

    /// Delete the characters `range` of a block
    pub fn delete_text(&mut self, index: usize, range: Range<usize>) {
        let Some(block) = self.doc.blocks.get_mut(index) else {
            return;
        };
        let start = byte_index(&block.text, range.start);
        let end = byte_index(&block.text, range.end.max(range.start));
        if start == end {
            return;
        }
        block.text.replace_range(start..end, "");
        self.touch(index);
    }

    /// Cut the block at `at`; the tail becomes a new block right after it
    /// with the same kind and list attributes. Splitting an object instead
    /// opens an empty paragraph after it. Returns the new block's index.
    pub fn split_block(&mut self, at: Position) -> usize {
        let at = self.doc.clamp_position(at);
        let block = &mut self.doc.blocks[at.block];
        let tail = if block.is_listable() {
            let idx = byte_index(&block.text, at.offset);
            Block {
                kind: block.kind.clone(),
                text: block.text.split_off(idx),
                list: block.list.clone(),
            }
        } else {
            Block::paragraph("")
        };
        self.touch(at.block);
        self.insert_block(at.block + 1, tail);
        at.block + 1
    }

    /// Append the text of block `index` to the block before it and remove it.
    /// The previous block keeps its attributes. Objects do not merge.
    pub fn merge_into_previous(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.doc.blocks.len() {
            return false;
        }
        let mergeable = |b: &Block| matches!(b.kind, BlockKind::Paragraph);
        if !mergeable(&self.doc.blocks[index]) || !mergeable(&self.doc.blocks[index - 1]) {
            return false;
        }
        let text = std::mem::take(&mut self.doc.blocks[index].text);
        self.doc.blocks[index - 1].text.push_str(&text);
        self.touch(index - 1);
        self.remove_blocks(index..index + 1);
        true
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let selection = self.doc.clamp_selection(selection);
        if selection != self.doc.selection {
            self.doc.selection = selection;
            self.doc.txn.selection_changed = true;
        }
    }

    /// A list item id not used by any block of the document, nor handed out
    /// earlier in this transaction
    pub fn mint_id(&mut self) -> ListItemId {
        for _ in 0..MINT_ATTEMPTS {
            let id = self.doc.ids.next_id();
            if !self.id_taken(&id) {
                self.doc.txn.minted.insert(id.clone());
                return id;
            }
        }
        debug!("id source keeps colliding, falling back to uuid ids");
        loop {
            let id = UuidIds.next_id();
            if !self.id_taken(&id) {
                self.doc.txn.minted.insert(id.clone());
                return id;
            }
        }
    }

    fn id_taken(&self, id: &ListItemId) -> bool {
        self.doc.txn.minted.contains(id)
            || self
                .doc
                .blocks
                .iter()
                .any(|b| b.list.as_ref().is_some_and(|list| &list.item_id == id))
    }
}
