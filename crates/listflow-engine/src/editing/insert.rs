//! Reconciling foreign content with the list it lands in
//!
//! Pasted blocks arrive with indents relative to their own source and ids
//! that may clash with the document. They are re-based onto the item at the
//! insertion point, given fresh ids, and spliced in; the fixer clamps
//! whatever is left when the transaction closes.

use std::collections::HashMap;
use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::editing::content::delete_content;
use crate::editing::ids::SequenceIds;
use crate::editing::patch::{ListCommand, Outcome};
use crate::editing::snapshot::{TreeNode, flatten};
use crate::editing::walker;
use crate::editing::writer::Writer;
use crate::models::{Block, InsertionPoint, ListItemId, Position, Selection};

/// Flat blocks to be inserted into a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub blocks: Vec<Block>,
}

impl Fragment {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Flatten a nested tree. Items without ids get placeholders, which are
    /// replaced on insertion like every other fragment id.
    pub fn from_tree(nodes: &[TreeNode]) -> Self {
        Self::new(flatten(nodes, &mut SequenceIds::new("fragment-")))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Fresh document ids for fragment ids, minted in order of first use
struct IdMap {
    fresh: HashMap<ListItemId, ListItemId>,
}

impl IdMap {
    fn new() -> Self {
        Self {
            fresh: HashMap::new(),
        }
    }

    fn remint(&mut self, writer: &mut Writer<'_>, mut block: Block) -> Block {
        if let Some(list) = block.list.as_mut() {
            let fresh = match self.fresh.get(&list.item_id) {
                Some(id) => id.clone(),
                None => {
                    let id = writer.mint_id();
                    self.fresh.insert(list.item_id.clone(), id.clone());
                    id
                }
            };
            list.item_id = fresh;
        }
        block
    }
}

/// Shift the leading run of list blocks so the fragment starts at the
/// reference item's depth
fn rebase(blocks: &mut [Block], reference_indent: usize) {
    let first_indent = blocks.first().and_then(Block::indent).unwrap_or(0);
    let diff = reference_indent.saturating_sub(first_indent);
    if diff == 0 {
        return;
    }
    for block in blocks.iter_mut() {
        let Some(list) = block.list.as_mut() else {
            break;
        };
        list.indent += diff;
    }
}

/// Paste `fragment` at `at`, or over the current selection
pub(crate) fn insert_content(
    writer: &mut Writer<'_>,
    fragment: &Fragment,
    at: Option<InsertionPoint>,
) -> Outcome {
    if fragment.is_empty() {
        debug!("insert: empty fragment");
        return Outcome::none();
    }
    let at = match at {
        Some(point) => point,
        None => {
            let selection = writer.selection();
            let cursor = if selection.is_collapsed() {
                selection.focus
            } else {
                delete_content(writer, selection, false)
            };
            InsertionPoint::InBlock(cursor)
        }
    };

    let mut blocks = fragment.blocks.clone();
    for block in blocks.iter_mut().filter(|b| !b.is_listable()) {
        block.list = None;
    }

    let reference = match at {
        InsertionPoint::InBlock(position) => {
            let position = writer.clamp_position(position);
            walker::list_at(writer.blocks(), position.block)
        }
        InsertionPoint::BetweenBlocks(index) => index
            .checked_sub(1)
            .and_then(|before| walker::list_at(writer.blocks(), before)),
    };
    if let Some(reference) = reference.map(|list| list.indent) {
        rebase(&mut blocks, reference);
    }

    let inserted = match at {
        InsertionPoint::BetweenBlocks(index) => {
            insert_between(writer, blocks, index.min(writer.len()))
        }
        InsertionPoint::InBlock(position) => {
            let position = writer.clamp_position(position);
            if writer.blocks()[position.block].is_listable() {
                splice_into(writer, blocks, position)
            } else {
                insert_between(writer, blocks, position.block + 1)
            }
        }
    };
    debug!("inserted fragment into {} block(s)", inserted.len());
    Outcome::executed(ListCommand::InsertContent, writer.handles_of(inserted))
}

fn insert_between(writer: &mut Writer<'_>, blocks: Vec<Block>, index: usize) -> Vec<usize> {
    let mut ids = IdMap::new();
    let mut inserted = Vec::new();
    for (offset, block) in blocks.into_iter().enumerate() {
        let block = ids.remint(writer, block);
        writer.insert_block(index + offset, block);
        inserted.push(index + offset);
    }
    if let Some(&last) = inserted.last() {
        let end = Position::new(last, writer.blocks()[last].len());
        writer.set_selection(Selection::collapsed(end));
    }
    inserted
}

/// Splice into the text of a block. The first fragment block merges into
/// the left half; the right half joins the last fragment block unless that
/// is an object.
fn splice_into(writer: &mut Writer<'_>, blocks: Vec<Block>, at: Position) -> Vec<usize> {
    if let [single] = blocks.as_slice()
        && single.is_listable()
    {
        writer.insert_text(at, &single.text);
        let end = Position::new(at.block, at.offset + single.len());
        writer.set_selection(Selection::collapsed(end));
        return vec![at.block];
    }

    let right = writer.split_block(at);
    let right_text = writer.blocks()[right].text.clone();
    let mut ids = IdMap::new();
    let mut inserted = Vec::new();
    let mut next = right;
    let mut cursor = Position::new(right, 0);
    let count = blocks.len();

    for (position, block) in blocks.into_iter().enumerate() {
        let is_first = position == 0;
        let is_last = position + 1 == count;
        if is_first && block.is_listable() {
            let end = Position::new(at.block, at.offset);
            writer.insert_text(end, &block.text);
            cursor = Position::new(at.block, at.offset + block.len());
            inserted.push(at.block);
            continue;
        }
        let mut block = ids.remint(writer, block);
        if is_last && block.is_listable() {
            cursor = Position::new(next, block.len());
            block.text.push_str(&right_text);
            writer.insert_block(next, block);
            writer.remove_blocks(next + 1..next + 2);
        } else {
            writer.insert_block(next, block);
            cursor = Position::new(next + 1, 0);
        }
        inserted.push(next);
        next += 1;
    }
    writer.set_selection(Selection::collapsed(cursor));
    inserted
}

/// Blocks the host inserted by itself are treated as a pasted fragment
pub(crate) fn reconcile_inserted(writer: &mut Writer<'_>, range: Range<usize>) -> Outcome {
    let end = range.end.min(writer.len());
    let start = range.start.min(end);
    if start == end {
        return Outcome::none();
    }
    let fragment = Fragment::new(writer.blocks()[start..end].to_vec());
    writer.remove_blocks(start..end);
    insert_content(writer, &fragment, Some(InsertionPoint::BetweenBlocks(start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Document, SequenceIds};
    use crate::models::ListType;
    use pretty_assertions::assert_eq;

    fn item(text: &str, indent: usize, id: &str) -> Block {
        Block::list_item(text, ListType::Bulleted, indent, id)
    }

    #[test]
    fn test_empty_fragment_is_noop() {
        let mut doc = Document::with_id_source(vec![item("a", 0, "a")], SequenceIds::default());
        let outcome = doc.change(|w| insert_content(w, &Fragment::default(), None));
        assert!(outcome.executed.is_none());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_single_block_merges_inline() {
        let mut doc = Document::with_id_source(vec![item("ab", 0, "a")], SequenceIds::default());
        let fragment = Fragment::new(vec![item("X", 0, "x")]);
        let at = InsertionPoint::InBlock(Position::new(0, 1));
        doc.change(|w| insert_content(w, &fragment, Some(at)));
        assert_eq!(doc.blocks(), &[item("aXb", 0, "a")]);
        assert_eq!(doc.selection(), Selection::collapsed(Position::new(0, 2)));
    }

    #[test]
    fn test_object_keeps_right_half_apart() {
        let mut doc = Document::with_id_source(vec![item("AB", 0, "a")], SequenceIds::default());
        let fragment = Fragment::new(vec![item("x", 0, "x"), Block::object("rule")]);
        let at = InsertionPoint::InBlock(Position::new(0, 1));
        doc.change(|w| insert_content(w, &fragment, Some(at)));
        assert_eq!(
            doc.blocks(),
            &[item("Ax", 0, "a"), Block::object("rule"), item("B", 0, "a00")]
        );
    }

    #[test]
    fn test_host_inserted_blocks_are_rebased() {
        let mut doc = Document::with_id_source(
            vec![item("a", 0, "a"), item("b", 1, "b"), item("x", 0, "b")],
            SequenceIds::default(),
        );
        let outcome = doc.change(|w| reconcile_inserted(w, 2..3));
        assert_eq!(outcome.changed.len(), 1);
        assert_eq!(doc.blocks()[2], item("x", 1, "a00"));
    }
}
