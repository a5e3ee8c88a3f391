//! Item splitting and the structural meaning of "enter" inside lists

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::editing::content::{break_block, delete_content};
use crate::editing::document::Document;
use crate::editing::indent::outdent;
use crate::editing::patch::{ListCommand, Outcome};
use crate::editing::walker;
use crate::editing::writer::Writer;
use crate::models::{Position, Selection};

/// Which part of the item becomes the new item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitDirection {
    /// The block itself and what follows it
    Before,
    /// Only the blocks after it
    After,
}

/// Give the block at `index` and the rest of its item a fresh id
pub(crate) fn split_item_before(writer: &mut Writer<'_>, index: usize) -> Vec<usize> {
    let blocks = walker::item_blocks_from(writer.blocks(), index);
    let id = writer.mint_id();
    debug!("splitting item at block {index} into {id}");
    blocks
        .into_iter()
        .filter(|&block| writer.set_item_id(block, id.clone()))
        .collect()
}

pub(crate) fn split_item(
    writer: &mut Writer<'_>,
    direction: SplitDirection,
    range: Option<Range<usize>>,
) -> Outcome {
    let selection = writer.selection();
    if range.is_none() && !selection.is_collapsed() {
        debug!("split: selection is not collapsed");
        return Outcome::none();
    }
    let index = range.map_or(selection.focus.block, |r| r.start);
    if walker::list_at(writer.blocks(), index).is_none() {
        debug!("split: block {index} is not a list block");
        return Outcome::none();
    }
    let changed = match direction {
        SplitDirection::Before => {
            if walker::is_first_block_of_item(writer.blocks(), index) {
                debug!("split: block {index} already starts its item");
                return Outcome::none();
            }
            split_item_before(writer, index)
        }
        SplitDirection::After => {
            let item = walker::item_blocks_from(writer.blocks(), index);
            let Some(&next) = item.get(1) else {
                debug!("split: block {index} already ends its item");
                return Outcome::none();
            };
            split_item_before(writer, next)
        }
    };
    Outcome::executed(ListCommand::SplitItem, writer.handles_of(changed))
}

/// Structural enter. Runs up to two transactions: the break itself, then,
/// once the fixer has settled it, promoting the new block to its own item.
pub(crate) fn enter(doc: &mut Document) -> Outcome {
    let selection = doc.selection();
    let cursor = selection.focus;

    if selection.is_collapsed()
        && let Some(block) = doc.blocks().get(cursor.block)
        && block.is_list()
        && block.is_empty()
    {
        let first = walker::is_first_block_of_item(doc.blocks(), cursor.block);
        let last = walker::is_last_block_of_item(doc.blocks(), cursor.block);
        if first && last {
            debug!("enter: empty item, outdenting");
            return doc.change(|writer| outdent(writer, None));
        }
        if last {
            debug!("enter: empty trailing block, splitting item");
            return doc.change(|writer| split_item(writer, SplitDirection::Before, None));
        }
    }

    let cursor = doc.change(|writer| generic_enter(writer, selection));

    let blocks = doc.blocks();
    if walker::list_at(blocks, cursor.block).is_some()
        && !walker::is_first_block_of_item(blocks, cursor.block)
        && walker::item_blocks(blocks, cursor.block).len() == 2
    {
        debug!("enter: second block of a one-block item becomes a new item");
        return doc.change(|writer| split_item(writer, SplitDirection::Before, None));
    }
    Outcome::none()
}

/// Block break that knows nothing about lists
fn generic_enter(writer: &mut Writer<'_>, selection: Selection) -> Position {
    if selection.is_collapsed() {
        return break_block(writer, selection.focus);
    }
    let start = writer.clamp_position(selection.start());
    let end = writer.clamp_position(selection.end());
    let end_len = writer.blocks()[end.block].len();
    let leave_unmerged = !(start.offset == 0 && end.offset == end_len);
    let within_one_block = start.block == end.block;

    let cursor = delete_content(writer, selection, leave_unmerged);
    if !leave_unmerged {
        return cursor;
    }
    if within_one_block {
        return break_block(writer, cursor);
    }
    let cursor = Position::new(start.block + 1, 0);
    writer.set_selection(Selection::collapsed(cursor));
    cursor
}
