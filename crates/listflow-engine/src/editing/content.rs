//! Generic edits the list behaviour composes with
//!
//! Nothing here knows about list items; list attributes simply travel with
//! the blocks and the fixer sorts out the rest when the transaction closes.

use crate::editing::writer::Writer;
use crate::models::{Block, Position, Selection};

/// Remove the selected content and collapse the selection at its start.
///
/// A multi-block range covering the entire document leaves a single empty
/// paragraph. Otherwise the blocks strictly inside the range go, the edge
/// blocks are trimmed and, unless `leave_unmerged`, the end block is merged
/// into the start block, which keeps its attributes.
pub fn delete_content(writer: &mut Writer<'_>, range: Selection, leave_unmerged: bool) -> Position {
    let start = writer.clamp_position(range.start());
    let end = writer.clamp_position(range.end());

    if start.block == end.block {
        writer.delete_text(start.block, start.offset..end.offset);
        writer.set_selection(Selection::collapsed(start));
        return start;
    }

    let last = writer.len() - 1;
    let covers_document = start == Position::new(0, 0)
        && end.block == last
        && end.offset == writer.blocks()[last].len();
    if covers_document {
        writer.remove_blocks(0..writer.len());
        writer.insert_block(0, Block::paragraph(""));
        let origin = Position::new(0, 0);
        writer.set_selection(Selection::collapsed(origin));
        return origin;
    }

    writer.delete_text(start.block, start.offset..usize::MAX);
    writer.delete_text(end.block, 0..end.offset);
    writer.remove_blocks(start.block + 1..end.block);
    if !leave_unmerged {
        writer.merge_into_previous(start.block + 1);
    }
    writer.set_selection(Selection::collapsed(start));
    start
}

/// Plain block break at `at`; the cursor moves to the start of the new block
pub fn break_block(writer: &mut Writer<'_>, at: Position) -> Position {
    let index = writer.split_block(at);
    let cursor = Position::new(index, 0);
    writer.set_selection(Selection::collapsed(cursor));
    cursor
}

/// Type `text` at `at` and put the cursor after it
pub fn insert_text(writer: &mut Writer<'_>, at: Position, text: &str) -> Position {
    let at = writer.clamp_position(at);
    writer.insert_text(at, text);
    let cursor = writer.clamp_position(Position::new(at.block, at.offset + text.chars().count()));
    writer.set_selection(Selection::collapsed(cursor));
    cursor
}
