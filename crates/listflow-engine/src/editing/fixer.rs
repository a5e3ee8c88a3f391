//! Post-change consistency fixer
//!
//! Runs once when the outermost transaction closes and applies the minimal
//! attribute corrections that restore the list invariants. It never inserts
//! or deletes blocks, and running it on its own output changes nothing.

use std::collections::{BTreeSet, HashSet};

use log::trace;

use crate::editing::walker;
use crate::editing::writer::Writer;
use crate::models::{BlockId, ListItemId};

/// Repair the whole document; returns the blocks that changed, in order
pub(crate) fn fix(writer: &mut Writer<'_>) -> Vec<BlockId> {
    let mut changed = BTreeSet::new();
    strip_objects(writer, &mut changed);
    fix_indents(writer, &mut changed);
    fix_item_ids(writer, &mut changed);

    let mut ordered: Vec<(usize, BlockId)> = changed
        .into_iter()
        .filter_map(|index| writer.block_id(index).map(|id| (index, id)))
        .collect();
    ordered.sort_unstable();
    ordered.into_iter().map(|(_, id)| id).collect()
}

fn strip_objects(writer: &mut Writer<'_>, changed: &mut BTreeSet<usize>) {
    for index in 0..writer.len() {
        let block = &writer.blocks()[index];
        if !block.is_listable() && block.is_list() {
            trace!("block {index}: objects cannot be list items");
            writer.remove_list(index);
            changed.insert(index);
        }
    }
}

/// Clamp indents so that no block is more than one level below the one
/// before it, keeping the relative nesting of an over-indented streak
fn fix_indents(writer: &mut Writer<'_>, changed: &mut BTreeSet<usize>) {
    let mut max_indent = 0;
    let mut previous: Option<usize> = None;
    let mut fix_by: Option<usize> = None;

    for index in 0..writer.len() {
        let Some(indent) = writer.blocks()[index].indent() else {
            max_indent = 0;
            previous = None;
            fix_by = None;
            continue;
        };
        let limit = previous.map_or(0, |p| p + 1);

        let new_indent = if indent > max_indent {
            let by = match fix_by {
                None => indent - max_indent,
                Some(by) => by.min(indent),
            };
            fix_by = Some(by);
            (indent - by).min(limit)
        } else {
            fix_by = None;
            max_indent = indent + 1;
            if indent > limit {
                fix_by = Some(indent - limit);
                limit
            } else {
                indent
            }
        };

        if new_indent != indent {
            trace!("block {index}: indent {indent} -> {new_indent}");
            writer.set_indent(index, new_indent);
            changed.insert(index);
        }
        previous = Some(new_indent);
    }
}

/// Give every logical item an id of its own and a single list type
fn fix_item_ids(writer: &mut Writer<'_>, changed: &mut BTreeSet<usize>) {
    let mut seen: HashSet<ListItemId> = HashSet::new();
    let mut visited = vec![false; writer.len()];

    for start in 0..writer.len() {
        if visited[start] {
            continue;
        }
        let Some(first) = walker::list_at(writer.blocks(), start).cloned() else {
            continue;
        };
        let mut id = first.item_id.clone();
        if seen.contains(&id) {
            id = writer.mint_id();
            trace!("block {start}: item id {} already used, now {id}", first.item_id);
        }
        let mut running = first.list_type;

        for index in walker::item_blocks_from(writer.blocks(), start) {
            visited[index] = true;
            let Some(list) = walker::list_at(writer.blocks(), index).cloned() else {
                continue;
            };
            if list.kind() != running.kind() {
                seen.insert(id);
                id = writer.mint_id();
                running = list.list_type;
                trace!("block {index}: list type changes inside item, new id {id}");
            } else if list.list_type != running && writer.set_list_type(index, running) {
                changed.insert(index);
            }
            if list.item_id != id && writer.set_item_id(index, id.clone()) {
                changed.insert(index);
            }
        }
        seen.insert(id);
    }
}
