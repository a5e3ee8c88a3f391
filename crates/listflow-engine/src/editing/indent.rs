//! Indent and outdent of list items together with their descendants

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use log::debug;

use crate::editing::patch::{ListCommand, Outcome};
use crate::editing::split::split_item_before;
use crate::editing::walker;
use crate::editing::writer::Writer;

pub(crate) fn indent(writer: &mut Writer<'_>, range: Option<Range<usize>>) -> Outcome {
    let selected = walker::selected_list_blocks(writer.blocks(), writer.selection(), range);
    let Some(&first) = selected.first() else {
        debug!("indent: selection is not in a list");
        return Outcome::none();
    };
    let mut changed = BTreeSet::new();

    if walker::is_single_item(writer.blocks(), &selected)
        && !walker::is_first_block_of_item(writer.blocks(), first)
    {
        // Trailing blocks of an item become a sub-item of it
        for &index in &selected {
            let indent = writer.blocks()[index].indent().unwrap_or(0);
            if writer.set_indent(index, indent + 1) {
                changed.insert(index);
            }
        }
        changed.extend(split_item_before(writer, first));
    } else {
        let blocks = walker::expand_to_complete_items(writer.blocks(), &selected, true);
        let Some(&head) = blocks.first() else {
            return Outcome::none();
        };
        if walker::previous_sibling(writer.blocks(), head).is_none() {
            debug!("indent: block {head} has no previous sibling to nest under");
            return Outcome::none();
        }
        for &index in &blocks {
            let indent = writer.blocks()[index].indent().unwrap_or(0);
            if writer.set_indent(index, indent + 1) {
                changed.insert(index);
            }
        }
    }

    align_with_siblings(writer, &changed);
    Outcome::executed(ListCommand::Indent, writer.handles_of(changed))
}

pub(crate) fn outdent(writer: &mut Writer<'_>, range: Option<Range<usize>>) -> Outcome {
    let selected = walker::selected_list_blocks(writer.blocks(), writer.selection(), range);
    let Some(&first) = selected.first() else {
        debug!("outdent: selection is not in a list");
        return Outcome::none();
    };

    let changed = if walker::is_single_item(writer.blocks(), &selected)
        && !walker::is_first_block_of_item(writer.blocks(), first)
    {
        split_item_before(writer, first).into_iter().collect()
    } else {
        let blocks = walker::expand_to_complete_items(writer.blocks(), &selected, true);
        outdent_with_merge(writer, &blocks)
    };

    align_with_siblings(writer, &changed);
    Outcome::executed(ListCommand::Outdent, writer.handles_of(changed))
}

/// Move `blocks` one level up. Depth-0 blocks leave the list; an item at the
/// shallowest selected level whose parent item goes on after it is merged
/// into that parent.
fn outdent_with_merge(writer: &mut Writer<'_>, blocks: &[usize]) -> BTreeSet<usize> {
    let mut changed = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let reference = blocks
        .iter()
        .filter_map(|&index| writer.blocks()[index].indent())
        .min()
        .unwrap_or(0);
    // Parents are looked up before the structure starts moving
    let parents: HashMap<usize, Option<usize>> = blocks
        .iter()
        .map(|&index| (index, walker::parent(writer.blocks(), index)))
        .collect();

    for &index in blocks {
        if !visited.insert(index) {
            continue;
        }
        let Some(indent) = writer.blocks()[index].indent() else {
            continue;
        };
        if indent == 0 {
            if writer.remove_list(index) {
                changed.insert(index);
            }
            continue;
        }
        if indent == reference
            && let Some(parent) = parents.get(&index).copied().flatten()
        {
            let merged = merge_into_parent_if_not_last(writer, index, parent);
            if !merged.is_empty() {
                visited.extend(merged.iter().copied());
                changed.extend(merged);
                continue;
            }
        }
        if writer.set_indent(index, indent - 1) {
            changed.insert(index);
        }
    }
    changed
}

/// Merge the item starting at `index` into the item of `parent` when the
/// parent has blocks after it; returns the blocks that changed
fn merge_into_parent_if_not_last(writer: &mut Writer<'_>, index: usize, parent: usize) -> Vec<usize> {
    let parent_blocks = walker::item_blocks_from(writer.blocks(), parent);
    if parent_blocks.last().is_none_or(|&last| last < index) {
        return Vec::new();
    }
    let Some(attributes) = walker::list_at(writer.blocks(), parent).cloned() else {
        return Vec::new();
    };
    let item = walker::item_blocks_from(writer.blocks(), index);
    debug!("outdent: merging block {index} into parent item {}", attributes.item_id);
    for &block in &item {
        writer.set_list(block, Some(attributes.clone()));
    }
    item
}

/// Changed list blocks take the list kind of their previous sibling
fn align_with_siblings(writer: &mut Writer<'_>, changed: &BTreeSet<usize>) {
    for &index in changed {
        let Some(own) = walker::list_at(writer.blocks(), index).map(|list| list.list_type) else {
            continue;
        };
        let Some(sibling) = walker::previous_sibling(writer.blocks(), index) else {
            continue;
        };
        let Some(kind) = walker::list_at(writer.blocks(), sibling).map(|list| list.kind()) else {
            continue;
        };
        if kind != own.kind() {
            writer.set_list_type(index, kind.default_type());
        }
    }
}
