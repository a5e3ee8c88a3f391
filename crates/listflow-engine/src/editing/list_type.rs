use std::collections::BTreeSet;
use std::ops::Range;

use log::debug;

use crate::editing::patch::{ListCommand, Outcome};
use crate::editing::walker;
use crate::editing::writer::Writer;
use crate::models::{ListAttributes, ListKind, ListType};

/// Blocks the selection (or `range`) covers
fn selected_blocks(writer: &Writer<'_>, range: Option<Range<usize>>) -> Vec<usize> {
    let range = range.unwrap_or_else(|| {
        let blocks = writer.selection().blocks();
        *blocks.start()..*blocks.end() + 1
    });
    range.filter(|&index| index < writer.len()).collect()
}

pub(crate) fn remove_list(writer: &mut Writer<'_>, range: Option<Range<usize>>) -> Outcome {
    let selected = walker::selected_list_blocks(writer.blocks(), writer.selection(), range);
    if selected.is_empty() {
        debug!("remove list: selection is not in a list");
        return Outcome::none();
    }
    let changed = strip_items(writer, &selected);
    Outcome::executed(ListCommand::RemoveList, writer.handles_of(changed))
}

fn strip_items(writer: &mut Writer<'_>, selected: &[usize]) -> BTreeSet<usize> {
    let blocks = walker::expand_to_complete_items(writer.blocks(), selected, false);
    let mut changed = BTreeSet::new();
    for &index in &blocks {
        if writer.remove_list(index) {
            changed.insert(index);
        }
    }
    if let Some(&last) = blocks.last() {
        changed.extend(outdent_following_items(writer, last));
    }
    changed
}

/// Re-base the items after a removed one so that the first of them starts
/// a new list at depth 0 and the others keep their relative nesting, up to
/// the next depth-0 item
fn outdent_following_items(writer: &mut Writer<'_>, last: usize) -> Vec<usize> {
    let mut changed = Vec::new();
    let mut base = usize::MAX;
    for index in last + 1..writer.len() {
        let Some(indent) = writer.blocks()[index].indent() else {
            break;
        };
        if indent == 0 {
            break;
        }
        base = base.min(indent);
        if writer.set_indent(index, indent - base) {
            changed.push(index);
        }
    }
    changed
}

/// Turn the selection into a list of `kind`, or take it out of the list
/// when it already is one
pub(crate) fn set_list_type(
    writer: &mut Writer<'_>,
    kind: ListKind,
    range: Option<Range<usize>>,
) -> Outcome {
    let selected = selected_blocks(writer, range);
    let listable: Vec<usize> = selected
        .into_iter()
        .filter(|&index| writer.blocks()[index].is_listable())
        .collect();
    if listable.is_empty() {
        debug!("set list type: nothing listable selected");
        return Outcome::none();
    }

    let already = listable
        .iter()
        .all(|&index| walker::list_at(writer.blocks(), index).is_some_and(|l| l.kind() == kind));
    if already {
        let changed = strip_items(writer, &listable);
        return Outcome::executed(ListCommand::RemoveList, writer.handles_of(changed));
    }

    let mut changed = BTreeSet::new();
    for &index in &listable {
        if writer.blocks()[index].is_list() {
            for block in walker::expand_to_complete_items(writer.blocks(), &[index], false) {
                let Some(current) = walker::list_at(writer.blocks(), block).map(|l| l.list_type)
                else {
                    continue;
                };
                if current.kind() != kind && writer.set_list_type(block, kind.default_type()) {
                    changed.insert(block);
                }
            }
        } else {
            let id = writer.mint_id();
            let list = ListAttributes::new(kind.default_type(), 0, id);
            if writer.set_list(index, Some(list)) {
                changed.insert(index);
            }
        }
    }
    Outcome::executed(ListCommand::SetListType, writer.handles_of(changed))
}

/// Check every selected task item, or uncheck them all when all are done
pub(crate) fn toggle_checked(writer: &mut Writer<'_>, range: Option<Range<usize>>) -> Outcome {
    let selected = walker::selected_list_blocks(writer.blocks(), writer.selection(), range);
    let items: Vec<usize> = walker::expand_to_complete_items(writer.blocks(), &selected, false)
        .into_iter()
        .filter(|&index| {
            walker::list_at(writer.blocks(), index).is_some_and(|l| l.kind() == ListKind::Checkable)
        })
        .collect();
    if items.is_empty() {
        debug!("toggle checked: no task items selected");
        return Outcome::none();
    }
    let all_checked = items
        .iter()
        .all(|&index| walker::list_at(writer.blocks(), index).is_some_and(|l| l.list_type.is_checked()));
    let target = ListType::Checkable {
        checked: !all_checked,
    };
    let changed: Vec<usize> = items
        .into_iter()
        .filter(|&index| writer.set_list_type(index, target))
        .collect();
    Outcome::executed(ListCommand::ToggleChecked, writer.handles_of(changed))
}
