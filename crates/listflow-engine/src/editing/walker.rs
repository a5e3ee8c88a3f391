//! Derived queries over the flat block sequence
//!
//! A logical item is never stored: it is the set of blocks with one item id
//! at one indent, reached by walking siblings while skipping deeper blocks
//! and stopping at a shallower block, a plain block, or a same-indent block
//! of another item.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::models::{Block, ListAttributes, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

fn step(index: usize, direction: Direction, len: usize) -> Option<usize> {
    match direction {
        Direction::Backward => index.checked_sub(1),
        Direction::Forward => (index + 1 < len).then_some(index + 1),
    }
}

/// Blocks of the item of `start` in walk order, `start` excluded.
///
/// With `nested`, deeper blocks met on the way are kept when a later block of
/// the item follows them; walking forward the trailing ones are kept too
/// since they are the item's own descendants.
fn walk_item(blocks: &[Block], start: usize, direction: Direction, nested: bool) -> Vec<usize> {
    let Some(own) = list_at(blocks, start) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    let mut pending = Vec::new();
    let mut cursor = step(start, direction, blocks.len());
    while let Some(index) = cursor {
        let Some(list) = list_at(blocks, index) else {
            break;
        };
        if list.indent < own.indent {
            break;
        }
        if list.indent > own.indent {
            if nested {
                pending.push(index);
            }
        } else if list.item_id == own.item_id {
            found.append(&mut pending);
            found.push(index);
        } else {
            break;
        }
        cursor = step(index, direction, blocks.len());
    }
    if direction == Direction::Forward {
        found.append(&mut pending);
    }
    found
}

pub fn list_at(blocks: &[Block], index: usize) -> Option<&ListAttributes> {
    blocks.get(index).and_then(|b| b.list.as_ref())
}

/// All blocks of the logical item containing `index`, in document order
pub fn item_blocks(blocks: &[Block], index: usize) -> Vec<usize> {
    if list_at(blocks, index).is_none() {
        return Vec::new();
    }
    let mut all = walk_item(blocks, index, Direction::Backward, false);
    all.reverse();
    all.push(index);
    all.extend(walk_item(blocks, index, Direction::Forward, false));
    all
}

/// Blocks of the item from `index` on (inclusive)
pub fn item_blocks_from(blocks: &[Block], index: usize) -> Vec<usize> {
    if list_at(blocks, index).is_none() {
        return Vec::new();
    }
    let mut all = vec![index];
    all.extend(walk_item(blocks, index, Direction::Forward, false));
    all
}

pub fn is_first_block_of_item(blocks: &[Block], index: usize) -> bool {
    walk_item(blocks, index, Direction::Backward, false).is_empty()
}

pub fn is_last_block_of_item(blocks: &[Block], index: usize) -> bool {
    walk_item(blocks, index, Direction::Forward, false).is_empty()
}

/// Closest earlier block at the same indent within the same list, skipping
/// nested blocks
pub fn previous_sibling(blocks: &[Block], index: usize) -> Option<usize> {
    let own = list_at(blocks, index)?.indent;
    let mut cursor = index.checked_sub(1);
    while let Some(i) = cursor {
        let indent = list_at(blocks, i)?.indent;
        if indent < own {
            return None;
        }
        if indent == own {
            return Some(i);
        }
        cursor = i.checked_sub(1);
    }
    None
}

/// Closest earlier block one or more levels up
pub fn parent(blocks: &[Block], index: usize) -> Option<usize> {
    let own = list_at(blocks, index)?.indent;
    let mut cursor = index.checked_sub(1);
    while let Some(i) = cursor {
        if list_at(blocks, i)?.indent < own {
            return Some(i);
        }
        cursor = i.checked_sub(1);
    }
    None
}

/// Complete items covering `selected`; with `nested` the items' descendants
/// are included as well
pub fn expand_to_complete_items(blocks: &[Block], selected: &[usize], nested: bool) -> Vec<usize> {
    let mut all = BTreeSet::new();
    for &index in selected {
        if list_at(blocks, index).is_none() {
            continue;
        }
        all.insert(index);
        all.extend(walk_item(blocks, index, Direction::Backward, nested));
        all.extend(walk_item(blocks, index, Direction::Forward, nested));
    }
    all.into_iter().collect()
}

/// List blocks touched by the selection, or by an explicit block range
pub fn selected_list_blocks(
    blocks: &[Block],
    selection: Selection,
    range: Option<Range<usize>>,
) -> Vec<usize> {
    let range = range.unwrap_or_else(|| {
        let touched = selection.blocks();
        *touched.start()..touched.end() + 1
    });
    range
        .filter(|&index| list_at(blocks, index).is_some())
        .collect()
}

/// True when `indices` all belong to one logical item
pub fn is_single_item(blocks: &[Block], indices: &[usize]) -> bool {
    let Some(&first) = indices.first() else {
        return false;
    };
    let item = item_blocks(blocks, first);
    indices.iter().all(|index| item.contains(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn item(text: &str, indent: usize, id: &str) -> Block {
        Block::list_item(text, ListType::Bulleted, indent, id)
    }

    /// * a
    ///   * b
    ///   a2
    /// * c
    ///   * d
    fn sample() -> Vec<Block> {
        vec![
            item("a", 0, "a"),
            item("b", 1, "b"),
            item("a2", 0, "a"),
            item("c", 0, "c"),
            item("d", 1, "d"),
        ]
    }

    #[rstest]
    #[case(0, vec![0, 2])]
    #[case(2, vec![0, 2])]
    #[case(1, vec![1])]
    #[case(3, vec![3])]
    fn test_item_resumes_after_nested_list(#[case] index: usize, #[case] expected: Vec<usize>) {
        assert_eq!(item_blocks(&sample(), index), expected);
    }

    #[test]
    fn test_first_and_last_block() {
        let blocks = sample();
        assert!(is_first_block_of_item(&blocks, 0));
        assert!(!is_last_block_of_item(&blocks, 0));
        assert!(!is_first_block_of_item(&blocks, 2));
        assert!(is_last_block_of_item(&blocks, 2));
    }

    #[test]
    fn test_siblings_and_parents() {
        let blocks = sample();
        assert_eq!(previous_sibling(&blocks, 3), Some(2));
        assert_eq!(previous_sibling(&blocks, 4), None);
        assert_eq!(previous_sibling(&blocks, 0), None);
        assert_eq!(parent(&blocks, 4), Some(3));
        assert_eq!(parent(&blocks, 3), None);
    }

    #[test]
    fn test_plain_block_ends_list() {
        let blocks = vec![item("a", 0, "a"), Block::paragraph("p"), item("b", 0, "b")];
        assert_eq!(previous_sibling(&blocks, 2), None);
        assert_eq!(item_blocks(&blocks, 1), Vec::<usize>::new());
    }

    #[test]
    fn test_expand_with_and_without_nested() {
        let blocks = sample();
        assert_eq!(expand_to_complete_items(&blocks, &[2], true), vec![0, 1, 2]);
        assert_eq!(expand_to_complete_items(&blocks, &[2], false), vec![0, 2]);
        // backward walk from c does not pick up a's children
        assert_eq!(expand_to_complete_items(&blocks, &[3], true), vec![3, 4]);
    }
}
