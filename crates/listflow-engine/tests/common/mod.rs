// Shared helpers for the integration tests. Each test binary uses a
// different subset of them.
#![allow(dead_code)]

use std::collections::HashMap;

use listflow_engine::editing::SequenceIds;
use listflow_engine::models::Block;
use listflow_engine::{Document, io};

/// Document from notation lines, with ids minted as `a00`, `a01`, ...
pub fn doc(lines: &[&str]) -> Document {
    io::parse(&lines.join("\n"))
        .unwrap()
        .into_document(SequenceIds::default())
}

/// The document and its selection in notation
pub fn render(doc: &Document) -> String {
    io::format(doc.blocks(), Some(doc.selection()))
}

/// Expected rendering for notation lines
pub fn lines(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Panic with a readable message if `blocks` break a structural rule
pub fn assert_well_formed(blocks: &[Block]) {
    let rendered = io::format(blocks, None);
    let mut previous: Option<&Block> = None;
    for (index, block) in blocks.iter().enumerate() {
        if let Some(list) = &block.list {
            assert!(block.is_listable(), "object with list attributes at {index}:\n{rendered}");
            let limit = previous.and_then(Block::indent).map_or(0, |indent| indent + 1);
            assert!(
                list.indent <= limit,
                "indent {} exceeds {limit} at {index}:\n{rendered}",
                list.indent
            );
            if let Some(prev) = previous.and_then(|b| b.list.as_ref())
                && prev.item_id == list.item_id
            {
                assert_eq!(prev.indent, list.indent, "item split across depths at {index}:\n{rendered}");
                assert_eq!(prev.list_type, list.list_type, "item mixes types at {index}:\n{rendered}");
            }
        }
        previous = Some(block);
    }

    let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, block) in blocks.iter().enumerate() {
        if let Some(list) = &block.list {
            occurrences.entry(list.item_id.as_str()).or_default().push(index);
        }
    }
    for (id, indices) in occurrences {
        for pair in indices.windows(2) {
            let indent = blocks[pair[0]].indent().unwrap_or(0);
            let nested_between = blocks[pair[0] + 1..pair[1]]
                .iter()
                .all(|b| b.indent().is_some_and(|i| i > indent));
            assert!(nested_between, "id {id} is used by two items:\n{rendered}");
        }
    }
}
