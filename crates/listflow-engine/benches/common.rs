// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use listflow_engine::models::{Block, ListType};

/// Nested outline: `items` top-level items, each with a child chain of
/// `depth` levels and a trailing continuation paragraph
#[allow(dead_code)]
pub fn generate_outline(items: usize, depth: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(items * (depth + 2));
    for item in 0..items {
        let id = format!("item-{item}");
        blocks.push(Block::list_item(
            format!("Item {item}"),
            ListType::Bulleted,
            0,
            &id,
        ));
        for level in 1..=depth {
            let list_type = if level % 2 == 0 {
                ListType::Bulleted
            } else {
                ListType::Numbered
            };
            blocks.push(Block::list_item(
                format!("Nested {item}.{level}"),
                list_type,
                level,
                &format!("{id}-{level}"),
            ));
        }
        blocks.push(Block::list_item("continuation", ListType::Bulleted, 0, &id));
    }
    blocks
}

/// Outline with broken indents and colliding ids, so the fixer has work
#[allow(dead_code)]
pub fn generate_malformed(items: usize) -> Vec<Block> {
    (0..items)
        .map(|item| {
            let indent = (item * 7) % 5;
            let id = format!("dup-{}", item % 3);
            Block::list_item(format!("Item {item}"), ListType::Bulleted, indent, &id)
        })
        .collect()
}
