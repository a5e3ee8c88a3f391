use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::editing::Document;
use crate::editing::ids::IdSource;
use crate::models::{Block, BlockKind, ListAttributes, ListItemId, ListKind, ListType};

/// Top-level node of the nested view
///
/// The flat sequence nests into containers the way a renderer would emit
/// `<ul>`/`<ol>` elements: consecutive items of one kind at one depth share a
/// container, and deeper items live inside the item they follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Block outside any list
    Block(Block),
    List(ListNode),
}

/// List container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    pub kind: ListKind,
    pub items: Vec<ItemNode>,
}

/// One logical list item: its blocks and nested lists in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    /// Missing ids are minted when the tree is flattened
    pub id: Option<ListItemId>,
    /// Only meaningful inside checkable lists
    pub checked: bool,
    pub children: Vec<ItemContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemContent {
    /// Block of the item; carries no list attributes of its own
    Block(Block),
    List(ListNode),
}

impl ListNode {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: ItemNode) -> Self {
        self.items.push(item);
        self
    }
}

impl ItemNode {
    pub fn new(id: Option<ListItemId>) -> Self {
        Self {
            id,
            checked: false,
            children: Vec::new(),
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.children.push(ItemContent::Block(block));
        self
    }

    pub fn with_list(mut self, list: ListNode) -> Self {
        self.children.push(ItemContent::List(list));
        self
    }
}

/// Nested view of a document at one version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: u64,
    pub nodes: Vec<TreeNode>,
}

impl Document {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            nodes: nest(&self.blocks),
        }
    }
}

fn without_list(block: &Block) -> Block {
    Block {
        list: None,
        ..block.clone()
    }
}

/// Flat blocks to tree. Total: over-deep blocks hang off the deepest open item.
pub fn nest(blocks: &[Block]) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    let mut index = 0;
    while index < blocks.len() {
        if blocks[index].is_list() {
            let lists = nest_level(blocks, &mut index, 0);
            nodes.extend(lists.into_iter().map(TreeNode::List));
        } else {
            nodes.push(TreeNode::Block(without_list(&blocks[index])));
            index += 1;
        }
    }
    nodes
}

/// Consume the run of list blocks at `depth` or deeper starting at `index`
fn nest_level(blocks: &[Block], index: &mut usize, depth: usize) -> Vec<ListNode> {
    let mut lists: Vec<ListNode> = Vec::new();
    // Id and kind of the item open at this depth
    let mut open: Option<(ListItemId, ListKind)> = None;

    while let Some(list) = blocks.get(*index).and_then(|b| b.list.as_ref()) {
        if list.indent < depth {
            break;
        }
        if list.indent > depth
            && open.is_some()
            && let Some(item) = lists.last_mut().and_then(|l| l.items.last_mut())
        {
            let nested = nest_level(blocks, index, depth + 1);
            item.children.extend(nested.into_iter().map(ItemContent::List));
            continue;
        }

        let block = without_list(&blocks[*index]);
        let kind = list.kind();
        let continues = open
            .as_ref()
            .is_some_and(|(id, open_kind)| *id == list.item_id && *open_kind == kind);
        if continues && let Some(item) = lists.last_mut().and_then(|l| l.items.last_mut()) {
            item.children.push(ItemContent::Block(block));
        } else {
            let item = ItemNode::new(Some(list.item_id.clone()))
                .checked(list.list_type.is_checked())
                .with_block(block);
            match lists.last_mut() {
                Some(current) if current.kind == kind => current.items.push(item),
                _ => lists.push(ListNode::new(kind).with_item(item)),
            }
            open = Some((list.item_id.clone(), kind));
        }
        *index += 1;
    }
    lists
}

/// Tree to flat blocks; items without an id get one from `ids`
pub fn flatten(nodes: &[TreeNode], ids: &mut dyn IdSource) -> Vec<Block> {
    let mut blocks = Vec::new();
    for node in nodes {
        match node {
            TreeNode::Block(block) => blocks.push(without_list(block)),
            TreeNode::List(list) => flatten_list(list, 0, ids, &mut blocks),
        }
    }
    blocks
}

fn flatten_list(list: &ListNode, depth: usize, ids: &mut dyn IdSource, out: &mut Vec<Block>) {
    for item in &list.items {
        let id = item.id.clone().unwrap_or_else(|| ids.next_id());
        let list_type = match list.kind {
            ListKind::Checkable => ListType::Checkable {
                checked: item.checked,
            },
            kind => kind.default_type(),
        };
        for child in &item.children {
            match child {
                ItemContent::Block(block) if block.is_listable() => out.push(
                    without_list(block).with_list(ListAttributes::new(list_type, depth, id.clone())),
                ),
                ItemContent::Block(block) => out.push(without_list(block)),
                ItemContent::List(nested) => flatten_list(nested, depth + 1, ids, out),
            }
        }
    }
}

/// Whether `nest(flatten(nodes))` gives `nodes` back: every item starts with
/// a block, sibling lists differ in kind, ids are present and unique, and
/// list items hold no objects
pub fn is_well_formed(nodes: &[TreeNode]) -> bool {
    let mut seen = HashSet::new();
    let mut previous_kind = None;
    for node in nodes {
        match node {
            TreeNode::Block(block) => {
                if block.is_list() {
                    return false;
                }
                previous_kind = None;
            }
            TreeNode::List(list) => {
                if previous_kind == Some(list.kind) || !list_well_formed(list, &mut seen) {
                    return false;
                }
                previous_kind = Some(list.kind);
            }
        }
    }
    true
}

fn list_well_formed(list: &ListNode, seen: &mut HashSet<ListItemId>) -> bool {
    if list.items.is_empty() {
        return false;
    }
    list.items.iter().all(|item| {
        let Some(id) = &item.id else {
            return false;
        };
        if !seen.insert(id.clone()) || (list.kind != ListKind::Checkable && item.checked) {
            return false;
        }
        if !matches!(item.children.first(), Some(ItemContent::Block(_))) {
            return false;
        }
        let mut previous_kind = None;
        item.children.iter().all(|child| match child {
            ItemContent::Block(block) => {
                previous_kind = None;
                block.is_listable() && !block.is_list()
            }
            ItemContent::List(nested) => {
                let fine = previous_kind != Some(nested.kind) && list_well_formed(nested, seen);
                previous_kind = Some(nested.kind);
                fine
            }
        })
    })
}

/// Indented outline of the tree, one node per line
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.nodes)
    }
}

pub fn render_tree(nodes: &[TreeNode]) -> String {
    struct Tree<'a>(&'a [TreeNode]);
    impl fmt::Display for Tree<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_nodes(f, self.0)
        }
    }
    Tree(nodes).to_string()
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[TreeNode]) -> fmt::Result {
    for node in nodes {
        match node {
            TreeNode::Block(block) => write_block(f, block, 0)?,
            TreeNode::List(list) => write_list(f, list, 0)?,
        }
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter<'_>, block: &Block, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match &block.kind {
        BlockKind::Paragraph => writeln!(f, "{pad}paragraph {:?}", block.text),
        BlockKind::Object { name } => writeln!(f, "{pad}object {name}"),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &ListNode, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    writeln!(f, "{pad}{}", list.kind.name())?;
    for item in &list.items {
        let id = item.id.as_ref().map_or("?", |id| id.as_str());
        match list.kind {
            ListKind::Checkable => {
                let mark = if item.checked { "x" } else { " " };
                writeln!(f, "{pad}  item {id} [{mark}]")?;
            }
            _ => writeln!(f, "{pad}  item {id}")?,
        }
        for child in &item.children {
            match child {
                ItemContent::Block(block) => write_block(f, block, depth + 2)?,
                ItemContent::List(nested) => write_list(f, nested, depth + 2)?,
            }
        }
    }
    Ok(())
}
