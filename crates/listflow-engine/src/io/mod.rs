//! Plain-text notation for documents
//!
//! One line per block:
//!
//! ```text
//! intro                 plain paragraph
//! * item                bulleted item (`#` numbered, `[ ]`/`[x]` task)
//!   * nested            two spaces per level
//!   continuation        another block of the item one level up
//! <table>               object
//! * cursor[] here       collapsed selection; `[` and `]` mark a range
//! * item {id:abc}       explicit item id
//! ```
//!
//! An item's id defaults to its line number as three digits (`000`, `001`,
//! …), so only ids that differ from that are written out.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;

use crate::editing::ids::IdSource;
use crate::editing::{Document, walker};
use crate::models::{Block, ListAttributes, ListType, Position, Selection};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("line {line}: indentation must be a multiple of two spaces")]
    OddIndent { line: usize },
    #[error("line {line}: continuation has no list item to belong to")]
    OrphanContinuation { line: usize },
    #[error("line {line}: unbalanced selection markers")]
    Selection { line: usize },
}

/// Parsed notation: blocks plus the selection, if one was marked
#[derive(Debug, Clone, PartialEq)]
pub struct Notation {
    pub blocks: Vec<Block>,
    pub selection: Option<Selection>,
}

impl Notation {
    /// Document holding these blocks, with the marked selection applied
    pub fn into_document(self, ids: impl IdSource + 'static) -> Document {
        let mut doc = Document::with_id_source(self.blocks, ids);
        if let Some(selection) = self.selection {
            doc.set_selection(selection);
            doc.take_events();
        }
        doc
    }
}

fn item_regex() -> &'static Regex {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    ITEM.get_or_init(|| {
        Regex::new(r"^(?<marker>\*|#|\[ \]|\[x\])(?: (?<text>.*))?$").expect("Invalid item regex")
    })
}

fn id_regex() -> &'static Regex {
    static ID: OnceLock<Regex> = OnceLock::new();
    ID.get_or_init(|| Regex::new(r"^(?<body>.*?) ?\{id:(?<id>[^}\s]+)\}$").expect("Invalid id regex"))
}

fn object_regex() -> &'static Regex {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    OBJECT.get_or_init(|| Regex::new(r"^<(?<name>[^<>]+)>$").expect("Invalid object regex"))
}

fn default_id(index: usize) -> String {
    format!("{index:03}")
}

fn marker_type(marker: &str) -> ListType {
    match marker {
        "#" => ListType::Numbered,
        "[ ]" => ListType::Checkable { checked: false },
        "[x]" => ListType::Checkable { checked: true },
        _ => ListType::Bulleted,
    }
}

fn marker_of(list_type: ListType) -> &'static str {
    match list_type {
        ListType::Bulleted => "*",
        ListType::Numbered => "#",
        ListType::Checkable { checked: false } => "[ ]",
        ListType::Checkable { checked: true } => "[x]",
    }
}

/// Selection markers collected while parsing
#[derive(Default)]
struct Markers {
    anchor: Option<Position>,
    focus: Option<Position>,
}

impl Markers {
    fn set(slot: &mut Option<Position>, at: Position, line: usize) -> Result<(), NotationError> {
        if slot.replace(at).is_some() {
            return Err(NotationError::Selection { line });
        }
        Ok(())
    }

    /// Strip `[]`, `[` and `]` from `text`, recording where they were
    fn strip(&mut self, text: &str, block: usize, line: usize) -> Result<String, NotationError> {
        let mut plain = String::with_capacity(text.len());
        let mut offset = 0;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let at = Position::new(block, offset);
            match c {
                '[' if chars.peek() == Some(&']') => {
                    chars.next();
                    Self::set(&mut self.anchor, at, line)?;
                    Self::set(&mut self.focus, at, line)?;
                }
                '[' => Self::set(&mut self.anchor, at, line)?,
                ']' => Self::set(&mut self.focus, at, line)?,
                _ => {
                    plain.push(c);
                    offset += 1;
                }
            }
        }
        Ok(plain)
    }
}

/// Attributes of the item a continuation line at `level` belongs to
fn continuation_owner(blocks: &[Block], level: usize) -> Option<ListAttributes> {
    for block in blocks.iter().rev() {
        let list = block.list.as_ref()?;
        if list.indent == level {
            return Some(list.clone());
        }
        if list.indent < level {
            return None;
        }
    }
    None
}

pub fn parse(input: &str) -> Result<Notation, NotationError> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut markers = Markers::default();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let (raw, explicit_id) = match id_regex().captures(raw) {
            Some(caps) => (
                caps.name("body").map_or("", |m| m.as_str()),
                caps.name("id").map(|m| m.as_str().to_string()),
            ),
            None => (raw, None),
        };
        let rest = raw.trim_start_matches(' ');
        let spaces = raw.len() - rest.len();
        if spaces % 2 != 0 {
            return Err(NotationError::OddIndent { line });
        }

        if spaces == 0
            && let Some(caps) = object_regex().captures(rest)
        {
            blocks.push(Block::object(&caps["name"]));
            continue;
        }

        let (mut block, text) = if let Some(caps) = item_regex().captures(rest) {
            let list_type = marker_type(&caps["marker"]);
            let id = explicit_id.unwrap_or_else(|| default_id(index));
            let text = caps.name("text").map_or("", |m| m.as_str());
            (Block::list_item("", list_type, spaces / 2, &id), text)
        } else if spaces == 0 {
            (Block::paragraph(""), rest)
        } else {
            let mut owner = continuation_owner(&blocks, spaces / 2 - 1)
                .ok_or(NotationError::OrphanContinuation { line })?;
            if let Some(id) = explicit_id {
                owner.item_id = id.as_str().into();
            }
            (Block::paragraph("").with_list(owner), rest)
        };
        block.text = markers.strip(text, index, line)?;
        blocks.push(block);
    }

    let selection = match (markers.anchor, markers.focus) {
        (Some(anchor), Some(focus)) => Some(Selection::range(anchor, focus)),
        (None, None) => None,
        _ => {
            return Err(NotationError::Selection {
                line: input.lines().count(),
            });
        }
    };
    Ok(Notation { blocks, selection })
}

fn with_markers(text: &str, block: usize, selection: Option<Selection>) -> String {
    let Some(selection) = selection else {
        return text.to_string();
    };
    let mut marks: Vec<(usize, &str)> = Vec::new();
    if selection.is_collapsed() {
        if selection.focus.block == block {
            marks.push((selection.focus.offset, "[]"));
        }
    } else {
        if selection.anchor.block == block {
            marks.push((selection.anchor.offset, "["));
        }
        if selection.focus.block == block {
            marks.push((selection.focus.offset, "]"));
        }
    }
    let mut out = text.to_string();
    marks.sort_by(|a, b| b.0.cmp(&a.0));
    for (offset, mark) in marks {
        let idx = crate::models::block::byte_index(&out, offset);
        out.insert_str(idx, mark);
    }
    out
}

/// Render blocks (and optionally a selection) in the notation
pub fn format(blocks: &[Block], selection: Option<Selection>) -> String {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        let text = with_markers(&block.text, index, selection);
        let line = match (&block.kind, &block.list) {
            (crate::models::BlockKind::Object { name }, _) => format!("<{name}>"),
            (_, None) => text,
            (_, Some(list)) if !walker::is_first_block_of_item(blocks, index) => {
                format!("{}{text}", "  ".repeat(list.indent + 1))
            }
            (_, Some(list)) => {
                let mut line = format!("{}{}", "  ".repeat(list.indent), marker_of(list.list_type));
                if !text.is_empty() {
                    line.push(' ');
                    line.push_str(&text);
                }
                if list.item_id.as_str() != default_id(index) {
                    line.push_str(&format!(" {{id:{}}}", list.item_id));
                }
                line
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Read a notation file
pub fn load(path: &Path) -> anyhow::Result<Notation> {
    let input =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let notation = parse(&input).with_context(|| format!("parsing {}", path.display()))?;
    Ok(notation)
}

/// Write a document in notation, creating parent directories as needed
pub fn save(path: &Path, doc: &Document) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, format(doc.blocks(), None))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
