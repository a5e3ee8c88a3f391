use serde::{Deserialize, Serialize};

use super::{ListAttributes, ListType};

/// Stable handle of a block stored in a [`crate::editing::Document`]
///
/// Indices shift as blocks are inserted and removed; handles do not, so they
/// are what changed-block reports carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// What kind of element a block is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Text block that may take part in a list
    Paragraph,
    /// Non-listable element (table, image, unknown widget). Never carries
    /// list attributes and splits list runs.
    Object { name: String },
}

/// An element of the flat content sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    pub list: Option<ListAttributes>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            list: None,
        }
    }

    pub fn list_item(
        text: impl Into<String>,
        list_type: ListType,
        indent: usize,
        item_id: &str,
    ) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            list: Some(ListAttributes::new(list_type, indent, item_id)),
        }
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Object { name: name.into() },
            text: String::new(),
            list: None,
        }
    }

    pub fn with_list(mut self, list: ListAttributes) -> Self {
        self.list = Some(list);
        self
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn is_listable(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph)
    }

    /// Objects have no text but are never considered empty
    pub fn is_empty(&self) -> bool {
        self.is_listable() && self.text.is_empty()
    }

    pub fn indent(&self) -> Option<usize> {
        self.list.as_ref().map(|list| list.indent)
    }

    /// Length of the text in characters (positions count characters)
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Byte index of the `offset`-th character, clamped to the end of `text`
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
