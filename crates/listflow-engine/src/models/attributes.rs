use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload-free discriminant of a [`ListType`]
///
/// Containers in the nested view declare a kind; the per-item data (the
/// checked flag of task items) lives on the items themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bulleted,
    Numbered,
    Checkable,
}

impl ListKind {
    /// List type a fresh item of this kind starts with
    pub fn default_type(self) -> ListType {
        match self {
            ListKind::Bulleted => ListType::Bulleted,
            ListKind::Numbered => ListType::Numbered,
            ListKind::Checkable => ListType::Checkable { checked: false },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ListKind::Bulleted => "bulleted",
            ListKind::Numbered => "numbered",
            ListKind::Checkable => "checkable",
        }
    }
}

/// List type of a single block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bulleted,
    Numbered,
    /// Task item with a done/undone flag
    Checkable { checked: bool },
}

impl ListType {
    pub fn kind(self) -> ListKind {
        match self {
            ListType::Bulleted => ListKind::Bulleted,
            ListType::Numbered => ListKind::Numbered,
            ListType::Checkable { .. } => ListKind::Checkable,
        }
    }

    pub fn is_checked(self) -> bool {
        matches!(self, ListType::Checkable { checked: true })
    }
}

/// Opaque token grouping blocks into one logical list item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListItemId(String);

impl ListItemId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListItemId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// The list attributes carried by a list block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListAttributes {
    pub list_type: ListType,
    /// Nesting depth, 0 for top-level items
    pub indent: usize,
    pub item_id: ListItemId,
}

impl ListAttributes {
    pub fn new(list_type: ListType, indent: usize, item_id: impl Into<ListItemId>) -> Self {
        Self {
            list_type,
            indent,
            item_id: item_id.into(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.list_type.kind()
    }
}
