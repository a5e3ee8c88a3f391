use crate::models::ListItemId;

/// Pluggable source of list item ids
///
/// The document never trusts a source to be collision free: it keeps asking
/// until it gets a token no block in the document uses.
pub trait IdSource {
    fn next_id(&mut self) -> ListItemId;
}

/// Random ids for production documents
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> ListItemId {
        ListItemId::new(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// Deterministic ids (`a00`, `a01`, …) for tests and reproducible runs
#[derive(Debug, Clone)]
pub struct SequenceIds {
    prefix: String,
    next: u64,
}

impl SequenceIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::new("a")
    }
}

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> ListItemId {
        let id = ListItemId::new(format!("{}{:02x}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
