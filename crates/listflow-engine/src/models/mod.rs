pub mod attributes;
pub mod block;
pub mod position;

pub use attributes::{ListAttributes, ListItemId, ListKind, ListType};
pub use block::{Block, BlockId, BlockKind};
pub use position::{InsertionPoint, Position, Selection};
