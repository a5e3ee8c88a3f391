pub mod editing;
pub mod io;
pub mod models;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, DocumentEvent, Fragment, HostEvent, Patch, Snapshot};
pub use io::{Notation, NotationError};
pub use models::*;
