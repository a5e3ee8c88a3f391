/*!
 * # Editing Core Module
 *
 * Lists are stored flat: every block may carry a list type, an indent and a
 * list item id, and nesting is implied by those attributes. This module keeps
 * that representation consistent under editing.
 *
 * ## Architecture Overview
 *
 * ### 1. Transactions over a flat block sequence
 * - All mutation goes through **`Document::change`** and the **`Writer`** it hands out
 * - Nested changes join the outermost one
 * - When the outermost change closes, the **fixer** repairs indents, ids and
 *   list types, then the version is bumped and events are queued
 *
 * ### 2. Command-Based Editing
 * - List behaviour is exposed as **Commands** (`Cmd` enum) applied with `Document::apply`
 * - Each command reports the blocks it altered in a **`Patch`**
 * - Commands that cannot run are no-ops with an empty report
 *
 * ### 3. Derived logical items
 * - A list item is never stored; **`walker`** derives it from ids and indents
 *
 * ### 4. Read API: nested snapshots
 * - **`Document::snapshot`** nests the flat blocks into list containers and items
 * - `snapshot::flatten` goes back, so pasted trees become `Fragment`s
 *
 * ## Usage Pattern
 *
 * ```rust
 * use listflow_engine::editing::*;
 * use listflow_engine::models::{Block, ListType, Position, Selection};
 *
 * let mut doc = Document::with_id_source(
 *     vec![Block::list_item("milk", ListType::Bulleted, 0, "a")],
 *     SequenceIds::default(),
 * );
 * doc.set_selection(Selection::collapsed(Position::new(0, 4)));
 *
 * // Enter at the end of an item starts a new item
 * let patch = doc.apply(Cmd::Enter);
 * assert_eq!(patch.executed, Some(ListCommand::SplitItem));
 *
 * let snapshot = doc.snapshot();
 * assert_eq!(snapshot.nodes.len(), 1);
 * ```
 */

pub mod commands;
pub mod content;
pub mod document;
mod fixer;
pub mod ids;
mod indent;
pub mod insert;
mod list_type;
pub mod patch;
pub mod snapshot;
pub mod split;
pub mod walker;
pub mod writer;

pub use commands::{Cmd, HostEvent};
pub use document::{Document, DocumentEvent};
pub use ids::{IdSource, SequenceIds, UuidIds};
pub use insert::Fragment;
pub use patch::{ListCommand, Patch};
pub use snapshot::{ItemContent, ItemNode, ListNode, Snapshot, TreeNode};
pub use split::SplitDirection;
pub use writer::Writer;
