//! Append-only movement ledger: record types and write-side decisions.
//!
//! Movements are immutable facts. A mistake is corrected by appending a
//! compensating movement, never by editing history. All logic here is pure;
//! the transactional append lives in the infra layer.

pub mod movement;
pub mod record;

pub use movement::{EntryCosts, Movement, MovementKind, ProductRef};
pub use record::{EntryDraft, ExitDraft, prepare_entry, prepare_exit};
