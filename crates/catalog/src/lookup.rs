//! Configuration lookup tables.
//!
//! Small, operator-editable collections referenced by products and movements.
//! Unlike the ledger these are mutable documents; they carry no history.

use serde::{Deserialize, Serialize};

use stockroom_core::{AddressingId, EntryTypeId, ExitTypeId, GroupId, LocationId, WorkId};

/// Product group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Kind of stock entry (purchase, return, adjustment...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryType {
    pub id: EntryTypeId,
    pub name: String,
}

/// Kind of stock exit (consumption, loss, transfer...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitType {
    pub id: ExitTypeId,
    pub name: String,
}

/// Work/job site an exit is charged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    pub name: String,
}

/// Physical storage location (warehouse, room).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
}

/// Shelf/bin addressing entry: a code within a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressing {
    pub id: AddressingId,
    pub code: String,
    pub location_id: LocationId,
}
