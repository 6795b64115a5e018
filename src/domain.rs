//! Input entities: rooms, instructors, subjects. Loaded once and immutable
//! for the lifetime of a solve.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A physical campus. Rooms and events are branch-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(pub String);

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BranchId {
    fn from(s: &str) -> Self {
        BranchId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    Lab,
    Room,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub branch: BranchId,
    pub kind: RoomKind,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    /// Subset of `0..D-1` (weekday indices into `SolverConfig::days`).
    pub available_days: BTreeSet<usize>,
}

/// A subject (course) offered at one branch, with its lecture and section
/// shape. The branch itself is *not* stored here; it is resolved through
/// the `subject_branches` mapping passed into `generate_events`/`solve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub level: String,
    /// 1 or 2.
    pub lecture_occurrences: u8,
    pub lecture_instructor: String,
    pub section_instructor: String,
    pub section_is_lab: bool,
    /// 1 or 2.
    pub section_duration_hours: u8,
    pub capacity_ab: u32,
    pub capacity_cd: u32,
    pub capacity_sections_ac: u32,
    pub capacity_sections_bd: u32,
}
