//! University timetabling solver core.
//!
//! Given rooms, instructors, and subjects, produces a weekly schedule
//! assigning every lecture and section a day, starting hour, and (when
//! required) a physical room, subject to multi-branch facilities, cohort
//! pairing across delivery modes, per-group face-to-face vs. remote day
//! patterns, room-type and capacity requirements, instructor availability,
//! and same-level non-overlap.
//!
//! This is a library: no wire protocol, persisted file format, or CLI is
//! part of it. Input loading and presentation are external collaborators.

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
mod model;
mod solve;

pub use config::SolverConfig;
pub use domain::{BranchId, Instructor, Room, RoomKind, Subject};
pub use error::ScheduleError;
pub use events::{capacity_needed, generate_events, CohortPair, Event, EventDetails, EventKind, GroupBucket};
pub use solve::{solve, Placement, RoomOrRemote, SolveOutcome, SolveStatus};
