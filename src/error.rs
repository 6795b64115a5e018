//! Error kinds, per spec section 7. Validation errors abort before variable
//! creation; solver outcomes (infeasible/timeout) are reported as a status
//! value by [`crate::solve`], not raised as errors, these variants exist
//! for the cases that genuinely abort the pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("subject {subject} references unknown instructor {instructor}")]
    UnknownInstructor { subject: String, instructor: String },

    #[error("subject {subject} has no branch assignment")]
    MissingBranch { subject: String },

    #[error("subject {subject} branch {branch} has no rooms on that branch")]
    UnknownBranch { subject: String, branch: String },

    #[error("subject {subject} lecture_occurrences must be 1 or 2, got {value}")]
    InvalidLectureOccurrences { subject: String, value: u8 },

    #[error("subject {subject} section_duration_hours must be 1 or 2, got {value}")]
    InvalidSectionDuration { subject: String, value: u8 },

    #[error("DAYS must not be empty")]
    EmptyDays,

    #[error("END_HOUR ({end}) must be greater than START_HOUR ({start})")]
    InvalidHourWindow { start: u32, end: u32 },

    #[error("F2F day index {day} is out of range for DAYS")]
    InvalidDayIndex { day: usize },

    #[error("F2F_DAYS_AB and F2F_DAYS_CD must be disjoint")]
    OverlappingF2fDays,

    #[error("solver failed internally: {0}")]
    SolverInternal(String),
}
