//! Solve-time configuration. Threaded explicitly through the encoder and
//! solver driver rather than read from process-wide state (see Design
//! Note "Global state").

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub const DEFAULT_MAX_TIME_IN_SECONDS: f64 = 15.0;
pub const DEFAULT_NUM_SEARCH_WORKERS: i32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Ordered weekday labels; `days.len()` is `D`, indices `0..D`.
    pub days: Vec<String>,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Disjoint from `f2f_days_cd`.
    pub f2f_days_ab: BTreeSet<usize>,
    pub f2f_days_cd: BTreeSet<usize>,
    pub max_time_in_seconds: f64,
    pub num_search_workers: i32,
}

impl SolverConfig {
    pub fn new(
        days: Vec<String>,
        start_hour: u32,
        end_hour: u32,
        f2f_days_ab: BTreeSet<usize>,
        f2f_days_cd: BTreeSet<usize>,
    ) -> Self {
        SolverConfig {
            days,
            start_hour,
            end_hour,
            f2f_days_ab,
            f2f_days_cd,
            max_time_in_seconds: DEFAULT_MAX_TIME_IN_SECONDS,
            num_search_workers: DEFAULT_NUM_SEARCH_WORKERS,
        }
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> + Clone {
        self.start_hour..self.end_hour
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::EmptyDays);
        }
        if self.end_hour <= self.start_hour {
            return Err(ScheduleError::InvalidHourWindow {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        for d in self.f2f_days_ab.iter().chain(self.f2f_days_cd.iter()) {
            if *d >= self.num_days() {
                return Err(ScheduleError::InvalidDayIndex { day: *d });
            }
        }
        if !self.f2f_days_ab.is_disjoint(&self.f2f_days_cd) {
            return Err(ScheduleError::OverlappingF2fDays);
        }
        Ok(())
    }
}
