//! Event generation: expands subjects into the concrete events the encoder
//! places. See spec section 4.1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::domain::{BranchId, Subject};
use crate::error::ScheduleError;

/// Group-family label. Determines which weekday set is F2F for the event
/// (see [`GroupBucket::f2f_days`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBucket {
    Ab,
    Cd,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
}

impl GroupBucket {
    pub const SECTION_GROUPS_AC: [GroupBucket; 3] = [GroupBucket::S1, GroupBucket::S2, GroupBucket::S3];
    pub const SECTION_GROUPS_BD: [GroupBucket; 3] = [GroupBucket::S4, GroupBucket::S5, GroupBucket::S6];

    /// AB and S4/S5/S6 are F2F on `F2F_DAYS_AB`; CD and S1/S2/S3 are F2F on
    /// `F2F_DAYS_CD`.
    pub fn f2f_days<'a>(&self, cfg: &'a SolverConfig) -> &'a std::collections::BTreeSet<usize> {
        match self {
            GroupBucket::Ab | GroupBucket::S4 | GroupBucket::S5 | GroupBucket::S6 => &cfg.f2f_days_ab,
            GroupBucket::Cd | GroupBucket::S1 | GroupBucket::S2 | GroupBucket::S3 => &cfg.f2f_days_cd,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupBucket::Ab => "AB",
            GroupBucket::Cd => "CD",
            GroupBucket::S1 => "S1",
            GroupBucket::S2 => "S2",
            GroupBucket::S3 => "S3",
            GroupBucket::S4 => "S4",
            GroupBucket::S5 => "S5",
            GroupBucket::S6 => "S6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lecture,
    Section,
}

/// Sum type over lecture-only and section-only fields, so the compiler
/// enforces that section variables never produce remote placements and
/// lecture variables never carry a lab requirement (Design Note "Dynamic
/// typing / ad-hoc records").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventDetails {
    /// needs_room = AUTO: face-to-face on F2F days, remote otherwise.
    Lecture,
    /// needs_room = YES: always face-to-face.
    Section { requires_lab: bool, duration_hours: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub subject_id: String,
    pub level: String,
    pub branch: BranchId,
    pub instructor_id: String,
    pub bucket: GroupBucket,
    pub details: EventDetails,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self.details {
            EventDetails::Lecture => EventKind::Lecture,
            EventDetails::Section { .. } => EventKind::Section,
        }
    }

    pub fn duration_hours(&self) -> u8 {
        match &self.details {
            EventDetails::Lecture => 1,
            EventDetails::Section { duration_hours, .. } => *duration_hours,
        }
    }

    pub fn requires_lab(&self) -> bool {
        matches!(self.details, EventDetails::Section { requires_lab: true, .. })
    }

    /// Is a remote placement ever possible for this event? Only lectures
    /// ever get `xR` variables (Filter 2).
    pub fn allows_remote(&self) -> bool {
        matches!(self.details, EventDetails::Lecture)
    }
}

/// The two events (AB and CD) produced by one weekly lecture occurrence of
/// a subject. Stored as index pairs into the event arena rather than
/// string-linked, per Design Note "Cyclic references".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortPair {
    pub ab: usize,
    pub cd: usize,
}

fn validate_subject(subject: &Subject) -> Result<(), ScheduleError> {
    if !(1..=2).contains(&subject.lecture_occurrences) {
        return Err(ScheduleError::InvalidLectureOccurrences {
            subject: subject.id.clone(),
            value: subject.lecture_occurrences,
        });
    }
    if !(1..=2).contains(&subject.section_duration_hours) {
        return Err(ScheduleError::InvalidSectionDuration {
            subject: subject.id.clone(),
            value: subject.section_duration_hours,
        });
    }
    Ok(())
}

/// Expands subjects into a deterministic, ordered sequence of events plus
/// the cohort pairs linking each lecture occurrence's AB/CD events.
///
/// Order: subjects in input order; within a subject, lecture occurrences
/// `1..=lecture_occurrences` (AB then CD each), then sections
/// `S1..S6` in that order.
pub fn generate_events(
    subjects: &[Subject],
    subject_branches: &HashMap<String, BranchId>,
) -> Result<(Vec<Event>, Vec<CohortPair>), ScheduleError> {
    let mut events = Vec::new();
    let mut pairs = Vec::new();

    for subject in subjects {
        validate_subject(subject)?;
        let branch = subject_branches
            .get(&subject.id)
            .cloned()
            .ok_or_else(|| ScheduleError::MissingBranch { subject: subject.id.clone() })?;

        for occurrence in 1..=subject.lecture_occurrences {
            let ab_idx = events.len();
            events.push(Event {
                id: format!("{}_L{}_AB", subject.id, occurrence),
                subject_id: subject.id.clone(),
                level: subject.level.clone(),
                branch: branch.clone(),
                instructor_id: subject.lecture_instructor.clone(),
                bucket: GroupBucket::Ab,
                details: EventDetails::Lecture,
            });
            let cd_idx = events.len();
            events.push(Event {
                id: format!("{}_L{}_CD", subject.id, occurrence),
                subject_id: subject.id.clone(),
                level: subject.level.clone(),
                branch: branch.clone(),
                instructor_id: subject.lecture_instructor.clone(),
                bucket: GroupBucket::Cd,
                details: EventDetails::Lecture,
            });
            pairs.push(CohortPair { ab: ab_idx, cd: cd_idx });
        }

        for bucket in [
            GroupBucket::S1,
            GroupBucket::S2,
            GroupBucket::S3,
            GroupBucket::S4,
            GroupBucket::S5,
            GroupBucket::S6,
        ] {
            events.push(Event {
                id: format!("{}_{}", subject.id, bucket.label()),
                subject_id: subject.id.clone(),
                level: subject.level.clone(),
                branch: branch.clone(),
                instructor_id: subject.section_instructor.clone(),
                bucket,
                details: EventDetails::Section {
                    requires_lab: subject.section_is_lab,
                    duration_hours: subject.section_duration_hours,
                },
            });
        }
    }

    log::debug!(
        "generated {} events ({} cohort pairs) from {} subjects",
        events.len(),
        pairs.len(),
        subjects.len()
    );

    Ok((events, pairs))
}

/// Required capacity for an event, by bucket family (spec §4.2 Filter 4).
pub fn capacity_needed(event: &Event, subject: &Subject) -> u32 {
    match event.bucket {
        GroupBucket::Ab => subject.capacity_ab,
        GroupBucket::Cd => subject.capacity_cd,
        GroupBucket::S1 | GroupBucket::S2 | GroupBucket::S3 => subject.capacity_sections_ac,
        GroupBucket::S4 | GroupBucket::S5 | GroupBucket::S6 => subject.capacity_sections_bd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn subject(id: &str, occurrences: u8, section_hours: u8) -> Subject {
        Subject {
            id: id.to_string(),
            level: "L1".to_string(),
            lecture_occurrences: occurrences,
            lecture_instructor: "D1".to_string(),
            section_instructor: "D2".to_string(),
            section_is_lab: false,
            section_duration_hours: section_hours,
            capacity_ab: 40,
            capacity_cd: 40,
            capacity_sections_ac: 20,
            capacity_sections_bd: 20,
        }
    }

    #[test]
    fn one_occurrence_yields_eight_events() {
        let s = subject("ALG", 1, 1);
        let mut branches = HashMap::new();
        branches.insert("ALG".to_string(), BranchId::from("Main"));
        let (events, pairs) = generate_events(&[s], &branches).unwrap();
        assert_eq!(events.len(), 2 + 6);
        assert_eq!(pairs.len(), 1);
        assert_eq!(events[pairs[0].ab].bucket, GroupBucket::Ab);
        assert_eq!(events[pairs[0].cd].bucket, GroupBucket::Cd);
    }

    #[test]
    fn two_occurrences_yields_two_cohort_pairs() {
        let s = subject("ALG", 2, 2);
        let mut branches = HashMap::new();
        branches.insert("ALG".to_string(), BranchId::from("Main"));
        let (events, pairs) = generate_events(&[s], &branches).unwrap();
        assert_eq!(events.len(), 4 + 6);
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn missing_branch_is_rejected() {
        let s = subject("ALG", 1, 1);
        let branches = HashMap::new();
        let err = generate_events(&[s], &branches).unwrap_err();
        assert!(matches!(err, ScheduleError::MissingBranch { .. }));
    }

    #[test]
    fn bad_lecture_occurrences_is_rejected() {
        let s = subject("ALG", 3, 1);
        let mut branches = HashMap::new();
        branches.insert("ALG".to_string(), BranchId::from("Main"));
        let err = generate_events(&[s], &branches).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidLectureOccurrences { .. }));
    }

    #[test]
    fn section_groups_cover_disjoint_day_sets() {
        let ac: BTreeSet<_> = GroupBucket::SECTION_GROUPS_AC.iter().collect();
        let bd: BTreeSet<_> = GroupBucket::SECTION_GROUPS_BD.iter().collect();
        assert!(ac.is_disjoint(&bd));
    }
}
