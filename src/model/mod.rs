//! Constraint encoding: builds decision variables and posts the hard
//! constraints of spec section 4.2 into a CP-SAT model.

mod constraints;
mod context;
mod variables;

pub use context::{EncoderContext, VarRef};
pub use variables::build_variables;

use std::collections::HashMap;

use crate::config::SolverConfig;
use crate::domain::{Instructor, Room, Subject};
use crate::events::{CohortPair, Event};

/// Assembles the full constraint model for one solve: variable creation
/// followed by every constraint family, in the order given in spec
/// section 4.2. Mirrors the teacher's `build_model_pipeline` shape: one
/// function that threads a freshly built [`EncoderContext`] through each
/// constraint-posting step.
pub fn build_model_pipeline<'a>(
    cfg: &'a SolverConfig,
    rooms: &'a [Room],
    instructors: &'a HashMap<String, Instructor>,
    subjects: &'a [Subject],
    events: &'a [Event],
    pairs: &[CohortPair],
) -> EncoderContext<'a> {
    let mut ctx = EncoderContext::new(cfg, rooms, instructors, subjects, events);

    build_variables(&mut ctx);
    constraints::post_exactly_one(&mut ctx);
    constraints::post_room_nonoverlap(&mut ctx);
    constraints::post_instructor_nonoverlap(&mut ctx);
    constraints::post_level_nonoverlap(&mut ctx);
    constraints::post_cohort_same_day(&mut ctx, pairs);

    ctx
}
