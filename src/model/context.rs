//! The encoder's working state: the CP-SAT model under construction plus
//! every decision variable created so far, indexed for fast constraint
//! posting. See Design Note "Decision-variable storage".

use std::collections::HashMap;

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};

use crate::config::SolverConfig;
use crate::domain::{Instructor, Room, Subject};
use crate::events::Event;

/// A decision variable reference, used where a constraint needs to sum
/// face-to-face and remote placements together (instructor/level
/// non-overlap).
#[derive(Debug, Clone, Copy)]
pub enum VarRef {
    Face(usize, usize, usize, usize),
    Remote(usize, usize, usize),
}

pub fn var_ref_expr(
    xf: &HashMap<(usize, usize, usize, usize), BoolVar>,
    xr: &HashMap<(usize, usize, usize), BoolVar>,
    vr: &VarRef,
) -> LinearExpr {
    match *vr {
        VarRef::Face(e, d, h, r) => LinearExpr::from(xf[&(e, d, h, r)].clone()),
        VarRef::Remote(e, d, h) => LinearExpr::from(xr[&(e, d, h)].clone()),
    }
}

pub struct EncoderContext<'a> {
    pub model: CpModelBuilder,
    pub cfg: &'a SolverConfig,
    pub rooms: &'a [Room],
    pub instructors: &'a HashMap<String, Instructor>,
    pub subjects_by_id: HashMap<&'a str, &'a Subject>,
    pub events: &'a [Event],

    /// `xF[e,d,h,r]`, keyed `(event_idx, day, hour, room_idx)`.
    pub xf: HashMap<(usize, usize, usize, usize), BoolVar>,
    /// `xR[e,d,h]`, keyed `(event_idx, day, hour)`. Lectures only.
    pub xr: HashMap<(usize, usize, usize), BoolVar>,

    pub xf_by_event: Vec<Vec<(usize, usize, usize)>>,
    pub xr_by_event: Vec<Vec<(usize, usize)>>,

    /// `(day, hour, room_idx) -> event indices with an `xF` cell there;
    /// used for room non-overlap.
    pub room_cell: HashMap<(usize, usize, usize), Vec<usize>>,
    /// `(instructor_id, day, hour) -> placement variables`; used for
    /// instructor non-overlap.
    pub instructor_cell: HashMap<(String, usize, usize), Vec<VarRef>>,
    /// `(level, day, hour) -> placement variables`; used for level
    /// non-overlap.
    pub level_cell: HashMap<(String, usize, usize), Vec<VarRef>>,

    /// Pair-start auxiliaries for 2-hour sections, keyed by event index:
    /// `(day, hour, room_idx, p)`. Kept around so the solver driver can
    /// read back which contiguous block was chosen.
    pub pair_starts: HashMap<usize, Vec<(usize, usize, usize, BoolVar)>>,

    day_indicator_cache: HashMap<(usize, usize), BoolVar>,
}

impl<'a> EncoderContext<'a> {
    pub fn new(
        cfg: &'a SolverConfig,
        rooms: &'a [Room],
        instructors: &'a HashMap<String, Instructor>,
        subjects: &'a [Subject],
        events: &'a [Event],
    ) -> Self {
        let subjects_by_id = subjects.iter().map(|s| (s.id.as_str(), s)).collect();
        EncoderContext {
            model: CpModelBuilder::default(),
            cfg,
            rooms,
            instructors,
            subjects_by_id,
            events,
            xf: HashMap::new(),
            xr: HashMap::new(),
            xf_by_event: vec![Vec::new(); events.len()],
            xr_by_event: vec![Vec::new(); events.len()],
            room_cell: HashMap::new(),
            instructor_cell: HashMap::new(),
            level_cell: HashMap::new(),
            pair_starts: HashMap::new(),
            day_indicator_cache: HashMap::new(),
        }
    }

    /// All placement booleans for `event_idx` on `day`.
    pub fn event_vars_on_day(&self, event_idx: usize, day: usize) -> Vec<BoolVar> {
        let mut out = Vec::new();
        for &(d, h, r) in &self.xf_by_event[event_idx] {
            if d == day {
                out.push(self.xf[&(event_idx, d, h, r)].clone());
            }
        }
        for &(d, h) in &self.xr_by_event[event_idx] {
            if d == day {
                out.push(self.xr[&(event_idx, d, h)].clone());
            }
        }
        out
    }

    /// Indicator boolean that is 1 iff `event_idx` has any placement on
    /// `day`. Built once per `(event, day)` and cached (Design Note
    /// "Reified day indicators").
    pub fn day_indicator(&mut self, event_idx: usize, day: usize) -> BoolVar {
        if let Some(v) = self.day_indicator_cache.get(&(event_idx, day)) {
            return v.clone();
        }
        let terms = self.event_vars_on_day(event_idx, day);
        let y = self.reify_or(&terms);
        self.day_indicator_cache.insert((event_idx, day), y.clone());
        y
    }

    /// `y = OR(terms)` via the two-sided pattern: `sum >= y` and
    /// `sum <= len(terms) * y`. An empty `terms` pins `y` to 0 (no
    /// candidates exist on that day).
    pub fn reify_or(&mut self, terms: &[BoolVar]) -> BoolVar {
        let y = self.model.new_bool_var();
        if terms.is_empty() {
            self.model.add_eq(LinearExpr::from(y.clone()), LinearExpr::from(0));
            return y;
        }
        let mut sum = LinearExpr::from(0);
        for t in terms {
            sum = sum + LinearExpr::from(t.clone());
        }
        self.model.add_ge(sum.clone(), LinearExpr::from(y.clone()));
        let mut bound = LinearExpr::from(0);
        for _ in 0..terms.len() {
            bound = bound + LinearExpr::from(y.clone());
        }
        self.model.add_le(sum, bound);
        y
    }
}
