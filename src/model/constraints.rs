//! The five constraint families of spec section 4.2.

use std::collections::{HashMap, HashSet};

use cp_sat::builder::LinearExpr;

use crate::events::{CohortPair, EventDetails};

use super::context::{var_ref_expr, EncoderContext};

/// Constraint family 1: exactly one placement per event.
pub fn post_exactly_one(ctx: &mut EncoderContext) {
    for event_idx in 0..ctx.events.len() {
        let duration_hours = match &ctx.events[event_idx].details {
            EventDetails::Lecture => 1u8,
            EventDetails::Section { duration_hours, .. } => *duration_hours,
        };

        if duration_hours == 2 {
            post_two_hour_section(ctx, event_idx);
            continue;
        }

        let mut sum = LinearExpr::from(0);
        for &(d, h, r) in &ctx.xf_by_event[event_idx] {
            sum = sum + LinearExpr::from(ctx.xf[&(event_idx, d, h, r)].clone());
        }
        for &(d, h) in &ctx.xr_by_event[event_idx] {
            sum = sum + LinearExpr::from(ctx.xr[&(event_idx, d, h)].clone());
        }
        ctx.model.add_eq(sum, LinearExpr::from(1));
    }
}

/// A 2-hour section's candidates are tied together with a pair-start
/// auxiliary `p[e,d,h,r]` per adjacent-hour-in-same-room pair (Design Note
/// "2-hour sections as auxiliaries"). Exactly one pair is chosen, and each
/// `xF` cell is forced to equal the sum of the pair-starts that use it, so
/// downstream non-overlap constraints can keep treating `xF` uniformly.
fn post_two_hour_section(ctx: &mut EncoderContext, event_idx: usize) {
    let cells = ctx.xf_by_event[event_idx].clone();
    let cell_set: HashSet<(usize, usize, usize)> = cells.iter().copied().collect();

    let mut p_sum = LinearExpr::from(0);
    let mut usage: HashMap<(usize, usize, usize), LinearExpr> = HashMap::new();

    for &(d, h, r) in &cells {
        if !cell_set.contains(&(d, h + 1, r)) {
            continue;
        }
        let p = ctx.model.new_bool_var();
        let xf_h = ctx.xf[&(event_idx, d, h, r)].clone();
        let xf_h1 = ctx.xf[&(event_idx, d, h + 1, r)].clone();
        ctx.model.add_le(LinearExpr::from(p.clone()), LinearExpr::from(xf_h));
        ctx.model.add_le(LinearExpr::from(p.clone()), LinearExpr::from(xf_h1));
        p_sum = p_sum + LinearExpr::from(p.clone());

        let e = usage.entry((d, h, r)).or_insert_with(|| LinearExpr::from(0));
        *e = e.clone() + LinearExpr::from(p.clone());
        let e1 = usage.entry((d, h + 1, r)).or_insert_with(|| LinearExpr::from(0));
        *e1 = e1.clone() + LinearExpr::from(p.clone());

        ctx.pair_starts.entry(event_idx).or_default().push((d, h, r, p));
    }

    ctx.model.add_eq(p_sum, LinearExpr::from(1));

    for &(d, h, r) in &cells {
        let usage_expr = usage.get(&(d, h, r)).cloned().unwrap_or_else(|| LinearExpr::from(0));
        let xf_var = ctx.xf[&(event_idx, d, h, r)].clone();
        ctx.model.add_eq(LinearExpr::from(xf_var), usage_expr);
    }
}

/// Constraint family 2: no room hosts two face-to-face events at once.
pub fn post_room_nonoverlap(ctx: &mut EncoderContext) {
    for (&(d, h, r), events) in &ctx.room_cell {
        if events.len() < 2 {
            continue;
        }
        let mut sum = LinearExpr::from(0);
        for &e in events {
            sum = sum + LinearExpr::from(ctx.xf[&(e, d, h, r)].clone());
        }
        ctx.model.add_le(sum, LinearExpr::from(1));
    }
}

/// Constraint family 3: no instructor has two overlapping events, face to
/// face or remote.
pub fn post_instructor_nonoverlap(ctx: &mut EncoderContext) {
    for (_key, refs) in &ctx.instructor_cell {
        if refs.len() < 2 {
            continue;
        }
        let mut sum = LinearExpr::from(0);
        for r in refs {
            sum = sum + var_ref_expr(&ctx.xf, &ctx.xr, r);
        }
        ctx.model.add_le(sum, LinearExpr::from(1));
    }
}

/// Constraint family 4: no two events of the same academic level overlap,
/// regardless of delivery mode.
pub fn post_level_nonoverlap(ctx: &mut EncoderContext) {
    for (_key, refs) in &ctx.level_cell {
        if refs.len() < 2 {
            continue;
        }
        let mut sum = LinearExpr::from(0);
        for r in refs {
            sum = sum + var_ref_expr(&ctx.xf, &ctx.xr, r);
        }
        ctx.model.add_le(sum, LinearExpr::from(1));
    }
}

/// Constraint family 5: for each lecture occurrence, its AB and CD events
/// land on the same day.
pub fn post_cohort_same_day(ctx: &mut EncoderContext, pairs: &[CohortPair]) {
    for pair in pairs {
        let mut ab_indicators = Vec::with_capacity(ctx.cfg.num_days());
        let mut cd_indicators = Vec::with_capacity(ctx.cfg.num_days());

        for day in 0..ctx.cfg.num_days() {
            let yab = ctx.day_indicator(pair.ab, day);
            let ycd = ctx.day_indicator(pair.cd, day);
            ctx.model.add_eq(LinearExpr::from(yab.clone()), LinearExpr::from(ycd.clone()));
            ab_indicators.push(yab);
            cd_indicators.push(ycd);
        }

        let mut sum_ab = LinearExpr::from(0);
        for v in &ab_indicators {
            sum_ab = sum_ab + LinearExpr::from(v.clone());
        }
        ctx.model.add_eq(sum_ab, LinearExpr::from(1));

        let mut sum_cd = LinearExpr::from(0);
        for v in &cd_indicators {
            sum_cd = sum_cd + LinearExpr::from(v.clone());
        }
        ctx.model.add_eq(sum_cd, LinearExpr::from(1));
    }
}
