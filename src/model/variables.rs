//! Decision-variable creation: the four filters of spec section 4.2.
//! Variables are created lazily: a cell is only allocated once every
//! filter has passed for it.

use crate::domain::RoomKind;
use crate::events::{capacity_needed, EventKind};

use super::context::{EncoderContext, VarRef};

pub fn build_variables(ctx: &mut EncoderContext) {
    for event_idx in 0..ctx.events.len() {
        build_variables_for_event(ctx, event_idx);
    }
}

fn build_variables_for_event(ctx: &mut EncoderContext, event_idx: usize) {
    let event = &ctx.events[event_idx];
    let subject = match ctx.subjects_by_id.get(event.subject_id.as_str()) {
        Some(s) => *s,
        None => return,
    };
    let instructor = match ctx.instructors.get(&event.instructor_id) {
        Some(i) => i,
        None => return,
    };
    let capacity = capacity_needed(event, subject);
    let is_section = event.kind() == EventKind::Section;
    let requires_lab = event.requires_lab();
    let branch = event.branch.clone();
    let instructor_id = event.instructor_id.clone();
    let level = event.level.clone();

    let mut created = 0usize;

    for day in 0..ctx.cfg.num_days() {
        // Filter 1: instructor availability.
        if !instructor.available_days.contains(&day) {
            continue;
        }
        let is_f2f_day = ctx.events[event_idx].bucket.f2f_days(ctx.cfg).contains(&day);

        // Filter 2: day validity.
        if is_section && !is_f2f_day {
            continue;
        }

        if is_f2f_day {
            // Filter 3 (hour window) and Filter 4 (branch/room/capacity).
            for hour in ctx.cfg.hours() {
                let hour = hour as usize;
                for room_idx in 0..ctx.rooms.len() {
                    let room = &ctx.rooms[room_idx];
                    if room.branch != branch {
                        continue;
                    }
                    if requires_lab && room.kind != RoomKind::Lab {
                        continue;
                    }
                    if room.capacity < capacity {
                        continue;
                    }
                    let var = ctx.model.new_bool_var();
                    ctx.xf.insert((event_idx, day, hour, room_idx), var);
                    ctx.xf_by_event[event_idx].push((day, hour, room_idx));
                    ctx.room_cell.entry((day, hour, room_idx)).or_default().push(event_idx);
                    ctx.instructor_cell
                        .entry((instructor_id.clone(), day, hour))
                        .or_default()
                        .push(VarRef::Face(event_idx, day, hour, room_idx));
                    ctx.level_cell
                        .entry((level.clone(), day, hour))
                        .or_default()
                        .push(VarRef::Face(event_idx, day, hour, room_idx));
                    created += 1;
                }
            }
        } else {
            // Non-F2F day: only possible for lectures (Filter 2), no room.
            for hour in ctx.cfg.hours() {
                let hour = hour as usize;
                let var = ctx.model.new_bool_var();
                ctx.xr.insert((event_idx, day, hour), var);
                ctx.xr_by_event[event_idx].push((day, hour));
                ctx.instructor_cell
                    .entry((instructor_id.clone(), day, hour))
                    .or_default()
                    .push(VarRef::Remote(event_idx, day, hour));
                ctx.level_cell
                    .entry((level.clone(), day, hour))
                    .or_default()
                    .push(VarRef::Remote(event_idx, day, hour));
                created += 1;
            }
        }
    }

    log::debug!(
        "event {} ({:?}): {} decision variables",
        ctx.events[event_idx].id,
        ctx.events[event_idx].kind(),
        created
    );
}
