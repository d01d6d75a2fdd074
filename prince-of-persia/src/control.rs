//! The player-control state machine.
//!
//! Runs once per tick before the animation step, keyed on the current
//! frame number, and re-points the character's sequence according to the
//! tri-state input and the surrounding tiles.  All input is read in
//! face-normalized space for the duration of the call.

use crate::blocks;
use crate::character::{Action, Character};
use crate::coords::{self, ANGLE, BLOCK_WIDTH};
use crate::input::{Input, FRESH};
use crate::level::{Level, TileKind};
use crate::seq::{SeqId, SeqTable};

// Running-jump commit window, in pixels ahead of the takeoff foot.
const RJUMP_CHANGE: i16 = 4;
const RJUMP_LOOKAHEAD: i16 = 1;
const RJUMP_LEAD_DIST: i16 = 14;
const RJUMP_MAX_EARLY: i16 = 8;
const RJUMP_MAX_LATE: i16 = 2;

// Minimum clearance from the back edge for a backward jump to a ledge.
const JUMP_BACK_THRES: i16 = 6;

// An exit door must have risen this far (spec >> 2) to walk into.
const EXIT_CLIMBABLE: u8 = 30;

// Second-in-a-row no-progress marker for the careful-step protocol.
const STEP_STALLED: u8 = 0xff;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FwdKind {
    Edge,
    Barrier,
    Clear,
}

/// Distance to whatever bounds forward movement: a barrier face, a
/// floor edge, or nothing within a block's reach.
pub fn get_fwd_dist(chr: &Character, level: &Level) -> (i16, FwdKind, TileKind) {
    let own = blocks::tile_own(level, chr);
    if let Some(d) = blocks::dist_to_barrier(chr, &own, chr.block_x) {
        return (d, FwdKind::Barrier, own.kind);
    }

    let front = blocks::tile_front(level, chr);
    if !(front.kind == TileKind::PanelWof && chr.face < 0) {
        if let Some(d) = blocks::dist_to_barrier(chr, &front, chr.block_x + chr.face) {
            return (d, FwdKind::Barrier, front.kind);
        }
    }

    if front.kind == TileKind::Loose {
        return (chr.dist_to_edge(), FwdKind::Edge, front.kind);
    }

    // Items and plates on the far block read as clear once the character
    // straddles the boundary, so he walks onto them instead of stalling.
    if matches!(
        front.kind,
        TileKind::PressPlate | TileKind::UPressPlate | TileKind::Sword | TileKind::Flask
    ) {
        let d = chr.dist_to_edge();
        if d == 0 {
            return (11, FwdKind::Clear, front.kind);
        }
        return (d, FwdKind::Edge, front.kind);
    }

    if blocks::is_passable(front.kind) {
        return (chr.dist_to_edge(), FwdKind::Edge, front.kind);
    }

    (11, FwdKind::Clear, front.kind)
}

/// Dispatch player control.  Returns the potion code of a pickup
/// committed this tick (-1 for the sword), if any.
pub fn player_ctrl(
    chr: &mut Character,
    level: &mut Level,
    input: &mut Input,
    table: &SeqTable,
) -> Option<i8> {
    let face0 = chr.face;
    input.face_jstk(face0);
    let picked = dispatch(chr, level, input, table);
    input.unface_jstk(face0);
    picked
}

fn dispatch(
    chr: &mut Character,
    level: &mut Level,
    input: &mut Input,
    table: &SeqTable,
) -> Option<i8> {
    match chr.posn {
        15 | 50..=52 => standing(chr, level, input, table),
        1..=3 => {
            starting(chr, input, table);
            None
        }
        4..=14 => {
            running(chr, level, input, table);
            None
        }
        48 => {
            turning(chr, input, table);
            None
        }
        67..=69 => {
            jump_startup(chr, input, table);
            None
        }
        87..=99 => {
            hanging(chr, level, input, table);
            None
        }
        109 => crouching(chr, level, input, table),
        _ => None,
    }
}

fn standing(
    chr: &mut Character,
    level: &mut Level,
    input: &mut Input,
    table: &SeqTable,
) -> Option<i8> {
    if input.clr_btn == FRESH {
        input.clr_btn = 1;
        if pickup_standing(chr, level, table) {
            // Stoop over the item; the crouched phase takes it while the
            // button is still held.
            return None;
        }
    }

    if input.clr_b == FRESH {
        input.clr_b = 1;
        chr.jump_seq(table, SeqId::Turn);
        return None;
    }

    if input.clr_u == FRESH {
        input.clr_u = 1;
        if try_stairs(chr, level, table) {
            return None;
        }
        if input.forward_held() {
            chr.jump_seq(table, SeqId::StandJump);
        } else {
            do_jumpup(chr, level, table);
        }
        return None;
    }

    if input.clr_d == FRESH {
        input.clr_d = 1;
        standing_down(chr, level, table);
        return None;
    }

    if input.clr_f == FRESH {
        input.clr_f = 1;
        if input.btn {
            do_stepfwd(chr, level, table);
        } else {
            chr.jump_seq(table, SeqId::StartRun);
        }
    }
    None
}

fn starting(chr: &mut Character, input: &mut Input, table: &SeqTable) {
    if input.clr_b == FRESH {
        input.clr_b = 1;
        chr.jump_seq(table, SeqId::Turn);
    }
}

fn running(chr: &mut Character, level: &Level, input: &mut Input, table: &SeqTable) {
    if input.jstk_x == 0 && (chr.posn == 7 || chr.posn == 11) {
        chr.jump_seq(table, SeqId::RunStop);
        return;
    }
    if input.back_held() {
        chr.jump_seq(table, SeqId::RunTurn);
        return;
    }
    if input.forward_held() {
        if input.clr_u == FRESH {
            input.clr_u = 1;
            do_runjump(chr, level, table);
            return;
        }
        if input.clr_d == FRESH {
            input.clr_d = 1;
            chr.jump_seq(table, SeqId::RDiveRoll);
        }
    }
}

fn turning(chr: &mut Character, input: &mut Input, table: &SeqTable) {
    if !input.btn && input.forward_held() && !input.up_held() {
        chr.jump_seq(table, SeqId::TurnRun);
    }
}

fn jump_startup(chr: &mut Character, input: &mut Input, table: &SeqTable) {
    if input.clr_f == FRESH {
        input.clr_f = 1;
        chr.jump_seq(table, SeqId::StandJump);
    }
}

fn hanging(chr: &mut Character, level: &Level, input: &mut Input, table: &SeqTable) {
    if chr.stun > 0 {
        chr.stun -= 1;
    }

    let above = blocks::tile_above(level, chr);
    let under = blocks::tile_own(level, chr);
    let ledge = blocks::tile_above_front(level, chr);

    if chr.stun == 0 && input.up_held() {
        let clear = match above.kind {
            // Mirrors and blades can only be climbed past from the left.
            TileKind::Mirror | TileKind::Slicer => chr.face < 0,
            TileKind::Gate => chr.face > 0 || above.spec >> 2 >= 6,
            _ => true,
        };
        if clear {
            chr.jump_seq(table, SeqId::ClimbUp);
        } else {
            chr.jump_seq(table, SeqId::ClimbFail);
        }
        return;
    }

    if !input.btn {
        let behind = blocks::tile_behind(level, chr);
        if blocks::is_passable(behind.kind) {
            // Sheer drop against a wall face: push clear of it first.
            if under.kind == TileKind::Block || blocks::is_wall(under.kind, chr.face) {
                chr.add_x(-7);
            }
            chr.jump_seq(table, SeqId::HangDrop);
        } else if blocks::is_passable(under.kind) {
            chr.jump_seq(table, SeqId::HangFall);
        } else {
            chr.jump_seq(table, SeqId::HangDrop);
        }
        return;
    }

    if chr.action != Action::HangStill
        && (under.kind == TileKind::Block || (chr.face < 0 && blocks::is_wall(under.kind, chr.face)))
    {
        chr.jump_seq(table, SeqId::HangStraight);
        return;
    }

    // The ledge itself may have crumbled away under his hands.
    if blocks::is_passable(ledge.kind) {
        if blocks::is_passable(under.kind) {
            chr.jump_seq(table, SeqId::HangFall);
        } else {
            chr.jump_seq(table, SeqId::HangDrop);
        }
    }
}

fn crouching(
    chr: &mut Character,
    level: &mut Level,
    input: &mut Input,
    table: &SeqTable,
) -> Option<i8> {
    if input.clr_btn == FRESH || input.btn {
        if input.clr_btn == FRESH {
            input.clr_btn = 1;
        }
        if let Some(picked) = pickup_crouched(chr, level, table) {
            return Some(picked);
        }
    }
    if !input.down_held() {
        chr.jump_seq(table, SeqId::StandUp);
        return None;
    }
    if input.clr_f == FRESH {
        input.clr_f = 1;
        chr.jump_seq(table, SeqId::Crawl);
    }
    None
}

fn try_stairs(chr: &mut Character, level: &Level, table: &SeqTable) -> bool {
    for col in [chr.block_x, chr.block_x - chr.face, chr.block_x + chr.face].iter() {
        let t = level.tile_at(chr.scrn, *col, chr.block_y);
        if t.kind == TileKind::Exit && t.spec >> 2 >= EXIT_CLIMBABLE {
            chr.x = coords::block_ej(*col) + ANGLE;
            if *col != chr.block_x {
                chr.face = (*col - chr.block_x).signum();
            }
            chr.reread_blocks();
            chr.jump_seq(table, SeqId::ClimbStairs);
            return true;
        }
    }
    false
}

fn standing_down(chr: &mut Character, level: &Level, table: &SeqTable) {
    let (_, kind, _) = get_fwd_dist(chr, level);
    if kind == FwdKind::Edge && chr.dist_to_edge() < 3 {
        // Close to the forward edge: shuffle over it and let the ground
        // check take him down.
        chr.add_x(5);
        chr.reread_blocks();
    }

    let own = blocks::tile_own(level, chr);
    let behind = blocks::tile_behind(level, chr);
    let back_d = BLOCK_WIDTH - 1 - chr.dist_to_edge();
    let behind_clear = blocks::is_passable(behind.kind)
        || (behind.kind == TileKind::Gate && behind.spec >> 2 >= 6);
    let ledge_ok = !blocks::is_passable(own.kind)
        && !(own.kind == TileKind::Loose && own.spec != 0);

    if behind_clear && back_d >= 8 && ledge_ok {
        chr.add_x(-9);
        chr.reread_blocks();
        chr.jump_seq(table, SeqId::ClimbDown);
        return;
    }

    chr.jump_seq(table, SeqId::Stoop);
}

fn do_stepfwd(chr: &mut Character, level: &Level, table: &SeqTable) {
    let (fd, kind, _) = get_fwd_dist(chr, level);
    let d = fd.max(0).min(11) as u8;

    if d != 0 {
        chr.repeat = d;
        chr.jump_seq(table, step_seq(d));
        return;
    }

    if kind == FwdKind::Barrier {
        chr.repeat = 11;
        chr.jump_seq(table, SeqId::Step11);
        return;
    }

    if chr.repeat == STEP_STALLED {
        chr.repeat = 0;
        chr.jump_seq(table, SeqId::Step11);
    } else {
        chr.repeat = STEP_STALLED;
        chr.jump_seq(table, SeqId::TestFoot);
    }
}

fn step_seq(d: u8) -> SeqId {
    // step1..step11 are ids 29..39.
    match d {
        1 => SeqId::Step1,
        2 => SeqId::Step2,
        3 => SeqId::Step3,
        4 => SeqId::Step4,
        5 => SeqId::Step5,
        6 => SeqId::Step6,
        7 => SeqId::Step7,
        8 => SeqId::Step8,
        9 => SeqId::Step9,
        10 => SeqId::Step10,
        _ => SeqId::Step11,
    }
}

fn do_jumpup(chr: &mut Character, level: &Level, table: &SeqTable) {
    let above = blocks::tile_above(level, chr);
    let above_front = blocks::tile_above_front(level, chr);
    if blocks::can_grab_ledge(&above_front, &above, chr.face) {
        do_jumphang(chr, level, table);
        return;
    }

    let above_behind = blocks::tile_above_behind(level, chr);
    let back_d = BLOCK_WIDTH - 1 - chr.dist_to_edge();
    if blocks::can_grab_ledge(&above_behind, &above, chr.face) && back_d >= JUMP_BACK_THRES {
        let behind = blocks::tile_behind(level, chr);
        if !blocks::is_passable(behind.kind) && !blocks::is_wall(behind.kind, chr.face) {
            // Floor back there: take the full step back and grab facing
            // the same way.
            chr.add_x(-BLOCK_WIDTH);
            chr.reread_blocks();
            do_jumphang(chr, level, table);
        } else {
            chr.add_x(-back_d);
            chr.reread_blocks();
            chr.jump_seq(table, SeqId::JumpBackHang);
        }
        return;
    }

    do_jumphigh(chr, level, table);
}

fn do_jumphang(chr: &mut Character, level: &Level, table: &SeqTable) {
    let dist = chr.dist_to_edge();
    if dist >= 4 {
        chr.add_x(dist - 4);
        chr.jump_seq(table, SeqId::JumpHangLong);
        return;
    }
    let (fd, kind, _) = get_fwd_dist(chr, level);
    if kind == FwdKind::Barrier && fd < 4 {
        chr.add_x(dist - 4);
        chr.jump_seq(table, SeqId::JumpHangLong);
    } else {
        chr.add_x(dist);
        chr.jump_seq(table, SeqId::JumpHangMed);
    }
}

fn do_jumphigh(chr: &mut Character, level: &Level, table: &SeqTable) {
    let (col, _) = coords::block_x_center(chr.base_x() - 6);
    let ceiling = level.tile_at(chr.scrn, col, chr.block_y - 1);
    if ceiling.kind == TileKind::Block {
        chr.jump_seq(table, SeqId::JumpUp);
    } else {
        chr.jump_seq(table, SeqId::HighJump);
    }
}

fn do_runjump(chr: &mut Character, level: &Level, table: &SeqTable) {
    // Not available until the run is up to speed.
    if chr.posn < 7 {
        return;
    }

    let proj = chr.base_x() + chr.face * RJUMP_CHANGE;
    let (pcol, off) = coords::block_x_center(proj);
    let to_edge = if chr.face < 0 {
        off
    } else {
        BLOCK_WIDTH - 1 - off
    };

    let mut found = None;
    for i in 0..=RJUMP_LOOKAHEAD {
        let t = level.tile_at(chr.scrn, pcol + chr.face * (i + 1), chr.block_y);
        if t.kind == TileKind::Spikes || blocks::is_passable(t.kind) {
            found = Some(i);
            break;
        }
    }
    let blocks_ahead = match found {
        Some(i) => i,
        // No edge in reach: keep running, try again next frame.
        None => return,
    };

    let mut diff = (to_edge + blocks_ahead * BLOCK_WIDTH) - RJUMP_LEAD_DIST;
    if diff < -RJUMP_MAX_EARLY {
        return;
    }
    if diff > RJUMP_MAX_LATE {
        diff = -3;
    }
    chr.add_x(diff + RJUMP_CHANGE);
    chr.reread_blocks();
    chr.jump_seq(table, SeqId::RunJump);
}

fn pickup_standing(chr: &mut Character, level: &mut Level, table: &SeqTable) -> bool {
    let own = blocks::tile_own(level, chr);
    if matches!(own.kind, TileKind::Flask | TileKind::Sword) {
        let behind = blocks::tile_behind(level, chr);
        if !blocks::is_passable(behind.kind) {
            // Standing on the item: back off a block to face it.
            chr.add_x(-BLOCK_WIDTH);
            chr.reread_blocks();
        }
    }
    let front = blocks::tile_front(level, chr);
    if matches!(front.kind, TileKind::Flask | TileKind::Sword) {
        chr.jump_seq(table, SeqId::Stoop);
        return true;
    }
    false
}

fn pickup_crouched(chr: &mut Character, level: &mut Level, table: &SeqTable) -> Option<i8> {
    let loc = level.resolve(chr.scrn, chr.block_x + chr.face, chr.block_y)?;
    let tile = *level.tile(loc);
    if !matches!(tile.kind, TileKind::Sword | TileKind::Flask) {
        return None;
    }

    // Scoot up to the item before taking it.
    let (d, kind, _) = get_fwd_dist(chr, level);
    if kind == FwdKind::Edge && d > 0 {
        chr.add_x(d);
    }
    if chr.face > 0 {
        chr.add_x(-2);
    }
    chr.reread_blocks();

    match tile.kind {
        TileKind::Sword => {
            level.set_kind(loc, TileKind::Floor, 0);
            chr.jump_seq(table, SeqId::PickUpSword);
            Some(-1)
        }
        TileKind::Flask => {
            let potion = ((tile.spec >> 5) & 7) as i8;
            level.set_kind(loc, TileKind::Floor, 0);
            chr.jump_seq(table, SeqId::DrinkPotion);
            Some(potion)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::create_kid;
    use crate::input::RawInput;
    use crate::level::testutil::{build_level, set_tile};

    fn setup(level: Level) -> (Level, SeqTable, Character, Input) {
        let table = SeqTable::standard();
        let kid = create_kid(&level, 3, &table);
        (level, table, kid, Input::default())
    }

    fn press(input: &mut Input, x: i16, y: i16, btn: bool) {
        input.clr_jstk(RawInput { x, y, btn });
    }

    #[test]
    fn forward_press_starts_the_run() {
        let (mut level, table, mut kid, mut input) = setup(build_level(|_| {}));
        press(&mut input, -1, 0, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::StartRun));
        // The press was consumed.
        assert_eq!(input.clr_f, 1);
    }

    #[test]
    fn back_press_turns() {
        let (mut level, table, mut kid, mut input) = setup(build_level(|_| {}));
        // Facing left, pressing right is backward.
        press(&mut input, 1, 0, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::Turn));
    }

    #[test]
    fn careful_step_dispatches_by_distance() {
        // Kid spawns at column 2 of row 2; open the tile ahead of him so
        // there is an edge, and back him 5 px off the boundary.
        let (mut level, table, mut kid, mut input) = setup(build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::Space, 0);
        }));
        kid.x += 5;
        kid.reread_blocks();
        assert_eq!(kid.dist_to_edge(), 5);
        press(&mut input, -1, 0, true);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.repeat, 5);
        assert_eq!(kid.seq, table.start(SeqId::Step5));
    }

    #[test]
    fn step_protocol_commits_after_two_stalls() {
        let (mut level, table, mut kid, mut input) = setup(build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::Space, 0);
        }));
        // The spawn point sits exactly on the boundary.
        assert_eq!(kid.dist_to_edge(), 0);

        press(&mut input, -1, 0, true);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::TestFoot));
        assert_eq!(kid.repeat, STEP_STALLED);

        kid.posn = 15;
        input.clr_jstk(RawInput::default());
        press(&mut input, -1, 0, true);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::Step11));
    }

    #[test]
    fn runjump_commit_window_boundary() {
        let gap = || {
            build_level(|data| {
                set_tile(data, 1, 3, 2, TileKind::Space, 0);
            })
        };

        // Frame 7 carries dx 5 with foot mark 1, so base X is x - 4
        // facing left; projecting 4 further gives x - 8.  At x = 135 the
        // projected point sits 6 px short of the gap edge: diff -8, the
        // last accepted commit point.
        let (mut level, table, mut kid, mut input) = setup(gap());
        kid.posn = 7;
        kid.x = 135;
        kid.reread_blocks();
        press(&mut input, -1, -1, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::RunJump));

        // One pixel earlier: diff -9, rejected, no sequence change.
        let (mut level, table, mut kid, mut input) = setup(gap());
        kid.posn = 7;
        kid.x = 134;
        kid.reread_blocks();
        let seq0 = kid.seq;
        press(&mut input, -1, -1, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, seq0);
    }

    #[test]
    fn runjump_without_an_edge_keeps_running() {
        let (mut level, table, mut kid, mut input) = setup(build_level(|_| {}));
        kid.posn = 9;
        kid.x = 135;
        kid.reread_blocks();
        let seq0 = kid.seq;
        press(&mut input, -1, -1, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, seq0);
    }

    #[test]
    fn hanging_climb_gated_by_gate_height() {
        let hang_room = |gate_spec| {
            build_level(|data| {
                set_tile(data, 1, 4, 0, TileKind::Floor, 0);
                set_tile(data, 1, 5, 0, TileKind::Gate, gate_spec);
                set_tile(data, 1, 5, 1, TileKind::Floor, 0);
            })
        };
        let hang = |kid: &mut Character, table: &SeqTable| {
            kid.posn = 87;
            kid.action = Action::Hang;
            kid.block_x = 5;
            kid.block_y = 1;
            kid.x = coords::block_ej(5) + ANGLE;
            kid.y = coords::floor_y(1);
            kid.jump_seq(table, SeqId::Hang);
        };

        // Gate above at spec 20 (>> 2 == 5): climb refused facing left.
        let (mut level, table, mut kid, mut input) = setup(hang_room(20));
        hang(&mut kid, &table);
        press(&mut input, 0, -1, true);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::ClimbFail));

        // At spec 24 (>> 2 == 6) the gate has risen enough.
        let (mut level, table, mut kid, mut input) = setup(hang_room(24));
        hang(&mut kid, &table);
        press(&mut input, 0, -1, true);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::ClimbUp));
    }

    #[test]
    fn crouch_rises_when_down_released() {
        let (mut level, table, mut kid, mut input) = setup(build_level(|_| {}));
        kid.posn = 109;
        press(&mut input, 0, 0, false);
        player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(kid.seq, table.start(SeqId::StandUp));
    }

    #[test]
    fn crouched_pickup_takes_the_flask() {
        // Heal potion: spec bits 5..7 == 1.
        let (mut level, table, mut kid, mut input) = setup(build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::Flask, 1 << 5);
        }));
        kid.posn = 109;
        press(&mut input, 0, 1, true);
        let picked = player_ctrl(&mut kid, &mut level, &mut input, &table);
        assert_eq!(picked, Some(1));
        assert_eq!(level.tile_at(1, 1, 2).kind, TileKind::Floor);
        assert_eq!(kid.seq, table.start(SeqId::DrinkPotion));
    }
}
