//! Post-physics floor classification.
//!
//! Runs after the animation step and velocity integration: decides
//! whether the character is still on solid ground, has walked off into a
//! fall, can grab a ledge mid-fall, or has landed (and how hard), and
//! pushes him back out of blocks he was shoved into.

use crate::blocks;
use crate::character::{Action, Character, CHAR_KID, CHAR_SHADOW};
use crate::coords;
use crate::frames;
use crate::interp;
use crate::level::{Level, TileKind};
use crate::seq::{SeqId, SeqTable};

// Falling faster than this, the hands can no longer catch a ledge.
const GRAB_MAX_VEL: i16 = 32;
// Hands reach a ledge when the feet are within this of the floor line.
const GRAB_REACH: i16 = 25;

// Landing classification by terminal velocity.
const SOFT_LAND_VEL: i16 = 22;
const HARD_LAND_VEL: i16 = 33;

const GRAB_STUN: u8 = 12;

/// Classify the character against the floor.  Returns the hit points the
/// landing costs (0, 1, or a killing 100), which the scheduler feeds to
/// the health meter.
pub fn check_floor(chr: &mut Character, level: &Level, table: &SeqTable, btn_held: bool) -> i16 {
    match chr.action {
        Action::Hang | Action::HangStill => 0,
        Action::Bumped => {
            // Landed and dead bodies still adhere to the floor.
            if chr.posn == 109 || chr.posn == 185 {
                on_ground(chr, level, table)
            } else {
                0
            }
        }
        Action::Freefall => falling(chr, level, table, btn_held),
        Action::Arc => {
            if (102..=105).contains(&chr.posn) {
                try_grab(chr, level, table, btn_held);
            }
            0
        }
        Action::Stand | Action::Ground | Action::Turning => on_ground(chr, level, table),
    }
}

fn falling(chr: &mut Character, level: &Level, table: &SeqTable, btn_held: bool) -> i16 {
    if chr.y < coords::floor_y(chr.block_y) {
        // Still above the next floor line: the only option is a grab.
        try_grab(chr, level, table, btn_held);
        return 0;
    }
    let under = blocks::tile_own(level, chr);
    if under.kind == TileKind::Block {
        inside_block(chr, level, table, false);
        0
    } else if blocks::is_passable(under.kind) {
        chr.block_y += 1;
        0
    } else {
        hit_floor(chr, level, table)
    }
}

fn try_grab(chr: &mut Character, level: &Level, table: &SeqTable, btn_held: bool) {
    if !btn_held || !chr.alive() || chr.yvel >= GRAB_MAX_VEL {
        return;
    }
    if chr.y + GRAB_REACH < coords::floor_y(chr.block_y) {
        return;
    }

    let saved_x = chr.x;
    chr.add_x(-8);
    chr.reread_blocks();
    let above = blocks::tile_above(level, chr);
    let ledge = blocks::tile_above_front(level, chr);
    if !blocks::can_grab_ledge(&ledge, &above, chr.face) {
        chr.x = saved_x;
        chr.reread_blocks();
        return;
    }

    let d = chr.dist_to_edge();
    chr.add_x(d);
    chr.y = coords::floor_y(chr.block_y);
    chr.yvel = 0;
    chr.xvel = 0;
    chr.jump_seq(table, SeqId::FallHang);
    let _ = interp::anim_char(chr, table, false);
    chr.stun = GRAB_STUN;
}

fn hit_floor(chr: &mut Character, level: &Level, table: &SeqTable) -> i16 {
    let vel = chr.yvel;
    chr.y = coords::floor_y(chr.block_y);
    chr.yvel = 0;
    chr.xvel = 0;

    let front = blocks::tile_front(level, chr);
    if blocks::is_passable(front.kind) && chr.dist_to_edge() < 4 {
        chr.add_x(-3);
        chr.reread_blocks();
    }

    if !chr.alive() {
        chr.jump_seq(table, SeqId::HardLand);
        return 0;
    }

    if vel < SOFT_LAND_VEL {
        chr.jump_seq(table, SeqId::SoftLand);
        0
    } else if vel < HARD_LAND_VEL {
        match chr.id {
            CHAR_KID => {
                chr.jump_seq(table, SeqId::MedLand);
                1
            }
            CHAR_SHADOW => {
                chr.jump_seq(table, SeqId::SoftLand);
                0
            }
            _ => {
                chr.jump_seq(table, SeqId::DropDead);
                100
            }
        }
    } else {
        chr.jump_seq(table, SeqId::HardLand);
        100
    }
}

fn on_ground(chr: &mut Character, level: &Level, table: &SeqTable) -> i16 {
    // Only frames with the foot down are checked.
    if !frames::frame(chr.posn, chr.id).on_floor() {
        return 0;
    }
    let under = blocks::tile_own(level, chr);
    if under.kind == TileKind::Block {
        inside_block(chr, level, table, true);
    } else if blocks::is_passable(under.kind) {
        start_fall(chr, level, table);
    }
    0
}

fn start_fall(chr: &mut Character, level: &Level, table: &SeqTable) {
    chr.rjump_frame = chr.posn;
    chr.sword = 0;
    chr.block_y += 1;

    let id = match chr.posn {
        9 => SeqId::StepFall,
        13 => SeqId::StepFall2,
        26 => SeqId::JumpFall,
        44 => SeqId::RJumpFall,
        81..=85 => {
            // Dropped off a ledge that is no longer there.
            chr.add_x(5);
            SeqId::StepFall2
        }
        150..=179 => SeqId::StepFall,
        _ => SeqId::StepFall,
    };
    chr.jump_seq(table, id);
    let _ = interp::anim_char(chr, table, false);
    chr.reread_blocks();

    let under = blocks::tile_own(level, chr);
    if blocks::is_wall(under.kind, chr.face) {
        inside_block(chr, level, table, false);
    }
    let front = blocks::tile_front(level, chr);
    if blocks::is_wall(front.kind, chr.face) {
        if chr.rjump_frame == 44 && chr.dist_to_edge() < 6 {
            chr.jump_seq(table, SeqId::PatchFall);
        } else {
            chr.add_x(-1);
        }
    }
}

fn inside_block(chr: &mut Character, level: &Level, table: &SeqTable, bump_anim: bool) {
    let d = chr.dist_to_edge();
    let front = blocks::tile_front(level, chr);
    if d < 8 && blocks::barrier_code(front.kind) == 0 {
        chr.add_x(d + 4);
    } else {
        chr.add_x(-(coords::BLOCK_WIDTH - d) + 4);
    }
    chr.reread_blocks();
    if bump_anim {
        chr.jump_seq(table, SeqId::Bump);
    }
}
