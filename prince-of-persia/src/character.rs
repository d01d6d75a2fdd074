//! Character state and the velocity/gravity integration step.

use num_derive::FromPrimitive;
use serde::Serialize;

use crate::coords;
use crate::frames;
use crate::level::Level;
use crate::seq::{SeqId, SeqTable};

#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq, Serialize)]
#[repr(u8)]
pub enum Action {
    Stand = 0,
    Ground = 1,
    Hang = 2,
    /// Falling on the launch velocity, before gravity takes over.
    Arc = 3,
    Freefall = 4,
    Bumped = 5,
    HangStill = 6,
    Turning = 7,
}

pub const CHAR_KID: u8 = 0;
pub const CHAR_SHADOW: u8 = 1;
pub const CHAR_GUARD: u8 = 2;
pub const CHAR_MOUSE: u8 = 24;

pub const EN_GARDE: u8 = 2;

const TERMINAL_VEL: i16 = 33;
const WEIGHTLESS_TERMINAL_VEL: i16 = 4;

#[derive(Clone, Debug, Serialize)]
pub struct Character {
    pub posn: u8,
    /// Foot X in 140-res coordinates and Y in scanlines.
    pub x: i16,
    pub y: i16,
    /// -1 facing left, +1 facing right.
    pub face: i16,
    pub block_x: i16,
    pub block_y: i16,
    pub action: Action,
    pub xvel: i16,
    pub yvel: i16,
    /// Byte offset into the sequence table.
    pub seq: usize,
    /// Current room number, 1..24.
    pub scrn: u8,
    /// Scratch counter for the careful-step sequences.
    pub repeat: u8,
    pub id: u8,
    /// 0 sheathed, 2 en garde.
    pub sword: u8,
    /// -1 alive, 0 dead.
    pub life: i8,
    pub stun: u8,
    /// Frame number at the moment a fall started; the running-jump wall
    /// correction keys off it.
    pub rjump_frame: u8,
    pub skill: u8,
}

impl Character {
    pub fn alive(&self) -> bool {
        self.life < 0
    }

    pub fn jump_seq(&mut self, table: &SeqTable, id: SeqId) {
        self.seq = table.start(id);
    }

    /// Face-relative X move.
    pub fn add_x(&mut self, dx: i16) {
        self.x = coords::add_char_x(self.x, self.face, dx);
    }

    /// The notional foot/center X used for block and distance queries.
    pub fn base_x(&self) -> i16 {
        let def = frames::frame(self.posn, self.id);
        self.x + self.face * (def.dx as i16 - def.foot_mark())
    }

    /// Pixels to the block edge in the facing direction, 0..=13.
    pub fn dist_to_edge(&self) -> i16 {
        let (_, off) = coords::block_x_center(self.base_x());
        if self.face < 0 {
            off
        } else {
            coords::BLOCK_WIDTH - 1 - off
        }
    }

    /// Recompute the block position from the coordinates.  Airborne and
    /// hanging characters keep their row: the fall logic advances it one
    /// floor line at a time, which is what keeps a terminal-velocity fall
    /// from skipping past a row boundary between checks.
    pub fn reread_blocks(&mut self) {
        let (block, _) = coords::block_x_center(self.base_x());
        self.block_x = block;
        match self.action {
            Action::Stand | Action::Ground | Action::Turning => {
                self.block_y = coords::block_y_center(self.y);
            }
            _ => {}
        }
    }

    pub fn apply_gravity(&mut self, weightless: bool) {
        if self.action != Action::Freefall {
            return;
        }
        if weightless {
            self.yvel = std::cmp::min(self.yvel + 1, WEIGHTLESS_TERMINAL_VEL);
        } else {
            self.yvel = std::cmp::min(self.yvel + 3, TERMINAL_VEL);
        }
    }

    pub fn add_fall(&mut self) {
        self.y += self.yvel;
        if self.action == Action::Freefall {
            let dx = self.xvel;
            self.add_x(dx);
        }
    }
}

fn block_col_row(block: u8) -> (i16, i16) {
    (block as i16 % 10, block as i16 / 10)
}

fn spawn(table: &SeqTable, id: u8, room: u8, block: u8, face: i16, seq_id: SeqId) -> Character {
    let (col, row) = block_col_row(block);
    Character {
        posn: 15,
        x: coords::block_ej(col) + coords::ANGLE,
        y: coords::floor_y(row),
        face,
        block_x: col,
        block_y: row,
        action: Action::Stand,
        xvel: 0,
        yvel: 0,
        seq: table.start(seq_id),
        scrn: room,
        repeat: 0,
        id,
        sword: 0,
        life: -1,
        stun: 0,
        rjump_frame: 0,
        skill: 0,
    }
}

/// Spawn the kid at the level's start position.  Level 1 opens with the
/// kid dropping in, level 13 with him already at a run.
pub fn create_kid(level: &Level, level_num: u8, table: &SeqTable) -> Character {
    let seq_id = match level_num {
        1 => SeqId::StepFall,
        13 => SeqId::RunCyc,
        _ => SeqId::Stand,
    };
    spawn(
        table,
        CHAR_KID,
        level.kid_room,
        level.kid_block,
        level.kid_face,
        seq_id,
    )
}

/// Spawn the guard of `room`, if the level places one there.
pub fn create_guard(level: &Level, room: u8, table: &SeqTable) -> Option<Character> {
    let start = level.guard_start(room)?;
    let mut guard = spawn(table, CHAR_GUARD, room, start.block, start.face, SeqId::Ready);
    guard.posn = 157;
    guard.sword = EN_GARDE;
    guard.skill = start.skill;
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::testutil::build_level;

    #[test]
    fn kid_spawns_at_level_start() {
        let level = build_level(|_| {});
        let table = SeqTable::standard();
        let kid = create_kid(&level, 3, &table);
        assert_eq!(kid.scrn, 1);
        assert_eq!(kid.block_x, 2);
        assert_eq!(kid.block_y, 2);
        assert_eq!(kid.face, -1);
        assert_eq!(kid.y, coords::floor_y(2));
        assert_eq!(kid.seq, table.start(SeqId::Stand));
        assert!(kid.alive());
    }

    #[test]
    fn guard_spawn_requires_level_data() {
        let level = build_level(|_| {});
        let table = SeqTable::standard();
        assert!(create_guard(&level, 1, &table).is_none());
    }

    #[test]
    fn guard_spawns_en_garde() {
        let level = build_level(|data| {
            crate::level::testutil::set_guard_start(data, 1, 14, 0, 2);
        });
        let table = SeqTable::standard();
        let guard = create_guard(&level, 1, &table).unwrap();
        assert_eq!(guard.block_x, 4);
        assert_eq!(guard.block_y, 1);
        assert_eq!(guard.face, 1);
        assert_eq!(guard.sword, EN_GARDE);
        assert_eq!(guard.skill, 2);
        assert_eq!(guard.posn, 157);
    }

    #[test]
    fn gravity_only_in_freefall() {
        let level = build_level(|_| {});
        let table = SeqTable::standard();
        let mut kid = create_kid(&level, 3, &table);
        kid.apply_gravity(false);
        assert_eq!(kid.yvel, 0);
        kid.action = Action::Freefall;
        for _ in 0..20 {
            kid.apply_gravity(false);
        }
        assert_eq!(kid.yvel, 33);
    }

    #[test]
    fn weightless_gravity_caps_low() {
        let level = build_level(|_| {});
        let table = SeqTable::standard();
        let mut kid = create_kid(&level, 3, &table);
        kid.action = Action::Freefall;
        for _ in 0..10 {
            kid.apply_gravity(true);
        }
        assert_eq!(kid.yvel, 4);
    }

    #[test]
    fn airborne_reread_keeps_row() {
        let level = build_level(|_| {});
        let table = SeqTable::standard();
        let mut kid = create_kid(&level, 3, &table);
        kid.block_y = 0;
        kid.y = coords::floor_y(0) + 30;
        kid.action = Action::Freefall;
        kid.reread_blocks();
        assert_eq!(kid.block_y, 0);
        kid.action = Action::Stand;
        kid.reread_blocks();
        assert_eq!(kid.block_y, 1);
    }
}
