//! Room-to-room transitions.
//!
//! The playfield is wider than a room on purpose: a character walks a
//! few pixels past the room body before the cut fires, and the bottom
//! edge has a dead band between the last scanline and the cut line.

use serde::Serialize;

use crate::character::Character;
use crate::coords::{BLOCK_HEIGHT, SCRN_WIDTH};
use crate::level::{Level, ROOM_ROWS};

const CUT_LEFT: i16 = 54;
const CUT_RIGHT: i16 = 201;
const CUT_UP: i16 = 10;
const CUT_DOWN: i16 = 215;

const ROOM_HEIGHT: i16 = BLOCK_HEIGHT * ROOM_ROWS;

pub const CUT_COOLDOWN: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum CutDir {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct CutResult {
    pub cut: Option<CutDir>,
    pub new_room: u8,
    /// Crossed the bottom edge with nothing below: void death.
    pub fell_off: bool,
}

/// Wrap the character into a neighbor room when he crosses an edge.
/// After a cut the check stays quiet for two frames.
pub fn cut_check(chr: &mut Character, level: &Level, cooldown: &mut u8) -> CutResult {
    let mut result = CutResult::default();

    if *cooldown > 0 {
        *cooldown -= 1;
        return result;
    }

    let room = match level.room(chr.scrn) {
        Some(room) => room,
        None => return result,
    };

    if chr.x <= CUT_LEFT && room.left != 0 {
        chr.scrn = room.left;
        chr.x += SCRN_WIDTH;
        result.cut = Some(CutDir::Left);
    } else if chr.x >= CUT_RIGHT && room.right != 0 {
        chr.scrn = room.right;
        chr.x -= SCRN_WIDTH;
        result.cut = Some(CutDir::Right);
    } else if chr.y < CUT_UP && room.up != 0 {
        chr.scrn = room.up;
        chr.y += ROOM_HEIGHT;
        chr.block_y += ROOM_ROWS;
        result.cut = Some(CutDir::Up);
    } else if chr.y >= CUT_DOWN {
        if room.down != 0 {
            chr.scrn = room.down;
            chr.y -= ROOM_HEIGHT;
            chr.block_y -= ROOM_ROWS;
            result.cut = Some(CutDir::Down);
        } else {
            result.fell_off = true;
        }
    }

    if result.cut.is_some() {
        *cooldown = CUT_COOLDOWN;
        result.new_room = chr.scrn;
        log::debug!("cut {:?} into room {}", result.cut, chr.scrn);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::create_kid;
    use crate::level::testutil::{build_level, set_neighbors};
    use crate::seq::SeqTable;

    fn kid_in(level: &Level) -> Character {
        let table = SeqTable::standard();
        create_kid(level, 3, &table)
    }

    #[test]
    fn left_edge_wraps_with_cooldown() {
        let level = build_level(|data| {
            set_neighbors(data, 1, 4, 0, 0, 0);
        });
        let mut kid = kid_in(&level);
        kid.x = 54;
        let mut cooldown = 0;

        let result = cut_check(&mut kid, &level, &mut cooldown);
        assert_eq!(result.cut, Some(CutDir::Left));
        assert_eq!(result.new_room, 4);
        assert_eq!(kid.scrn, 4);
        assert_eq!(kid.x, 54 + 140);
        assert_eq!(cooldown, 2);

        // The next two checks are quiet regardless of position.
        kid.x = 10;
        assert!(cut_check(&mut kid, &level, &mut cooldown).cut.is_none());
        assert!(cut_check(&mut kid, &level, &mut cooldown).cut.is_none());
        assert_eq!(cooldown, 0);
    }

    #[test]
    fn missing_neighbor_keeps_the_room() {
        let level = build_level(|_| {});
        let mut kid = kid_in(&level);
        kid.x = 40;
        let mut cooldown = 0;
        let result = cut_check(&mut kid, &level, &mut cooldown);
        assert!(result.cut.is_none());
        assert_eq!(kid.scrn, 1);
        assert_eq!(kid.x, 40);
    }

    #[test]
    fn down_cross_shifts_the_row() {
        let level = build_level(|data| {
            set_neighbors(data, 1, 0, 0, 0, 7);
        });
        let mut kid = kid_in(&level);
        kid.block_y = 3;
        kid.y = 220;
        let mut cooldown = 0;
        let result = cut_check(&mut kid, &level, &mut cooldown);
        assert_eq!(result.cut, Some(CutDir::Down));
        assert_eq!(kid.scrn, 7);
        assert_eq!(kid.y, 220 - 189);
        assert_eq!(kid.block_y, 0);
    }

    #[test]
    fn bottom_of_screen_has_a_dead_band() {
        let level = build_level(|data| {
            set_neighbors(data, 1, 0, 0, 0, 7);
        });
        let mut kid = kid_in(&level);
        kid.y = 214;
        let mut cooldown = 0;
        assert!(cut_check(&mut kid, &level, &mut cooldown).cut.is_none());
    }

    #[test]
    fn void_below_is_fatal() {
        let level = build_level(|_| {});
        let mut kid = kid_in(&level);
        kid.y = 230;
        let mut cooldown = 0;
        let result = cut_check(&mut kid, &level, &mut cooldown);
        assert!(result.fell_off);
        assert!(result.cut.is_none());
    }
}
