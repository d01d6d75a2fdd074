//! Per-frame animation records.
//!
//! Each of the 240 frame numbers a sequence can emit maps to a static
//! record: image selector, sword overlay slot, the signed X/Y advance
//! applied when the frame is shown, and the check byte.  Guards (and the
//! shadow) substitute a 40-entry alternate set over frames 150..189.
//!
//! Check byte layout:
//!
//!  |7   |6   |5  4  3  2  1  0|
//!  +----+----+----------------+
//!  |odd |foot|  foot offset   |
//!  +----+----+----------------+
//!
//! `odd` swaps pixel parity when the figure faces left (a renderer
//! concern), `foot` marks frames that stand on the floor and so are
//! subject to the on-ground check, and the foot offset biases the base-X
//! computation.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FrameDef {
    pub image: u8,
    pub sword: u8,
    pub dx: i8,
    pub dy: i8,
    pub check: u8,
}

pub const FOOT: u8 = 0x40;
pub const ODD: u8 = 0x80;

impl FrameDef {
    pub fn foot_mark(&self) -> i16 {
        (self.check & 0x1f) as i16
    }

    pub fn on_floor(&self) -> bool {
        self.check & FOOT == FOOT
    }

    /// 3-bit image table index: one bit from the image byte, two from the
    /// sword byte.
    pub fn table(&self) -> u8 {
        ((self.image & 0x80) >> 5) | ((self.sword & 0xc0) >> 6)
    }

    pub fn sword_slot(&self) -> u8 {
        self.sword & 0x3f
    }
}

macro_rules! f {
    ($im:expr, $sw:expr, $dx:expr, $dy:expr, $chk:expr) => {
        FrameDef {
            image: $im,
            sword: $sw,
            dx: $dx,
            dy: $dy,
            check: $chk,
        }
    };
}

const Z: FrameDef = f!(0, 0, 0, 0, 0);

// Second image table.
const T1: u8 = 0x40;

static FRAME_TABLE: [FrameDef; 241] = [
    Z, // 0: out-of-range default
    // 1..6: start run
    f!(1, 0, 1, 0, FOOT),
    f!(2, 0, 2, 0, FOOT),
    f!(3, 0, 3, 0, FOOT),
    f!(4, 0, 4, 0, FOOT | ODD),
    f!(5, 0, 5, 0, FOOT),
    f!(6, 0, 6, 0, FOOT),
    // 7..14: run cycle
    f!(7, 0, 5, 0, FOOT | 1),
    f!(8, 0, 4, 0, FOOT | ODD),
    f!(9, 0, 5, 0, FOOT | 2),
    f!(10, 0, 4, 0, FOOT),
    f!(11, 0, 5, 0, FOOT | ODD | 1),
    f!(12, 0, 4, 0, FOOT),
    f!(13, 0, 5, 0, FOOT | 2),
    f!(14, 0, 4, 0, FOOT),
    // 15: stand
    f!(15, 0, 0, 0, FOOT),
    // 16..26: standing jump (airborne 18..25, no floor checks)
    f!(16, 0, 0, 0, FOOT),
    f!(17, 0, 1, 0, FOOT),
    f!(18, 0, 2, -4, 0),
    f!(19, 0, 3, -7, 0),
    f!(20, 0, 5, -9, 0),
    f!(21, 0, 6, 0, 0),
    f!(22, 0, 5, 9, 0),
    f!(23, 0, 3, 7, 0),
    f!(24, 0, 2, 4, 0),
    f!(25, 0, 1, 0, 0),
    f!(26, 0, 0, 0, FOOT),
    // 27..44: running jump; 31..38 airborne
    f!(27, 0, 4, 0, FOOT),
    f!(28, 0, 5, 0, FOOT | 1),
    f!(29, 0, 5, 0, FOOT),
    f!(30, 0, 6, 0, FOOT | 2),
    f!(31, 0, 7, -3, 0),
    f!(32, 0, 7, -6, 0),
    f!(33, 0, 8, -9, 0),
    f!(34, 0, 8, -3, 0),
    f!(35, 0, 8, 3, 0),
    f!(36, 0, 7, 9, 0),
    f!(37, 0, 6, 6, 0),
    f!(38, 0, 5, 3, 0),
    f!(39, 0, 5, 0, FOOT),
    f!(40, 0, 4, 0, FOOT | 1),
    f!(41, 0, 4, 0, FOOT | ODD),
    f!(42, 0, 3, 0, FOOT),
    f!(43, 0, 3, 0, FOOT | 1),
    f!(44, 0, 3, 0, FOOT),
    // 45..52: turn in place
    f!(45, 0, 0, 0, FOOT),
    f!(46, 0, 0, 0, FOOT),
    f!(47, 0, -1, 0, FOOT),
    f!(48, 0, -1, 0, FOOT | ODD),
    f!(49, 0, 0, 0, FOOT),
    f!(50, 0, 0, 0, FOOT),
    f!(51, 0, 0, 0, FOOT),
    f!(52, 0, 0, 0, FOOT),
    // 53..57: careful step (advance comes from the step sequences)
    f!(53, 0, 0, 0, FOOT),
    f!(54, 0, 0, 0, FOOT | 1),
    f!(55, 0, 0, 0, FOOT),
    f!(56, 0, 0, 0, FOOT | 1),
    f!(57, 0, 0, 0, FOOT),
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z, // 58..64
    Z,
    Z, // 65..66
    // 67..69: jump-up startup (still on the floor)
    f!(67, 0, 0, 0, FOOT),
    f!(68, 0, 0, 0, FOOT),
    f!(69, 0, 0, 0, FOOT),
    // 70..76: vertical jump arc
    f!(70, 0, 0, -6, 0),
    f!(71, 0, 0, -9, 0),
    f!(72, 0, 0, -4, 0),
    f!(73, 0, 0, 0, 0),
    f!(74, 0, 0, 4, 0),
    f!(75, 0, 0, 9, 0),
    f!(76, 0, 0, 6, 0),
    // 77..80: reach and grab
    f!(77, 0, 0, 0, 0),
    f!(78, 0, 0, 0, 0),
    f!(79, 0, 0, 0, 0),
    f!(80, 0, 0, 0, 0),
    // 81..85: drop from ledge and settle
    f!(81, 0, 0, 0, FOOT),
    f!(82, 0, 0, 0, FOOT),
    f!(83, 0, 0, 0, FOOT | 1),
    f!(84, 0, 0, 0, FOOT),
    f!(85, 0, 0, 0, FOOT),
    Z, // 86
    // 87..99: hang cycle
    f!(87, 0, 0, 0, 0),
    f!(88, 0, 0, 0, 0),
    f!(89, 0, 0, 0, 0),
    f!(90, 0, 0, 0, 0),
    f!(91, 0, 0, 0, 0),
    f!(92, 0, 0, 0, 0),
    f!(93, 0, 0, 0, 0),
    f!(94, 0, 0, 0, 0),
    f!(95, 0, 0, 0, 0),
    f!(96, 0, 0, 0, 0),
    f!(97, 0, 0, 0, 0),
    f!(98, 0, 0, 0, 0),
    f!(99, 0, 0, 0, 0),
    Z,
    Z, // 100..101
    // 102..106: falling; 106 is the freefall loop frame
    f!(102, 0, 0, 0, 0),
    f!(103, 0, 0, 0, 0),
    f!(104, 0, 0, 0, 0),
    f!(105, 0, 0, 0, 0),
    f!(106, 0, 0, 0, 0),
    // 107..109: crouch
    f!(107, 0, 0, 0, FOOT),
    f!(108, 0, 0, 0, FOOT),
    f!(109, 0, 0, 0, FOOT),
    // 110..119: stand up from crouch
    f!(110, 0, 0, 0, FOOT),
    f!(111, 0, 0, 0, FOOT),
    f!(112, 0, 1, 0, FOOT),
    f!(113, 0, 1, 0, FOOT | 1),
    f!(114, 0, 0, 0, FOOT),
    f!(115, 0, 0, 0, FOOT),
    f!(116, 0, 0, 0, FOOT),
    f!(117, 0, 0, 0, FOOT | ODD),
    f!(118, 0, 0, 0, FOOT),
    f!(119, 0, 0, 0, FOOT),
    // 120..122: bump recoil
    f!(120, 0, 0, 0, FOOT),
    f!(121, 0, 0, 0, FOOT),
    f!(122, 0, 0, 0, FOOT),
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z, // 123..134
    // 135..146: climb through a row (movement from the sequences)
    f!(7 | 0x80, T1, 0, 0, 0),
    f!(8 | 0x80, T1, 0, 0, 0),
    f!(9 | 0x80, T1, 0, 0, 0),
    f!(10 | 0x80, T1, 0, 0, 0),
    f!(11 | 0x80, T1, 0, 0, 0),
    f!(12 | 0x80, T1, 0, 0, 0),
    f!(13 | 0x80, T1, 0, 0, 0),
    f!(14 | 0x80, T1, 0, 0, 0),
    f!(15 | 0x80, T1, 0, 0, 0),
    f!(16 | 0x80, T1, 0, 0, 0),
    f!(17 | 0x80, T1, 0, 0, 0),
    f!(18 | 0x80, T1, 0, 0, 0),
    Z,
    Z,
    Z, // 147..149
    // 150..184: fighting frames (unused by the passive core)
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    // 185..187: dead, impaled, halved
    f!(57 | 0x80, T1, 0, 0, FOOT),
    f!(58 | 0x80, T1, 0, 0, FOOT),
    f!(59 | 0x80, T1, 0, 0, FOOT),
    Z,
    Z,
    Z, // 188..190
    // 191..200: drink potion
    f!(63 | 0x80, T1, 0, 0, FOOT),
    f!(64 | 0x80, T1, 0, 0, FOOT),
    f!(65 | 0x80, T1, 0, 0, FOOT),
    f!(66 | 0x80, T1, 0, 0, FOOT),
    f!(67 | 0x80, T1, 0, 0, FOOT),
    f!(68 | 0x80, T1, 0, 0, FOOT),
    f!(69 | 0x80, T1, 0, 0, FOOT),
    f!(70 | 0x80, T1, 0, 0, FOOT),
    f!(71 | 0x80, T1, 0, 0, FOOT),
    f!(72 | 0x80, T1, 0, 0, FOOT),
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z, // 201..216
    // 217..228: climb the exit stairs
    f!(89 | 0x80, T1, 2, -3, 0),
    f!(90 | 0x80, T1, 2, -3, 0),
    f!(91 | 0x80, T1, 2, -3, 0),
    f!(92 | 0x80, T1, 2, -3, 0),
    f!(93 | 0x80, T1, 2, -3, 0),
    f!(94 | 0x80, T1, 2, -3, 0),
    f!(95 | 0x80, T1, 2, -3, 0),
    f!(96 | 0x80, T1, 2, -3, 0),
    f!(97 | 0x80, T1, 2, -3, 0),
    f!(98 | 0x80, T1, 2, -3, 0),
    f!(99 | 0x80, T1, 2, -3, 0),
    f!(100 | 0x80, T1, 2, -3, 0),
    // 229..232: pick up the sword
    f!(101 | 0x80, T1, 0, 0, FOOT),
    f!(102 | 0x80, T1, 0, 0, FOOT),
    f!(103 | 0x80, T1, 0, 0, FOOT),
    f!(104 | 0x80, T1, 0, 0, FOOT),
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z,
    Z, // 233..240
];

// Guard alternate set for frames 150..189: the en-garde stance, strikes,
// blocks, and death.  Sword slots pose the blade over the body.
static GUARD_TABLE: [FrameDef; 40] = [
    // 150..158: walk out / en-garde idle
    f!(1, T1 | 1, 0, 0, FOOT),
    f!(2, T1 | 2, 0, 0, FOOT),
    f!(3, T1 | 3, 0, 0, FOOT),
    f!(4, T1 | 4, 0, 0, FOOT),
    f!(5, T1 | 5, 0, 0, FOOT),
    f!(6, T1 | 6, 0, 0, FOOT),
    f!(7, T1 | 7, 0, 0, FOOT),
    f!(8, T1 | 8, 0, 0, FOOT | ODD),
    f!(9, T1 | 9, 0, 0, FOOT),
    Z, // 159
    // 160..163: advance
    f!(10, T1 | 10, 3, 0, FOOT),
    f!(11, T1 | 11, 3, 0, FOOT),
    f!(12, T1 | 12, 3, 0, FOOT),
    f!(13, T1 | 13, 2, 0, FOOT),
    // 164..166: retreat
    f!(14, T1 | 14, -2, 0, FOOT),
    f!(15, T1 | 15, -2, 0, FOOT),
    f!(16, T1 | 16, -2, 0, FOOT),
    // 167..172: strike
    f!(17, T1 | 17, 0, 0, FOOT),
    f!(18, T1 | 18, 1, 0, FOOT),
    f!(19, T1 | 19, 2, 0, FOOT),
    f!(20, T1 | 20, 0, 0, FOOT),
    f!(21, T1 | 21, 0, 0, FOOT),
    f!(22, T1 | 22, -1, 0, FOOT),
    // 173..175: block
    f!(23, T1 | 23, 0, 0, FOOT),
    f!(24, T1 | 24, 0, 0, FOOT),
    f!(25, T1 | 25, 0, 0, FOOT),
    // 176..178: struck
    f!(26, T1 | 26, -2, 0, FOOT),
    f!(27, T1 | 27, -1, 0, FOOT),
    f!(28, T1 | 28, 0, 0, FOOT),
    // 179..184: fall
    f!(29, T1, 0, 0, 0),
    f!(30, T1, 0, 0, 0),
    f!(31, T1, 0, 0, 0),
    f!(32, T1, 0, 0, 0),
    f!(33, T1, 0, 0, 0),
    f!(34, T1, 0, 0, 0),
    // 185..189: dead and misc
    f!(35, T1, 0, 0, FOOT),
    f!(36, T1, 0, 0, FOOT),
    f!(37, T1, 0, 0, FOOT),
    Z,
    Z,
];

/// Sword overlay records, indexed by sword slot 1..50: image and the
/// offset of the blade relative to the body.
static SWORD_TABLE: [(u8, i8, i8); 51] = [
    (0, 0, 0),
    (1, 0, -2),
    (2, 2, -3),
    (3, 4, -5),
    (4, 6, -7),
    (5, 7, -9),
    (6, 6, -7),
    (7, 4, -5),
    (8, 2, -3),
    (9, 0, -2),
    (10, 3, -4),
    (11, 5, -6),
    (12, 7, -8),
    (13, 8, -10),
    (14, 7, -8),
    (15, 5, -6),
    (16, 3, -4),
    (17, 9, -11),
    (18, 11, -12),
    (19, 13, -12),
    (20, 11, -11),
    (21, 9, -10),
    (22, 7, -9),
    (23, 2, -6),
    (24, 1, -5),
    (25, 0, -4),
    (26, -1, -3),
    (27, -2, -2),
    (28, -3, -1),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
];

/// Frame record for a character.  Ids 1..4 (shadow and guards) use the
/// alternate set over the fighting range; anything out of range reads as
/// the zero record.
pub fn frame(posn: u8, id: u8) -> &'static FrameDef {
    if (1..=4).contains(&id) && (150..=189).contains(&posn) {
        return &GUARD_TABLE[(posn - 150) as usize];
    }
    match FRAME_TABLE.get(posn as usize) {
        Some(def) => def,
        None => &Z,
    }
}

pub fn sword_overlay(slot: u8) -> (u8, i8, i8) {
    match SWORD_TABLE.get(slot as usize) {
        Some(entry) => *entry,
        None => (0, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kid_reads_main_table() {
        let def = frame(15, 0);
        assert_eq!(def.dx, 0);
        assert!(def.on_floor());
    }

    #[test]
    fn guard_reads_alternate_set() {
        let kid = frame(160, 0);
        let guard = frame(160, 2);
        assert_eq!(kid.dx, 0);
        assert_eq!(guard.dx, 3);
        assert_eq!(guard.sword_slot(), 10);
    }

    #[test]
    fn out_of_range_is_zero_record() {
        let def = frame(250, 0);
        assert_eq!(def.check, 0);
        assert_eq!(def.dx, 0);
    }

    #[test]
    fn airborne_jump_frames_skip_floor_checks() {
        for posn in 18..=25 {
            assert!(!frame(posn, 0).on_floor());
        }
        assert!(frame(26, 0).on_floor());
    }

    #[test]
    fn table_select_bits() {
        let def = frame(135, 0);
        assert_eq!(def.table(), 0x4 | 0x1);
    }
}
