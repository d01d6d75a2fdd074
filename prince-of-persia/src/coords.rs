//! Screen/block coordinate math for the 140x192 playfield.
//!
//! All simulation coordinates are 140-res: a room is 10 blocks of 14
//! pixels across and 3 blocks of 63 scanlines down, inset 58 pixels from
//! the left of the coordinate space.

pub const SCRN_LEFT: i16 = 58;
pub const SCRN_WIDTH: i16 = 140;
pub const BLOCK_WIDTH: i16 = 14;
pub const BLOCK_HEIGHT: i16 = 63;

// Offset from a block's left edge to its center plane.
pub const ANGLE: i16 = 7;
pub const VERT_DIST: i16 = 10;

/// Foot scanline of each row's walking surface, indexed by `block_y + 1`
/// (index 0 is the phantom row above the room, index 4 below it).
pub const FLOOR_Y: [i16; 5] = [-8, 55, 118, 181, 244];

/// Top scanline of the block body in each row, same indexing as `FLOOR_Y`.
pub const BLOCK_TOP: [i16; 5] = [-5, 58, 121, 184, 247];

/// Bottom scanline of the block body in each row.
pub const BLOCK_BOT: [i16; 5] = [58, 121, 184, 247, 310];

/// Walking-surface scanline for a block row.
pub fn floor_y(block_y: i16) -> i16 {
    FLOOR_Y[(block_y + 1) as usize]
}

/// Left pixel of block column `b` (may be outside 0..=9).
pub fn block_ej(b: i16) -> i16 {
    SCRN_LEFT + b * BLOCK_WIDTH
}

/// Block column and offset-in-block (0..=13) for an X coordinate.
pub fn block_x(x: i16) -> (i16, i16) {
    let rel = x - SCRN_LEFT;
    (rel.div_euclid(BLOCK_WIDTH), rel.rem_euclid(BLOCK_WIDTH))
}

/// Same as `block_x` but relative to the block center plane.
pub fn block_x_center(x: i16) -> (i16, i16) {
    block_x(x - ANGLE)
}

fn scan_rows(y: i16, table: &[i16; 5]) -> i16 {
    for (i, top) in table.iter().enumerate() {
        if y <= *top {
            return i as i16 - 1;
        }
    }
    3
}

/// Block row for a Y coordinate, by block-body extent.
pub fn block_y(y: i16) -> i16 {
    scan_rows(y, &BLOCK_TOP)
}

/// Block row for a Y coordinate, by floor line.  A character standing at
/// a row's floor scanline maps to that row.
pub fn block_y_center(y: i16) -> i16 {
    scan_rows(y, &FLOOR_Y)
}

/// Move an X coordinate `dx` pixels in the facing direction.  Forward is
/// +X facing right and -X facing left.
pub fn add_char_x(x: i16, face: i16, dx: i16) -> i16 {
    x + face * dx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_x_round_trip() {
        for b in 0..10 {
            let (block, off) = block_x_center(block_ej(b) + ANGLE);
            assert_eq!(block, b);
            assert_eq!(off, 0);
        }
    }

    #[test]
    fn block_x_left_of_screen() {
        let (block, off) = block_x(SCRN_LEFT - 1);
        assert_eq!(block, -1);
        assert_eq!(off, 13);
    }

    #[test]
    fn standing_y_maps_to_own_row() {
        assert_eq!(block_y_center(floor_y(0)), 0);
        assert_eq!(block_y_center(floor_y(1)), 1);
        assert_eq!(block_y_center(floor_y(2)), 2);
        // Just past a floor line belongs to the next row down.
        assert_eq!(block_y_center(floor_y(0) + 1), 1);
    }

    #[test]
    fn add_char_x_is_face_relative() {
        assert_eq!(add_char_x(100, 1, 5), 105);
        assert_eq!(add_char_x(100, -1, 5), 95);
        // Forward then backward restores bit-exact.
        let x = add_char_x(add_char_x(77, -1, 9), -1, -9);
        assert_eq!(x, 77);
    }
}
