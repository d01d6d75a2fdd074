//! Level file parsing and the mutable tile model.
//!
//! A level is a 2,304 byte image holding 24 rooms of 30 tiles (3 rows of
//! 10 columns, row major), the pressure-plate link tables, the 4-neighbor
//! room map, and the INFO start-data page.

use byteorder::ReadBytesExt;
use failure::{format_err, Error};
use num::FromPrimitive;
use num_derive::FromPrimitive;
use serde::Serialize;
use std::io::Cursor;

macro_rules! is_bit_set {
    ($value:expr, $test:expr) => {
        ($value & $test) == $test
    };
}

pub const LEVEL_FILE_SIZE: usize = 0x900;
pub const NUM_ROOMS: usize = 24;
pub const TILES_PER_ROOM: usize = 30;
pub const ROOM_COLS: i16 = 10;
pub const ROOM_ROWS: i16 = 3;

const BLUETYPE_OFFSET: usize = 0x000;
const BLUESPEC_OFFSET: usize = 0x2d0;
const LINKLOC_OFFSET: usize = 0x5a0;
const LINKMAP_OFFSET: usize = 0x6a0;
const MAP_OFFSET: usize = 0x7a0;
const INFO_OFFSET: usize = 0x800;

// INFO page layout, relative to INFO_OFFSET.
const INFO_NUM_ROOMS: usize = 0x00;
const INFO_KID_START: usize = 0x40;
const INFO_SWORD_START: usize = 0x44;
const INFO_GUARD_BLOCK: usize = 0x47;
const INFO_GUARD_FACE: usize = 0x5f;
const INFO_GUARD_SKILL: usize = 0xa7;

/// A guard start block of 30 or more means "no guard in this room".
pub const NO_GUARD_BLOCK: u8 = 30;

#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq, Serialize)]
#[repr(u8)]
pub enum TileKind {
    Space = 0x00,
    Floor = 0x01,
    Spikes = 0x02,
    Posts = 0x03,
    Gate = 0x04,
    DPressPlate = 0x05,
    PressPlate = 0x06,
    PanelWif = 0x07,
    PillarBottom = 0x08,
    PillarTop = 0x09,
    Flask = 0x0a,
    Loose = 0x0b,
    PanelWof = 0x0c,
    Mirror = 0x0d,
    Rubble = 0x0e,
    UPressPlate = 0x0f,
    Exit = 0x10,
    Exit2 = 0x11,
    Slicer = 0x12,
    Torch = 0x13,
    Block = 0x14,
    Bones = 0x15,
    Sword = 0x16,
    Window = 0x17,
    Window2 = 0x18,
    ArchBot = 0x19,
    ArchTop1 = 0x1a,
    ArchTop2 = 0x1b,
    ArchTop3 = 0x1c,
    ArchTop4 = 0x1d,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Bit 5 of the type byte.  A loose floor with the modifier set is
    /// required and can never detach.
    pub modifier: bool,
    /// Bits 6..7 of the type byte, a renderer hint.
    pub section: u8,
    /// The only field that mutates during simulation.  Interpretation is
    /// per tile kind: animation phase, timer, or plate link index.
    pub spec: u8,
}

/// The synthetic tile returned for lookups that leave the room map.
pub const VOID_TILE: Tile = Tile {
    kind: TileKind::Block,
    modifier: false,
    section: 0,
    spec: 0,
};

#[derive(Clone, Debug, Serialize)]
pub struct Room {
    pub tiles: [Tile; TILES_PER_ROOM],
    pub left: u8,
    pub right: u8,
    pub up: u8,
    pub down: u8,
}

/// A resolved tile position: room number and tile index within the room.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TileLoc {
    pub room: u8,
    pub idx: u8,
}

impl TileLoc {
    pub fn new(room: u8, col: i16, row: i16) -> TileLoc {
        TileLoc {
            room,
            idx: (row * ROOM_COLS + col) as u8,
        }
    }

    pub fn col(&self) -> i16 {
        self.idx as i16 % ROOM_COLS
    }

    pub fn row(&self) -> i16 {
        self.idx as i16 / ROOM_COLS
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct GuardStart {
    pub block: u8,
    pub face: i16,
    pub skill: u8,
}

// Not serialized: the renderer contract exposes per-room views, never
// the whole level (and serde has no impls for the 256-byte link arrays).
#[derive(Clone, Debug)]
pub struct Level {
    rooms: Vec<Room>,
    pub link_loc: [u8; 256],
    pub link_map: [u8; 256],
    pub num_rooms: u8,
    pub kid_room: u8,
    pub kid_block: u8,
    pub kid_face: i16,
    pub sword_room: u8,
    pub sword_block: u8,
    guards: Vec<Option<GuardStart>>,
}

struct Loader<'a> {
    data: &'a [u8],
}

impl<'a> Loader<'a> {
    fn new(data: &'a [u8]) -> Loader<'a> {
        Loader { data }
    }

    fn load_tile(self: &Self, room: usize, idx: usize) -> Result<Tile, Error> {
        let ty = self.data[BLUETYPE_OFFSET + room * TILES_PER_ROOM + idx];
        let spec = self.data[BLUESPEC_OFFSET + room * TILES_PER_ROOM + idx];
        let kind = TileKind::from_u8(ty & 0x1f).ok_or(format_err!(
            "unknown tile type {:02x} at room {} tile {}",
            ty & 0x1f,
            room + 1,
            idx
        ))?;
        Ok(Tile {
            kind,
            modifier: is_bit_set!(ty, 0x20),
            section: (ty >> 6) & 0x3,
            spec,
        })
    }

    fn load_room(self: &Self, room: usize) -> Result<Room, Error> {
        let mut tiles = [VOID_TILE; TILES_PER_ROOM];
        for (idx, tile) in tiles.iter_mut().enumerate() {
            *tile = self.load_tile(room, idx)?;
        }
        let mut r = Cursor::new(&self.data[MAP_OFFSET + room * 4..]);
        Ok(Room {
            tiles,
            left: r.read_u8()?,
            right: r.read_u8()?,
            up: r.read_u8()?,
            down: r.read_u8()?,
        })
    }

    fn load(self: Self) -> Result<Level, Error> {
        let info = &self.data[INFO_OFFSET..];

        let mut rooms = Vec::with_capacity(NUM_ROOMS);
        for room in 0..NUM_ROOMS {
            rooms.push(self.load_room(room)?);
        }

        let mut guards = Vec::with_capacity(NUM_ROOMS);
        for room in 0..NUM_ROOMS {
            let block = info[INFO_GUARD_BLOCK + room];
            if block >= NO_GUARD_BLOCK {
                guards.push(None);
            } else {
                guards.push(Some(GuardStart {
                    block,
                    face: face_from_flag(info[INFO_GUARD_FACE + room]),
                    skill: info[INFO_GUARD_SKILL + room],
                }));
            }
        }

        let mut link_loc = [0u8; 256];
        let mut link_map = [0u8; 256];
        link_loc.copy_from_slice(&self.data[LINKLOC_OFFSET..LINKLOC_OFFSET + 256]);
        link_map.copy_from_slice(&self.data[LINKMAP_OFFSET..LINKMAP_OFFSET + 256]);

        let level = Level {
            rooms,
            link_loc,
            link_map,
            num_rooms: info[INFO_NUM_ROOMS].wrapping_sub(1),
            kid_room: info[INFO_KID_START],
            kid_block: info[INFO_KID_START + 1],
            kid_face: face_from_flag(info[INFO_KID_START + 2]),
            sword_room: info[INFO_SWORD_START],
            sword_block: info[INFO_SWORD_START + 1],
            guards,
        };

        if level.kid_room as usize > NUM_ROOMS || level.kid_room == 0 {
            return Err(format_err!("kid start room {} out of range", level.kid_room));
        }
        if level.kid_block as usize >= TILES_PER_ROOM {
            return Err(format_err!("kid start block {} out of range", level.kid_block));
        }

        Ok(level)
    }
}

fn face_from_flag(flag: u8) -> i16 {
    if flag == 0xff {
        -1
    } else {
        1
    }
}

impl Level {
    pub fn from_bytes(data: &[u8]) -> Result<Level, Error> {
        if data.len() != LEVEL_FILE_SIZE {
            return Err(format_err!(
                "level file is {} bytes, expected {}",
                data.len(),
                LEVEL_FILE_SIZE
            ));
        }
        let level = Loader::new(data).load()?;
        log::debug!(
            "loaded level: {} rooms, kid at room {} block {}",
            level.num_rooms,
            level.kid_room,
            level.kid_block
        );
        Ok(level)
    }

    pub fn room(&self, room: u8) -> Option<&Room> {
        if room == 0 || room as usize > NUM_ROOMS {
            return None;
        }
        self.rooms.get(room as usize - 1)
    }

    pub fn guard_start(&self, room: u8) -> Option<GuardStart> {
        if room == 0 || room as usize > NUM_ROOMS {
            return None;
        }
        self.guards[room as usize - 1]
    }

    /// Resolve a possibly out-of-room (col, row) to a concrete tile
    /// location, stepping through neighbor rooms.  Returns `None` when the
    /// walk leaves the map (no neighbor on that side).
    pub fn resolve(&self, room: u8, col: i16, row: i16) -> Option<TileLoc> {
        let mut room = room;
        let mut col = col;
        let mut row = row;
        loop {
            let r = self.room(room)?;
            if col < 0 {
                room = r.left;
                col += ROOM_COLS;
            } else if col >= ROOM_COLS {
                room = r.right;
                col -= ROOM_COLS;
            } else if row < 0 {
                room = r.up;
                row += ROOM_ROWS;
            } else if row >= ROOM_ROWS {
                room = r.down;
                row -= ROOM_ROWS;
            } else {
                return Some(TileLoc::new(room, col, row));
            }
        }
    }

    pub fn tile(&self, loc: TileLoc) -> &Tile {
        &self.rooms[loc.room as usize - 1].tiles[loc.idx as usize]
    }

    /// Tile at (col, row) of `room`, wrapping into neighbors.  Lookups
    /// that fall off the map read as solid block.
    pub fn tile_at(&self, room: u8, col: i16, row: i16) -> Tile {
        match self.resolve(room, col, row) {
            Some(loc) => *self.tile(loc),
            None => VOID_TILE,
        }
    }

    pub fn set_spec(&mut self, loc: TileLoc, spec: u8) {
        self.rooms[loc.room as usize - 1].tiles[loc.idx as usize].spec = spec;
    }

    /// Change a tile's kind mid-simulation (pickup, loose-floor detach,
    /// rubble).  The spec byte is reset alongside.
    pub fn set_kind(&mut self, loc: TileLoc, kind: TileKind, spec: u8) {
        let tile = &mut self.rooms[loc.room as usize - 1].tiles[loc.idx as usize];
        tile.kind = kind;
        tile.spec = spec;
    }

    /// Decoded pressure-plate link entry `i` (see the level file format):
    /// target tile, target room (5 bits split across both arrays), the
    /// end-of-chain flag, and the plate timer.
    pub fn link(&self, i: u8) -> LinkEntry {
        let loc = self.link_loc[i as usize];
        let map = self.link_map[i as usize];
        LinkEntry {
            tile: loc & 0x1f,
            room: ((map & 0xe0) >> 3) | ((loc & 0x60) >> 5),
            last: is_bit_set!(loc, 0x80),
            timer: map & 0x1f,
        }
    }

    pub fn set_link_timer(&mut self, i: u8, timer: u8) {
        let map = self.link_map[i as usize];
        self.link_map[i as usize] = (map & 0xe0) | (timer & 0x1f);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LinkEntry {
    pub tile: u8,
    pub room: u8,
    pub last: bool,
    pub timer: u8,
}

#[cfg(test)]
pub mod testutil {
    use super::*;

    /// Assemble a level image in memory.  Every room defaults to a full
    /// floor row at the bottom and space above, with no neighbors; the
    /// closure patches the image before parsing.  The kid starts in room
    /// 1 on block 22, facing left.
    pub fn build_level_data<F: FnOnce(&mut Vec<u8>)>(patch: F) -> Vec<u8> {
        let mut data = vec![0u8; LEVEL_FILE_SIZE];
        for room in 0..NUM_ROOMS {
            for col in 0..10 {
                data[BLUETYPE_OFFSET + room * TILES_PER_ROOM + 20 + col] = TileKind::Floor as u8;
            }
        }
        data[INFO_OFFSET + INFO_NUM_ROOMS] = 2;
        data[INFO_OFFSET + INFO_KID_START] = 1;
        data[INFO_OFFSET + INFO_KID_START + 1] = 22;
        data[INFO_OFFSET + INFO_KID_START + 2] = 0xff;
        for room in 0..NUM_ROOMS {
            data[INFO_OFFSET + INFO_GUARD_BLOCK + room] = 0xff;
        }
        patch(&mut data);
        data
    }

    pub fn build_level<F: FnOnce(&mut Vec<u8>)>(patch: F) -> Level {
        Level::from_bytes(&build_level_data(patch)).unwrap()
    }

    pub fn set_kid_start(data: &mut Vec<u8>, room: u8, block: u8, face_flag: u8) {
        data[INFO_OFFSET + INFO_KID_START] = room;
        data[INFO_OFFSET + INFO_KID_START + 1] = block;
        data[INFO_OFFSET + INFO_KID_START + 2] = face_flag;
    }

    pub fn set_guard_start(data: &mut Vec<u8>, room: u8, block: u8, face_flag: u8, skill: u8) {
        let i = room as usize - 1;
        data[INFO_OFFSET + INFO_GUARD_BLOCK + i] = block;
        data[INFO_OFFSET + INFO_GUARD_FACE + i] = face_flag;
        data[INFO_OFFSET + INFO_GUARD_SKILL + i] = skill;
    }

    pub fn set_tile(data: &mut Vec<u8>, room: u8, col: i16, row: i16, kind: TileKind, spec: u8) {
        let idx = (room as usize - 1) * TILES_PER_ROOM + (row * ROOM_COLS + col) as usize;
        data[BLUETYPE_OFFSET + idx] = kind as u8;
        data[BLUESPEC_OFFSET + idx] = spec;
    }

    pub fn set_neighbors(data: &mut Vec<u8>, room: u8, left: u8, right: u8, up: u8, down: u8) {
        let off = MAP_OFFSET + (room as usize - 1) * 4;
        data[off] = left;
        data[off + 1] = right;
        data[off + 2] = up;
        data[off + 3] = down;
    }

    pub fn set_link(data: &mut Vec<u8>, i: u8, room: u8, tile: u8, last: bool, timer: u8) {
        data[LINKLOC_OFFSET + i as usize] =
            (tile & 0x1f) | ((room & 0x3) << 5) | if last { 0x80 } else { 0 };
        data[LINKMAP_OFFSET + i as usize] = (timer & 0x1f) | ((room & 0x1c) << 3);
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn rejects_short_file() {
        assert!(Level::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn rejects_unknown_tile_type() {
        let mut data = vec![0u8; LEVEL_FILE_SIZE];
        data[BLUETYPE_OFFSET] = 0x1e;
        data[INFO_OFFSET + INFO_NUM_ROOMS] = 2;
        data[INFO_OFFSET + INFO_KID_START] = 1;
        assert!(Level::from_bytes(&data).is_err());
    }

    #[test]
    fn parses_start_data() {
        let level = build_level(|_| {});
        assert_eq!(level.kid_room, 1);
        assert_eq!(level.kid_block, 22);
        assert_eq!(level.kid_face, -1);
        assert!(level.guard_start(1).is_none());
    }

    #[test]
    fn tile_modifier_and_section_bits() {
        let level = build_level(|data| {
            let idx = BLUETYPE_OFFSET + 5;
            data[idx] = TileKind::Loose as u8 | 0x20 | 0x80;
        });
        let tile = level.tile_at(1, 5, 0);
        assert_eq!(tile.kind, TileKind::Loose);
        assert!(tile.modifier);
        assert_eq!(tile.section, 2);
    }

    #[test]
    fn lookup_wraps_into_neighbors() {
        let level = build_level(|data| {
            set_neighbors(data, 1, 2, 3, 0, 0);
            set_tile(data, 2, 9, 0, TileKind::Torch, 0);
            set_tile(data, 3, 0, 1, TileKind::Gate, 7);
        });
        assert_eq!(level.tile_at(1, -1, 0).kind, TileKind::Torch);
        let gate = level.tile_at(1, 10, 1);
        assert_eq!(gate.kind, TileKind::Gate);
        assert_eq!(gate.spec, 7);
        // No up neighbor: solid block.
        assert_eq!(level.tile_at(1, 4, -1).kind, TileKind::Block);
    }

    #[test]
    fn link_entry_decoding() {
        let level = build_level(|data| {
            // Room 22 (0b10110) splits as high 101, low 10.
            set_link(data, 9, 22, 17, true, 5);
        });
        let entry = level.link(9);
        assert_eq!(entry.room, 22);
        assert_eq!(entry.tile, 17);
        assert!(entry.last);
        assert_eq!(entry.timer, 5);
    }

    #[test]
    fn set_link_timer_preserves_room_bits() {
        let mut level = build_level(|data| {
            set_link(data, 3, 22, 17, false, 5);
        });
        level.set_link_timer(3, 31);
        let entry = level.link(3);
        assert_eq!(entry.timer, 31);
        assert_eq!(entry.room, 22);
    }
}
