//! Tile classification and the neighbor reads the movement code uses.

use crate::character::Character;
use crate::coords::{self, ANGLE, BLOCK_WIDTH};
use crate::level::{Level, Tile, TileKind};

/// Tiles with no floor: they do not stop a fall.
pub fn is_passable(kind: TileKind) -> bool {
    matches!(
        kind,
        TileKind::Space
            | TileKind::PillarTop
            | TileKind::PanelWof
            | TileKind::Block
            | TileKind::ArchTop1
            | TileKind::ArchTop2
            | TileKind::ArchTop3
            | TileKind::ArchTop4
    )
}

/// Barrier class of a tile: 0 clear, 1 panel or gate, 3 mirror or
/// slicer, 4 solid block.
pub fn barrier_code(kind: TileKind) -> usize {
    match kind {
        TileKind::Gate | TileKind::PanelWif | TileKind::PanelWof => 1,
        TileKind::Mirror | TileKind::Slicer => 3,
        TileKind::Block => 4,
        _ => 0,
    }
}

/// Pixel insets of a barrier body from the block's left and right edge,
/// indexed by barrier code.
pub const BAR_L: [i16; 5] = [0, 12, 2, 0, 0];
pub const BAR_R: [i16; 5] = [0, 0, 9, 11, 0];

/// Solid for movement purposes.  Panels only block a left-facing
/// character; their open side faces right.
pub fn is_wall(kind: TileKind, face: i16) -> bool {
    match kind {
        TileKind::Block => true,
        TileKind::PanelWif | TileKind::PanelWof => face < 0,
        _ => false,
    }
}

/// Whether a ledge can be grabbed: the tile above the ledge must be
/// clear, and the ledge itself must hold a floor that is still there.
pub fn can_grab_ledge(ledge: &Tile, above: &Tile, face: i16) -> bool {
    if above.kind == TileKind::Block {
        return false;
    }
    if above.kind == TileKind::PanelWof && face > 0 {
        return false;
    }
    if !is_passable(above.kind) {
        return false;
    }
    if is_passable(ledge.kind) {
        return false;
    }
    // A loose floor already shaken counts as gone.
    if ledge.kind == TileKind::Loose && ledge.spec != 0 {
        return false;
    }
    if ledge.kind == TileKind::PanelWif && face < 0 {
        return false;
    }
    true
}

/// Signed distance from the character's base X to the near face of a
/// barrier in block column `block`, or `None` when the tile poses no
/// barrier.  A gate that has opened past 24 is pass-through.
pub fn dist_to_barrier(chr: &Character, tile: &Tile, block: i16) -> Option<i16> {
    let code = barrier_code(tile.kind);
    if code == 0 {
        return None;
    }
    if tile.kind == TileKind::Gate && tile.spec >= 24 {
        return None;
    }
    let edge = coords::block_ej(block) + ANGLE;
    Some(if chr.face > 0 {
        (edge + BAR_L[code]) - chr.base_x()
    } else {
        chr.base_x() - (edge + BLOCK_WIDTH - 1 - BAR_R[code])
    })
}

// Neighbor reads relative to the character's block position.

pub fn tile_own(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x, chr.block_y)
}

pub fn tile_front(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x + chr.face, chr.block_y)
}

pub fn tile_behind(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x - chr.face, chr.block_y)
}

pub fn tile_above(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x, chr.block_y - 1)
}

pub fn tile_above_front(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x + chr.face, chr.block_y - 1)
}

pub fn tile_above_behind(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x - chr.face, chr.block_y - 1)
}

pub fn tile_below(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x, chr.block_y + 1)
}

pub fn tile_below_behind(level: &Level, chr: &Character) -> Tile {
    level.tile_at(chr.scrn, chr.block_x - chr.face, chr.block_y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::VOID_TILE;

    fn tile(kind: TileKind, spec: u8) -> Tile {
        Tile {
            kind,
            modifier: false,
            section: 0,
            spec,
        }
    }

    #[test]
    fn passable_means_no_floor() {
        assert!(is_passable(TileKind::Space));
        assert!(is_passable(TileKind::Block));
        assert!(is_passable(TileKind::ArchTop3));
        assert!(!is_passable(TileKind::Floor));
        assert!(!is_passable(TileKind::Loose));
        assert!(!is_passable(TileKind::Gate));
    }

    #[test]
    fn panels_wall_only_leftward() {
        assert!(is_wall(TileKind::PanelWif, -1));
        assert!(!is_wall(TileKind::PanelWif, 1));
        assert!(is_wall(TileKind::Block, 1));
        assert!(!is_wall(TileKind::Floor, -1));
    }

    #[test]
    fn grab_needs_clear_air_and_a_floor() {
        let space = tile(TileKind::Space, 0);
        let floor = tile(TileKind::Floor, 0);
        assert!(can_grab_ledge(&floor, &space, -1));
        // Solid block above blocks the grab.
        assert!(!can_grab_ledge(&floor, &VOID_TILE, -1));
        // No ledge to grab.
        assert!(!can_grab_ledge(&space, &space, -1));
        // A shaken loose floor is as good as gone.
        assert!(!can_grab_ledge(&tile(TileKind::Loose, 1), &space, -1));
        assert!(can_grab_ledge(&tile(TileKind::Loose, 0), &space, -1));
        // Left-facing panel is not grabbable from its open side.
        assert!(!can_grab_ledge(&tile(TileKind::PanelWif, 0), &space, -1));
        assert!(can_grab_ledge(&tile(TileKind::PanelWif, 0), &space, 1));
    }

    #[test]
    fn open_gate_is_pass_through() {
        let table = crate::seq::SeqTable::standard();
        let level = crate::level::testutil::build_level(|_| {});
        let chr = crate::character::create_kid(&level, 3, &table);
        let shut = tile(TileKind::Gate, 0);
        let open = tile(TileKind::Gate, 24);
        assert!(dist_to_barrier(&chr, &shut, chr.block_x).is_some());
        assert!(dist_to_barrier(&chr, &open, chr.block_x).is_none());
    }
}
