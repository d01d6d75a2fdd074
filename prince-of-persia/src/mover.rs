//! Animated tiles and falling floor pieces.
//!
//! Two fixed-capacity lists drive everything that moves besides the
//! characters.  TROB entries animate a tile in place by evolving its
//! spec byte (gates, spikes, slicers, loose floors, pressure plates,
//! exit doors); MOB entries are loose-floor pieces that have detached
//! and fall through open space until they crash into a floor.
//!
//! Pressure plates reach their remote targets through the level's two
//! 256-byte link arrays; a chain is walked entry by entry until one
//! carries the last-in-chain bit.

use serde::Serialize;

use crate::character::Character;
use crate::coords;
use crate::level::{Level, TileKind, TileLoc};

pub const MAX_TROBS: usize = 31;
pub const MAX_MOBS: usize = 15;

// Gate spec space: 0 closed, up to GMAX_VAL opening, then the hold-open
// timer zone, 0xff jammed open for good.
pub const GMAX_VAL: u8 = 188;
const GATE_TIMER_TOP: u8 = 238;
pub const GATE_JAMMED: u8 = 0xff;
const GATE_RISE: u8 = 4;
const GATE_DROP_VEL: [u8; 9] = [0, 0, 0, 20, 40, 60, 80, 100, 120];

pub const EMAX_VAL: u8 = 172;
const EXIT_RISE: u8 = 4;

// Spikes: 1..4 extending, 5 out, 0x8f..0x81 armed countdown, 6..8
// retracting, 0xff jammed by an impalement.
const SPIKES_OUT: u8 = 5;
const SPIKES_ARMED: u8 = 0x8f;
const SPIKES_DONE: u8 = 9;
pub const SPIKES_JAMMED: u8 = 0xff;

// Slicer: frame counter in the low bits, blood on the blade in bit 7.
const SLICE_TIMER: u8 = 15;
const SLICER_RET: u8 = 6;
pub const SLICER_EXT: u8 = 2;
const SLICER_SYNC: u8 = 3;
const SLICER_BLOOD: u8 = 0x80;
const SLICER_INIT: u8 = 1;

// Loose floor: a short wiggle, then a count to the drop.
const FFALLING: u8 = 10;
const WIGGLE_START: u8 = 0x80;
const WIGGLE_END: u8 = 0x83;
const CRUMBLE_TIME: i16 = 2;
const MOB_TERMINAL: i16 = 29;

const PLATE_PERMANENT: u8 = 31;
const PLATE_TIMER: u8 = 5;

// TROB directions.  Gates use 3..8 as an index into the fast-close
// velocity ramp.
const DIR_STOP: i8 = -1;
pub const DIR_DOWN: i8 = 0;
pub const DIR_UP: i8 = 1;
pub const DIR_UPJAM: i8 = 2;
pub const DIR_FAST: i8 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpikeState {
    Safe,
    Deadly,
    Springing,
}

/// What a plate press means to its targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlateKind {
    /// A regular plate drops gates shut.
    Regular,
    /// A raise plate opens gates (and exits).
    Raise,
    /// Rubble jams gates open permanently.
    Rubble,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct Trob {
    loc: TileLoc,
    dir: i8,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct Mob {
    x: i16,
    y: i16,
    screen: u8,
    yvel: i16,
    row: i16,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Movers {
    trobs: Vec<Trob>,
    mobs: Vec<Mob>,
    /// Requested screen-shake frames; the scheduler decays it.
    pub shake: u8,
}

impl Movers {
    pub fn new() -> Movers {
        Movers::default()
    }

    pub fn trob_count(&self) -> usize {
        self.trobs.len()
    }

    pub fn mob_count(&self) -> usize {
        self.mobs.len()
    }

    fn search(&self, loc: TileLoc) -> Option<usize> {
        self.trobs.iter().position(|t| t.loc == loc)
    }

    fn add(&mut self, loc: TileLoc, dir: i8) {
        if let Some(i) = self.search(loc) {
            self.trobs[i].dir = dir;
            return;
        }
        if self.trobs.len() >= MAX_TROBS {
            log::warn!("trob list full, dropping tile {:?}", loc);
            return;
        }
        self.trobs.push(Trob { loc, dir });
    }

    fn request_shake(&mut self, frames: u8) {
        self.shake = std::cmp::max(self.shake, frames);
    }

    /// One frame of everything: falling pieces first, then the in-place
    /// tile animations, each scanned back to front.
    pub fn animate(&mut self, level: &mut Level, current_screen: u8) {
        self.anim_mobs(level);
        self.anim_trans(level, current_screen);
    }

    fn anim_trans(&mut self, level: &mut Level, current_screen: u8) {
        for i in (0..self.trobs.len()).rev() {
            let trob = self.trobs[i];
            let kind = level.tile(trob.loc).kind;
            match kind {
                TileKind::Gate => self.anim_gate(level, i),
                TileKind::Exit | TileKind::Exit2 => self.anim_exit(level, i),
                TileKind::Spikes => self.anim_spikes(level, i),
                TileKind::Slicer => self.anim_slicer(level, i, current_screen),
                TileKind::Loose => self.anim_loose(level, i),
                TileKind::PressPlate | TileKind::UPressPlate => self.anim_plate(level, i),
                // The tile changed under the entry (picked up, crumbled).
                _ => self.trobs[i].dir = DIR_STOP,
            }
        }
        self.trobs.retain(|t| t.dir != DIR_STOP);
    }

    fn anim_gate(&mut self, level: &mut Level, i: usize) {
        let loc = self.trobs[i].loc;
        let dir = self.trobs[i].dir;
        let spec = level.tile(loc).spec;
        if spec == GATE_JAMMED {
            self.trobs[i].dir = DIR_STOP;
            return;
        }
        match dir {
            DIR_DOWN => {
                if spec == 0 {
                    self.trobs[i].dir = DIR_STOP;
                } else {
                    level.set_spec(loc, spec - 1);
                }
            }
            DIR_UP => {
                let next = spec.saturating_add(GATE_RISE);
                if next >= GMAX_VAL {
                    level.set_spec(loc, GATE_TIMER_TOP);
                    self.trobs[i].dir = DIR_DOWN;
                } else {
                    level.set_spec(loc, next);
                }
            }
            DIR_UPJAM => {
                let next = spec.saturating_add(GATE_RISE);
                if next >= GMAX_VAL {
                    level.set_spec(loc, GATE_JAMMED);
                    self.trobs[i].dir = DIR_STOP;
                } else {
                    level.set_spec(loc, next);
                }
            }
            _ => {
                // Fast close, accelerating down the velocity ramp.
                let vel = GATE_DROP_VEL[dir as usize];
                if spec <= vel {
                    level.set_spec(loc, 0);
                    self.trobs[i].dir = DIR_STOP;
                    self.request_shake(2);
                } else {
                    level.set_spec(loc, spec - vel);
                    self.trobs[i].dir = std::cmp::min(dir + 1, 8);
                }
            }
        }
    }

    fn anim_exit(&mut self, level: &mut Level, i: usize) {
        let loc = self.trobs[i].loc;
        let spec = level.tile(loc).spec;
        let next = spec.saturating_add(EXIT_RISE);
        if next >= EMAX_VAL {
            level.set_spec(loc, EMAX_VAL);
            self.trobs[i].dir = DIR_STOP;
        } else {
            level.set_spec(loc, next);
        }
    }

    fn anim_spikes(&mut self, level: &mut Level, i: usize) {
        let loc = self.trobs[i].loc;
        let spec = level.tile(loc).spec;
        if spec == SPIKES_JAMMED {
            self.trobs[i].dir = DIR_STOP;
            return;
        }
        if spec & 0x80 != 0 {
            // Armed countdown; at zero the retraction starts.
            let next = spec - 1;
            if next & 0x7f == 0 {
                level.set_spec(loc, SPIKES_OUT + 1);
            } else {
                level.set_spec(loc, next);
            }
            return;
        }
        if spec == SPIKES_OUT {
            level.set_spec(loc, SPIKES_ARMED);
            return;
        }
        let next = spec + 1;
        if next >= SPIKES_DONE {
            level.set_spec(loc, 0);
            self.trobs[i].dir = DIR_STOP;
        } else {
            level.set_spec(loc, next);
        }
    }

    fn anim_slicer(&mut self, level: &mut Level, i: usize, current_screen: u8) {
        let loc = self.trobs[i].loc;
        let spec = level.tile(loc).spec;
        let blood = spec & SLICER_BLOOD;
        let mut frame = (spec & 0x7f) + 1;
        if frame >= SLICE_TIMER {
            frame = 0;
        }
        if frame == SLICER_RET && loc.room != current_screen {
            // Out of sight: park the blade and drop the entry.
            level.set_spec(loc, 0);
            self.trobs[i].dir = DIR_STOP;
            return;
        }
        level.set_spec(loc, blood | frame);
    }

    fn anim_loose(&mut self, level: &mut Level, i: usize) {
        let loc = self.trobs[i].loc;
        let spec = level.tile(loc).spec;
        if spec & 0x80 != 0 {
            // Wiggle phase.
            if spec >= WIGGLE_END {
                level.set_spec(loc, 1);
            } else {
                level.set_spec(loc, spec + 1);
            }
            return;
        }
        let next = spec + 1;
        if next <= FFALLING {
            level.set_spec(loc, next);
            return;
        }
        // Detach: the tile becomes space and the piece a falling mob.
        let col = loc.col();
        let row = loc.row();
        level.set_kind(loc, TileKind::Space, 0);
        self.trobs[i].dir = DIR_STOP;
        if self.mobs.len() >= MAX_MOBS {
            log::warn!("mob list full, dropping piece from {:?}", loc);
            return;
        }
        self.mobs.push(Mob {
            x: coords::block_ej(col) + coords::ANGLE,
            y: coords::floor_y(row),
            screen: loc.room,
            yvel: 0,
            row,
        });
    }

    fn anim_plate(&mut self, level: &mut Level, i: usize) {
        let loc = self.trobs[i].loc;
        let idx = level.tile(loc).spec;
        let timer = level.link(idx).timer;
        if timer <= 1 {
            level.set_link_timer(idx, 0);
            self.trobs[i].dir = DIR_STOP;
        } else {
            level.set_link_timer(idx, timer - 1);
        }
    }

    fn anim_mobs(&mut self, level: &mut Level) {
        for i in (0..self.mobs.len()).rev() {
            let mut mob = self.mobs[i];
            if mob.yvel < 0 {
                // Crumbling where it landed.
                mob.yvel += 1;
                if mob.yvel == 0 {
                    self.mobs.remove(i);
                } else {
                    self.mobs[i] = mob;
                }
                continue;
            }

            mob.yvel = std::cmp::min(mob.yvel + 3, MOB_TERMINAL);
            mob.y += mob.yvel;

            if mob.screen == 0 {
                if mob.y >= 192 + 17 {
                    self.mobs.remove(i);
                } else {
                    self.mobs[i] = mob;
                }
                continue;
            }

            let next = mob.row + 1;
            if mob.y >= coords::floor_y(next) {
                if next > 2 {
                    // Out the bottom of the room.
                    let down = level.room(mob.screen).map(|r| r.down).unwrap_or(0);
                    mob.screen = down;
                    if down != 0 {
                        mob.row = -1;
                        mob.y -= 3 * coords::BLOCK_HEIGHT;
                    }
                } else {
                    let (col, _) = coords::block_x_center(mob.x);
                    match level.resolve(mob.screen, col, next) {
                        Some(loc) => {
                            let kind = level.tile(loc).kind;
                            if kind == TileKind::Space {
                                mob.row = next;
                            } else if kind == TileKind::Loose {
                                self.knock_loose(level, loc);
                                mob.yvel /= 2;
                                mob.row = next;
                            } else {
                                mob.y = coords::floor_y(next);
                                mob.yvel = -CRUMBLE_TIME;
                                self.make_rubble(level, loc);
                                self.request_shake(4);
                            }
                        }
                        None => mob.screen = 0,
                    }
                }
            }
            self.mobs[i] = mob;
        }
    }

    fn knock_loose(&mut self, level: &mut Level, loc: TileLoc) {
        let tile = level.tile(loc);
        if tile.modifier || tile.spec != 0 {
            return;
        }
        level.set_spec(loc, WIGGLE_START);
        self.add(loc, DIR_DOWN);
    }

    /// Turn the tile a piece crashed on into rubble; a pressure plate
    /// underneath fires its chain one last time, jammed.
    fn make_rubble(&mut self, level: &mut Level, loc: TileLoc) {
        let tile = *level.tile(loc);
        if matches!(tile.kind, TileKind::PressPlate | TileKind::UPressPlate) {
            self.jam_plate(level, loc);
        }
        level.set_kind(loc, TileKind::Rubble, 0);
    }

    /// A plate crushed by rubble: the plate tile degrades and its chain
    /// fires with jam semantics.
    pub fn jam_plate(&mut self, level: &mut Level, loc: TileLoc) {
        let tile = *level.tile(loc);
        let idx = tile.spec;
        match tile.kind {
            TileKind::PressPlate => level.set_kind(loc, TileKind::DPressPlate, idx),
            TileKind::UPressPlate => level.set_kind(loc, TileKind::Floor, 0),
            _ => return,
        }
        self.trigger_chain(level, idx, PlateKind::Rubble);
    }

    /// A character stands on a plate.
    pub fn push_plate(&mut self, level: &mut Level, loc: TileLoc) {
        let tile = *level.tile(loc);
        let kind = match tile.kind {
            TileKind::PressPlate => PlateKind::Regular,
            TileKind::UPressPlate => PlateKind::Raise,
            _ => return,
        };
        let idx = tile.spec;
        let timer = level.link(idx).timer;
        if timer >= PLATE_PERMANENT {
            return;
        }
        if timer >= 2 {
            // Still depressed: rearm and re-trigger.
            level.set_link_timer(idx, PLATE_TIMER);
            self.trigger_chain(level, idx, kind);
            return;
        }
        level.set_link_timer(idx, PLATE_TIMER);
        self.add(loc, DIR_DOWN);
        self.trigger_chain(level, idx, kind);
    }

    fn trigger_chain(&mut self, level: &mut Level, start: u8, kind: PlateKind) {
        let mut i = start;
        loop {
            let entry = level.link(i);
            if let Some(loc) = target_loc(level, entry.room, entry.tile) {
                match level.tile(loc).kind {
                    TileKind::Gate => self.trigger_gate(level, loc, kind),
                    TileKind::Exit | TileKind::Exit2 => self.add(loc, DIR_UP),
                    _ => {}
                }
            }
            if entry.last {
                break;
            }
            i = i.wrapping_add(1);
        }
    }

    fn trigger_gate(&mut self, level: &mut Level, loc: TileLoc, kind: PlateKind) {
        let spec = level.tile(loc).spec;
        if spec == GATE_JAMMED {
            return;
        }
        match kind {
            PlateKind::Raise => {
                if spec > GMAX_VAL {
                    // Already at the top: just rearm the hold timer.
                    level.set_spec(loc, GATE_TIMER_TOP);
                    self.add(loc, DIR_DOWN);
                } else {
                    self.add(loc, DIR_UP);
                }
            }
            PlateKind::Rubble => self.add(loc, DIR_UPJAM),
            PlateKind::Regular => self.add(loc, DIR_FAST),
        }
    }

    /// Arm a spike tile.
    pub fn trig_spikes(&mut self, level: &mut Level, loc: TileLoc) {
        let spec = level.tile(loc).spec;
        if spec == SPIKES_JAMMED {
            return;
        }
        if spec & 0x80 != 0 {
            level.set_spec(loc, SPIKES_ARMED);
            return;
        }
        if spec == 0 {
            level.set_spec(loc, 1);
            self.add(loc, DIR_DOWN);
        }
        // Mid-cycle: already moving, nothing to do.
    }

    /// Restart a slicer that is idle or past its retraction point.
    pub fn trig_slicer(&mut self, level: &mut Level, loc: TileLoc) {
        let spec = level.tile(loc).spec;
        let frame = spec & 0x7f;
        if frame == 0 || frame > SLICER_RET {
            level.set_spec(loc, (spec & SLICER_BLOOD) | SLICER_INIT);
            self.add(loc, DIR_DOWN);
        }
    }

    /// Start a loose floor's fall count.
    pub fn break_loose(&mut self, level: &mut Level, loc: TileLoc) {
        let tile = level.tile(loc);
        if tile.modifier || tile.spec != 0 {
            return;
        }
        level.set_spec(loc, 1);
        self.add(loc, DIR_DOWN);
    }

    /// Jar a whole row: every idle loose floor in it starts wiggling.
    pub fn shake_row(&mut self, level: &mut Level, room: u8, row: i16) {
        if !(0..=2).contains(&row) {
            return;
        }
        for col in 0..10 {
            if let Some(loc) = level.resolve(room, col, row) {
                let tile = level.tile(loc);
                if tile.kind == TileKind::Loose && !tile.modifier && tile.spec == 0 {
                    level.set_spec(loc, WIGGLE_START);
                    self.add(loc, DIR_DOWN);
                }
            }
        }
    }

    /// Prime every slicer in a freshly entered room, staggered so blades
    /// in a corridor chop out of phase.
    pub fn add_slicers(&mut self, level: &mut Level, room: u8) {
        let mut slot = 0u8;
        for idx in 0..crate::level::TILES_PER_ROOM as u8 {
            let loc = TileLoc { room, idx };
            if level.room(room).is_none() {
                return;
            }
            if level.tile(loc).kind == TileKind::Slicer {
                let blood = level.tile(loc).spec & SLICER_BLOOD;
                level.set_spec(loc, blood | (slot * SLICER_SYNC % SLICE_TIMER));
                self.add(loc, DIR_DOWN);
                slot += 1;
            }
        }
    }
}

fn target_loc(level: &Level, room: u8, tile: u8) -> Option<TileLoc> {
    if room == 0 || level.room(room).is_none() || tile as usize >= crate::level::TILES_PER_ROOM {
        return None;
    }
    Some(TileLoc { room, idx: tile })
}

pub fn get_spikes(spec: u8) -> SpikeState {
    if spec == 0 || (SPIKES_OUT + 1..=SPIKES_DONE).contains(&spec) {
        return SpikeState::Safe;
    }
    if spec == SPIKES_OUT || spec & 0x80 != 0 {
        return SpikeState::Deadly;
    }
    SpikeState::Springing
}

/// Plate check: standing on a pressure plate pushes it.
pub fn check_press(chr: &Character, level: &mut Level, movers: &mut Movers) {
    if let Some(loc) = level.resolve(chr.scrn, chr.block_x, chr.block_y) {
        if matches!(
            level.tile(loc).kind,
            TileKind::PressPlate | TileKind::UPressPlate
        ) {
            movers.push_plate(level, loc);
        }
    }
}

/// Arm spikes the character is on or walking into.
pub fn check_spikes(chr: &Character, level: &mut Level, movers: &mut Movers) {
    for col in [chr.block_x, chr.block_x + chr.face].iter() {
        if let Some(loc) = level.resolve(chr.scrn, *col, chr.block_y) {
            if level.tile(loc).kind == TileKind::Spikes {
                movers.trig_spikes(level, loc);
            }
        }
    }
}

/// Spikes under the character that are out (or springing) impale him;
/// the tile jams bloodied.
pub fn check_impale(chr: &Character, level: &mut Level) -> bool {
    if let Some(loc) = level.resolve(chr.scrn, chr.block_x, chr.block_y) {
        let tile = level.tile(loc);
        if tile.kind == TileKind::Spikes && get_spikes(tile.spec) != SpikeState::Safe {
            level.set_spec(loc, SPIKES_JAMMED);
            return true;
        }
    }
    false
}

/// A closing blade on the character's row catches him if he is within a
/// column of it.
pub fn check_slice(chr: &Character, level: &mut Level) -> bool {
    for col in chr.block_x - 1..=chr.block_x + 1 {
        if let Some(loc) = level.resolve(chr.scrn, col, chr.block_y) {
            let tile = level.tile(loc);
            if tile.kind == TileKind::Slicer && tile.spec & 0x7f == SLICER_EXT {
                level.set_spec(loc, tile.spec | SLICER_BLOOD);
                return true;
            }
        }
    }
    false
}

/// Standing on a loose floor starts it falling.
pub fn shake_loose(chr: &Character, level: &mut Level, movers: &mut Movers) {
    if let Some(loc) = level.resolve(chr.scrn, chr.block_x, chr.block_y) {
        if level.tile(loc).kind == TileKind::Loose {
            movers.break_loose(level, loc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::testutil::{build_level, set_link, set_tile};

    #[test]
    fn gate_fast_close_runs_the_velocity_ramp() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 4, 1, TileKind::Gate, GMAX_VAL);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 4, 1).unwrap();
        movers.trigger_gate(&mut level, loc, PlateKind::Regular);

        let mut specs = Vec::new();
        for _ in 0..6 {
            movers.animate(&mut level, 1);
            specs.push(level.tile(loc).spec);
        }
        assert_eq!(&specs[..4], &[168, 128, 68, 0]);
        assert_eq!(movers.shake, 2);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn gate_opens_then_times_out() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 4, 1, TileKind::Gate, 0);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 4, 1).unwrap();
        movers.trigger_gate(&mut level, loc, PlateKind::Raise);

        // Rises 4 per frame to the top, then holds on the timer.
        for _ in 0..48 {
            movers.animate(&mut level, 1);
        }
        assert!(level.tile(loc).spec > GMAX_VAL);
        // The timer counts back down into the closing range.
        for _ in 0..60 {
            movers.animate(&mut level, 1);
        }
        assert!(level.tile(loc).spec <= GMAX_VAL);
    }

    #[test]
    fn rubble_kind_jams_the_gate_open() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 4, 1, TileKind::Gate, 100);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 4, 1).unwrap();
        movers.trigger_gate(&mut level, loc, PlateKind::Rubble);
        for _ in 0..40 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(level.tile(loc).spec, GATE_JAMMED);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn spike_cycle_extends_arms_and_retracts() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 3, 2, TileKind::Spikes, 0);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 3, 2).unwrap();
        movers.trig_spikes(&mut level, loc);
        assert_eq!(level.tile(loc).spec, 1);
        assert_eq!(get_spikes(1), SpikeState::Springing);

        let mut specs = Vec::new();
        for _ in 0..25 {
            movers.animate(&mut level, 1);
            specs.push(level.tile(loc).spec);
        }
        // Extends to 5, arms the countdown, retracts, and stops.
        assert_eq!(&specs[..5], &[2, 3, 4, 5, SPIKES_ARMED]);
        assert_eq!(get_spikes(SPIKES_ARMED), SpikeState::Deadly);
        assert_eq!(*specs.last().unwrap(), 0);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn retrigger_rearms_extended_spikes() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 3, 2, TileKind::Spikes, 0x85);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 3, 2).unwrap();
        movers.trig_spikes(&mut level, loc);
        assert_eq!(level.tile(loc).spec, SPIKES_ARMED);
    }

    #[test]
    fn jammed_spikes_ignore_triggers() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 3, 2, TileKind::Spikes, SPIKES_JAMMED);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 3, 2).unwrap();
        movers.trig_spikes(&mut level, loc);
        assert_eq!(level.tile(loc).spec, SPIKES_JAMMED);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn slicers_stagger_out_of_phase() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 1, TileKind::Slicer, 0);
            set_tile(data, 1, 5, 1, TileKind::Slicer, 0);
            set_tile(data, 1, 8, 1, TileKind::Slicer, 0);
        });
        let mut movers = Movers::new();
        movers.add_slicers(&mut level, 1);
        assert_eq!(level.tile_at(1, 2, 1).spec, 0);
        assert_eq!(level.tile_at(1, 5, 1).spec, 3);
        assert_eq!(level.tile_at(1, 8, 1).spec, 6);

        movers.animate(&mut level, 1);
        assert_eq!(level.tile_at(1, 2, 1).spec, 1);
        assert_eq!(level.tile_at(1, 5, 1).spec, 4);
    }

    #[test]
    fn offscreen_slicer_parks_at_retraction() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 1, TileKind::Slicer, 4);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 2, 1).unwrap();
        movers.add(loc, DIR_DOWN);
        // Viewing room 2: the blade resets the tick it would reach the
        // retraction frame.
        movers.animate(&mut level, 2);
        movers.animate(&mut level, 2);
        assert_eq!(level.tile(loc).spec, 0);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn loose_floor_detaches_into_a_mob() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 1, TileKind::Loose, 0);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 2, 1).unwrap();
        movers.break_loose(&mut level, loc);
        assert_eq!(level.tile(loc).spec, 1);

        // Counts 2..10 over nine frames, still attached.
        for _ in 0..9 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(level.tile(loc).kind, TileKind::Loose);
        assert_eq!(level.tile(loc).spec, FFALLING);

        // The tenth frame drops it.
        movers.animate(&mut level, 1);
        assert_eq!(level.tile(loc).kind, TileKind::Space);
        assert_eq!(level.tile(loc).spec, 0);
        assert_eq!(movers.mob_count(), 1);
    }

    #[test]
    fn required_loose_floor_never_breaks() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 1, TileKind::Loose, 0);
            // Tile 12 of room 1: set the modifier bit on the type byte.
            data[12] |= 0x20;
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 2, 1).unwrap();
        movers.break_loose(&mut level, loc);
        assert_eq!(level.tile(loc).spec, 0);
        assert_eq!(movers.trob_count(), 0);
    }

    #[test]
    fn mob_falls_and_crashes_into_rubble() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 1, TileKind::Loose, FFALLING);
        });
        let mut movers = Movers::new();
        let loc = level.resolve(1, 2, 1).unwrap();
        movers.add(loc, DIR_DOWN);

        // First frame: detach.
        movers.animate(&mut level, 1);
        assert_eq!(movers.mob_count(), 1);

        // Fall to the row-2 floor and crash.
        for _ in 0..8 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(level.tile_at(1, 2, 2).kind, TileKind::Rubble);
        assert_eq!(movers.shake, 4);
        // Crumble countdown drains and the mob disappears.
        for _ in 0..3 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(movers.mob_count(), 0);
    }

    #[test]
    fn plate_chain_fast_closes_the_gate() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::PressPlate, 7);
            set_tile(data, 1, 5, 2, TileKind::Gate, GMAX_VAL);
            set_link(data, 7, 1, 25, true, 0);
        });
        let mut movers = Movers::new();
        let plate = level.resolve(1, 1, 2).unwrap();
        movers.push_plate(&mut level, plate);

        assert_eq!(level.link(7).timer, 5);
        assert_eq!(movers.trob_count(), 2);

        for _ in 0..6 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(level.tile_at(1, 5, 2).spec, 0);
        // Both the gate and the expired plate compacted away.
        assert_eq!(movers.trob_count(), 0);
        assert_eq!(level.link(7).timer, 0);
    }

    #[test]
    fn permanent_plate_is_inert() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::PressPlate, 7);
            set_tile(data, 1, 5, 2, TileKind::Gate, GMAX_VAL);
            set_link(data, 7, 1, 25, true, 31);
        });
        let mut movers = Movers::new();
        let plate = level.resolve(1, 1, 2).unwrap();
        movers.push_plate(&mut level, plate);
        assert_eq!(movers.trob_count(), 0);
        assert_eq!(level.tile_at(1, 5, 2).spec, GMAX_VAL);
    }

    #[test]
    fn raise_plate_opens_and_rubble_jams() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::UPressPlate, 3);
            set_tile(data, 1, 5, 2, TileKind::Gate, 0);
            set_link(data, 3, 1, 25, true, 0);
        });
        let mut movers = Movers::new();
        let plate = level.resolve(1, 1, 2).unwrap();
        movers.push_plate(&mut level, plate);
        movers.animate(&mut level, 1);
        assert!(level.tile_at(1, 5, 2).spec > 0);

        // Rubble crushing the plate converts it and jams the gate.
        movers.jam_plate(&mut level, plate);
        assert_eq!(level.tile_at(1, 1, 2).kind, TileKind::Floor);
        for _ in 0..50 {
            movers.animate(&mut level, 1);
        }
        assert_eq!(level.tile_at(1, 5, 2).spec, GATE_JAMMED);
    }

    #[test]
    fn impale_jams_the_spikes() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 2, 2, TileKind::Spikes, SPIKES_OUT);
        });
        let table = crate::seq::SeqTable::standard();
        let kid = crate::character::create_kid(&level, 3, &table);
        assert!(check_impale(&kid, &mut level));
        assert_eq!(level.tile_at(1, 2, 2).spec, SPIKES_JAMMED);
    }

    #[test]
    fn slice_marks_blood_on_the_blade() {
        let mut level = build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::Slicer, SLICER_EXT);
        });
        let table = crate::seq::SeqTable::standard();
        let kid = crate::character::create_kid(&level, 3, &table);
        assert!(check_slice(&kid, &mut level));
        assert_eq!(level.tile_at(1, 1, 2).spec, SLICER_BLOOD | SLICER_EXT);
        // Open blade does not cut.
        let mut level = build_level(|data| {
            set_tile(data, 1, 1, 2, TileKind::Slicer, 9);
        });
        assert!(!check_slice(&kid, &mut level));
    }
}
