//! The per-tick scheduler.
//!
//! One call to `tick` is one animation frame.  The pipeline order is
//! load-bearing: movers run before the player so his collision checks
//! see this frame's gate and spike state, control runs before the
//! animation step so sequence jumps take effect the same tick, physics
//! runs after the frame is emitted, and the floor check classifies the
//! post-fall position before the hazard predicates get to bite.

use failure::Error;
use serde::Serialize;

use crate::character::{create_guard, create_kid, Character};
use crate::control;
use crate::floor;
use crate::health::{Meter, INIT_MAX};
use crate::input::{Input, RawInput};
use crate::interp;
use crate::level::{Level, TileKind, TILES_PER_ROOM};
use crate::mover::{self, Movers};
use crate::seq::{SeqId, SeqTable};
use crate::transition;

const DEATH_RESTART_TICKS: i16 = 90;
const WEIGHTLESS_TICKS: u16 = 200;
pub const LAST_LEVEL: u8 = 14;

// Potion kinds, as brewed into a flask's spec bits 5..7.  The sword
// pickup shares the channel with -1.
const PICKUP_SWORD: i8 = -1;
const POTION_HEAL: i8 = 1;
const POTION_BOOST: i8 = 2;
const POTION_WEIGHTLESS: i8 = 3;
const POTION_INVERT: i8 = 4;
const POTION_POISON: i8 = 5;

const FLASH_WHITE: u8 = 15;
const FLASH_ORANGE: u8 = 9;
const FLASH_GREEN: u8 = 12;

#[derive(Clone, Copy, Debug, Default)]
pub struct TickResult {
    /// Set when the exit stairs finished: the host must load this level
    /// and call `advance_level`.  Ticking suspends until it does.
    pub pending_level: Option<u8>,
    pub won: bool,
}

/// What the renderer consumes at the end of a tick.
#[derive(Clone, Debug, Serialize)]
pub struct TickSnapshot {
    pub kid: Character,
    pub guard: Option<Character>,
    pub room: Vec<(TileKind, u8)>,
    pub flash_color: u8,
    pub flash_frames: u8,
    pub shake_dy: i8,
    pub hp: (i16, i16),
    pub level_num: u8,
    pub room_num: u8,
}

pub struct Game {
    pub level: Level,
    pub level_num: u8,
    table: SeqTable,
    pub kid: Character,
    pub guard: Option<Character>,
    pub movers: Movers,
    input: Input,
    pub health: Meter,
    pub got_sword: bool,
    /// Upside-down rendering left over from an invert potion.
    pub inverted: bool,
    death_timer: i16,
    last_potion: i8,
    weightless: u16,
    flash_color: u8,
    flash_frames: u8,
    next_level: i16,
    cut_cooldown: u8,
    won: bool,
}

impl Game {
    pub fn new(level_data: &[u8], level_num: u8) -> Result<Game, Error> {
        let level = Level::from_bytes(level_data)?;
        let table = SeqTable::standard();
        let mut kid = create_kid(&level, level_num, &table);
        let _ = interp::anim_char(&mut kid, &table, false);
        let mut movers = Movers::new();
        let mut level = level;
        movers.add_slicers(&mut level, kid.scrn);
        let guard = create_guard(&level, kid.scrn, &table);

        Ok(Game {
            level,
            level_num,
            table,
            kid,
            guard,
            movers,
            input: Input::default(),
            health: Meter::new(INIT_MAX),
            got_sword: false,
            inverted: false,
            death_timer: -1,
            last_potion: 0,
            weightless: 0,
            flash_color: 0,
            flash_frames: 0,
            next_level: -1,
            cut_cooldown: 0,
            won: false,
        })
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn dead(&self) -> bool {
        self.death_timer >= 0
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self, raw: RawInput) -> TickResult {
        if self.next_level >= 0 || self.won {
            // Suspended on the host: either waiting for the next level's
            // data or finished for good.
            return self.result();
        }

        // Death wind-down: keep the corpse animating and the screen
        // settling, then restart.
        if self.death_timer >= 0 {
            if let Err(e) = interp::anim_char(&mut self.kid, &self.table, false) {
                log::warn!("death animation: {}", e);
            }
            if self.movers.shake > 0 {
                self.movers.shake -= 1;
            }
            self.death_timer += 1;
            if self.death_timer >= DEATH_RESTART_TICKS {
                self.restart_level();
            }
            return self.result();
        }
        if !self.kid.alive() {
            self.death_timer = 0;
            return self.result();
        }

        self.movers.animate(&mut self.level, self.kid.scrn);

        self.input.clr_jstk(raw);
        self.kid.reread_blocks();
        if let Some(potion) =
            control::player_ctrl(&mut self.kid, &mut self.level, &mut self.input, &self.table)
        {
            self.last_potion = potion;
        }
        self.input.clr_all();

        match interp::anim_char(&mut self.kid, &self.table, self.weightless > 0) {
            Ok(ev) => {
                if ev.died {
                    self.kid.life = 0;
                }
                if ev.effect == Some(1) {
                    self.potion_effect();
                }
                if ev.next_level {
                    self.next_level = self.level_num as i16 + 1;
                }
                if ev.jar_below {
                    self.movers
                        .shake_row(&mut self.level, self.kid.scrn, self.kid.block_y + 1);
                }
                if ev.jar_above {
                    self.movers
                        .shake_row(&mut self.level, self.kid.scrn, self.kid.block_y - 1);
                }
            }
            Err(e) => log::warn!("kid sequence: {}", e),
        }

        self.kid.apply_gravity(self.weightless > 0);
        self.kid.add_fall();
        self.kid.reread_blocks();

        let hp_loss = floor::check_floor(&mut self.kid, &self.level, &self.table, self.input.btn);
        if hp_loss > 0 {
            self.health.hurt(hp_loss);
        }

        if self.kid.alive() {
            mover::check_press(&self.kid, &mut self.level, &mut self.movers);
            mover::check_spikes(&self.kid, &mut self.level, &mut self.movers);
            if mover::check_impale(&self.kid, &mut self.level) {
                self.health.hurt(100);
                self.kid.life = 0;
                self.kid.jump_seq(&self.table, SeqId::Impaled);
            } else if mover::check_slice(&self.kid, &mut self.level) {
                self.health.hurt(100);
                self.kid.life = 0;
                self.kid.jump_seq(&self.table, SeqId::Halved);
            }
            mover::shake_loose(&self.kid, &mut self.level, &mut self.movers);
        }

        let cut = transition::cut_check(&mut self.kid, &self.level, &mut self.cut_cooldown);
        if cut.cut.is_some() {
            self.guard = create_guard(&self.level, self.kid.scrn, &self.table);
            self.movers.add_slicers(&mut self.level, self.kid.scrn);
        }
        if cut.fell_off {
            self.kid.life = 0;
            self.kid.jump_seq(&self.table, SeqId::DeadFall);
            self.death_timer = 0;
        }

        if self.health.chg_meters() && self.kid.alive() {
            self.kid.life = 0;
            if !(185..=187).contains(&self.kid.posn) {
                self.kid.jump_seq(&self.table, SeqId::DropDead);
            }
        }

        if self.weightless > 0 {
            self.weightless -= 1;
        }
        if self.movers.shake > 0 {
            self.movers.shake -= 1;
        }
        if self.flash_frames > 0 {
            self.flash_frames -= 1;
        }

        if let Some(guard) = &mut self.guard {
            if let Err(e) = interp::anim_char(guard, &self.table, false) {
                log::warn!("guard sequence: {}", e);
            }
        }

        if self.next_level > LAST_LEVEL as i16 {
            self.won = true;
            self.next_level = -1;
        }
        self.result()
    }

    fn result(&self) -> TickResult {
        TickResult {
            pending_level: if self.next_level >= 0 {
                Some(self.next_level as u8)
            } else {
                None
            },
            won: self.won,
        }
    }

    fn potion_effect(&mut self) {
        match self.last_potion {
            PICKUP_SWORD => {
                self.got_sword = true;
                self.flash(FLASH_WHITE, 3);
            }
            POTION_HEAL => {
                self.health.heal(1);
                self.flash(FLASH_ORANGE, 2);
            }
            POTION_BOOST => {
                self.health.boost_max();
                self.flash(FLASH_ORANGE, 5);
            }
            POTION_WEIGHTLESS => {
                self.weightless = WEIGHTLESS_TICKS;
                self.flash(FLASH_GREEN, 2);
            }
            POTION_INVERT => {
                self.inverted = !self.inverted;
                self.flash(FLASH_GREEN, 2);
            }
            POTION_POISON => {
                self.health.hurt(1);
                self.flash(FLASH_GREEN, 2);
            }
            _ => {}
        }
        self.last_potion = 0;
    }

    fn flash(&mut self, color: u8, frames: u8) {
        self.flash_color = color;
        self.flash_frames = frames;
    }

    /// Load the level the last tick requested.  Mirrors a fresh `new`
    /// but carries over max strength and the sword.
    pub fn advance_level(&mut self, level_data: &[u8]) -> Result<(), Error> {
        let target = self.next_level.max(0) as u8;
        let had_sword = self.got_sword;
        let strength = self.health.max;
        self.level = Level::from_bytes(level_data)?;
        self.level_num = target;
        self.next_level = -1;
        self.reset_world();
        self.health = Meter::new(strength);
        self.got_sword = if target == 1 { false } else { had_sword };
        log::debug!("advanced to level {}", target);
        Ok(())
    }

    fn restart_level(&mut self) {
        self.reset_world();
        self.health = Meter::new(self.health.max);
        // The first level starts swordless even on a retry.
        if self.level_num == 1 {
            self.got_sword = false;
        }
        log::debug!("restarting level {}", self.level_num);
    }

    fn reset_world(&mut self) {
        self.kid = create_kid(&self.level, self.level_num, &self.table);
        let _ = interp::anim_char(&mut self.kid, &self.table, false);
        self.movers = Movers::new();
        self.movers.add_slicers(&mut self.level, self.kid.scrn);
        self.guard = create_guard(&self.level, self.kid.scrn, &self.table);
        self.death_timer = -1;
        self.last_potion = 0;
        self.weightless = 0;
        self.flash_frames = 0;
        self.flash_color = 0;
        self.cut_cooldown = 0;
    }

    /// End-of-tick state for the renderer and the HUD.
    pub fn snapshot(&self) -> TickSnapshot {
        let room = match self.level.room(self.kid.scrn) {
            Some(room) => room.tiles.iter().map(|t| (t.kind, t.spec)).collect(),
            None => vec![(TileKind::Block, 0); TILES_PER_ROOM],
        };
        TickSnapshot {
            kid: self.kid.clone(),
            guard: self.guard.clone(),
            room,
            flash_color: self.flash_color,
            flash_frames: self.flash_frames,
            shake_dy: if self.movers.shake == 0 {
                0
            } else if self.movers.shake % 2 == 0 {
                2
            } else {
                -2
            },
            hp: (self.health.cur, self.health.max),
            level_num: self.level_num,
            room_num: self.kid.scrn,
        }
    }
}
