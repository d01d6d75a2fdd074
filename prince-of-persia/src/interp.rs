//! The sequence interpreter.
//!
//! One call advances a character by exactly one animation frame: opcodes
//! are executed until a frame byte is emitted, then control returns to
//! the scheduler.  Notifications raised by opcodes (`die`, `effect`,
//! `nextlevel`, the floor jars, taps) do not touch interpreter state;
//! they are collected into a `StepEvents` record for the caller.

use byteorder::{LittleEndian, ReadBytesExt};
use failure::{format_err, Error};
use num::FromPrimitive;
use std::io::Cursor;

use crate::character::{Action, Character};
use crate::coords;
use crate::frames;
use crate::seq::{SeqOp, SeqTable, MAX_FRAME};

/// Opcodes executed without emitting a frame before the tick is declared
/// runaway.  Well-formed sequences use a handful.
pub const OPCODE_LIMIT: usize = 200;

#[derive(Clone, Copy, Debug, Default)]
pub struct StepEvents {
    pub effect: Option<u8>,
    pub tap: Option<u8>,
    pub died: bool,
    pub next_level: bool,
    pub jar_above: bool,
    pub jar_below: bool,
}

/// Run the character's sequence until it emits one frame.  The emitted
/// frame's dx/dy advance is applied immediately.
///
/// A stale sequence pointer emits the zero frame and leaves the pointer
/// alone; a runaway opcode chain is an error, with `posn` and `seq` kept
/// so the character freezes for the tick.
pub fn anim_char(
    chr: &mut Character,
    table: &SeqTable,
    weightless: bool,
) -> Result<StepEvents, Error> {
    let mut ev = StepEvents::default();

    if chr.seq >= table.len() {
        log::warn!("sequence pointer {:#x} out of range", chr.seq);
        chr.posn = 0;
        return Ok(ev);
    }

    let mut r = Cursor::new(table.as_slice());
    r.set_position(chr.seq as u64);

    let mut budget = OPCODE_LIMIT;
    loop {
        let b = r.read_u8()?;
        if b <= MAX_FRAME {
            chr.seq = r.position() as usize;
            chr.posn = b;
            let def = frames::frame(b, chr.id);
            chr.x = coords::add_char_x(chr.x, chr.face, def.dx as i16);
            chr.y += def.dy as i16;
            return Ok(ev);
        }

        if budget == 0 {
            return Err(format_err!(
                "sequence at {:#x} ran {} opcodes without a frame",
                chr.seq,
                OPCODE_LIMIT
            ));
        }
        budget -= 1;

        let op = SeqOp::from_u8(b).ok_or(format_err!("unknown opcode {:02x}", b))?;
        match op {
            SeqOp::Goto => {
                let addr = r.read_u16::<LittleEndian>()?;
                r.set_position(addr as u64);
            }
            SeqOp::IfWtless => {
                let addr = r.read_u16::<LittleEndian>()?;
                if weightless {
                    r.set_position(addr as u64);
                }
            }
            SeqOp::AboutFace => chr.face = -chr.face,
            SeqOp::Up => chr.block_y -= 1,
            SeqOp::Down => chr.block_y += 1,
            SeqOp::ChX => {
                let dx = r.read_i8()? as i16;
                chr.add_x(dx);
            }
            SeqOp::ChY => chr.y += r.read_i8()? as i16,
            SeqOp::Act => {
                let a = r.read_u8()?;
                chr.action =
                    Action::from_u8(a).ok_or(format_err!("bad action operand {}", a))?;
            }
            SeqOp::SetFall => {
                chr.xvel = r.read_i8()? as i16;
                chr.yvel = r.read_i8()? as i16;
            }
            SeqOp::Die => ev.died = true,
            SeqOp::JarUp => ev.jar_above = true,
            SeqOp::JarDown => ev.jar_below = true,
            SeqOp::Effect => ev.effect = Some(r.read_u8()?),
            SeqOp::Tap => ev.tap = Some(r.read_u8()?),
            SeqOp::NextLevel => ev.next_level = true,
        }
    }
}

impl SeqTable {
    fn as_slice(&self) -> &[u8] {
        &self.code
    }
}
