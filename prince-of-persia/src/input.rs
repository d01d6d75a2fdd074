//! The tri-state input contract.
//!
//! The host samples its devices once per tick and hands the core a raw
//! two-axis record plus the button.  Each direction and the button carry
//! a fresh-press flag: 0 idle, -1 freshly pressed and unconsumed, +1
//! consumed.  A handler that acts on a fresh press writes +1, so holding
//! a key cannot re-fire the action on later ticks.
//!
//! Player control works in face-normalized space: `face_jstk` flips the
//! X axis and swaps the forward/backward flags for a right-facing
//! character, and `unface_jstk` undoes it (the two are the same
//! transform, its own inverse).

use serde::Serialize;

/// What the host delivers each tick: axes in {-1, 0, +1}.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RawInput {
    pub x: i16,
    pub y: i16,
    pub btn: bool,
}

pub const FRESH: i8 = -1;
pub const CONSUMED: i8 = 1;

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Input {
    pub jstk_x: i16,
    pub jstk_y: i16,
    pub btn: bool,
    /// Fresh-press flags.  In unnormalized space forward is -X.
    pub clr_f: i8,
    pub clr_b: i8,
    pub clr_u: i8,
    pub clr_d: i8,
    pub clr_btn: i8,
}

fn update(flag: &mut i8, pressed: bool) {
    if pressed {
        if *flag == 0 {
            *flag = FRESH;
        }
    } else {
        *flag = 0;
    }
}

impl Input {
    /// Fold the tick's raw sample into the tri-state flags.
    pub fn clr_jstk(&mut self, raw: RawInput) {
        update(&mut self.clr_f, raw.x < 0);
        update(&mut self.clr_b, raw.x > 0);
        update(&mut self.clr_u, raw.y < 0);
        update(&mut self.clr_d, raw.y > 0);
        update(&mut self.clr_btn, raw.btn);
        self.jstk_x = raw.x;
        self.jstk_y = raw.y;
        self.btn = raw.btn;
    }

    pub fn face_jstk(&mut self, face: i16) {
        if face > 0 {
            self.jstk_x = -self.jstk_x;
            std::mem::swap(&mut self.clr_f, &mut self.clr_b);
        }
    }

    pub fn unface_jstk(&mut self, face: i16) {
        self.face_jstk(face);
    }

    /// Mark every remaining fresh press consumed; runs after player
    /// control so a press never fires twice.
    pub fn clr_all(&mut self) {
        for flag in [
            &mut self.clr_f,
            &mut self.clr_b,
            &mut self.clr_u,
            &mut self.clr_d,
            &mut self.clr_btn,
        ]
        .iter_mut()
        {
            if **flag == FRESH {
                **flag = CONSUMED;
            }
        }
    }

    // Held-direction predicates in face-normalized space.
    pub fn forward_held(&self) -> bool {
        self.jstk_x < 0
    }

    pub fn back_held(&self) -> bool {
        self.jstk_x > 0
    }

    pub fn up_held(&self) -> bool {
        self.jstk_y < 0
    }

    pub fn down_held(&self) -> bool {
        self.jstk_y > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_then_consumed_then_idle() {
        let mut inp = Input::default();
        inp.clr_jstk(RawInput {
            x: -1,
            y: 0,
            btn: false,
        });
        assert_eq!(inp.clr_f, FRESH);
        inp.clr_all();
        assert_eq!(inp.clr_f, CONSUMED);
        // Still held: stays consumed, does not re-fire.
        inp.clr_jstk(RawInput {
            x: -1,
            y: 0,
            btn: false,
        });
        assert_eq!(inp.clr_f, CONSUMED);
        // Released, then pressed again: fresh again.
        inp.clr_jstk(RawInput::default());
        assert_eq!(inp.clr_f, 0);
        inp.clr_jstk(RawInput {
            x: -1,
            y: 0,
            btn: false,
        });
        assert_eq!(inp.clr_f, FRESH);
    }

    #[test]
    fn face_jstk_is_its_own_inverse() {
        let mut inp = Input::default();
        inp.clr_jstk(RawInput {
            x: -1,
            y: 1,
            btn: true,
        });
        let before = inp;
        inp.face_jstk(1);
        inp.unface_jstk(1);
        assert_eq!(inp.jstk_x, before.jstk_x);
        assert_eq!(inp.clr_f, before.clr_f);
        assert_eq!(inp.clr_b, before.clr_b);
    }

    #[test]
    fn face_normalization_flips_forward() {
        let mut inp = Input::default();
        // Pressing right while facing right is forward.
        inp.clr_jstk(RawInput {
            x: 1,
            y: 0,
            btn: false,
        });
        inp.face_jstk(1);
        assert!(inp.forward_held());
        assert_eq!(inp.clr_f, FRESH);
        inp.unface_jstk(1);
        // Facing left, the same press is backward.
        inp.face_jstk(-1);
        assert!(inp.back_held());
        assert_eq!(inp.clr_b, FRESH);
    }
}
