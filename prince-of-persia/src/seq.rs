//! The shared animation sequence table.
//!
//! The table is a single byte array: a preamble of 114 little-endian
//! 2-byte sequence pointers, then the program.  Each character keeps a
//! byte offset (`seq`) into this array; the interpreter in `interp`
//! advances it by exactly one emitted frame per tick.
//!
//! Byte encoding:
//!
//!  |00..f0|  emit this frame number and stop for the tick
//!  |f1..ff|  opcode, possibly with immediate operands (see `SeqOp`)
//!
//! The table is assembled at startup by `SeqTable::standard`, which also
//! serves as the listing of every sequence's opcode stream.  Forward
//! references are backpatched from the dispatch slots once every
//! sequence has been laid down.

use num_derive::FromPrimitive;

pub const SEQ_COUNT: usize = 114;
pub const DISPATCH_SIZE: usize = SEQ_COUNT * 2;

/// Highest byte that emits a frame; everything above is an opcode.
pub const MAX_FRAME: u8 = 0xf0;

#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum SeqOp {
    NextLevel = 0xf1,
    Tap = 0xf2,
    Effect = 0xf3,
    JarDown = 0xf4,
    JarUp = 0xf5,
    Die = 0xf6,
    IfWtless = 0xf7,
    SetFall = 0xf8,
    Act = 0xf9,
    ChY = 0xfa,
    ChX = 0xfb,
    Down = 0xfc,
    Up = 0xfd,
    AboutFace = 0xfe,
    Goto = 0xff,
}

/// Sequence ids, 1-based to match the dispatch table.  The careful-step
/// family occupies 29..39 so a step of `d` pixels dispatches to id
/// `28 + d`.
#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum SeqId {
    StartRun = 1,
    Stand = 2,
    StandJump = 3,
    RunJump = 4,
    Turn = 5,
    RunTurn = 6,
    StepFall = 7,
    JumpHangMed = 8,
    Hang = 9,
    StepBack = 10,
    HangStraight = 11,
    TurnRun = 12,
    RunStop = 13,
    JumpUp = 14,
    HighJump = 15,
    SuperHighJump = 16,
    FallHang = 17,
    Bump = 18,
    BumpFall = 19,
    StepFall2 = 20,
    JumpBackHang = 21,
    JumpHangLong = 22,
    JumpFall = 23,
    RJumpFall = 24,
    DeadFall = 25,
    RDiveRoll = 26,
    SDiveRoll = 27,
    TestFoot = 28,
    Step1 = 29,
    Step2 = 30,
    Step3 = 31,
    Step4 = 32,
    Step5 = 33,
    Step6 = 34,
    Step7 = 35,
    Step8 = 36,
    Step9 = 37,
    Step10 = 38,
    Step11 = 39,
    Stoop = 40,
    StandUp = 41,
    Crawl = 42,
    CrawlWait = 43,
    ClimbUp = 44,
    ClimbDown = 45,
    ClimbFail = 46,
    ClimbStairs = 47,
    HangDrop = 48,
    HangFall = 49,
    FreeFall = 50,
    PatchFall = 51,
    SoftLand = 52,
    MedLand = 53,
    HardLand = 54,
    StepFloat = 55,
    BumpFloat = 56,
    HardBump = 57,
    DrinkPotion = 58,
    PickUpSword = 59,
    Impaled = 60,
    Halved = 61,
    Crushed = 62,
    DropDead = 63,
    Stabbed = 64,
    StabKill = 65,
    EnGarde = 66,
    Ready = 67,
    Strike = 68,
    StrikeRet = 69,
    Advance = 70,
    FastAdvance = 71,
    Retreat = 72,
    BlockedStrike = 73,
    BlockToStrike = 74,
    ReadyBlock = 75,
    StrikeToBlock = 76,
    LandEnGarde = 77,
    BumpEngFwd = 78,
    BumpEngBack = 79,
    Flee = 80,
    TurnEnGarde = 81,
    AlertStand = 82,
    GoAlertStand = 83,
    AlertTurn = 84,
    GuardEnGarde = 85,
    Arise = 86,
    FightFall = 87,
    EFightFall = 88,
    EFightFallFwd = 89,
    Resheathe = 90,
    FastSheathe = 91,
    MClimb = 92,
    MCower = 93,
    MLeave = 94,
    MRaise = 95,
    MStand = 96,
    MScurry = 97,
    MStop = 98,
    VStand = 99,
    VRaise = 100,
    VWalk = 101,
    VStop = 102,
    PStand = 103,
    PAlert = 104,
    PBack = 105,
    PLie = 106,
    PWaiting = 107,
    PEmbrace = 108,
    PStroke = 109,
    PRise = 110,
    PCrouch = 111,
    PSlump = 112,
    RunCyc = 113,
    LieDown = 114,
}

pub struct SeqTable {
    pub(crate) code: Vec<u8>,
}

impl SeqTable {
    /// Code address a sequence id dispatches to.
    pub fn start(&self, id: SeqId) -> usize {
        let slot = (id as usize - 1) * 2;
        self.code[slot] as usize | ((self.code[slot + 1] as usize) << 8)
    }

    pub fn byte(&self, addr: usize) -> Option<u8> {
        self.code.get(addr).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn standard() -> SeqTable {
        let mut b = Builder::new();
        build_kid(&mut b);
        build_guard(&mut b);
        build_extras(&mut b);
        b.finish()
    }
}

struct Builder {
    code: Vec<u8>,
    // (operand offset, target sequence) pairs patched in finish().
    fixups: Vec<(usize, SeqId)>,
}

impl Builder {
    fn new() -> Builder {
        Builder {
            code: vec![0; DISPATCH_SIZE],
            fixups: Vec::new(),
        }
    }

    fn begin(&mut self, id: SeqId) {
        let slot = (id as usize - 1) * 2;
        let addr = self.code.len();
        self.code[slot] = (addr & 0xff) as u8;
        self.code[slot + 1] = (addr >> 8) as u8;
    }

    /// Address of the next byte, for backward gotos within a sequence.
    fn mark(&self) -> usize {
        self.code.len()
    }

    fn frame(&mut self, n: u8) {
        assert!(n <= MAX_FRAME);
        self.code.push(n);
    }

    fn frames(&mut self, ns: &[u8]) {
        for n in ns {
            self.frame(*n);
        }
    }

    fn act(&mut self, action: u8) {
        self.code.push(SeqOp::Act as u8);
        self.code.push(action);
    }

    fn chx(&mut self, dx: i8) {
        self.code.push(SeqOp::ChX as u8);
        self.code.push(dx as u8);
    }

    fn chy(&mut self, dy: i8) {
        self.code.push(SeqOp::ChY as u8);
        self.code.push(dy as u8);
    }

    fn setfall(&mut self, xvel: i8, yvel: i8) {
        self.code.push(SeqOp::SetFall as u8);
        self.code.push(xvel as u8);
        self.code.push(yvel as u8);
    }

    fn aboutface(&mut self) {
        self.code.push(SeqOp::AboutFace as u8);
    }

    fn up(&mut self) {
        self.code.push(SeqOp::Up as u8);
    }

    fn down(&mut self) {
        self.code.push(SeqOp::Down as u8);
    }

    fn effect(&mut self, code: u8) {
        self.code.push(SeqOp::Effect as u8);
        self.code.push(code);
    }

    fn tap(&mut self, code: u8) {
        self.code.push(SeqOp::Tap as u8);
        self.code.push(code);
    }

    fn jar_above(&mut self) {
        self.code.push(SeqOp::JarUp as u8);
    }

    fn jar_below(&mut self) {
        self.code.push(SeqOp::JarDown as u8);
    }

    fn die(&mut self) {
        self.code.push(SeqOp::Die as u8);
    }

    fn next_level(&mut self) {
        self.code.push(SeqOp::NextLevel as u8);
    }

    fn goto_seq(&mut self, id: SeqId) {
        self.code.push(SeqOp::Goto as u8);
        self.fixups.push((self.code.len(), id));
        self.code.push(0);
        self.code.push(0);
    }

    fn goto_mark(&mut self, addr: usize) {
        self.code.push(SeqOp::Goto as u8);
        self.code.push((addr & 0xff) as u8);
        self.code.push((addr >> 8) as u8);
    }

    fn ifwtless(&mut self, id: SeqId) {
        self.code.push(SeqOp::IfWtless as u8);
        self.fixups.push((self.code.len(), id));
        self.code.push(0);
        self.code.push(0);
    }

    fn finish(mut self) -> SeqTable {
        for (offset, id) in &self.fixups {
            let slot = (*id as usize - 1) * 2;
            let addr = self.code[slot] as usize | ((self.code[slot + 1] as usize) << 8);
            assert!(addr >= DISPATCH_SIZE, "goto to unassembled sequence {:?}", id);
            self.code[*offset] = (addr & 0xff) as u8;
            self.code[*offset + 1] = (addr >> 8) as u8;
        }
        SeqTable { code: self.code }
    }
}

// Character actions as the `act` opcode encodes them.
const STAND: u8 = 0;
const GROUND: u8 = 1;
const HANG: u8 = 2;
const ARC: u8 = 3;
const FREEFALL: u8 = 4;
const BUMPED: u8 = 5;
const HANG_STILL: u8 = 6;
const TURNING: u8 = 7;

fn build_kid(b: &mut Builder) {
    // startrun flows into the run cycle once up to speed.
    b.begin(SeqId::StartRun);
    b.act(GROUND);
    b.frames(&[1, 2, 3, 4, 5, 6]);
    b.goto_seq(SeqId::RunCyc);

    b.begin(SeqId::RunCyc);
    let cyc = b.mark();
    b.frames(&[7, 8, 9, 10, 11, 12, 13, 14]);
    b.goto_mark(cyc);

    b.begin(SeqId::Stand);
    b.act(STAND);
    let stand = b.mark();
    b.frame(15);
    b.goto_mark(stand);

    b.begin(SeqId::StandJump);
    b.act(GROUND);
    b.frames(&[16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::RunJump);
    b.act(GROUND);
    b.frames(&[27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38]);
    b.jar_below();
    b.frames(&[39, 40, 41, 42, 43, 44]);
    b.goto_seq(SeqId::RunCyc);

    b.begin(SeqId::Turn);
    b.aboutface();
    b.act(TURNING);
    b.frames(&[45, 46, 47, 48, 49, 50, 51, 52]);
    b.goto_seq(SeqId::Stand);

    // turnrun picks up speed straight out of the half-finished turn.
    b.begin(SeqId::TurnRun);
    b.act(GROUND);
    b.frames(&[2, 3, 4, 5, 6]);
    b.goto_seq(SeqId::RunCyc);

    b.begin(SeqId::RunTurn);
    b.aboutface();
    b.act(GROUND);
    b.frames(&[45, 46, 47, 48]);
    b.frames(&[2, 3, 4, 5, 6]);
    b.goto_seq(SeqId::RunCyc);

    b.begin(SeqId::RunStop);
    b.act(GROUND);
    b.tap(2);
    b.frames(&[13, 14]);
    b.goto_seq(SeqId::Stand);

    // Falls.  The first two frames keep the launch velocity (no gravity
    // until the action flips to freefall).
    b.begin(SeqId::StepFall);
    b.setfall(0, 0);
    b.ifwtless(SeqId::StepFloat);
    b.act(ARC);
    b.frames(&[102, 103]);
    b.act(FREEFALL);
    b.frames(&[104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::StepFloat);
    b.setfall(0, 0);
    b.act(FREEFALL);
    b.frames(&[102, 103, 104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::StepFall2);
    b.chx(1);
    b.setfall(0, 0);
    b.ifwtless(SeqId::StepFloat);
    b.act(ARC);
    b.frames(&[102, 103]);
    b.act(FREEFALL);
    b.frames(&[104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::JumpFall);
    b.setfall(2, 0);
    b.act(ARC);
    b.frames(&[102, 103]);
    b.act(FREEFALL);
    b.frames(&[104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::RJumpFall);
    b.setfall(4, 0);
    b.act(ARC);
    b.frames(&[102, 103]);
    b.act(FREEFALL);
    b.frames(&[104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::PatchFall);
    b.chx(-7);
    b.setfall(0, 0);
    b.act(FREEFALL);
    b.frames(&[102, 103, 104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::FreeFall);
    b.act(FREEFALL);
    let fall = b.mark();
    b.frame(106);
    b.goto_mark(fall);

    b.begin(SeqId::DeadFall);
    b.setfall(0, 0);
    b.act(FREEFALL);
    let dead_fall = b.mark();
    b.frame(185);
    b.goto_mark(dead_fall);

    // Bumps out of walls.
    b.begin(SeqId::Bump);
    b.act(BUMPED);
    b.chx(-1);
    b.frames(&[120, 121]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::HardBump);
    b.act(BUMPED);
    b.chx(-1);
    b.frame(120);
    b.chx(-2);
    b.frames(&[121, 122]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::BumpFall);
    b.setfall(0, 1);
    b.ifwtless(SeqId::BumpFloat);
    b.act(FREEFALL);
    b.frames(&[102, 103, 104, 105]);
    b.goto_seq(SeqId::FreeFall);

    b.begin(SeqId::BumpFloat);
    b.setfall(0, 0);
    b.act(FREEFALL);
    b.frames(&[102, 103, 104, 105]);
    b.goto_seq(SeqId::FreeFall);

    // Careful steps.  The whole advance lands in one chx so the repeat
    // protocol in player control observes the full distance at once.
    b.begin(SeqId::TestFoot);
    b.act(GROUND);
    b.tap(1);
    b.frames(&[53, 54]);
    b.goto_seq(SeqId::Stand);

    for (i, id) in [
        SeqId::Step1,
        SeqId::Step2,
        SeqId::Step3,
        SeqId::Step4,
        SeqId::Step5,
        SeqId::Step6,
        SeqId::Step7,
        SeqId::Step8,
        SeqId::Step9,
        SeqId::Step10,
    ]
    .iter()
    .enumerate()
    {
        b.begin(*id);
        b.act(GROUND);
        b.chx((i + 1) as i8);
        b.frames(&[54, 55, 56]);
        b.goto_seq(SeqId::Stand);
    }

    b.begin(SeqId::Step11);
    b.act(GROUND);
    b.chx(11);
    b.frames(&[53, 54, 55, 56, 57]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::StepBack);
    b.act(GROUND);
    b.chx(-5);
    b.frames(&[47, 46]);
    b.goto_seq(SeqId::Stand);

    // Crouching.
    b.begin(SeqId::Stoop);
    b.act(GROUND);
    b.frames(&[107, 108]);
    let crouch = b.mark();
    b.frame(109);
    b.goto_mark(crouch);

    b.begin(SeqId::StandUp);
    b.act(GROUND);
    b.frames(&[110, 111, 112, 113, 114, 115, 116, 117, 118, 119]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::Crawl);
    b.act(GROUND);
    b.chx(4);
    b.frame(108);
    b.chx(3);
    b.frame(109);
    let crawl_hold = b.mark();
    b.frame(109);
    b.goto_mark(crawl_hold);

    b.begin(SeqId::CrawlWait);
    b.act(GROUND);
    let crawl_wait = b.mark();
    b.frame(109);
    b.goto_mark(crawl_wait);

    b.begin(SeqId::RDiveRoll);
    b.act(GROUND);
    b.chx(5);
    b.frames(&[107, 108]);
    b.chx(4);
    let rroll = b.mark();
    b.frame(109);
    b.goto_mark(rroll);

    b.begin(SeqId::SDiveRoll);
    b.act(GROUND);
    b.chx(3);
    b.frames(&[107, 108]);
    let sroll = b.mark();
    b.frame(109);
    b.goto_mark(sroll);

    // Landings.
    b.begin(SeqId::SoftLand);
    b.act(BUMPED);
    b.jar_below();
    b.frames(&[107, 108]);
    let soft = b.mark();
    b.frame(109);
    b.goto_mark(soft);

    b.begin(SeqId::MedLand);
    b.act(BUMPED);
    b.jar_below();
    b.frames(&[107, 107, 108, 108]);
    let med = b.mark();
    b.frame(109);
    b.goto_mark(med);

    b.begin(SeqId::HardLand);
    b.act(BUMPED);
    b.jar_below();
    b.frame(185);
    b.die();
    let hard = b.mark();
    b.frame(185);
    b.goto_mark(hard);

    // Jumps straight up.
    b.begin(SeqId::JumpUp);
    b.act(GROUND);
    b.frames(&[67, 68, 69, 70]);
    b.jar_above();
    b.frame(76);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::HighJump);
    b.act(GROUND);
    b.frames(&[67, 68, 69, 70, 71, 72, 73, 74, 75, 76]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::SuperHighJump);
    b.act(GROUND);
    b.frames(&[67, 68, 69, 70, 71, 72, 73, 74, 75, 76]);
    b.goto_seq(SeqId::Stand);

    // Jumps that end hanging.
    b.begin(SeqId::JumpHangMed);
    b.act(GROUND);
    b.frames(&[67, 68, 69]);
    b.frames(&[77, 78, 79, 80]);
    b.act(HANG);
    b.goto_seq(SeqId::Hang);

    b.begin(SeqId::JumpHangLong);
    b.act(GROUND);
    b.frames(&[67, 68, 69]);
    b.chx(2);
    b.frames(&[77, 78, 79, 80]);
    b.act(HANG);
    b.goto_seq(SeqId::Hang);

    b.begin(SeqId::JumpBackHang);
    b.aboutface();
    b.act(GROUND);
    b.frames(&[67, 68, 69]);
    b.frames(&[77, 78, 79, 80]);
    b.act(HANG);
    b.goto_seq(SeqId::Hang);

    // Hanging.
    b.begin(SeqId::Hang);
    b.act(HANG);
    let hang = b.mark();
    b.frames(&[88, 89, 90, 91, 90, 89, 88, 87]);
    b.goto_mark(hang);

    b.begin(SeqId::HangStraight);
    b.act(HANG_STILL);
    b.frames(&[95, 96]);
    let hang_still = b.mark();
    b.frame(97);
    b.goto_mark(hang_still);

    b.begin(SeqId::FallHang);
    b.act(HANG);
    b.frame(80);
    b.goto_seq(SeqId::Hang);

    // Drop frames carry the floor flag, so a ledge that crumbled away
    // under the drop turns into a fall through the 81..85 path.
    b.begin(SeqId::HangDrop);
    b.act(GROUND);
    b.frames(&[81, 82, 83, 84, 85]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::HangFall);
    b.setfall(0, 0);
    b.act(FREEFALL);
    b.frames(&[81, 82]);
    b.goto_seq(SeqId::FreeFall);

    // Climbing through a row.
    b.begin(SeqId::ClimbUp);
    b.act(BUMPED);
    b.chy(-10);
    b.frame(135);
    b.chy(-10);
    b.frame(136);
    b.chy(-10);
    b.frame(137);
    b.up();
    b.chy(-11);
    b.frame(138);
    b.chy(-11);
    b.frame(139);
    b.chy(-11);
    b.frame(140);
    b.chx(8);
    b.frame(141);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::ClimbDown);
    b.act(BUMPED);
    b.chy(10);
    b.frame(142);
    b.chy(11);
    b.frame(141);
    b.down();
    b.chy(21);
    b.frame(140);
    b.chy(21);
    b.frame(139);
    b.act(HANG);
    b.goto_seq(SeqId::Hang);

    b.begin(SeqId::ClimbFail);
    b.act(HANG);
    b.frames(&[94, 95, 96]);
    b.goto_seq(SeqId::Hang);

    b.begin(SeqId::ClimbStairs);
    b.act(BUMPED);
    b.frames(&[217, 218, 219, 220, 221, 222, 223, 224, 225, 226, 227, 228]);
    b.next_level();
    let stairs = b.mark();
    b.frame(228);
    b.goto_mark(stairs);

    // Pickups.
    b.begin(SeqId::DrinkPotion);
    b.act(GROUND);
    b.frames(&[191, 192, 193, 194, 195, 196]);
    b.effect(1);
    b.frames(&[197, 198, 199, 200]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::PickUpSword);
    b.act(GROUND);
    b.frames(&[229, 230]);
    b.effect(1);
    b.frames(&[231, 232]);
    b.goto_seq(SeqId::Stand);

    // Deaths.
    b.begin(SeqId::Impaled);
    b.act(BUMPED);
    b.frame(186);
    b.die();
    let impaled = b.mark();
    b.frame(186);
    b.goto_mark(impaled);

    b.begin(SeqId::Halved);
    b.act(BUMPED);
    b.frame(187);
    b.die();
    let halved = b.mark();
    b.frame(187);
    b.goto_mark(halved);

    b.begin(SeqId::Crushed);
    b.act(BUMPED);
    b.frame(185);
    b.die();
    let crushed = b.mark();
    b.frame(185);
    b.goto_mark(crushed);

    b.begin(SeqId::DropDead);
    b.act(BUMPED);
    b.frame(185);
    b.die();
    let dropped = b.mark();
    b.frame(185);
    b.goto_mark(dropped);

    b.begin(SeqId::Stabbed);
    b.act(BUMPED);
    b.frame(185);
    b.die();
    let stabbed = b.mark();
    b.frame(185);
    b.goto_mark(stabbed);

    b.begin(SeqId::StabKill);
    b.act(BUMPED);
    b.frame(185);
    b.die();
    let stabkill = b.mark();
    b.frame(185);
    b.goto_mark(stabkill);
}

fn build_guard(b: &mut Builder) {
    b.begin(SeqId::EnGarde);
    b.act(GROUND);
    b.frames(&[150, 151, 152, 153]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::Ready);
    b.act(GROUND);
    let ready = b.mark();
    b.frames(&[157, 158]);
    b.goto_mark(ready);

    b.begin(SeqId::GuardEnGarde);
    b.goto_seq(SeqId::EnGarde);

    b.begin(SeqId::Strike);
    b.frames(&[167, 168, 169, 170, 171, 172]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::StrikeRet);
    b.frames(&[170, 169, 168]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::Advance);
    b.frames(&[160, 161, 162, 163]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::FastAdvance);
    b.frames(&[160, 162, 163]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::Retreat);
    b.frames(&[164, 165, 166]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::BlockedStrike);
    b.frames(&[167, 173]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::BlockToStrike);
    b.frames(&[174, 168]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::ReadyBlock);
    b.frames(&[173, 174, 175]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::StrikeToBlock);
    b.frames(&[169, 173]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::LandEnGarde);
    b.act(GROUND);
    b.jar_below();
    b.frame(157);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::BumpEngFwd);
    b.chx(-1);
    b.frames(&[176, 177]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::BumpEngBack);
    b.chx(-2);
    b.frames(&[176, 177, 178]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::Flee);
    b.aboutface();
    b.chx(3);
    b.frames(&[160, 161, 162, 163]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::TurnEnGarde);
    b.aboutface();
    b.frames(&[157, 158]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::AlertStand);
    b.act(GROUND);
    let alert = b.mark();
    b.frame(166);
    b.goto_mark(alert);

    b.begin(SeqId::GoAlertStand);
    b.frames(&[165, 166]);
    b.goto_seq(SeqId::AlertStand);

    b.begin(SeqId::AlertTurn);
    b.aboutface();
    b.frame(165);
    b.goto_seq(SeqId::AlertStand);

    b.begin(SeqId::Arise);
    b.act(GROUND);
    b.frames(&[177, 176, 157]);
    b.goto_seq(SeqId::Ready);

    b.begin(SeqId::FightFall);
    b.setfall(0, 0);
    b.act(FREEFALL);
    b.frames(&[179, 180]);
    let ffall = b.mark();
    b.frame(181);
    b.goto_mark(ffall);

    b.begin(SeqId::EFightFall);
    b.setfall(1, 0);
    b.act(FREEFALL);
    b.frames(&[179, 180]);
    let efall = b.mark();
    b.frame(182);
    b.goto_mark(efall);

    b.begin(SeqId::EFightFallFwd);
    b.setfall(2, 0);
    b.act(FREEFALL);
    b.frames(&[179, 180]);
    let effall = b.mark();
    b.frame(183);
    b.goto_mark(effall);

    b.begin(SeqId::Resheathe);
    b.act(GROUND);
    b.frames(&[158, 157, 156, 155]);
    b.goto_seq(SeqId::Stand);

    b.begin(SeqId::FastSheathe);
    b.act(GROUND);
    b.frames(&[158, 157]);
    b.goto_seq(SeqId::Stand);
}

// Mouse and cutscene poses.  Nothing in the core jumps to these, but a
// character parked on any of them animates cleanly.
fn build_extras(b: &mut Builder) {
    b.begin(SeqId::MStand);
    b.act(STAND);
    let mstand = b.mark();
    b.frame(233);
    b.goto_mark(mstand);

    b.begin(SeqId::MScurry);
    b.act(GROUND);
    b.chx(3);
    b.frames(&[234, 235]);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::MStop);
    b.frame(236);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::MRaise);
    b.frames(&[237, 238]);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::MCower);
    b.frames(&[236, 237]);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::MClimb);
    b.chy(-6);
    b.frames(&[238, 239]);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::MLeave);
    b.aboutface();
    b.chx(5);
    b.frames(&[234, 235]);
    b.goto_seq(SeqId::MStand);

    b.begin(SeqId::VStand);
    b.act(STAND);
    let vstand = b.mark();
    b.frame(239);
    b.goto_mark(vstand);

    b.begin(SeqId::VRaise);
    b.frames(&[238, 239]);
    b.goto_seq(SeqId::VStand);

    b.begin(SeqId::VWalk);
    b.chx(2);
    b.frames(&[234, 235]);
    b.goto_seq(SeqId::VStand);

    b.begin(SeqId::VStop);
    b.frame(236);
    b.goto_seq(SeqId::VStand);

    b.begin(SeqId::PStand);
    b.act(STAND);
    let pstand = b.mark();
    b.frame(240);
    b.goto_mark(pstand);

    b.begin(SeqId::PAlert);
    b.frames(&[239, 240]);
    b.goto_seq(SeqId::PStand);

    b.begin(SeqId::PBack);
    b.chx(-2);
    b.frame(240);
    b.goto_seq(SeqId::PStand);

    b.begin(SeqId::PLie);
    b.act(STAND);
    let plie = b.mark();
    b.frame(233);
    b.goto_mark(plie);

    b.begin(SeqId::PWaiting);
    b.act(STAND);
    let pwait = b.mark();
    b.frame(240);
    b.goto_mark(pwait);

    b.begin(SeqId::PEmbrace);
    b.frames(&[239, 240]);
    b.goto_seq(SeqId::PStand);

    b.begin(SeqId::PStroke);
    b.frame(240);
    b.goto_seq(SeqId::PStand);

    b.begin(SeqId::PRise);
    b.frames(&[233, 239]);
    b.goto_seq(SeqId::PStand);

    b.begin(SeqId::PCrouch);
    b.act(STAND);
    let pcrouch = b.mark();
    b.frame(237);
    b.goto_mark(pcrouch);

    b.begin(SeqId::PSlump);
    b.act(STAND);
    let pslump = b.mark();
    b.frame(233);
    b.goto_mark(pslump);

    b.begin(SeqId::LieDown);
    b.act(BUMPED);
    let lie = b.mark();
    b.frame(233);
    b.goto_mark(lie);
}
