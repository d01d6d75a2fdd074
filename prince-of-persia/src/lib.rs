//! Deterministic simulation core for the Apple II Prince of Persia.
//!
//! The crate owns everything between decoded assets and the renderer: a
//! byte-code animation interpreter over a shared sequence table, the
//! player-control state machine, collision and floor classification,
//! animated-tile and falling-piece management, room transitions, and
//! the fixed 12 Hz scheduler that orders them.  Rendering, audio, asset
//! file formats and input devices live with the host.

pub mod blocks;
pub mod character;
pub mod control;
pub mod coords;
pub mod floor;
pub mod frames;
pub mod game;
pub mod health;
pub mod input;
pub mod interp;
pub mod level;
pub mod mover;
pub mod seq;
pub mod transition;

pub use character::{Action, Character};
pub use game::{Game, TickResult, TickSnapshot};
pub use input::RawInput;
pub use level::{Level, TileKind};
