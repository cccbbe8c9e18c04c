//! Rules engine for standard 8×8 chess move legality.
//!
//! The crate answers two questions for a presentation layer: which squares a
//! picked-up piece may legally reach, and what happens to the board when a
//! drop is committed. Rendering, input handling and game-end detection live
//! outside this crate.

pub mod config;
pub mod engine;

pub use config::{CastlingPolicy, RulesConfig};
pub use engine::{Game, MoveOutcome};
