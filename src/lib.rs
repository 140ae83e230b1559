#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cards;
pub mod cli;
pub mod coords;
pub mod game;
pub mod players;
pub mod types;

pub use board::{Board, BoardError, CellId};
pub use cards::{Card, CardSet, Envelope, Suggestion};
pub use game::{Game, GameAction, GameConfig, GameError, GameEvent, GameState};
pub use types::{Person, Room, StepKind, Weapon};
