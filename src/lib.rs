//! Ninjas & Samurai: a 7x8 board game engine with an alpha-beta computer player.

pub mod cache;
pub mod engine;
pub mod game;
pub mod search;
pub mod ui;
pub mod zobrist;

pub use engine::{ApplyResult, Board, Move, Piece, Side};
pub use game::{Game, GameError, MoveOutcome};
pub use search::SearchConfig;
