//! Game session: the live board, both move caches, the key table and the result.

use crate::cache::{CacheStats, MoveCaches};
use crate::engine::{Board, Move, Side};
use crate::search::{self, SearchConfig};
use crate::zobrist::Zobrist;
use log::info;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("'{0}' is not a move (expected something like D2D3)")]
    BadMove(String),
    #[error("{0} is not a legal move")]
    IllegalMove(Move),
    #[error("there is no piece to move on the source square of {0}")]
    EmptySource(Move),
    #[error("the game is already over")]
    GameOver,
    #[error("unknown piece code {0}")]
    UnknownPieceCode(u8),
}

/// What applying a move did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mover: Side,
    pub captured: bool,
    pub game_ended: bool,
    pub winner: Option<Side>,
}

pub struct Game {
    board: Board,
    keys: Zobrist,
    caches: MoveCaches,
    config: SearchConfig,
    winner: Option<Side>,
}

impl Game {
    /// Start position with a fresh key table.
    pub fn new() -> Self {
        Self::with_keys(Zobrist::new())
    }

    pub fn with_keys(keys: Zobrist) -> Self {
        Self::from_board(Board::start_position(), keys)
    }

    /// Resume from an arbitrary position. A board already missing exactly one
    /// King counts as won by the other side.
    pub fn from_board(board: Board, keys: Zobrist) -> Self {
        let winner = match (board.find_king(Side::Computer), board.find_king(Side::Human)) {
            (None, Some(_)) => Some(Side::Human),
            (Some(_), None) => Some(Side::Computer),
            _ => None,
        };
        Game {
            board,
            keys,
            caches: MoveCaches::new(),
            config: SearchConfig::default(),
            winner,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn cache_stats(&self, side: Side) -> CacheStats {
        self.caches.stats(side)
    }

    /// Back to the start position; the key table is kept.
    pub fn reset(&mut self) {
        self.board = Board::start_position();
        self.caches.clear();
        self.winner = None;
    }

    pub fn legal_moves(&mut self, side: Side) -> Vec<Move> {
        self.caches
            .for_side(side)
            .get_or_compute(&self.board, &self.keys)
            .to_vec()
    }

    /// Parses and applies a move string such as `D2D3`.
    pub fn apply_move(&mut self, text: &str) -> Result<MoveOutcome, GameError> {
        let mv: Move = text.parse()?;
        self.apply(mv)
    }

    /// Applies a move for whichever side owns the source square. The board is
    /// untouched when the move is rejected.
    pub fn apply(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let mover = self
            .board
            .piece_at(mv.from)
            .side()
            .ok_or(GameError::EmptySource(mv))?;
        let legal = self.caches.for_side(mover).get_or_compute(&self.board, &self.keys);
        if !legal.contains(&mv) {
            return Err(GameError::IllegalMove(mv));
        }

        let result = self.board.apply(mv);
        if result.game_ended {
            self.winner = Some(mover);
            info!("{} captures the King with {}", mover, mv);
        }
        Ok(MoveOutcome {
            mover,
            captured: result.capture_occurred,
            game_ended: result.game_ended,
            winner: self.winner,
        })
    }

    /// Searches for a move among `legal` within the configured time budget.
    /// None if the game is over, `legal` is empty, or no depth finished.
    pub fn compute_move(&mut self, side: Side, legal: &[Move]) -> Option<Move> {
        if self.is_game_over() {
            return None;
        }
        search::compute_move(
            &mut self.board,
            &mut self.caches,
            &self.keys,
            side,
            legal,
            &self.config,
        )
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
