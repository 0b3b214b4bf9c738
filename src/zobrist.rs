// Features:
// - One random key per (square, piece identity), drawn once per table
// - Full-board XOR hash; side to move is deliberately not folded in
// - Seeded construction for reproducible tables, key injection for tests

use crate::engine::{BOARD_SIZE, Board, Piece, on_board, squares};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PIECE_KINDS: usize = Piece::ALL.len();

// =====================
// Core Zobrist Structure
// =====================

#[derive(Clone)]
pub struct Zobrist {
    // Piece placement keys: [square][piece index]; sentinel-file slots stay zero.
    pieces: [[u64; PIECE_KINDS]; BOARD_SIZE],

    // Seed used for generation, if any
    seed: Option<u64>,
}

impl Zobrist {
    /// Fresh table from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy(), None)
    }

    /// Create a new Zobrist instance with a custom seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), Some(seed))
    }

    /// Build from an explicit key table.
    pub fn from_keys(pieces: [[u64; PIECE_KINDS]; BOARD_SIZE]) -> Self {
        Self { pieces, seed: None }
    }

    fn from_rng(mut rng: StdRng, seed: Option<u64>) -> Self {
        let mut pieces = [[0u64; PIECE_KINDS]; BOARD_SIZE];
        for sq in squares() {
            for key in pieces[sq].iter_mut() {
                // Zero would make a piece invisible to the hash.
                *key = loop {
                    let k: u64 = rng.r#gen();
                    if k != 0 {
                        break k;
                    }
                };
            }
        }
        Self { pieces, seed }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    // =====================
    // Piece Indexing
    // =====================

    /// Index of a piece into the key table (None for an empty cell)
    pub fn piece_index(piece: Piece) -> Option<usize> {
        Piece::ALL.iter().position(|&p| p == piece)
    }

    pub fn key(&self, sq: usize, piece: Piece) -> u64 {
        assert!(on_board(sq as i32), "square {sq} is off the board");
        match Self::piece_index(piece) {
            Some(idx) => self.pieces[sq][idx],
            None => 0,
        }
    }

    // =====================
    // Full Board Hashing
    // =====================

    /// Occupancy hash of a board position; a full scan on every call.
    pub fn hash_board(&self, board: &Board) -> u64 {
        let mut h = 0u64;
        for sq in squares() {
            let piece = board.piece_at(sq);
            if let Some(idx) = Self::piece_index(piece) {
                h ^= self.pieces[sq][idx];
            }
        }
        h
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Self::new()
    }
}

// =====================
// Tests
// =====================
