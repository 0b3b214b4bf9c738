// Features:
// - Iterative deepening over the caller's root move list
// - Minimax with alpha-beta bounds, scores always Computer-positive
// - Cooperative cancellation: a stop flag polled on entry to every node
// - Wall-clock deadline raced against a scoped worker thread

use crate::cache::MoveCaches;
use crate::engine::{Board, Move, Side, material_score, terminal_score};
use crate::zobrist::Zobrist;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Larger than any reachable score, king captures included.
pub const INFINITY: i32 = 1_000_000;

// =====================
// Configuration
// =====================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Wall-clock budget for one `compute_move` call.
    pub time_limit: Duration,
    /// Safety cap on iterative deepening; the deadline normally fires first.
    pub max_depth: u32,
    /// Points per legal move of difference between the two sides.
    pub mobility_weight: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            time_limit: Duration::from_millis(5000),
            max_depth: 64,
            mobility_weight: 2,
        }
    }
}

/// Outcome of one fully completed depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthResult {
    pub depth: u32,
    pub best: Move,
    pub score: i32,
    /// The best move captures the enemy King outright.
    pub decisive: bool,
    pub nodes: u64,
}

// =====================
// Search
// =====================

/// One search invocation. Owns the live board for its lifetime and leaves it
/// as it found it, cancelled or not.
pub struct Searcher<'a> {
    board: &'a mut Board,
    caches: &'a mut MoveCaches,
    keys: &'a Zobrist,
    stop: &'a AtomicBool,
    mobility_weight: i32,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(
        board: &'a mut Board,
        caches: &'a mut MoveCaches,
        keys: &'a Zobrist,
        stop: &'a AtomicBool,
        mobility_weight: i32,
    ) -> Self {
        Searcher {
            board,
            caches,
            keys,
            stop,
            mobility_weight,
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Deepens from 1 to `max_depth`, reporting each completed depth. Returns
    /// the deepest completed result, or None if depth 1 never finished.
    pub fn iterative_deepening<F>(
        &mut self,
        side: Side,
        root_moves: &[Move],
        max_depth: u32,
        mut on_depth: F,
    ) -> Option<DepthResult>
    where
        F: FnMut(&DepthResult),
    {
        let start = Instant::now();
        let mut best = None;
        for depth in 1..=max_depth {
            let Some(result) = self.search_depth(side, root_moves, depth) else {
                debug!("depth={} abandoned after {:?}", depth, start.elapsed());
                break;
            };
            debug!(
                "depth={} score={} nodes={} move={} elapsed={:?} cache[{}]",
                depth,
                result.score,
                result.nodes,
                result.best,
                start.elapsed(),
                self.caches.stats(side)
            );
            on_depth(&result);
            let decisive = result.decisive;
            best = Some(result);
            if decisive {
                break;
            }
        }
        best
    }

    /// Full search of every root move to exactly `depth` plies.
    pub fn search_depth(&mut self, side: Side, root_moves: &[Move], depth: u32) -> Option<DepthResult> {
        if self.stopped() || root_moves.is_empty() || depth == 0 {
            return None;
        }
        let maximizing = side == Side::Computer;
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for &mv in root_moves {
            let undo = self.board.make_move(mv);
            if undo.king_taken {
                self.board.unmake_move(&undo);
                return Some(DepthResult {
                    depth,
                    best: mv,
                    score: terminal_score(side, 1),
                    decisive: true,
                    nodes: self.nodes,
                });
            }
            let score = self.minimax(side.opponent(), depth - 1, 1, alpha, beta);
            self.board.unmake_move(&undo);
            let score = score?;

            let improves = match best {
                None => true,
                Some((_, b)) if maximizing => score > b,
                Some((_, b)) => score < b,
            };
            if improves {
                best = Some((mv, score));
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        best.map(|(mv, score)| DepthResult {
            depth,
            best: mv,
            score,
            decisive: false,
            nodes: self.nodes,
        })
    }

    // `side` moves next from a position `ply` plies below the root. None means
    // the search was cancelled and nothing below here may be trusted.
    fn minimax(&mut self, side: Side, depth: u32, ply: i32, mut alpha: i32, mut beta: i32) -> Option<i32> {
        if self.stopped() {
            return None;
        }
        self.nodes += 1;

        if depth == 0 {
            return Some(self.evaluate(ply));
        }
        let moves = self.caches.for_side(side).get_or_compute(self.board, self.keys);
        if moves.is_empty() {
            return Some(self.evaluate(ply));
        }

        let maximizing = side == Side::Computer;
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for &mv in moves.iter() {
            let undo = self.board.make_move(mv);
            if undo.king_taken {
                self.board.unmake_move(&undo);
                return Some(terminal_score(side, ply + 1));
            }
            let score = self.minimax(side.opponent(), depth - 1, ply + 1, alpha, beta);
            self.board.unmake_move(&undo);
            let score = score?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }
        Some(best)
    }

    // Static score with mobility taken from the move caches.
    fn evaluate(&mut self, ply: i32) -> i32 {
        let mut score = material_score(self.board, ply);
        if self.mobility_weight != 0 {
            let mine = self
                .caches
                .for_side(Side::Computer)
                .get_or_compute(self.board, self.keys)
                .len() as i32;
            let theirs = self
                .caches
                .for_side(Side::Human)
                .get_or_compute(self.board, self.keys)
                .len() as i32;
            score += self.mobility_weight * (mine - theirs);
        }
        score
    }
}

/// Picks a move for `side` from `root_moves` within `config.time_limit`.
///
/// The deepening loop runs on a worker thread; this thread waits for depth
/// results until the deadline, then raises the stop flag and joins. Results
/// that arrive after the deadline are ignored. Returns None when no depth
/// completed in time.
pub fn compute_move(
    board: &mut Board,
    caches: &mut MoveCaches,
    keys: &Zobrist,
    side: Side,
    root_moves: &[Move],
    config: &SearchConfig,
) -> Option<Move> {
    let start = Instant::now();
    let deadline = start + config.time_limit;
    let stop = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<DepthResult>();

    let best = thread::scope(|scope| {
        let stop = &stop;
        scope.spawn(move || {
            let mut searcher = Searcher::new(board, caches, keys, stop, config.mobility_weight);
            searcher.iterative_deepening(side, root_moves, config.max_depth, |result| {
                // The receiver is gone once the deadline has passed.
                let _ = tx.send(*result);
            });
        });

        let mut best: Option<DepthResult> = None;
        loop {
            let now = Instant::now();
            if now >= deadline {
                debug!("search deadline reached");
                break;
            }
            match rx.recv_timeout(deadline - now) {
                Ok(result) => best = Some(result),
                Err(RecvTimeoutError::Timeout) => {
                    debug!("search deadline reached");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        stop.store(true, Ordering::Relaxed);
        best
    });

    match best {
        Some(result) => {
            info!(
                "{} plays {} (depth={} score={} nodes={} in {:?})",
                side,
                result.best,
                result.depth,
                result.score,
                result.nodes,
                start.elapsed()
            );
            Some(result.best)
        }
        None => {
            info!("{} search produced no move in {:?}", side, start.elapsed());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{eval, legal_moves};

    // Unpruned reference search over the same primitives.
    fn plain_minimax(board: &mut Board, side: Side, depth: u32, ply: i32, weight: i32) -> i32 {
        if depth == 0 {
            return eval(board, ply, weight);
        }
        let moves = legal_moves(board, side);
        if moves.is_empty() {
            return eval(board, ply, weight);
        }
        let maximizing = side == Side::Computer;
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for mv in moves {
            let undo = board.make_move(mv);
            let score = if undo.king_taken {
                terminal_score(side, ply + 1)
            } else {
                plain_minimax(board, side.opponent(), depth - 1, ply + 1, weight)
            };
            board.unmake_move(&undo);
            if undo.king_taken {
                return score;
            }
            best = if maximizing { best.max(score) } else { best.min(score) };
        }
        best
    }

    fn plain_root(board: &mut Board, side: Side, depth: u32, weight: i32) -> (Move, i32) {
        let maximizing = side == Side::Computer;
        let mut best: Option<(Move, i32)> = None;
        for mv in legal_moves(board, side) {
            let undo = board.make_move(mv);
            let score = if undo.king_taken {
                terminal_score(side, 1)
            } else {
                plain_minimax(board, side.opponent(), depth - 1, 1, weight)
            };
            board.unmake_move(&undo);
            if undo.king_taken {
                return (mv, score);
            }
            let improves = match best {
                None => true,
                Some((_, b)) => if maximizing { score > b } else { score < b },
            };
            if improves {
                best = Some((mv, score));
            }
        }
        best.expect("side has moves")
    }

    fn sample_positions() -> Vec<Board> {
        let mut out = vec![Board::start_position()];
        let mut b = Board::start_position();
        let mut side = Side::Human;
        for i in 0..6 {
            let moves = legal_moves(&b, side);
            b.apply(moves[(i * 7) % moves.len()]);
            out.push(b.clone());
            side = side.opponent();
        }
        out
    }

    #[test]
    fn alpha_beta_matches_plain_minimax() {
        let keys = Zobrist::with_seed(5);
        let stop = AtomicBool::new(false);
        for (i, position) in sample_positions().into_iter().step_by(2).enumerate() {
            for side in [Side::Computer, Side::Human] {
                for depth in 1..=3 {
                    let mut plain_board = position.clone();
                    let (plain_move, plain_score) = plain_root(&mut plain_board, side, depth, 2);

                    let mut board = position.clone();
                    let mut caches = MoveCaches::new();
                    let root = legal_moves(&board, side);
                    let mut searcher = Searcher::new(&mut board, &mut caches, &keys, &stop, 2);
                    let result = searcher.search_depth(side, &root, depth).expect("not cancelled");

                    assert_eq!(result.score, plain_score, "position {i} {side} depth {depth}");
                    assert_eq!(result.best, plain_move, "position {i} {side} depth {depth}");
                    assert_eq!(board, position);
                }
            }
        }
    }

    #[test]
    fn depth_one_from_start_picks_a_legal_quiet_move() {
        let keys = Zobrist::with_seed(9);
        let stop = AtomicBool::new(false);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Computer);

        let result = Searcher::new(&mut board, &mut caches, &keys, &stop, 2)
            .search_depth(Side::Computer, &root, 1)
            .expect("depth 1 completes");

        assert!(root.contains(&result.best));
        assert!(!result.decisive);
        assert!(!board.clone().apply(result.best).game_ended);
        assert_eq!(board, Board::start_position());
    }

    #[test]
    fn raised_stop_flag_abandons_the_search() {
        let keys = Zobrist::with_seed(9);
        let stop = AtomicBool::new(true);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Computer);

        let mut searcher = Searcher::new(&mut board, &mut caches, &keys, &stop, 2);
        assert_eq!(searcher.search_depth(Side::Computer, &root, 3), None);
        assert_eq!(searcher.iterative_deepening(Side::Computer, &root, 8, |_| {}), None);
        assert_eq!(board, Board::start_position());
    }

    #[test]
    fn depths_are_reported_in_order() {
        let keys = Zobrist::with_seed(9);
        let stop = AtomicBool::new(false);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Human);

        let mut seen = Vec::new();
        let last = Searcher::new(&mut board, &mut caches, &keys, &stop, 2)
            .iterative_deepening(Side::Human, &root, 3, |r| seen.push(r.depth))
            .expect("completes");

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(last.depth, 3);
        assert!(caches.stats(Side::Computer).hits > 0);
    }

    #[test]
    fn zero_budget_yields_no_move() {
        let keys = Zobrist::with_seed(9);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Computer);
        let config = SearchConfig {
            time_limit: Duration::ZERO,
            ..SearchConfig::default()
        };

        let mv = compute_move(&mut board, &mut caches, &keys, Side::Computer, &root, &config);
        assert_eq!(mv, None);
        assert_eq!(board, Board::start_position());
    }

    #[test]
    fn depth_cap_ends_the_search_before_the_deadline() {
        let keys = Zobrist::with_seed(9);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Computer);
        let config = SearchConfig {
            time_limit: Duration::from_secs(30),
            max_depth: 2,
            ..SearchConfig::default()
        };

        let start = Instant::now();
        let mv = compute_move(&mut board, &mut caches, &keys, Side::Computer, &root, &config);
        assert!(start.elapsed() < Duration::from_secs(30));
        assert!(root.contains(&mv.expect("depth 2 completes")));
    }

    #[test]
    fn deadline_interrupts_deep_search() {
        let keys = Zobrist::with_seed(9);
        let mut board = Board::start_position();
        let mut caches = MoveCaches::new();
        let root = legal_moves(&board, Side::Human);
        let config = SearchConfig {
            time_limit: Duration::from_millis(300),
            ..SearchConfig::default()
        };

        let start = Instant::now();
        let mv = compute_move(&mut board, &mut caches, &keys, Side::Human, &root, &config);
        assert!(start.elapsed() < Duration::from_secs(5));
        if let Some(mv) = mv {
            assert!(root.contains(&mv));
        }
        assert_eq!(board, Board::start_position());
    }
}
