// Features:
// - Padded 8x8 mailbox for a 7-file board (file 7 is a sentinel column)
// - Ninja (diagonal) / Samurai (orthogonal) / King move generation
// - Make/unmake with automatic forward attack (capture or demotion)
// - Static evaluation: advancement + material + mobility

use crate::game::GameError;
use std::fmt;
use std::str::FromStr;

// =====================
// Mailbox Utilities
// =====================
pub type Sq = usize;

pub const ROWS: i32 = 8;
pub const FILES: i32 = 7;
const STRIDE: i32 = 8;
pub const BOARD_SIZE: usize = (ROWS * STRIDE) as usize;

/// True if the (possibly negative) index names a playable square.
pub fn on_board(s: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&s) && (s & 7) != 7
}

pub fn sq(row: i32, file: i32) -> Sq {
    assert!(
        (0..ROWS).contains(&row) && (0..FILES).contains(&file),
        "square ({row}, {file}) is off the board"
    );
    (row * STRIDE + file) as Sq
}

pub fn row_of(s: Sq) -> i32 {
    s as i32 / STRIDE
}

pub fn file_of(s: Sq) -> i32 {
    s as i32 % STRIDE
}

/// Every playable square in row-major order.
pub fn squares() -> impl Iterator<Item = Sq> {
    (0..ROWS).flat_map(|r| (0..FILES).map(move |f| sq(r, f)))
}

// File A is file 0; rank 8 is row 0 (Computer's home).
fn sq_to_alg(s: Sq) -> String {
    let file = (b'A' + file_of(s) as u8) as char;
    let rank = ROWS - row_of(s);
    format!("{}{}", file, rank)
}

fn alg_to_sq(file: u8, rank: u8) -> Option<Sq> {
    let file = file.to_ascii_uppercase();
    if !(b'A'..b'A' + FILES as u8).contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    let f = (file - b'A') as i32;
    let r = ROWS - (rank - b'0') as i32;
    Some(sq(r, f))
}

// =====================
// Sides and Pieces
// =====================
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    Computer,
    Human,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Computer => Side::Human,
            Side::Human => Side::Computer,
        }
    }

    /// Row delta of one step forward: the Computer advances down the board.
    pub fn forward(self) -> i32 {
        match self {
            Side::Computer => 1,
            Side::Human => -1,
        }
    }

    pub fn home_row(self) -> i32 {
        match self {
            Side::Computer => 0,
            Side::Human => ROWS - 1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Computer => 0,
            Side::Human => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Computer => write!(f, "Computer"),
            Side::Human => write!(f, "Human"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Family {
    Ninja,
    Samurai,
    King,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Rank {
    Mini,
    Normal,
}

/// Piece codes: tens digit is the side (1 Computer, 2 Human), units digit is
/// 1 Mini Ninja, 2 Ninja, 5 Mini Samurai, 6 Samurai, 9 King.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Piece {
    Empty,
    CMiniNinja,
    CNinja,
    CMiniSamurai,
    CSamurai,
    CKing,
    HMiniNinja,
    HNinja,
    HMiniSamurai,
    HSamurai,
    HKing,
}

impl Piece {
    pub const ALL: [Piece; 10] = [
        Piece::CMiniNinja,
        Piece::CNinja,
        Piece::CMiniSamurai,
        Piece::CSamurai,
        Piece::CKing,
        Piece::HMiniNinja,
        Piece::HNinja,
        Piece::HMiniSamurai,
        Piece::HSamurai,
        Piece::HKing,
    ];

    pub fn from_code(code: u8) -> Result<Piece, GameError> {
        let piece = match code {
            0 => Piece::Empty,
            11 => Piece::CMiniNinja,
            12 => Piece::CNinja,
            15 => Piece::CMiniSamurai,
            16 => Piece::CSamurai,
            19 => Piece::CKing,
            21 => Piece::HMiniNinja,
            22 => Piece::HNinja,
            25 => Piece::HMiniSamurai,
            26 => Piece::HSamurai,
            29 => Piece::HKing,
            _ => return Err(GameError::UnknownPieceCode(code)),
        };
        Ok(piece)
    }

    pub fn code(self) -> u8 {
        match self {
            Piece::Empty => 0,
            Piece::CMiniNinja => 11,
            Piece::CNinja => 12,
            Piece::CMiniSamurai => 15,
            Piece::CSamurai => 16,
            Piece::CKing => 19,
            Piece::HMiniNinja => 21,
            Piece::HNinja => 22,
            Piece::HMiniSamurai => 25,
            Piece::HSamurai => 26,
            Piece::HKing => 29,
        }
    }

    /// Rebuilds a piece from its attributes. `rank` is ignored for the King.
    pub fn new(side: Side, family: Family, rank: Rank) -> Piece {
        match (side, family, rank) {
            (Side::Computer, Family::Ninja, Rank::Mini) => Piece::CMiniNinja,
            (Side::Computer, Family::Ninja, Rank::Normal) => Piece::CNinja,
            (Side::Computer, Family::Samurai, Rank::Mini) => Piece::CMiniSamurai,
            (Side::Computer, Family::Samurai, Rank::Normal) => Piece::CSamurai,
            (Side::Computer, Family::King, _) => Piece::CKing,
            (Side::Human, Family::Ninja, Rank::Mini) => Piece::HMiniNinja,
            (Side::Human, Family::Ninja, Rank::Normal) => Piece::HNinja,
            (Side::Human, Family::Samurai, Rank::Mini) => Piece::HMiniSamurai,
            (Side::Human, Family::Samurai, Rank::Normal) => Piece::HSamurai,
            (Side::Human, Family::King, _) => Piece::HKing,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self.code() / 10 {
            1 => Some(Side::Computer),
            2 => Some(Side::Human),
            _ => None,
        }
    }

    pub fn family(self) -> Option<Family> {
        match self.code() % 10 {
            1 | 2 => Some(Family::Ninja),
            5 | 6 => Some(Family::Samurai),
            9 => Some(Family::King),
            _ => None,
        }
    }

    pub fn rank(self) -> Option<Rank> {
        match self.code() % 10 {
            1 | 5 => Some(Rank::Mini),
            2 | 6 => Some(Rank::Normal),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    pub fn is_king(self) -> bool {
        self.family() == Some(Family::King)
    }

    pub fn belongs_to(self, side: Side) -> bool {
        self.side() == Some(side)
    }

    /// The piece left behind after an enemy attack: Normal demotes to Mini,
    /// everything else is removed.
    pub fn after_attack(self) -> Piece {
        match self {
            Piece::CNinja => Piece::CMiniNinja,
            Piece::CSamurai => Piece::CMiniSamurai,
            Piece::HNinja => Piece::HMiniNinja,
            Piece::HSamurai => Piece::HMiniSamurai,
            _ => Piece::Empty,
        }
    }

    pub fn to_char(self) -> char {
        match self.code() % 10 {
            1 => 'j',
            2 => 'J',
            5 => 's',
            6 => 'S',
            9 => 'K',
            _ => '.',
        }
    }
}

// =====================
// Board State
// =====================
pub const START_LAYOUT: [[u8; 7]; 8] = [
    [0, 0, 0, 19, 0, 0, 0],
    [12, 12, 12, 0, 16, 16, 16],
    [15, 15, 15, 0, 11, 11, 11],
    [0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0],
    [25, 25, 25, 0, 21, 21, 21],
    [22, 22, 22, 0, 26, 26, 26],
    [0, 0, 0, 29, 0, 0, 0],
];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    cells: [Piece; BOARD_SIZE],
}

/// Everything needed to take a move back.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    pub mv: Move,
    moved: Piece,
    displaced: Piece,
    attacked: Option<(Sq, Piece)>,
    pub captured: bool,
    pub king_taken: bool,
}

impl Undo {
    pub fn outcome(&self) -> ApplyResult {
        ApplyResult {
            capture_occurred: self.captured,
            game_ended: self.king_taken,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ApplyResult {
    pub capture_occurred: bool,
    pub game_ended: bool,
}

impl Board {
    pub fn empty() -> Board {
        Board {
            cells: [Piece::Empty; BOARD_SIZE],
        }
    }

    pub fn start_position() -> Board {
        let mut b = Board::empty();
        for (r, row) in START_LAYOUT.iter().enumerate() {
            for (f, &code) in row.iter().enumerate() {
                // Known-good table; every code decodes.
                if let Ok(p) = Piece::from_code(code) {
                    b.cells[sq(r as i32, f as i32)] = p;
                }
            }
        }
        b
    }

    pub fn from_codes(codes: &[[u8; 7]; 8]) -> Result<Board, GameError> {
        let mut b = Board::empty();
        for (r, row) in codes.iter().enumerate() {
            for (f, &code) in row.iter().enumerate() {
                b.cells[sq(r as i32, f as i32)] = Piece::from_code(code)?;
            }
        }
        Ok(b)
    }

    pub fn piece_at(&self, s: Sq) -> Piece {
        assert!(on_board(s as i32), "square {s} is off the board");
        self.cells[s]
    }

    pub fn set_piece(&mut self, s: Sq, p: Piece) {
        assert!(on_board(s as i32), "square {s} is off the board");
        self.cells[s] = p
    }

    pub fn snapshot(&self) -> Board {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: &Board) {
        self.cells = snapshot.cells;
    }

    pub fn find_king(&self, side: Side) -> Option<Sq> {
        let king = Piece::new(side, Family::King, Rank::Normal);
        squares().find(|&s| self.cells[s] == king)
    }

    /// Pieces of one side with their squares, row-major.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Sq, Piece)> + '_ {
        squares()
            .map(|s| (s, self.cells[s]))
            .filter(move |(_, p)| p.belongs_to(side))
    }

    // Relocate, then resolve the automatic forward attack. No legality check.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let moved = self.piece_at(mv.from);
        let displaced = self.piece_at(mv.to);
        self.cells[mv.from] = Piece::Empty;
        self.cells[mv.to] = moved;

        let mut undo = Undo {
            mv,
            moved,
            displaced,
            attacked: None,
            captured: false,
            king_taken: false,
        };

        let Some(side) = moved.side() else {
            return undo;
        };
        let target = mv.to as i32 + side.forward() * STRIDE;
        if !on_board(target) {
            return undo;
        }
        let target = target as Sq;
        let victim = self.cells[target];
        if victim.belongs_to(side.opponent()) {
            self.cells[target] = victim.after_attack();
            undo.attacked = Some((target, victim));
            undo.captured = true;
            undo.king_taken = victim.is_king();
        }
        undo
    }

    pub fn unmake_move(&mut self, undo: &Undo) {
        if let Some((s, victim)) = undo.attacked {
            self.cells[s] = victim;
        }
        self.cells[undo.mv.to] = undo.displaced;
        self.cells[undo.mv.from] = undo.moved;
    }

    pub fn apply(&mut self, mv: Move) -> ApplyResult {
        self.make_move(mv).outcome()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start_position()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..ROWS {
            write!(f, "{} ", ROWS - r)?;
            for file in 0..FILES {
                let p = self.cells[sq(r, file)];
                match p.side() {
                    Some(Side::Computer) => write!(f, " c{}", p.to_char())?,
                    Some(Side::Human) => write!(f, " h{}", p.to_char())?,
                    None => write!(f, " ..")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 0..FILES {
            write!(f, "  {}", (b'A' + file as u8) as char)?;
        }
        writeln!(f)
    }
}

// =====================
// Move Representation
// =====================
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Sq,
    pub to: Sq,
}

impl Move {
    pub fn new(from: Sq, to: Sq) -> Move {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", sq_to_alg(self.from), sq_to_alg(self.to))
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Move, GameError> {
        let t = s.trim();
        let bad = || GameError::BadMove(s.trim().to_string());
        let bytes = t.as_bytes();
        if bytes.len() != 4 {
            return Err(bad());
        }
        let from = alg_to_sq(bytes[0], bytes[1]).ok_or_else(bad)?;
        let to = alg_to_sq(bytes[2], bytes[3]).ok_or_else(bad)?;
        Ok(Move { from, to })
    }
}

// =====================
// Move Generation
// =====================
// Deltas are (rows forward, files); rows are flipped by the side's forward sign.
const NINJA_ADVANCE: [(i32, i32); 2] = [(1, -1), (1, 1)];
const NINJA_RETREAT: [(i32, i32); 2] = [(-1, -1), (-1, 1)];
const SAMURAI_ADVANCE: [(i32, i32); 1] = [(1, 0)];
const SAMURAI_LATERAL: [(i32, i32); 2] = [(0, -1), (0, 1)];

/// Fills `moves` with every legal move of `side`, grid order.
pub fn gen_moves(board: &Board, side: Side, moves: &mut Vec<Move>) {
    moves.clear();
    for (s, p) in board.pieces(side) {
        let slides = p.rank() == Some(Rank::Normal);
        match p.family() {
            Some(Family::Ninja) => {
                gen_advance_moves(board, s, side, &NINJA_ADVANCE, slides, moves);
                gen_attack_moves(board, s, side, &NINJA_RETREAT, slides, moves);
            }
            Some(Family::Samurai) => {
                gen_advance_moves(board, s, side, &SAMURAI_ADVANCE, slides, moves);
                gen_attack_moves(board, s, side, &SAMURAI_LATERAL, slides, moves);
            }
            // The King never moves.
            Some(Family::King) | None => {}
        }
    }
}

pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    gen_moves(board, side, &mut moves);
    moves
}

fn delta(side: Side, (rows, files): (i32, i32)) -> i32 {
    rows * side.forward() * STRIDE + files
}

// Advancing: any empty square along the line until blocked.
fn gen_advance_moves(
    board: &Board,
    s: Sq,
    side: Side,
    dirs: &[(i32, i32)],
    slides: bool,
    moves: &mut Vec<Move>,
) {
    for &dir in dirs {
        let d = delta(side, dir);
        let mut ns = s as i32 + d;
        while on_board(ns) && board.cells[ns as Sq].is_empty() {
            moves.push(Move::new(s, ns as Sq));
            if !slides {
                break;
            }
            ns += d;
        }
    }
}

// Retreat/lateral: an empty square only counts if an enemy sits one step
// forward of it, so the move is always an attack.
fn gen_attack_moves(
    board: &Board,
    s: Sq,
    side: Side,
    dirs: &[(i32, i32)],
    slides: bool,
    moves: &mut Vec<Move>,
) {
    let ahead = side.forward() * STRIDE;
    for &dir in dirs {
        let d = delta(side, dir);
        let mut ns = s as i32 + d;
        while on_board(ns) && board.cells[ns as Sq].is_empty() {
            let target = ns + ahead;
            if on_board(target) && board.cells[target as Sq].belongs_to(side.opponent()) {
                moves.push(Move::new(s, ns as Sq));
            }
            if !slides {
                break;
            }
            ns += d;
        }
    }
}

// =====================
// Evaluation
// =====================
pub const MINI_VALUE: i32 = 100;
pub const NORMAL_VALUE: i32 = 300;
pub const KING_VALUE: i32 = 100_000;
pub const ADVANCE_WEIGHT: i32 = 10;

/// King worth at `ply` plies from the root; faster wins are worth more.
pub fn king_value(ply: i32) -> i32 {
    KING_VALUE - ply
}

/// Score of a king capture by `winner`, Computer-positive.
pub fn terminal_score(winner: Side, ply: i32) -> i32 {
    match winner {
        Side::Computer => king_value(ply),
        Side::Human => -king_value(ply),
    }
}

fn side_score(board: &Board, side: Side, ply: i32) -> i32 {
    let mut score = 0;
    for (s, p) in board.pieces(side) {
        score += match p.rank() {
            Some(Rank::Mini) => MINI_VALUE,
            Some(Rank::Normal) => NORMAL_VALUE,
            None => king_value(ply),
        };
        if !p.is_king() {
            score += ADVANCE_WEIGHT * (row_of(s) - side.home_row()).abs();
        }
    }
    score
}

/// Advancement and material only, Computer-positive.
pub fn material_score(board: &Board, ply: i32) -> i32 {
    side_score(board, Side::Computer, ply) - side_score(board, Side::Human, ply)
}

/// Static score, higher is better for the Computer.
pub fn eval(board: &Board, ply: i32, mobility_weight: i32) -> i32 {
    let mut score = material_score(board, ply);
    if mobility_weight != 0 {
        let mut moves = Vec::new();
        gen_moves(board, Side::Computer, &mut moves);
        let mine = moves.len() as i32;
        gen_moves(board, Side::Human, &mut moves);
        let theirs = moves.len() as i32;
        score += mobility_weight * (mine - theirs);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        s.parse().expect("valid move")
    }

    fn at(s: &str) -> Sq {
        let b = s.as_bytes();
        alg_to_sq(b[0], b[1]).expect("valid square")
    }

    fn dests(moves: &[Move], from: &str) -> Vec<String> {
        let from = at(from);
        let mut out: Vec<String> = moves
            .iter()
            .filter(|m| m.from == from)
            .map(|m| sq_to_alg(m.to))
            .collect();
        out.sort();
        out
    }

    fn board(rows: [[u8; 7]; 8]) -> Board {
        Board::from_codes(&rows).expect("valid codes")
    }

    #[test]
    fn notation_maps_rows_to_ranks() {
        let m = mv("a8g1");
        assert_eq!(m.from, sq(0, 0));
        assert_eq!(m.to, sq(7, 6));
        assert_eq!(m.to_string(), "A8G1");
        assert_eq!(mv(" D2D3\n").to_string(), "D2D3");
    }

    #[test]
    fn notation_rejects_garbage() {
        for s in ["", "D2", "D2D", "H1A1", "A9A1", "A0A1", "D2D3D", "1234"] {
            assert!(s.parse::<Move>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    #[should_panic]
    fn sentinel_file_is_off_board() {
        Board::empty().piece_at(7);
    }

    #[test]
    fn piece_codes_round_trip() {
        for p in Piece::ALL {
            assert_eq!(Piece::from_code(p.code()).unwrap(), p);
            let side = p.side().unwrap();
            let family = p.family().unwrap();
            let rank = p.rank().unwrap_or(Rank::Normal);
            assert_eq!(Piece::new(side, family, rank), p);
        }
        assert!(matches!(
            Piece::from_code(13),
            Err(GameError::UnknownPieceCode(13))
        ));
    }

    #[test]
    fn start_position_layout() {
        let b = Board::start_position();
        assert_eq!(b.find_king(Side::Computer), Some(at("D8")));
        assert_eq!(b.find_king(Side::Human), Some(at("D1")));
        assert_eq!(b.pieces(Side::Computer).count(), 13);
        assert_eq!(b.pieces(Side::Human).count(), 13);
        assert_eq!(b.piece_at(at("A2")), Piece::HNinja);
        assert_eq!(b.piece_at(at("G6")), Piece::CMiniNinja);
    }

    #[test]
    fn mini_ninja_steps_once() {
        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0; 7],
            [0, 0, 0, 21, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let moves = legal_moves(&b, Side::Human);
        assert_eq!(dests(&moves, "D4"), vec!["C5", "E5"]);
    }

    #[test]
    fn normal_ninja_slides_until_blocked() {
        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 26],
            [0; 7],
            [0; 7],
            [0, 0, 0, 22, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let moves = legal_moves(&b, Side::Human);
        // Left diagonal runs to the edge, right diagonal stops short of G7.
        assert_eq!(dests(&moves, "D4"), vec!["A7", "B6", "C5", "E5", "F6"]);
    }

    #[test]
    fn retreat_needs_an_enemy_ahead_of_the_landing_square() {
        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 22, 0, 0, 0],
            [0, 0, 15, 0, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        // C4 is occupied; E4 and beyond have nothing in front of them.
        let moves = legal_moves(&b, Side::Human);
        assert_eq!(dests(&moves, "D5"), vec!["A8", "B7", "C6", "E6", "F7", "G8"]);

        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 22, 15, 0, 0],
            [0; 7],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let moves = legal_moves(&b, Side::Human);
        let d = dests(&moves, "D5");
        assert!(d.contains(&"E4".to_string()));
        assert!(!d.contains(&"C4".to_string()));
    }

    #[test]
    fn samurai_lateral_and_advance() {
        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 11, 0, 0, 0, 12, 0],
            [0, 0, 0, 26, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let moves = legal_moves(&b, Side::Human);
        // D8 holds the enemy king, so the advance stops at D7.
        assert_eq!(dests(&moves, "D4"), vec!["B4", "D5", "D6", "D7", "F4"]);
    }

    #[test]
    fn computer_moves_down_the_board() {
        let b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0, 15, 0, 0, 0, 0, 0],
            [0; 7],
            [0; 7],
            [0; 7],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let moves = legal_moves(&b, Side::Computer);
        assert_eq!(dests(&moves, "B7"), vec!["B6"]);
    }

    #[test]
    fn kings_never_move() {
        let b = Board::start_position();
        let king = b.find_king(Side::Computer).unwrap();
        assert!(legal_moves(&b, Side::Computer).iter().all(|m| m.from != king));
    }

    #[test]
    fn moves_never_land_on_pieces() {
        let b = Board::start_position();
        for side in [Side::Computer, Side::Human] {
            for m in legal_moves(&b, side) {
                assert!(b.piece_at(m.to).is_empty(), "{m} lands on a piece");
                assert!(b.piece_at(m.from).belongs_to(side));
            }
        }
    }

    #[test]
    fn attack_removes_mini_and_demotes_normal() {
        let mut b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0, 0, 15, 0, 16, 0, 0],
            [0; 7],
            [0, 26, 0, 0, 0, 26, 0],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        assert_eq!(b.apply(mv("B4C4")), ApplyResult::default());

        let r = b.apply(mv("C4C5"));
        assert!(r.capture_occurred && !r.game_ended);
        assert_eq!(b.piece_at(at("C6")), Piece::Empty);

        assert_eq!(b.apply(mv("F4E4")), ApplyResult::default());
        let r = b.apply(mv("E4E5"));
        assert!(r.capture_occurred);
        assert_eq!(b.piece_at(at("E6")), Piece::CMiniSamurai);
    }

    #[test]
    fn king_capture_ends_game() {
        let mut b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0, 0, 0, 0, 22, 0, 0],
            [0; 7],
            [0; 7],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        assert!(legal_moves(&b, Side::Human).contains(&mv("E6D7")));
        let r = b.apply(mv("E6D7"));
        assert!(r.game_ended && r.capture_occurred);
        assert_eq!(b.find_king(Side::Computer), None);
    }

    #[test]
    fn unmake_restores_board() {
        let start = Board::start_position();
        let mut b = start.clone();
        for side in [Side::Computer, Side::Human] {
            for m in legal_moves(&start, side) {
                let undo = b.make_move(m);
                b.unmake_move(&undo);
                assert_eq!(b, start, "unmake of {m} left the board changed");
            }
        }
    }

    #[test]
    fn unmake_restores_attacked_piece() {
        let mut b = board([
            [0, 0, 0, 19, 0, 0, 0],
            [0; 7],
            [0, 0, 0, 0, 22, 0, 0],
            [0; 7],
            [0; 7],
            [0; 7],
            [0; 7],
            [0, 0, 0, 29, 0, 0, 0],
        ]);
        let before = b.snapshot();
        let undo = b.make_move(mv("E6D7"));
        assert!(undo.king_taken);
        b.unmake_move(&undo);
        assert_eq!(b, before);
    }

    #[test]
    fn inverse_move_restores_board_without_capture() {
        let mut b = Board::start_position();
        let before = b.snapshot();
        assert!(!b.apply(mv("A3A4")).capture_occurred);
        b.apply(mv("A4A3"));
        assert_eq!(b, before);

        let mut c = Board::empty();
        c.restore(&before);
        assert_eq!(c, before);
    }

    #[test]
    fn eval_is_symmetric_at_start() {
        let b = Board::start_position();
        assert_eq!(eval(&b, 0, 2), 0);
    }

    #[test]
    fn eval_rewards_advancing() {
        let mut b = Board::start_position();
        let before = eval(&b, 0, 0);
        b.apply(mv("A6A5"));
        assert_eq!(eval(&b, 0, 0), before + ADVANCE_WEIGHT);
    }

    #[test]
    fn eval_prefers_faster_king_capture() {
        let mut b = Board::start_position();
        b.set_piece(at("D1"), Piece::Empty);
        assert!(eval(&b, 1, 0) > eval(&b, 3, 0));
        assert!(eval(&b, 3, 0) > KING_VALUE / 2);
    }

    #[test]
    fn display_marks_sides() {
        let text = Board::start_position().to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "8  .. .. .. cK .. .. ..");
        assert!(text.lines().last().unwrap().trim_start().starts_with('A'));
    }
}
