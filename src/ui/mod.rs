// Terminal UI for the game
// Features: colored board, last-move highlighting, move input validation

pub mod integration;
use crate::engine::{Board, FILES, Move, Piece, ROWS, Side, Sq, sq};
use crate::search::SearchConfig;
pub use integration::GameController;
use std::io::{self, BufRead, Write};

// ============================================================================
// COLOR CODES & STYLING
// ============================================================================

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";

    pub const BG_BLUE: &str = "\x1b[44m";
    pub const BG_BLACK: &str = "\x1b[40m";
    pub const BG_HIGHLIGHT: &str = "\x1b[48;5;226m";
}

// ============================================================================
// BOARD DISPLAY
// ============================================================================

pub struct BoardDisplay {
    pub use_color: bool,
    pub highlight_last_move: Option<(Sq, Sq)>,
}

impl Default for BoardDisplay {
    fn default() -> Self {
        Self {
            use_color: true,
            highlight_last_move: None,
        }
    }
}

impl BoardDisplay {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            highlight_last_move: None,
        }
    }

    pub fn highlight_move(&mut self, mv: Move) {
        self.highlight_last_move = Some((mv.from, mv.to));
    }

    pub fn render<W: Write>(&self, board: &Board, out: &mut W) -> io::Result<()> {
        use colors::*;

        writeln!(out, "   --------------------- COMPUTER")?;
        for r in 0..ROWS {
            write!(out, " {} ", ROWS - r)?;
            for f in 0..FILES {
                let s = sq(r, f);
                let text = Self::cell_text(board.piece_at(s));
                if self.use_color {
                    let fg = match board.piece_at(s).side() {
                        Some(Side::Human) => BRIGHT_WHITE,
                        _ => GREEN,
                    };
                    write!(out, "{}{}{}{}{}", self.background(s, r, f), BOLD, fg, text, RESET)?;
                } else {
                    write!(out, "{}", text)?;
                }
            }
            writeln!(out)?;
        }
        writeln!(out, "   --------------------- HUMAN")?;
        write!(out, "   ")?;
        for f in 0..FILES {
            write!(out, " {} ", (b'A' + f as u8) as char)?;
        }
        writeln!(out)
    }

    fn background(&self, s: Sq, rank: i32, file: i32) -> &'static str {
        use colors::*;

        if let Some((from, to)) = self.highlight_last_move {
            if s == from || s == to {
                return BG_HIGHLIGHT;
            }
        }
        if (rank * FILES + file) % 2 == 0 {
            BG_BLUE
        } else {
            BG_BLACK
        }
    }

    // Without color the Human's pieces are bracketed.
    fn cell_text(piece: Piece) -> String {
        match piece.side() {
            None => "   ".to_string(),
            Some(Side::Computer) => format!(" {} ", piece.to_char()),
            Some(Side::Human) => format!("[{}]", piece.to_char()),
        }
    }
}

// ============================================================================
// INPUT VALIDATION
// ============================================================================

pub struct InputValidator;

impl InputValidator {
    pub fn validate_move(input: &str) -> Result<Move, String> {
        let input = input.trim();

        if input.len() != 4 {
            return Err("A move is four characters, like D2D3".to_string());
        }
        if !input.is_ascii() {
            return Err("Moves use letters A-G and digits 1-8".to_string());
        }

        let (from, to) = input.split_at(2);
        if !Self::is_valid_square(from) {
            return Err(format!("Invalid source square: {}", from));
        }
        if !Self::is_valid_square(to) {
            return Err(format!("Invalid destination square: {}", to));
        }

        input.parse::<Move>().map_err(|e| e.to_string())
    }

    pub fn is_valid_square(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return false;
        }
        let file = bytes[0].to_ascii_uppercase() as char;
        let rank = bytes[1] as char;

        ('A'..='G').contains(&file) && ('1'..='8').contains(&rank)
    }
}

// ============================================================================
// GAME SETTINGS
// ============================================================================

#[derive(Clone, Debug)]
pub struct GameSettings {
    pub use_color: bool,
    pub search: SearchConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            use_color: true,
            search: SearchConfig::default(),
        }
    }
}

// ============================================================================
// PROMPTS
// ============================================================================

/// Prints `message` and reads one trimmed line; None on end of input.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> io::Result<bool> {
    let answer = prompt(input, out, &format!("{} (y/n): ", message))?;
    Ok(matches!(
        answer.as_deref().map(str::to_lowercase).as_deref(),
        Some("y" | "yes")
    ))
}

// ============================================================================
// MODULE TESTS
// ============================================================================
