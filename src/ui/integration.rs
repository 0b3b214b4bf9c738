// Integration layer between terminal UI and game engine

use crate::engine::{Move, Side};
use crate::game::Game;
use crate::ui::{BoardDisplay, GameSettings, InputValidator, colors, confirm, prompt};
use log::warn;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::time::Instant;

// ============================================================================
// GAME CONTROLLER
// ============================================================================

pub struct GameController<R, W> {
    game: Game,
    display: BoardDisplay,
    input: R,
    out: W,
}

impl GameController<StdinLock<'static>, Stdout> {
    pub fn new() -> Self {
        Self::with_io(GameSettings::default(), io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> GameController<R, W> {
    pub fn with_io(settings: GameSettings, input: R, out: W) -> Self {
        Self {
            game: Game::new().with_config(settings.search),
            display: BoardDisplay::new(settings.use_color),
            input,
            out,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Plays one game to the end. Returns the winner, or None if the human
    /// quit or neither side could move.
    pub fn run(&mut self) -> io::Result<Option<Side>> {
        writeln!(self.out, "Ninjas & Samurai")?;
        let human_first = confirm(&mut self.input, &mut self.out, "Do you want to move first?")?;
        let mut side = if human_first { Side::Human } else { Side::Computer };
        let mut passes = 0;

        loop {
            self.display.render(self.game.board(), &mut self.out)?;

            if let Some(winner) = self.game.winner() {
                self.show_result(winner)?;
                return Ok(Some(winner));
            }

            let legal = self.game.legal_moves(side);
            if legal.is_empty() {
                writeln!(self.out, "{} has no legal moves and passes.", side)?;
                passes += 1;
                if passes >= 2 {
                    writeln!(self.out, "Neither side can move. Game over.")?;
                    return Ok(None);
                }
                side = side.opponent();
                continue;
            }
            passes = 0;

            let mv = match side {
                Side::Human => match self.read_human_move(&legal)? {
                    Some(mv) => mv,
                    None => return Ok(None),
                },
                Side::Computer => self.computer_move(&legal)?,
            };

            match self.game.apply(mv) {
                Ok(outcome) => {
                    self.display.highlight_move(mv);
                    if outcome.captured && !outcome.game_ended {
                        writeln!(self.out, "{} attacks with {}!", outcome.mover, mv)?;
                    }
                }
                Err(e) => {
                    // Only reachable if the legal list and the board disagree.
                    writeln!(self.out, "Error: {}", e)?;
                    continue;
                }
            }
            side = side.opponent();
        }
    }

    fn read_human_move(&mut self, legal: &[Move]) -> io::Result<Option<Move>> {
        loop {
            let Some(line) = prompt(&mut self.input, &mut self.out, "Your move: ")? else {
                return Ok(None);
            };
            match line.to_lowercase().as_str() {
                "quit" | "exit" => return Ok(None),
                "moves" | "help" => {
                    let list: Vec<String> = legal.iter().map(Move::to_string).collect();
                    writeln!(self.out, "Legal moves: {}", list.join(" "))?;
                    continue;
                }
                _ => {}
            }

            match InputValidator::validate_move(&line) {
                Ok(mv) if legal.contains(&mv) => return Ok(Some(mv)),
                Ok(mv) => self.show_error(&format!("Illegal move: {} (type 'moves' for a list)", mv))?,
                Err(e) => self.show_error(&e)?,
            }
        }
    }

    fn computer_move(&mut self, legal: &[Move]) -> io::Result<Move> {
        writeln!(self.out, "Computer is thinking...")?;
        let start = Instant::now();

        let mv = match self.game.compute_move(Side::Computer, legal) {
            Some(mv) => mv,
            None => {
                warn!("no search depth finished in time; playing {}", legal[0]);
                legal[0]
            }
        };

        writeln!(
            self.out,
            "Computer plays {} ({}ms)",
            mv,
            start.elapsed().as_millis()
        )?;
        Ok(mv)
    }

    fn show_error(&mut self, message: &str) -> io::Result<()> {
        if self.display.use_color {
            writeln!(self.out, "{}{}{}", colors::BRIGHT_RED, message, colors::RESET)
        } else {
            writeln!(self.out, "{}", message)
        }
    }

    fn show_result(&mut self, winner: Side) -> io::Result<()> {
        let text = match winner {
            Side::Human => "You captured the Computer's King. You win!",
            Side::Computer => "The Computer captured your King. You lose.",
        };
        if self.display.use_color {
            writeln!(self.out, "{}{}{}{}", colors::BOLD, colors::BRIGHT_YELLOW, text, colors::RESET)
        } else {
            writeln!(self.out, "{}", text)
        }
    }
}
