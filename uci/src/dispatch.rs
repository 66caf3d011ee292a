/*
  Rookery, a UCI-compatible chess engine.
  Copyright (C) 2022 The Rookery Authors (see AUTHORS.md file)

  Rookery is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Rookery is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! The read-eval-print loop that drives the engine from stdin: parses each
//! line, updates the position, and starts or stops searches in the
//! background while staying responsive to new input.

use std::{
    io::BufRead,
    sync::{atomic::{AtomicBool, Ordering}, Arc, Condvar, Mutex, PoisonError},
    thread::JoinHandle,
    time::Duration,
};

use log::{info, warn};
use rookery_base::{perft, Board, Move};
use rookery_engine::{spawn_deadline, EngineState, MainSearch};

use crate::command::{parse_line, resolve_depth, GoOption, UciCommand};
use crate::message::{EngineInfo, OptionType, UciMessage};

const ENGINE_NAME: &str = "Rookery 0.1.0";
const ENGINE_AUTHOR: &str = "The Rookery Authors";

/// Blocks a finished `go ponder` search from announcing its best move until
/// `ponderhit` or `stop` releases it.
#[derive(Default)]
struct PonderGate {
    released: Mutex<bool>,
    cvar: Condvar,
}

impl PonderGate {
    fn new(armed: bool) -> PonderGate {
        PonderGate { released: Mutex::new(!armed), cvar: Condvar::new() }
    }

    /// Wait until [`PonderGate::release`] flips the gate. Tolerates a
    /// poisoned lock the same way `EngineState` does: a panicked search
    /// thread must not wedge every other thread waiting on this gate, so a
    /// poisoned guard is recovered rather than propagated.
    fn wait(&self) {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        while !*released {
            released = self.cvar.wait(released).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn release(&self) {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cvar.notify_all();
    }
}

/// Owns the engine's position and running search, and drives it from a
/// stream of UCI command lines.
pub struct Dispatcher {
    board: Board,
    state: Arc<EngineState>,
    search: MainSearch,
    search_handle: Option<JoinHandle<()>>,
    ponder_gate: Arc<PonderGate>,
    quit: bool,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Dispatcher {
        Dispatcher {
            board: Board::default_board(),
            state: Arc::new(EngineState::new()),
            search: MainSearch::new(rookery_engine::SearchConfig::new()),
            search_handle: None,
            ponder_gate: Arc::new(PonderGate::new(false)),
            quit: false,
        }
    }

    /// Run the loop until `quit` is received or the input stream ends.
    pub fn run(&mut self, input: impl BufRead) {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to read a line of input: {e}");
                    continue;
                }
            };
            self.handle_line(&line);
            if self.quit {
                break;
            }
        }
        self.join_search();
    }

    fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.try_debug_command(line).is_some() {
            return;
        }
        match parse_line(line, &self.board) {
            Ok(cmd) => self.dispatch(cmd),
            Err(e) => warn!("failed to parse UCI line `{line}`: {e}"),
        }
    }

    /// Handle the non-UCI debugging commands `printboard`, `fen`, and
    /// `perft <depth>`. Returns `Some(())` if `line` was one of these.
    fn try_debug_command(&self, line: &str) -> Option<()> {
        let mut tokens = line.split_ascii_whitespace();
        match tokens.next()? {
            "printboard" => {
                println!("{}", self.board);
                Some(())
            }
            "fen" => {
                println!("{}", self.board.format_fen());
                Some(())
            }
            "perft" => {
                let depth: u8 = tokens.next()?.parse().ok()?;
                let info = perft::perft(&self.board, depth);
                println!(
                    "nodes {} captures {} enpassants {} castles {} checks {} checkmates {} promotions {}",
                    info.nodes,
                    info.captures,
                    info.enpassants,
                    info.castles,
                    info.checks,
                    info.checkmates,
                    info.promotions,
                );
                Some(())
            }
            _ => None,
        }
    }

    fn dispatch(&mut self, cmd: UciCommand) {
        match cmd {
            UciCommand::Uci => {
                println!("{}", UciMessage::Id { name: Some(ENGINE_NAME), author: Some(ENGINE_AUTHOR) });
                println!(
                    "{}",
                    UciMessage::Option {
                        name: "Threads",
                        opt: OptionType::Spin {
                            default: self.search.config.n_helpers as i64,
                            min: 1,
                            max: 512,
                        },
                    }
                );
                println!("{}", UciMessage::UciOk);
            }
            UciCommand::Debug(on) => self.state.set_debug(on),
            UciCommand::IsReady => println!("{}", UciMessage::ReadyOk),
            UciCommand::SetOption { name, value } => self.set_option(&name, value.as_deref()),
            UciCommand::Register => info!("register: acknowledged (no registration required)"),
            UciCommand::NewGame => {
                self.stop_search();
                self.board = Board::default_board();
            }
            UciCommand::Position { fen, moves } => {
                self.board = match fen {
                    Some(fen) => match Board::load_fen(&fen) {
                        Ok(b) => b,
                        Err(e) => {
                            warn!("failed to load FEN `{fen}`: {e}");
                            return;
                        }
                    },
                    None => Board::default_board(),
                };
                for m in moves {
                    rookery_base::mutator::apply(&mut self.board, m);
                }
            }
            UciCommand::Go(opts) => {
                self.debug_info("go command received");
                self.go(&opts);
            }
            UciCommand::Stop => {
                self.state.set_stop();
                self.ponder_gate.release();
                self.join_search();
            }
            UciCommand::PonderHit => self.ponder_gate.release(),
            UciCommand::Quit => {
                self.stop_search();
                self.quit = true;
            }
        }
    }

    /// Emit an `info string` line to the GUI, but only while debug mode is
    /// enabled.
    fn debug_info(&self, s: &str) {
        if self.state.is_debug() {
            println!("{}", UciMessage::Info(&[EngineInfo::String(s)]));
        }
    }

    fn set_option(&mut self, name: &str, value: Option<&str>) {
        match name {
            "Threads" => match value.and_then(|v| v.parse().ok()) {
                Some(n) => self.search.config.n_helpers = n,
                None => warn!("setoption Threads requires an integer value"),
            },
            other => warn!("ignoring unrecognized option `{other}`"),
        }
    }

    fn go(&mut self, opts: &[GoOption]) {
        self.join_search();

        let depth = resolve_depth(opts, self.search.config.depth);
        self.search.config.depth = depth;

        let pondering = opts.contains(&GoOption::Ponder);
        self.ponder_gate = Arc::new(PonderGate::new(pondering));

        let movetime = opts.iter().find_map(|o| match o {
            GoOption::MoveTime(ms) => Some(Duration::from_millis(u64::from(*ms))),
            _ => None,
        });
        if let Some(duration) = movetime {
            spawn_deadline(Arc::clone(&self.state), duration);
        }

        // Only a non-empty `searchmoves` list actually restricts the root;
        // an empty one (e.g. every listed token failed to resolve) is
        // treated as if the subcommand had not been given at all.
        let search_moves: Option<Vec<Move>> = opts.iter().find_map(|o| match o {
            GoOption::SearchMoves(moves) if !moves.is_empty() => Some(moves.clone()),
            _ => None,
        });

        let board = self.board;
        let state = Arc::clone(&self.state);
        let search = self.search.clone();
        let gate = Arc::clone(&self.ponder_gate);

        self.search_handle = Some(std::thread::spawn(move || {
            let result = search.search_with(&board, &state, search_moves.as_deref(), |depth, elapsed, eval| {
                println!(
                    "{}",
                    UciMessage::Info(&[
                        EngineInfo::Depth(depth),
                        EngineInfo::Time(elapsed),
                        EngineInfo::Score { eval, is_lower_bound: false, is_upper_bound: false },
                    ])
                );
            });
            gate.wait();
            match result {
                Ok(m) => println!("{}", UciMessage::BestMove { m, ponder: None }),
                Err(e) => warn!("search failed: {e}"),
            }
        }));
    }

    fn stop_search(&mut self) {
        self.state.set_stop();
        self.ponder_gate.release();
        self.join_search();
    }

    fn join_search(&mut self) {
        if let Some(handle) = self.search_handle.take() {
            if handle.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_base::Square;

    #[test]
    fn ponder_gate_blocks_until_released() {
        let gate = Arc::new(PonderGate::new(true));
        let waiter_gate = Arc::clone(&gate);
        let released = Arc::new(AtomicBool::new(false));
        let waiter_released = Arc::clone(&released);
        let handle = std::thread::spawn(move || {
            waiter_gate.wait();
            waiter_released.store(true, Ordering::SeqCst);
        });
        std::thread::sleep(Duration::from_millis(20));
        assert!(!released.load(Ordering::SeqCst));
        gate.release();
        handle.join().unwrap();
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn dispatcher_handles_a_full_game_start_and_stop() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.handle_line("uci");
        dispatcher.handle_line("isready");
        dispatcher.handle_line("position startpos moves e2e4");
        assert_eq!(dispatcher.board.piece_at(Square::E4).unwrap().0, rookery_base::Piece::Pawn);
        dispatcher.handle_line("go depth 1");
        dispatcher.handle_line("stop");
        assert!(!dispatcher.quit);
        dispatcher.handle_line("quit");
        assert!(dispatcher.quit);
    }
}
