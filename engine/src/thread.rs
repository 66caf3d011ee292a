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

//! Thread management for the root of the search.
//!
//! Unlike a search that fans redundant full-tree workers out across
//! threads, [`MainSearch`] parallelizes over the root move list itself: at
//! each iterative-deepening depth, the legal root moves are split into
//! batches of up to `config.n_helpers` moves, one thread per move in the
//! batch, each searching its move on its own board copy against a shared
//! alpha. Ties among moves that land on the same best value are broken by a
//! uniform random choice, rather than always preferring the first move
//! enumerated.

use std::{
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use log::{debug, info};
use rookery_base::{movegen, mutator, Board, Eval, Move};

use super::{config::SearchConfig, search::alpha_beta, state::EngineState, SearchError};

/// Tracks the best value found at the current depth and every root move
/// that ties it, so the eventual choice among ties can be made uniformly at
/// random rather than always favoring move-generation order.
struct RootTracker {
    alpha: Eval,
    best: Vec<Move>,
}

impl RootTracker {
    fn new() -> RootTracker {
        RootTracker { alpha: Eval::MIN, best: Vec::new() }
    }

    fn record(&mut self, m: Move, value: Eval) {
        if value > self.alpha {
            self.alpha = value;
            self.best.clear();
            self.best.push(m);
        } else if value == self.alpha {
            self.best.push(m);
        }
    }

    fn choose(&self) -> Option<Move> {
        match self.best.len() {
            0 => None,
            1 => Some(self.best[0]),
            n => Some(self.best[fastrand::usize(..n)]),
        }
    }
}

#[derive(Clone, Debug)]
/// The primary entry point for the search: drives iterative deepening and
/// owns the configuration and shared state a run of searches needs.
pub struct MainSearch {
    pub config: SearchConfig,
}

impl MainSearch {
    #[must_use]
    pub fn new(config: SearchConfig) -> MainSearch {
        MainSearch { config }
    }

    /// Search `board` with iterative deepening up to `config.depth`,
    /// publishing the current best move to `state` after every completed
    /// depth and returning the deepest one found once the search stops
    /// (either by exhausting `config.depth` or by `state.is_stopped()`
    /// becoming true between depths).
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Poison` if a worker thread panicked while
    /// holding a shared lock.
    ///
    /// # Panics
    ///
    /// Panics if `board` has no legal moves (checkmate or stalemate); the
    /// caller is responsible for not starting a search on a terminal
    /// position.
    pub fn search(&self, board: &Board, state: &EngineState) -> Result<Move, SearchError> {
        self.search_with(board, state, None, |_, _, _| {})
    }

    /// As [`MainSearch::search`], but restricts the root to `search_moves`
    /// (the `go searchmoves ...` subcommand) when given, and calls
    /// `on_depth_complete(depth, elapsed, score)` after every completed
    /// depth so a caller can report search progress (e.g. as a UCI `info`
    /// line) without this crate depending on how that progress is
    /// formatted or where it is sent.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Poison` if a worker thread panicked while
    /// holding a shared lock.
    ///
    /// # Panics
    ///
    /// Panics if `board` has no legal moves (checkmate or stalemate), or if
    /// `search_moves` is `Some` but names no move that is actually legal in
    /// `board`; the caller is responsible for not starting a search on a
    /// terminal position or with an empty restricted root.
    pub fn search_with(
        &self,
        board: &Board,
        state: &EngineState,
        search_moves: Option<&[Move]>,
        mut on_depth_complete: impl FnMut(u8, Duration, Eval),
    ) -> Result<Move, SearchError> {
        state.clear_stop();
        let mut root_moves = movegen::generate_legal_moves(board);
        if let Some(restrict) = search_moves {
            root_moves.retain(|m| restrict.contains(m));
        }
        assert!(!root_moves.is_empty(), "cannot search a position with no legal moves");

        let batch_size = self.config.n_helpers.max(1);
        let mut best_move = root_moves[0];
        let start = Instant::now();

        for depth in 1..=self.config.depth {
            if state.is_stopped() {
                break;
            }

            let tracker = Mutex::new(RootTracker::new());
            for batch in root_moves.chunks(batch_size) {
                if state.is_stopped() {
                    break;
                }

                // Scoped threads let every worker below borrow `tracker` and
                // `state` directly instead of requiring an `Arc` around
                // data that only needs to live for this one batch.
                thread::scope(|scope| -> Result<(), SearchError> {
                    let handles: Vec<_> = batch
                        .iter()
                        .map(|&m| {
                            let mut scratch = *board;
                            scope.spawn(move || -> Result<(), SearchError> {
                                let alpha = tracker.lock()?.alpha;
                                let extended = mutator::apply(&mut scratch, m);
                                let value = (-alpha_beta(
                                    &mut scratch,
                                    Eval::MIN,
                                    -alpha,
                                    depth - 1,
                                    state,
                                )?)
                                .step_back();
                                mutator::undo(&mut scratch, extended);
                                tracker.lock()?.record(m, value);
                                Ok(())
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().expect("search worker thread panicked")?;
                    }
                    Ok(())
                })?;
            }

            let tracker = tracker.lock()?;
            if let Some(m) = tracker.choose() {
                best_move = m;
                state.set_best_move(Some(m))?;
                on_depth_complete(depth, start.elapsed(), tracker.alpha);
                debug!("info depth {depth} currmove {}", m.to_lan());
            }
        }

        info!("bestmove {}", best_move.to_lan());
        Ok(best_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_base::Square;

    fn find_best_move(fen: &str, depth: u8) -> Move {
        let board = Board::load_fen(fen).unwrap();
        let config = SearchConfig { depth, n_helpers: 2 };
        let state = EngineState::new();
        MainSearch::new(config).search(&board, &state).unwrap()
    }

    #[test]
    fn finds_the_only_back_rank_mate_in_one() {
        // White to move: Ra1-a8 is mate, and the only mating move on the board.
        let m = find_best_move("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 1);
        assert_eq!(m.from_square(), Square::A1);
        assert_eq!(m.to_square(), Square::A8);
    }

    #[test]
    fn prefers_capturing_an_undefended_queen() {
        // White to move: Bc4xd5 wins a completely undefended black queen for
        // free; no other legal move wins any material at all.
        let m = find_best_move("6k1/8/8/3q4/2B3K1/8/8/8 w - - 0 1", 2);
        assert_eq!(m.from_square(), Square::C4);
        assert_eq!(m.to_square(), Square::D5);
    }

    #[test]
    fn searchmoves_restricts_the_root_even_when_a_better_move_is_excluded() {
        // White to move: Bc4xd5 wins the undefended queen and is the engine's
        // free choice (see `prefers_capturing_an_undefended_queen`), but a
        // `searchmoves` restriction to a quiet king move must win anyway.
        let board = Board::load_fen("6k1/8/8/3q4/2B3K1/8/8/8 w - - 0 1").unwrap();
        let only_move =
            Move::encode(Square::G4, Square::H3, rookery_base::Piece::King, None, rookery_base::Color::White);
        let config = SearchConfig { depth: 2, n_helpers: 2 };
        let state = EngineState::new();
        let m = MainSearch::new(config)
            .search_with(&board, &state, Some(&[only_move]), |_, _, _| {})
            .unwrap();
        assert_eq!(m, only_move);
    }

    #[test]
    fn publishes_best_move_to_shared_state_after_every_depth() {
        let board = Board::load_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let config = SearchConfig { depth: 1, n_helpers: 1 };
        let state = EngineState::new();
        let best = MainSearch::new(config).search(&board, &state).unwrap();
        assert_eq!(state.best_move().unwrap(), Some(best));
    }

    #[test]
    fn mate_in_one() {
        let m = find_best_move("1k6/6R1/1K6/8/8/8/8/8 w - - 0 0", 1);
        assert_eq!(m.to_lan(), "g7g8");
    }

    #[test]
    fn mate_in_two_rook_ladder() {
        let m = find_best_move("8/1k6/6R1/K6R/8/8/8/8 w - - 0 0", 3);
        assert_eq!(m.to_lan(), "h5h7");
    }

    #[test]
    fn material_fork_puzzle() {
        let m = find_best_move(
            "rn1qk2r/pp3ppp/4p3/2bn4/6b1/4PN2/PP3PPP/RNBQKB1R w KQkq - 0 1",
            4,
        );
        assert_eq!(m.to_lan(), "d1a4");
    }

    #[test]
    fn remove_the_defender_puzzle() {
        let m = find_best_move("r4rk1/pp3ppp/2n5/3p4/4nB2/2qBP3/P1Q2PPP/R4RK1 w - - 0 17", 4);
        assert_eq!(m.to_lan(), "d3e4");
    }
}
