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

//! Negamax with alpha-beta pruning: the leaf-level search routine called
//! independently by every root-move worker spawned by [`crate::MainSearch`].

use rookery_base::{evaluate, mutator, movegen, Board, Eval};

use crate::{EngineState, SearchError};

/// Evaluate `board` to `depth` plies using negamax with alpha-beta pruning,
/// from the perspective of the side to move.
///
/// A position with no legal moves is a terminal node regardless of `depth`:
/// checkmate resolves to [`Eval::BLACK_MATE`] (the worst possible outcome
/// for whichever side is to move, since the return value is always
/// perspective-relative) and stalemate resolves to [`Eval::DRAW`]. Mate
/// scores are moved one ply closer to zero ([`Eval::step_back`]) at every
/// level they propagate through, so that a search prefers a faster mate over
/// a slower one.
///
/// # Errors
///
/// Returns `SearchError::Poison` if `state`'s lock was poisoned by a
/// panicked sibling thread.
pub fn alpha_beta(
    board: &mut Board,
    mut alpha: Eval,
    beta: Eval,
    depth: u8,
    state: &EngineState,
) -> Result<Eval, SearchError> {
    if state.is_stopped() {
        return Ok(evaluate(board).in_perspective(board.side_to_move()));
    }

    let moves = movegen::generate_legal_moves(board);
    if moves.is_empty() {
        let color = board.side_to_move();
        let king_square = board.king_square(color);
        return Ok(if movegen::is_square_attacked_by(board, king_square, !color) {
            Eval::BLACK_MATE
        } else {
            Eval::DRAW
        });
    }

    if depth == 0 {
        return Ok(evaluate(board).in_perspective(board.side_to_move()));
    }

    let mut best = Eval::MIN;
    for m in moves {
        let extended = mutator::apply(board, m);
        let value = (-alpha_beta(board, -beta, -alpha, depth - 1, state)?).step_back();
        mutator::undo(board, extended);

        if value > best {
            best = value;
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta || state.is_stopped() {
            break;
        }
    }

    Ok(best)
}
