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

//! Performance testing ("perft"): an exhaustive move-tree traversal used to
//! validate the move generator and the board mutator against published node
//! counts.

use crate::{movegen, mutator, Board, Piece};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Tallies collected while walking the legal-move tree to a fixed depth.
pub struct PerftInfo {
    pub nodes: u64,
    pub captures: u64,
    pub enpassants: u64,
    pub castles: u64,
    pub checks: u64,
    /// Reserved: counting true checkmates requires a full mate search at
    /// every leaf, which this traversal does not perform. Always zero.
    pub checkmates: u64,
    pub promotions: u64,
}

impl PerftInfo {
    fn combine(&mut self, other: PerftInfo) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.enpassants += other.enpassants;
        self.castles += other.castles;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
        self.promotions += other.promotions;
    }
}

#[must_use]
/// Walk every legal move tree rooted at `board` to `depth` plies, tallying
/// node counts and move categories as it goes.
pub fn perft(board: &Board, depth: u8) -> PerftInfo {
    let mut scratch = *board;
    perft_search(&mut scratch, depth)
}

/// Walk the same tree as [`perft`], but fan the root moves out across
/// threads, one per root move. Intended for deep counts where a single
/// thread is too slow.
#[must_use]
pub fn perft_parallel(board: &Board, depth: u8) -> PerftInfo {
    if depth == 0 {
        return PerftInfo { nodes: 1, ..Default::default() };
    }

    let root_moves = movegen::generate_legal_moves(board);
    let handles: Vec<_> = root_moves
        .into_iter()
        .map(|m| {
            let mut scratch = *board;
            std::thread::spawn(move || {
                let extended = mutator::apply(&mut scratch, m);
                let info = perft_search(&mut scratch, depth - 1);
                mutator::undo(&mut scratch, extended);
                info
            })
        })
        .collect();

    let mut total = PerftInfo::default();
    for handle in handles {
        total.combine(handle.join().expect("perft worker thread panicked"));
    }
    total
}

fn perft_search(board: &mut Board, depth: u8) -> PerftInfo {
    if depth == 0 {
        return PerftInfo { nodes: 1, ..Default::default() };
    }

    let color = board.side_to_move();
    let mut info = PerftInfo::default();

    for m in movegen::generate_legal_moves(board) {
        if depth == 1 {
            info.nodes += 1;
            let is_promotion = m.is_promotion();
            let is_castle = m.is_castle();
            let is_en_passant =
                m.piece() == Piece::Pawn && Some(m.to_square()) == board.en_passant_square();

            let extended = mutator::apply(board, m);
            if extended.captured().is_some() {
                info.captures += 1;
            }
            if is_en_passant {
                info.enpassants += 1;
            }
            if is_castle {
                info.castles += 1;
            }
            if is_promotion {
                info.promotions += 1;
            }
            let enemy_king = board.king_square(!color);
            if movegen::is_square_attacked_by(board, enemy_king, color) {
                info.checks += 1;
            }
            mutator::undo(board, extended);
        } else {
            let extended = mutator::apply(board, m);
            info.combine(perft_search(board, depth - 1));
            mutator::undo(board, extended);
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perft_nodes(fen: &str, node_counts: &[u64]) {
        let board = Board::load_fen(fen).unwrap();
        for (depth, &expected) in node_counts.iter().enumerate() {
            assert_eq!(perft(&board, depth as u8).nodes, expected, "depth {depth}");
        }
    }

    #[test]
    fn perft_start_position() {
        perft_nodes(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[1, 20, 400, 8_902, 197_281],
        );
    }

    #[test]
    fn perft_kiwipete() {
        perft_nodes(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[1, 48, 2_039, 97_862],
        );
    }

    #[test]
    fn perft_endgame() {
        // https://www.chessprogramming.org/Perft_Results#Position_3
        perft_nodes("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[1, 14, 191, 2_812, 43_238]);
    }

    #[test]
    fn perft_unbalanced() {
        // https://www.chessprogramming.org/Perft_Results#Position_4
        perft_nodes(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[1, 6, 264, 9_467],
        );
    }

    #[test]
    fn perft_edwards() {
        // https://www.chessprogramming.org/Perft_Results#Position_5
        perft_nodes(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[1, 44, 1_486, 62_379],
        );
    }

    #[test]
    fn category_tallies_for_kiwipete_depth_one() {
        let board =
            Board::load_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let info = perft(&board, 1);
        assert_eq!(info.nodes, 48);
        assert_eq!(info.captures, 8);
        assert_eq!(info.castles, 2);
        assert_eq!(info.checks, 0);
        assert_eq!(info.checkmates, 0);
    }

    #[test]
    fn parallel_perft_agrees_with_serial_perft() {
        let board = Board::default_board();
        assert_eq!(perft(&board, 4).nodes, perft_parallel(&board, 4).nodes);
    }
}
