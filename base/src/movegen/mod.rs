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

//! Move generation: per-piece attack maps, pseudo-legal enumeration, and the
//! self-check legality filter.
//!
//! Enumeration always proceeds pawn, knight, bishop, rook, queen, king, and
//! within a piece type, squares are always extracted lowest bit first. This
//! makes [`generate_legal_moves`] deterministic, which the perft traversal
//! and its tests depend on.

use crate::magic::MAGIC;
use crate::mutator;
use crate::{Bitboard, Board, Color, Direction, Move, Piece, Square};

use once_cell::sync::Lazy;
use std::convert::TryFrom;

static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| step_table(&Direction::KNIGHT_STEPS, 2));
static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| step_table(&Direction::KING_STEPS, 1));
static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    [
        step_table(&[Direction::NORTHEAST, Direction::NORTHWEST], 1),
        step_table(&[Direction::SOUTHEAST, Direction::SOUTHWEST], 1),
    ]
});

/// Build a single-step attack table: for every square, the union of
/// stepping in each of `steps`, discarding any step whose true Chebyshev
/// distance from the origin exceeds `max_dist` (this is what rejects steps
/// that wrapped around a file edge, since a wrapped step lands far away in
/// the Chebyshev metric).
fn step_table(steps: &[Direction], max_dist: u8) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for i in 0..64u8 {
        let sq = Square::try_from(i).unwrap();
        let mut bb = Bitboard::EMPTY;
        for &dir in steps {
            let dest = sq + dir;
            if sq.chebyshev_to(dest) <= max_dist {
                bb.insert(dest);
            }
        }
        table[i as usize] = bb;
    }
    table
}

#[must_use]
/// The squares a knight on `sq` attacks, ignoring occupancy.
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

#[must_use]
/// The squares a king on `sq` attacks, ignoring occupancy.
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

#[must_use]
/// The squares a `color` pawn on `sq` attacks diagonally, ignoring whether
/// those squares are occupied.
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color as usize][sq as usize]
}

#[must_use]
/// The squares a bishop on `sq` attacks given board `occupancy`.
pub fn bishop_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    MAGIC.bishop_attacks(occupancy, sq)
}

#[must_use]
/// The squares a rook on `sq` attacks given board `occupancy`.
pub fn rook_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    MAGIC.rook_attacks(occupancy, sq)
}

#[must_use]
/// The squares a queen on `sq` attacks given board `occupancy`.
pub fn queen_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    bishop_attacks(occupancy, sq) | rook_attacks(occupancy, sq)
}

#[must_use]
/// Determine whether `sq` is attacked by any piece belonging to `by_color`
/// in the given position.
///
/// Used both by the legality filter (is the mover's king attacked after the
/// move?) and by castling's path-safety check.
pub fn is_square_attacked_by(board: &Board, sq: Square, by_color: Color) -> bool {
    let occupancy = board.occupancy();

    if !(knight_attacks(sq) & board.piece_bb(Piece::Knight, by_color)).is_empty() {
        return true;
    }
    if !(king_attacks(sq) & board.piece_bb(Piece::King, by_color)).is_empty() {
        return true;
    }
    // A pawn of `by_color` attacks `sq` iff it sits on a square that `sq`
    // would attack were a pawn of the *opposite* color standing on `sq` -
    // the usual reverse-attack trick for pawns.
    if !(pawn_attacks(sq, !by_color) & board.piece_bb(Piece::Pawn, by_color)).is_empty() {
        return true;
    }
    let diag_attackers =
        board.piece_bb(Piece::Bishop, by_color) | board.piece_bb(Piece::Queen, by_color);
    if !(bishop_attacks(occupancy, sq) & diag_attackers).is_empty() {
        return true;
    }
    let line_attackers =
        board.piece_bb(Piece::Rook, by_color) | board.piece_bb(Piece::Queen, by_color);
    if !(rook_attacks(occupancy, sq) & line_attackers).is_empty() {
        return true;
    }

    false
}

/// Generate every pseudo-legal move available to the side to move: obeying
/// piece movement/capture rules, but possibly leaving the mover's own king
/// in check.
#[must_use]
pub fn pseudo_legal_moves(board: &Board) -> Vec<Move> {
    let color = board.side_to_move();
    let enemy = !color;
    let friends = board.occupancy_color(color);
    let foes = board.occupancy_color(enemy);
    let occupancy = friends | foes;

    let mut moves = Vec::with_capacity(48);

    generate_pawn_moves(board, color, friends, foes, &mut moves);
    generate_piece_moves(board, Piece::Knight, color, friends, occupancy, &mut moves, |occ, sq| {
        let _ = occ;
        knight_attacks(sq)
    });
    generate_piece_moves(board, Piece::Bishop, color, friends, occupancy, &mut moves, bishop_attacks);
    generate_piece_moves(board, Piece::Rook, color, friends, occupancy, &mut moves, rook_attacks);
    generate_piece_moves(board, Piece::Queen, color, friends, occupancy, &mut moves, queen_attacks);
    generate_king_moves(board, color, friends, occupancy, &mut moves);

    moves
}

/// Generate every legal move available to the side to move, in a
/// deterministic (repeatable) order.
///
/// Internally, each pseudo-legal move is applied to a scratch copy of
/// `board`, checked, and undone - the board passed in is never mutated.
#[must_use]
pub fn generate_legal_moves(board: &Board) -> Vec<Move> {
    let mut scratch = *board;
    let color = board.side_to_move();
    let mut legal = Vec::with_capacity(48);
    for m in pseudo_legal_moves(board) {
        if move_is_legal(&mut scratch, color, m) {
            legal.push(m);
        }
    }
    legal
}

#[must_use]
/// Whether the side to move has at least one legal move. Equivalent to
/// `!generate_legal_moves(board).is_empty()` but stops at the first legal
/// move found.
pub fn has_legal_moves(board: &Board) -> bool {
    let mut scratch = *board;
    let color = board.side_to_move();
    pseudo_legal_moves(board)
        .into_iter()
        .any(|m| move_is_legal(&mut scratch, color, m))
}

/// Apply `m` to `scratch`, check whether it leaves `color`'s king attacked
/// (and, for a castle, whether the king's origin or transit square is
/// attacked), then undo it unconditionally.
fn move_is_legal(scratch: &mut Board, color: Color, m: Move) -> bool {
    let extended = mutator::apply(scratch, m);
    let enemy = !color;

    let king_sq = scratch.king_square(color);
    let mut legal = !is_square_attacked_by(scratch, king_sq, enemy);

    if legal && m.is_castle() {
        let rank = m.from_square().rank();
        let e_file_sq = Square::new(rank, 4).unwrap();
        let transit_sq = if m.to_square().file() == 6 {
            Square::new(rank, 5).unwrap()
        } else {
            Square::new(rank, 3).unwrap()
        };
        legal = !is_square_attacked_by(scratch, e_file_sq, enemy)
            && !is_square_attacked_by(scratch, transit_sq, enemy);
    }

    mutator::undo(scratch, extended);
    legal
}

/// Generate moves for every piece of `piece` belonging to `color`, using
/// `attacks_fn` to compute each piece's attack set given the current
/// `occupancy`. Friendly-occupied destinations are removed.
fn generate_piece_moves(
    board: &Board,
    piece: Piece,
    color: Color,
    friends: Bitboard,
    occupancy: Bitboard,
    moves: &mut Vec<Move>,
    attacks_fn: impl Fn(Bitboard, Square) -> Bitboard,
) {
    for from in board.piece_bb(piece, color) {
        let targets = attacks_fn(occupancy, from) & !friends;
        for to in targets {
            moves.push(Move::encode(from, to, piece, None, color));
        }
    }
}

fn generate_pawn_moves(
    board: &Board,
    color: Color,
    friends: Bitboard,
    foes: Bitboard,
    moves: &mut Vec<Move>,
) {
    let direction = color.pawn_direction();
    let promote_rank = color.pawn_promote_rank();
    let start_rank = color.pawn_start_rank();
    let occupancy = friends | foes;
    let ep_square = board.en_passant_square();

    for from in board.piece_bb(Piece::Pawn, color) {
        let attack_squares = pawn_attacks(from, color);
        let mut capture_targets = attack_squares & foes;
        if let Some(ep) = ep_square {
            if attack_squares.contains(ep) {
                capture_targets.insert(ep);
            }
        }
        for to in capture_targets {
            push_pawn_move(moves, from, to, color, promote_rank);
        }

        let single = from + direction;
        if !occupancy.contains(single) {
            push_pawn_move(moves, from, single, color, promote_rank);

            if start_rank.contains(from) {
                let double = single + direction;
                if !occupancy.contains(double) {
                    moves.push(Move::encode(from, double, Piece::Pawn, None, color));
                }
            }
        }
    }
}

fn push_pawn_move(moves: &mut Vec<Move>, from: Square, to: Square, color: Color, promote_rank: Bitboard) {
    if promote_rank.contains(to) {
        for promo in Piece::PROMOTE_TYPES {
            moves.push(Move::encode(from, to, Piece::Pawn, Some(promo), color));
        }
    } else {
        moves.push(Move::encode(from, to, Piece::Pawn, None, color));
    }
}

fn generate_king_moves(board: &Board, color: Color, friends: Bitboard, occupancy: Bitboard, moves: &mut Vec<Move>) {
    let from = board.king_square(color);
    for to in king_attacks(from) & !friends {
        moves.push(Move::encode(from, to, Piece::King, None, color));
    }

    let rights = board.castle_rights();
    let rank = from.rank();

    if rights.is_kingside_castle_legal(color) {
        let f_sq = Square::new(rank, 5).unwrap();
        let g_sq = Square::new(rank, 6).unwrap();
        if !occupancy.contains(f_sq) && !occupancy.contains(g_sq) {
            moves.push(Move::encode(from, g_sq, Piece::King, None, color));
        }
    }
    if rights.is_queenside_castle_legal(color) {
        let d_sq = Square::new(rank, 3).unwrap();
        let c_sq = Square::new(rank, 2).unwrap();
        let b_sq = Square::new(rank, 1).unwrap();
        if !occupancy.contains(d_sq) && !occupancy.contains(c_sq) && !occupancy.contains(b_sq) {
            moves.push(Move::encode(from, c_sq, Piece::King, None, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color::{Black, White};

    #[test]
    fn default_board_has_twenty_legal_moves() {
        let board = Board::default_board();
        assert_eq!(generate_legal_moves(&board).len(), 20);
        assert!(has_legal_moves(&board));
    }

    #[test]
    fn kiwipete_has_forty_eight_legal_moves() {
        let board =
            Board::load_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(generate_legal_moves(&board).len(), 48);
    }

    #[test]
    fn enumeration_order_is_deterministic() {
        let board = Board::default_board();
        let first = generate_legal_moves(&board);
        let second = generate_legal_moves(&board);
        assert_eq!(first, second);
    }

    #[test]
    fn pinned_piece_cannot_move_off_the_pin_line() {
        // White king on e1, white bishop on e2 pinned by a black rook on e8.
        let board = Board::load_fen("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let moves = generate_legal_moves(&board);
        assert!(moves
            .iter()
            .filter(|m| m.from_square() == Square::E2)
            .all(|m| m.to_square().file() == 4));
    }

    #[test]
    fn cannot_castle_through_check() {
        // Black rook on f8 covers f1, so white cannot castle kingside.
        let board = Board::load_fen("5r1k/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let moves = generate_legal_moves(&board);
        assert!(!moves.iter().any(|m| m.is_castle()));
    }

    #[test]
    fn checkmate_position_has_no_legal_moves() {
        // Fool's mate.
        let board =
            Board::load_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(!has_legal_moves(&board));
        assert!(generate_legal_moves(&board).is_empty());
    }

    #[test]
    fn en_passant_capture_is_generated() {
        let board =
            Board::load_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1")
                .unwrap();
        let moves = generate_legal_moves(&board);
        assert!(moves
            .iter()
            .any(|m| m.from_square() == Square::E5 && m.to_square() == Square::D6));
    }

    #[test]
    fn pawn_reaching_last_rank_yields_four_promotions() {
        let board = Board::load_fen("8/P6k/8/8/8/8/7K/8 w - - 0 1").unwrap();
        let promos: Vec<Piece> = generate_legal_moves(&board)
            .into_iter()
            .filter(|m| m.from_square() == Square::A7)
            .filter_map(Move::promotion)
            .collect();
        assert_eq!(promos.len(), 4);
    }

    #[test]
    fn is_square_attacked_by_detects_pawn_attacks() {
        let board = Board::load_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_square_attacked_by(&board, Square::C4, Black));
        assert!(is_square_attacked_by(&board, Square::E4, Black));
        assert!(!is_square_attacked_by(&board, Square::D4, Black));
    }
}
