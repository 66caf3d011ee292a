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

//! Reversible move application.
//!
//! [`apply`] mutates a [`Board`] in place and hands back an *extended* move
//! carrying everything needed to reverse the mutation; [`undo`] consumes
//! that extended move and restores the board bit-identically. This lets the
//! move generator and search walk the game tree on a single board instead
//! of copying one at every node.

use crate::{Bitboard, Board, CastleRights, Color, Move, Piece, Square};

/// Apply `m` to `board`, mutating it in place, and return the extended
/// (undo) form of the move.
///
/// `m` must be a pseudo-legal move generated against `board`'s current
/// state; legality (does it leave the mover's king in check) is the move
/// generator's responsibility, not this function's.
pub fn apply(board: &mut Board, m: Move) -> Move {
    let mover_color = m.color();
    let enemy_color = !mover_color;
    let src = m.from_square();
    let dst = m.to_square();
    let piece = m.piece();

    let is_en_passant = piece == Piece::Pawn && board.en_passant_square() == Some(dst);
    let capture_square = if is_en_passant {
        dst - mover_color.pawn_direction()
    } else {
        dst
    };

    let captured = Piece::ALL_TYPES
        .into_iter()
        .find(|&p| board.piece_bb(p, enemy_color).contains(capture_square));
    if let Some(cp) = captured {
        toggle(board, cp, enemy_color, capture_square);
    }

    let prev_info = board.info();

    toggle2(board, piece, mover_color, src, dst);
    // `m.promotion()` is deliberately not consulted here: a pawn that
    // reaches the last rank remains a pawn on the board. Promotion during
    // play is out of scope (see the Non-goals); the move encoding still
    // carries the field so the move generator and UCI layer round-trip it.

    if m.is_castle() {
        relocate_castling_rook(board, mover_color, src.rank(), dst.file());
    }

    board.flip_side_to_move();
    recompute_castle_rights(board, piece, mover_color);

    board.clear_en_passant();
    if piece == Piece::Pawn && src.rank().abs_diff(dst.rank()) == 2 {
        board.set_en_passant_file(src.file());
    }

    m.extend(captured, prev_info)
}

/// Reverse the mutation recorded by an extended move produced by [`apply`].
pub fn undo(board: &mut Board, extended: Move) {
    let mover_color = extended.color();
    let enemy_color = !mover_color;
    let src = extended.from_square();
    let dst = extended.to_square();
    let piece = extended.piece();
    let captured = extended.captured();

    // Restoring `info` first puts the side-to-move bit back to the mover,
    // which is exactly what `en_passant_square` needs below to recognize an
    // en-passant capture the same way `apply` originally did.
    board.set_info(extended.prev_info());

    toggle2(board, piece, mover_color, src, dst);

    if extended.is_castle() {
        relocate_castling_rook(board, mover_color, src.rank(), dst.file());
    }

    if let Some(cp) = captured {
        let is_en_passant =
            piece == Piece::Pawn && cp == Piece::Pawn && board.en_passant_square() == Some(dst);
        let capture_square = if is_en_passant {
            dst - mover_color.pawn_direction()
        } else {
            dst
        };
        toggle(board, cp, enemy_color, capture_square);
    }
}

#[inline(always)]
fn toggle(board: &mut Board, piece: Piece, color: Color, sq: Square) {
    let bb = board.piece_bb_mut(piece, color);
    *bb = *bb ^ Bitboard::from(sq);
}

#[inline(always)]
fn toggle2(board: &mut Board, piece: Piece, color: Color, a: Square, b: Square) {
    let bb = board.piece_bb_mut(piece, color);
    *bb = *bb ^ Bitboard::from(a) ^ Bitboard::from(b);
}

/// Move the castling rook for a king move from `src_rank` that landed on
/// `dst_file` (either the g-file or c-file). Shared by `apply` and `undo`,
/// since the castling rook motion is its own inverse.
fn relocate_castling_rook(board: &mut Board, color: Color, rank: usize, dst_file: usize) {
    let (rook_from_file, rook_to_file) = if dst_file == 6 { (7, 5) } else { (0, 3) };
    let rook_from = Square::new(rank, rook_from_file).unwrap();
    let rook_to = Square::new(rank, rook_to_file).unwrap();
    toggle2(board, Piece::Rook, color, rook_from, rook_to);
}

/// Recompute castling rights after a move has been applied: a king move
/// clears both of its color's rights; a rook no longer standing on its home
/// square (because it moved or was captured) clears the corresponding
/// single right. Checking rook home squares directly, rather than special
/// casing captures, handles both causes uniformly.
fn recompute_castle_rights(board: &mut Board, moved_piece: Piece, mover_color: Color) {
    let mut rights = board.castle_rights();
    if moved_piece == Piece::King {
        rights &= !CastleRights::color_rights(mover_color);
    }
    if !board.piece_bb(Piece::Rook, Color::White).contains(Square::H1) {
        rights &= !CastleRights::king_castle(Color::White);
    }
    if !board.piece_bb(Piece::Rook, Color::White).contains(Square::A1) {
        rights &= !CastleRights::queen_castle(Color::White);
    }
    if !board.piece_bb(Piece::Rook, Color::Black).contains(Square::H8) {
        rights &= !CastleRights::king_castle(Color::Black);
    }
    if !board.piece_bb(Piece::Rook, Color::Black).contains(Square::A8) {
        rights &= !CastleRights::queen_castle(Color::Black);
    }
    board.set_castle_rights(rights);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color::{Black, White};

    #[test]
    fn apply_then_undo_restores_quiet_move() {
        let mut board = Board::default_board();
        let before = board;
        let m = Move::encode(Square::E2, Square::E4, Piece::Pawn, None, White);
        let extended = apply(&mut board, m);
        assert_ne!(board, before);
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn apply_then_undo_restores_capture() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut board = Board::load_fen(fen).unwrap();
        let before = board;
        let m = Move::encode(Square::E5, Square::D7, Piece::Knight, None, White);
        let extended = apply(&mut board, m);
        assert_eq!(extended.captured(), Some(Piece::Pawn));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn double_push_sets_en_passant_then_undo_clears_it() {
        let mut board = Board::default_board();
        let before = board;
        let m = Move::encode(Square::E2, Square::E4, Piece::Pawn, None, White);
        let extended = apply(&mut board, m);
        assert_eq!(board.en_passant_square(), Some(Square::E3));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_capture_round_trips() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1";
        let mut board = Board::load_fen(fen).unwrap();
        let before = board;
        let m = Move::encode(Square::E5, Square::D6, Piece::Pawn, None, White);
        let extended = apply(&mut board, m);
        assert_eq!(extended.captured(), Some(Piece::Pawn));
        assert!(!board.piece_bb(Piece::Pawn, Black).contains(Square::D5));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_field_is_carried_but_not_realized_on_the_board() {
        // Promotion during play is out of scope: the pawn lands on the
        // back rank and stays a pawn, even though the move it was given
        // names a promotion piece.
        let fen = "8/P6k/8/8/8/8/7K/8 w - - 0 1";
        let mut board = Board::load_fen(fen).unwrap();
        let before = board;
        let m = Move::encode(Square::A7, Square::A8, Piece::Pawn, Some(Piece::Queen), White);
        let extended = apply(&mut board, m);
        assert!(board.piece_bb(Piece::Pawn, White).contains(Square::A8));
        assert!(!board.piece_bb(Piece::Queen, White).contains(Square::A8));
        assert_eq!(extended.promotion(), Some(Piece::Queen));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn kingside_castle_moves_rook_and_round_trips() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut board = Board::load_fen(fen).unwrap();
        let before = board;
        let m = Move::encode(Square::E1, Square::G1, Piece::King, None, White);
        let extended = apply(&mut board, m);
        assert!(board.piece_bb(Piece::Rook, White).contains(Square::F1));
        assert!(!board.piece_bb(Piece::Rook, White).contains(Square::H1));
        assert!(!board.castle_rights().is_kingside_castle_legal(White));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }

    #[test]
    fn kiwipete_double_apply_and_undo_restores_original_fen() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut board = Board::load_fen(fen).unwrap();

        let black_move = Move::encode(Square::C7, Square::C5, Piece::Pawn, None, Black);
        let extended_black = apply(&mut board, black_move);
        assert_eq!(board.en_passant_square(), Some(Square::C6));

        let white_move = Move::encode(Square::A4, Square::A5, Piece::Pawn, None, White);
        let extended_white = apply(&mut board, white_move);

        undo(&mut board, extended_white);
        undo(&mut board, extended_black);

        assert_eq!(board.format_fen(), fen);
    }

    #[test]
    fn rook_capture_removes_opponent_castle_right() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K1NR w KQkq - 0 1";
        let mut board = Board::load_fen(fen).unwrap();
        let before = board;
        let m = Move::encode(Square::G1, Square::H8, Piece::Knight, None, White);
        let extended = apply(&mut board, m);
        assert!(!board.castle_rights().is_kingside_castle_legal(Black));
        undo(&mut board, extended);
        assert_eq!(board, before);
    }
}
