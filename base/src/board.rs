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

//! The board representation: twelve colored-piece bitboards plus a packed
//! `info` field, and the FEN boundary that reads and writes it.

use super::{Bitboard, CastleRights, Color, Piece, Square};
use crate::error::FenError;

use std::fmt::{Display, Formatter};

/// Bit 0 of `info`: side to move (0 = white, 1 = black).
const SIDE_TO_MOVE_BIT: u16 = 1 << 0;
/// Bits 1..4 of `info`: castling rights, shaped like [`CastleRights`].
const CASTLE_SHIFT: u16 = 1;
const CASTLE_MASK: u16 = 0b1111 << CASTLE_SHIFT;
/// Bits 5..7 of `info`: en passant target file.
const EP_FILE_SHIFT: u16 = 5;
const EP_FILE_MASK: u16 = 0b111 << EP_FILE_SHIFT;
/// Bit 8 of `info`: en passant target present.
const EP_PRESENT_BIT: u16 = 1 << 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A chess position: twelve colored-piece occupancy bitboards and the
/// side-to-move/castling/en-passant state packed into `info`.
///
/// History (move counts, repetition) is deliberately not tracked here; a
/// `Board` is a snapshot, not a game.
pub struct Board {
    /// Occupancy of each colored piece, indexed by
    /// `piece as usize + color.piece_offset()`.
    pieces: [Bitboard; 12],
    info: u16,
}

impl Board {
    #[inline(always)]
    const fn piece_index(piece: Piece, color: Color) -> usize {
        piece as usize + color.piece_offset()
    }

    #[inline(always)]
    #[must_use]
    /// Get the bitboard of `piece`s belonging to `color`.
    pub const fn piece_bb(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[Board::piece_index(piece, color)]
    }

    #[inline(always)]
    /// Get a mutable reference to the bitboard of `piece`s belonging to
    /// `color`.
    pub fn piece_bb_mut(&mut self, piece: Piece, color: Color) -> &mut Bitboard {
        &mut self.pieces[Board::piece_index(piece, color)]
    }

    #[must_use]
    /// Get the union of every piece bitboard belonging to `color`.
    pub fn occupancy_color(&self, color: Color) -> Bitboard {
        let offset = color.piece_offset();
        let mut occ = Bitboard::EMPTY;
        for p in Piece::ALL_TYPES {
            occ |= self.pieces[p as usize + offset];
        }
        occ
    }

    #[must_use]
    /// Get the union of every piece on the board.
    pub fn occupancy(&self) -> Bitboard {
        self.occupancy_color(Color::White) | self.occupancy_color(Color::Black)
    }

    #[must_use]
    /// Find the piece and color occupying `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL_TYPES {
                if self.piece_bb(piece, color).contains(sq) {
                    return Some((piece, color));
                }
            }
        }
        None
    }

    #[must_use]
    /// Get the square of `color`'s king.
    ///
    /// # Panics
    ///
    /// Panics if `color` has no king, which violates the one-king-per-color
    /// invariant every legal position maintains.
    pub fn king_square(&self, color: Color) -> Square {
        self.piece_bb(Piece::King, color)
            .into_iter()
            .next()
            .expect("every legal position has exactly one king per color")
    }

    #[inline(always)]
    #[must_use]
    /// The side to move.
    pub const fn side_to_move(&self) -> Color {
        if self.info & SIDE_TO_MOVE_BIT == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    /// Set the side to move.
    pub fn set_side_to_move(&mut self, color: Color) {
        match color {
            Color::White => self.info &= !SIDE_TO_MOVE_BIT,
            Color::Black => self.info |= SIDE_TO_MOVE_BIT,
        }
    }

    #[inline(always)]
    /// Flip the side to move.
    pub fn flip_side_to_move(&mut self) {
        self.info ^= SIDE_TO_MOVE_BIT;
    }

    #[inline(always)]
    #[must_use]
    /// The current castling rights.
    pub const fn castle_rights(&self) -> CastleRights {
        CastleRights(((self.info & CASTLE_MASK) >> CASTLE_SHIFT) as u8)
    }

    #[inline(always)]
    /// Overwrite the castling rights.
    pub fn set_castle_rights(&mut self, rights: CastleRights) {
        self.info = (self.info & !CASTLE_MASK) | ((rights.0 as u16) << CASTLE_SHIFT);
    }

    #[inline(always)]
    /// Remove the given rights (e.g. `CastleRights::king_castle(White)`)
    /// from the current set, leaving the others untouched.
    pub fn remove_castle_rights(&mut self, rights: CastleRights) {
        self.set_castle_rights(self.castle_rights() & !rights);
    }

    #[must_use]
    /// The en passant target square, if the side to move may capture en
    /// passant this move.
    ///
    /// The rank of the target square is derived from the side to move
    /// rather than stored: a double push always leaves the *opponent* to
    /// move, so black-to-move implies a white double push (target rank
    /// index 2) and white-to-move implies a black double push (target rank
    /// index 5).
    pub fn en_passant_square(&self) -> Option<Square> {
        if self.info & EP_PRESENT_BIT == 0 {
            return None;
        }
        let file = ((self.info & EP_FILE_MASK) >> EP_FILE_SHIFT) as usize;
        let rank = match self.side_to_move() {
            Color::Black => 2,
            Color::White => 5,
        };
        Square::new(rank, file)
    }

    #[inline(always)]
    /// Clear the en passant target.
    pub fn clear_en_passant(&mut self) {
        self.info &= !(EP_PRESENT_BIT | EP_FILE_MASK);
    }

    #[inline(always)]
    /// Record that `file` is now the en passant target file (its rank is
    /// implied by the side to move, see [`Board::en_passant_square`]).
    pub fn set_en_passant_file(&mut self, file: usize) {
        self.info = (self.info & !EP_FILE_MASK) | ((file as u16) << EP_FILE_SHIFT) | EP_PRESENT_BIT;
    }

    #[must_use]
    /// Get the raw packed `info` field. Used by [`crate::mutator`] to save
    /// and restore board state around a move.
    pub const fn info(&self) -> u16 {
        self.info
    }

    /// Overwrite the raw packed `info` field.
    pub fn set_info(&mut self, info: u16) {
        self.info = info;
    }

    #[must_use]
    /// The standard starting position.
    pub fn default_board() -> Board {
        let mut pieces = [Bitboard::EMPTY; 12];

        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        for (file, piece) in back_rank.into_iter().enumerate() {
            pieces[Board::piece_index(piece, Color::White)].insert(Square::new(0, file).unwrap());
            pieces[Board::piece_index(piece, Color::Black)].insert(Square::new(7, file).unwrap());
        }
        for file in 0..8 {
            pieces[Board::piece_index(Piece::Pawn, Color::White)]
                .insert(Square::new(1, file).unwrap());
            pieces[Board::piece_index(Piece::Pawn, Color::Black)]
                .insert(Square::new(6, file).unwrap());
        }

        Board {
            pieces,
            info: (CastleRights::ALL_RIGHTS.0 as u16) << CASTLE_SHIFT,
        }
    }

    /// Parse a FEN string into a `Board`.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] describing the first malformed field
    /// encountered.
    pub fn load_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount(fields.len()));
        }
        let (placement, side, castling, ep, halfmove, fullmove) =
            (fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]);

        let mut pieces = [Bitboard::EMPTY; 12];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount(ranks.len()));
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file >= 8 {
                    return Err(FenError::WrongFileCount(rank as u8));
                }
                let upper = c.to_ascii_uppercase();
                let piece = Piece::from_code(upper).ok_or(FenError::UnknownPieceChar(c))?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let sq = Square::new(rank, file).unwrap();
                pieces[Board::piece_index(piece, color)].insert(sq);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::WrongFileCount(rank as u8));
            }
        }

        let mut info: u16 = 0;
        match side {
            "w" => {}
            "b" => info |= SIDE_TO_MOVE_BIT,
            _ => return Err(FenError::BadSideToMove(side.to_string())),
        }

        if castling != "-" {
            let mut rights = CastleRights::NO_RIGHTS;
            for c in castling.chars() {
                rights |= match c {
                    'K' => CastleRights::king_castle(Color::White),
                    'Q' => CastleRights::queen_castle(Color::White),
                    'k' => CastleRights::king_castle(Color::Black),
                    'q' => CastleRights::queen_castle(Color::Black),
                    _ => return Err(FenError::BadCastlingRights(castling.to_string())),
                };
            }
            info |= (rights.0 as u16) << CASTLE_SHIFT;
        }

        if ep != "-" {
            let sq =
                Square::from_algebraic(ep).map_err(|_| FenError::BadEnPassant(ep.to_string()))?;
            info |= ((sq.file() as u16) << EP_FILE_SHIFT) | EP_PRESENT_BIT;
        }

        halfmove
            .parse::<u32>()
            .map_err(|_| FenError::BadMoveCounter(halfmove.to_string()))?;
        fullmove
            .parse::<u32>()
            .map_err(|_| FenError::BadMoveCounter(fullmove.to_string()))?;

        Ok(Board { pieces, info })
    }

    #[must_use]
    /// Format this board as a FEN string. The half-move and full-move
    /// counters are not tracked by `Board`, so they are always emitted as
    /// `0 1`.
    pub fn format_fen(&self) -> String {
        let mut placement = String::new();
        for rank_from_top in 0..8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u8;
            for file in 0..8 {
                let sq = Square::new(rank, file).unwrap();
                match self.piece_at(sq) {
                    None => empty_run += 1,
                    Some((piece, color)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let code = piece.code();
                        if color == Color::White {
                            placement.push_str(code);
                        } else {
                            placement.push_str(&code.to_lowercase());
                        }
                    }
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move() {
            Color::White => "w",
            Color::Black => "b",
        };

        let rights = self.castle_rights();
        let mut castling = String::new();
        if rights.is_kingside_castle_legal(Color::White) {
            castling.push('K');
        }
        if rights.is_queenside_castle_legal(Color::White) {
            castling.push('Q');
        }
        if rights.is_kingside_castle_legal(Color::Black) {
            castling.push('k');
        }
        if rights.is_queenside_castle_legal(Color::Black) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant_square() {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{placement} {side} {castling} {ep} 0 1")
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rank_from_top in 0..8 {
            let rank = 7 - rank_from_top;
            for file in 0..8 {
                let sq = Square::new(rank, file).unwrap();
                let ch = match self.piece_at(sq) {
                    None => '.',
                    Some((piece, Color::White)) => piece.code().chars().next().unwrap(),
                    Some((piece, Color::Black)) => {
                        piece.code().to_lowercase().chars().next().unwrap()
                    }
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.format_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_has_expected_material() {
        let b = Board::default_board();
        assert_eq!(b.piece_bb(Piece::Pawn, Color::White).len(), 8);
        assert_eq!(b.piece_bb(Piece::King, Color::White).len(), 1);
        assert_eq!(b.occupancy().len(), 32);
        assert_eq!(b.side_to_move(), Color::White);
        assert_eq!(b.castle_rights(), CastleRights::ALL_RIGHTS);
        assert_eq!(b.en_passant_square(), None);
    }

    #[test]
    fn default_board_round_trips_through_fen() {
        let b = Board::default_board();
        let fen = b.format_fen();
        assert_eq!(
            fen,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        let b2 = Board::load_fen(&fen).unwrap();
        assert_eq!(b2.pieces, b.pieces);
        assert_eq!(b2.info, b.info);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let b = Board::load_fen(fen).unwrap();
        assert_eq!(b.format_fen(), fen);
    }

    #[test]
    fn en_passant_field_round_trips() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1";
        let b = Board::load_fen(fen).unwrap();
        assert_eq!(b.en_passant_square(), Some(Square::D6));
        assert_eq!(b.format_fen(), fen);
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(
            Board::load_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(FenError::WrongFieldCount(5))
        );
    }

    #[test]
    fn unknown_piece_char_is_rejected() {
        assert_eq!(
            Board::load_fen("xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::UnknownPieceChar('x'))
        );
    }
}
