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

//! Pieces, which contain no information about their color or current square.

use std::{
    convert::TryFrom,
    fmt::{Display, Formatter, Result},
};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
/// The type of a piece. This contains no information about the location of a
/// piece, or of its color.
///
/// The ordering of this enum's discriminants is load-bearing: it is the same
/// numbering used for the piece-kind fields of a packed move word and for
/// indexing into a colored-piece bitboard array, so it must not be
/// reordered.
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// Total number of piece types.
    pub const NUM_TYPES: usize = 6;

    /// Array containing all piece types, pawn first through king last.
    pub const ALL_TYPES: [Piece; Piece::NUM_TYPES] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Array containing piece types which are not pawns.
    pub const NON_PAWN_TYPES: [Piece; Piece::NUM_TYPES - 1] = [
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Array containing piece types which are not kings.
    pub const NON_KING_TYPES: [Piece; Piece::NUM_TYPES - 1] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ];

    /// Array containing the piece types a pawn may promote to.
    pub const PROMOTE_TYPES: [Piece; 4] =
        [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

    #[must_use]
    /// Get the FEN code of this piece as an uppercase string.
    pub const fn code(self) -> &'static str {
        match self {
            Piece::Pawn => "P",
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
        }
    }

    #[must_use]
    /// Given a FEN character, convert it to a piece type. Must be uppercase.
    pub const fn from_code(c: char) -> Option<Piece> {
        match c {
            'P' => Some(Piece::Pawn),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            'K' => Some(Piece::King),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Piece {
    type Error = &'static str;

    /// Recover a `Piece` from its 3-bit packed-move encoding. Used to decode
    /// the moving-piece, promotion-piece, and captured-piece fields of a
    /// `Move`.
    fn try_from(x: u8) -> Result<Piece, Self::Error> {
        match x {
            0 => Ok(Piece::Pawn),
            1 => Ok(Piece::Knight),
            2 => Ok(Piece::Bishop),
            3 => Ok(Piece::Rook),
            4 => Ok(Piece::Queen),
            5 => Ok(Piece::King),
            _ => Err("piece code out of range 0..=5"),
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_packed_encoding() {
        assert_eq!(Piece::Pawn as u8, 0);
        assert_eq!(Piece::Knight as u8, 1);
        assert_eq!(Piece::Bishop as u8, 2);
        assert_eq!(Piece::Rook as u8, 3);
        assert_eq!(Piece::Queen as u8, 4);
        assert_eq!(Piece::King as u8, 5);
    }

    #[test]
    fn code_round_trip() {
        for p in Piece::ALL_TYPES {
            let c = p.code().chars().next().unwrap();
            assert_eq!(Piece::from_code(c), Some(p));
        }
    }

    #[test]
    fn try_from_round_trip() {
        for p in Piece::ALL_TYPES {
            assert_eq!(Piece::try_from(p as u8), Ok(p));
        }
        assert!(Piece::try_from(6).is_err());
    }
}
