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

//! Castling rights management.
//!
//! Rights are stored as a 4-bit field that is embedded verbatim into bits
//! 1..4 of `Board::info` (see [`crate::board`]). From LSB to MSB the four
//! bits are: black kingside, black queenside, white kingside, white
//! queenside.

use super::Color;

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// A 4-bit set of castling rights. The internal value is already shaped to
/// be OR'd directly into `Board::info` after a shift of 1.
pub struct CastleRights(pub u8);

impl CastleRights {
    /// A `CastleRights` where all rights are available.
    pub const ALL_RIGHTS: CastleRights = CastleRights(15);

    /// A `CastleRights` where no rights are available.
    pub const NO_RIGHTS: CastleRights = CastleRights(0);

    /// Create a `CastleRights` for kingside castling on one side.
    #[inline(always)]
    pub const fn king_castle(color: Color) -> CastleRights {
        match color {
            Color::Black => CastleRights(1),
            Color::White => CastleRights(4),
        }
    }

    /// Create a `CastleRights` for queenside castling on one side.
    #[inline(always)]
    pub const fn queen_castle(color: Color) -> CastleRights {
        match color {
            Color::Black => CastleRights(2),
            Color::White => CastleRights(8),
        }
    }

    /// Get the full rights for one color.
    pub const fn color_rights(color: Color) -> CastleRights {
        match color {
            Color::Black => CastleRights(3),
            Color::White => CastleRights(12),
        }
    }

    #[inline(always)]
    /// Can the given color legally castle kingside (rights-wise)?
    pub fn is_kingside_castle_legal(&self, color: Color) -> bool {
        *self & CastleRights::king_castle(color) != CastleRights::NO_RIGHTS
    }

    #[inline(always)]
    /// Can the given color legally castle queenside (rights-wise)?
    pub fn is_queenside_castle_legal(&self, color: Color) -> bool {
        *self & CastleRights::queen_castle(color) != CastleRights::NO_RIGHTS
    }
}

impl BitOr<CastleRights> for CastleRights {
    type Output = CastleRights;
    #[inline(always)]
    fn bitor(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }
}

impl BitOrAssign<CastleRights> for CastleRights {
    #[inline(always)]
    fn bitor_assign(&mut self, other: CastleRights) {
        self.0 |= other.0;
    }
}

impl BitAnd<CastleRights> for CastleRights {
    type Output = CastleRights;
    #[inline(always)]
    fn bitand(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 & other.0)
    }
}

impl BitAndAssign<CastleRights> for CastleRights {
    #[inline(always)]
    fn bitand_assign(&mut self, other: CastleRights) {
        self.0 &= other.0;
    }
}

impl Not for CastleRights {
    type Output = CastleRights;
    #[inline(always)]
    fn not(self) -> CastleRights {
        CastleRights(self.0 ^ 15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kingside_bit_positions_match_spec_order() {
        assert_eq!(CastleRights::king_castle(Color::Black).0, 1);
        assert_eq!(CastleRights::queen_castle(Color::Black).0, 2);
        assert_eq!(CastleRights::king_castle(Color::White).0, 4);
        assert_eq!(CastleRights::queen_castle(Color::White).0, 8);
    }

    #[test]
    fn color_rights_is_union_of_its_two_castles() {
        assert_eq!(
            CastleRights::color_rights(Color::White),
            CastleRights::king_castle(Color::White) | CastleRights::queen_castle(Color::White)
        );
    }

    #[test]
    fn not_all_rights_is_no_rights() {
        assert_eq!(!CastleRights::ALL_RIGHTS, CastleRights::NO_RIGHTS);
    }
}
