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

//! Error types for the boundaries of the board representation: FEN parsing
//! and magic table construction.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
/// An error produced while parsing a FEN string into a `Board`.
pub enum FenError {
    #[error("FEN must have exactly 6 space-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("FEN board field must have 8 ranks, got {0}")]
    WrongRankCount(usize),
    #[error("rank {0} in FEN board field does not describe exactly 8 files")]
    WrongFileCount(u8),
    #[error("unrecognized piece character '{0}' in FEN board field")]
    UnknownPieceChar(char),
    #[error("side-to-move field must be 'w' or 'b', got \"{0}\"")]
    BadSideToMove(String),
    #[error("castling rights field is malformed: \"{0}\"")]
    BadCastlingRights(String),
    #[error("en passant field is malformed: \"{0}\"")]
    BadEnPassant(String),
    #[error("halfmove or fullmove counter field is not a valid integer: \"{0}\"")]
    BadMoveCounter(String),
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
/// A fatal error produced when the magic-multiplier search exhausts its
/// trial budget without finding a collision-free multiplier for some
/// square.
#[error("failed to find a magic multiplier for square index {square} after {tries} tries")]
pub struct MagicBuildError {
    pub square: u8,
    pub tries: u64,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
/// An error produced while parsing a long algebraic notation move against a
/// board, or while decoding a packed move word.
pub enum MoveParseError {
    #[error("move text \"{0}\" is not valid long algebraic notation")]
    BadLan(String),
    #[error("move text \"{0}\" does not name a legal move in the given position")]
    NotLegal(String),
}
