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

//! Shared data types and useful basic definitions found across the entire
//! Rookery engine: board representation, move encoding, move generation,
//! reversible move application, perft, and material evaluation.

// Many module elements are re-exported to make names more ergonomic to access.

mod bitboard;
pub use crate::bitboard::Bitboard;

mod bitutil;
pub use bitutil::{bit_scan_forward, bit_scan_reverse, popcount};

mod board;
pub use board::Board;

mod castling;
pub use castling::CastleRights;

mod color;
pub use color::Color;

mod direction;
pub use direction::Direction;

pub mod error;

mod eval;
pub use eval::{evaluate, Eval};

mod magic;

pub mod movegen;

mod moves;
pub use moves::Move;

pub mod mutator;

pub mod perft;

mod piece;
pub use piece::Piece;

mod square;
pub use square::Square;
