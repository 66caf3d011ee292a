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

//! Magic bitboards, used for generating bishop and rook moves.
//!
//! Unlike a table loaded from a saved set of multipliers, this table is
//! built from scratch by random search every time the process starts. See
//! [`AttacksTable::build`] for the search algorithm.

use super::{Bitboard, Direction, Square};
use crate::error::MagicBuildError;

use once_cell::sync::Lazy;

use std::convert::TryFrom;

/// A master copy of the main magic table, built once on first use and shared
/// for the lifetime of the process.
pub static MAGIC: Lazy<AttacksTable> =
    Lazy::new(|| AttacksTable::build().expect("failed to build magic attack tables"));

/// The number of times to try generating a magic multiplier for a single
/// square before giving up.
const NUM_MAGIC_TRIES: u64 = 100_000_000;

/// The minimum number of set bits required in the high byte of `mask * magic`
/// for a candidate multiplier to even be tested against the full subset
/// table. Candidates which fail this cheap check are rejected without
/// building a trial table, which is the dominant cost of the search.
const MIN_HIGH_BYTE_POPULATION: u32 = 6;

#[derive(Clone, Debug)]
/// A complete magic table which can generate moves for rooks and bishops.
pub struct AttacksTable {
    rook_table: Vec<SquareAttacks>,
    bishop_table: Vec<SquareAttacks>,
}

impl AttacksTable {
    /// Build a fresh `AttacksTable` by searching for a magic multiplier at
    /// every square, for both rooks and bishops.
    ///
    /// # Errors
    ///
    /// Returns a [`MagicBuildError`] if no collision-free multiplier can be
    /// found for some square within the trial budget.
    pub fn build() -> std::result::Result<AttacksTable, MagicBuildError> {
        let rook_table = build_table(true)?;
        let bishop_table = build_table(false)?;
        Ok(AttacksTable {
            rook_table,
            bishop_table,
        })
    }

    #[inline(always)]
    #[must_use]
    /// Get the attacks that a rook on `sq` could make given the board's
    /// current `occupancy`.
    pub fn rook_attacks(&self, occupancy: Bitboard, sq: Square) -> Bitboard {
        get_attacks(occupancy, sq, &self.rook_table)
    }

    #[inline(always)]
    #[must_use]
    /// Get the attacks that a bishop on `sq` could make given the board's
    /// current `occupancy`.
    pub fn bishop_attacks(&self, occupancy: Bitboard, sq: Square) -> Bitboard {
        get_attacks(occupancy, sq, &self.bishop_table)
    }
}

/// A structure containing all the information needed to generate moves for a
/// rook or bishop from one square.
#[derive(Clone, Debug)]
struct SquareAttacks {
    /// A mask which, when ANDed with the occupancy bitboard, gives only the
    /// bits relevant to this square's attacks.
    mask: Bitboard,
    /// The magic number to multiply to hash the current board effectively.
    magic: Bitboard,
    /// A lookup table of attacked squares, indexed by magic hash key.
    attacks: Vec<Bitboard>,
    /// The right-shift amount, `64 - popcount(mask)`.
    shift: u8,
}

/// Build the table for either rooks (`is_rook == true`) or bishops.
fn build_table(is_rook: bool) -> std::result::Result<Vec<SquareAttacks>, MagicBuildError> {
    let mut table = Vec::with_capacity(64);
    #[allow(clippy::cast_possible_truncation)]
    for i in 0..64u8 {
        let sq = Square::try_from(i).unwrap();
        let mask = if is_rook {
            get_rook_mask(sq)
        } else {
            get_bishop_mask(sq)
        };
        let num_points = mask.len();
        let shift = 64 - num_points;

        let directions = if is_rook {
            &Direction::ROOK_DIRECTIONS[..]
        } else {
            &Direction::BISHOP_DIRECTIONS[..]
        };

        let subset_count = 1usize << num_points;
        let mut occupancies = Vec::with_capacity(subset_count);
        let mut attacks = Vec::with_capacity(subset_count);
        for j in 0..subset_count {
            let occupancy = index_to_occupancy(j, mask);
            occupancies.push(occupancy);
            attacks.push(directional_attacks(sq, directions, occupancy));
        }

        let (magic, filled) = find_magic(mask, &occupancies, &attacks, shift, subset_count)
            .ok_or(MagicBuildError {
                square: i,
                tries: NUM_MAGIC_TRIES,
            })?;

        table.push(SquareAttacks {
            mask,
            magic,
            attacks: filled,
            shift,
        });
    }

    Ok(table)
}

/// Search for a magic multiplier that hashes every occupancy subset in
/// `occupancies` to a unique bucket (or to an identical attack set, in the
/// case of a benign collision) without colliding with a different attack
/// set. Returns the magic and the filled attack table on success.
fn find_magic(
    mask: Bitboard,
    occupancies: &[Bitboard],
    attacks: &[Bitboard],
    shift: u8,
    subset_count: usize,
) -> Option<(Bitboard, Vec<Bitboard>)> {
    'candidates: for _ in 0..NUM_MAGIC_TRIES {
        let magic = random_sparse_bitboard();

        let product: u64 = (mask * magic).into();
        let high_byte = (product >> 56) as u8;
        if high_byte.count_ones() < MIN_HIGH_BYTE_POPULATION {
            continue;
        }

        let mut filled = vec![Bitboard::EMPTY; 1 << (64 - shift)];
        for j in 0..subset_count {
            let key = compute_magic_key(occupancies[j], magic, shift);
            if filled[key].is_empty() {
                filled[key] = attacks[j];
            } else if filled[key] != attacks[j] {
                continue 'candidates;
            }
        }

        return Some((magic, filled));
    }

    None
}

/// Get the attacks a square has, given a magic lookup table and the current
/// occupancy.
fn get_attacks(occupancy: Bitboard, sq: Square, table: &[SquareAttacks]) -> Bitboard {
    // SAFETY: `sq` is always a valid square index in 0..64.
    let magic_data = unsafe { table.get_unchecked(sq as usize) };
    let masked_occupancy = occupancy & magic_data.mask;
    let key = compute_magic_key(masked_occupancy, magic_data.magic, magic_data.shift);

    unsafe { *magic_data.attacks.get_unchecked(key) }
}

#[inline(always)]
/// Use magic hashing to get the index to look up attacks in a bitboard.
fn compute_magic_key(occupancy: Bitboard, magic: Bitboard, shift: u8) -> usize {
    usize::from((occupancy * magic) >> shift)
}

/// Create the mask for the relevant bits in magic of a rook. `sq` is the
/// square that a rook would occupy to receive this mask.
fn get_rook_mask(sq: Square) -> Bitboard {
    let index = sq as i8;
    // sequence of 1s down the same row as the piece to move, except on the
    // ends
    let row_mask = Bitboard::new(0x7E << (8 * (index / 8)));
    // sequence of 1s down the same col as the piece to move, except on the
    // ends
    let col_mask = Bitboard::new(0x0001_0101_0101_0100 << (index % 8));
    // note: pieces at the end of a ray don't affect occupancy, since they
    // can always be captured or not regardless of what is further behind
    // them
    (row_mask ^ col_mask) & !Bitboard::from(sq)
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
/// Create the mask for the relevant bits in magic of a bishop. `sq` is the
/// square that a bishop would be on to receive this mask.
fn get_bishop_mask(sq: Square) -> Bitboard {
    /// A Bitboard made of 1's around the ring of the board, and 0's in the
    /// middle: the edges never matter for occupancy.
    const RING_MASK: Bitboard = Bitboard::new(0xFF81_8181_8181_81FF);

    (Bitboard::diagonal(sq) ^ Bitboard::anti_diagonal(sq)) & !RING_MASK
}

/// Given some mask, create the occupancy bitboard according to this index.
/// `index` must be less than `2 ^ popcount(mask)`.
fn index_to_occupancy(index: usize, mask: Bitboard) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    let num_points = mask.len();
    let mut editable_mask = mask;
    for i in 0..num_points {
        let shift_size = editable_mask.trailing_zeros();
        let occupier = Bitboard::new(1 << shift_size);
        editable_mask &= !occupier;
        if (index & (1 << i)) != 0 {
            result |= occupier;
        }
    }

    result
}

/// Construct the squares attacked by a piece at `sq` sliding along the
/// directions in `dirs`, stopping at and including the first blocker along
/// each ray, given the board is occupied by the pieces in `occupancy`. This
/// is a slow ray-cast and should only be used while building magic tables.
fn directional_attacks(sq: Square, dirs: &[Direction], occupancy: Bitboard) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    for dir in dirs.iter() {
        let mut current_square = sq;
        for _ in 0..7 {
            if !is_valid_step(current_square, *dir) {
                break;
            }
            current_square += *dir;
            result.insert(current_square);
            if occupancy.contains(current_square) {
                break;
            }
        }
    }

    result
}

/// Return whether stepping from `sq` in `dir` stays on the board as a single
/// ray step (distance at most 1 in the Chebyshev metric).
fn is_valid_step(sq: Square, dir: Direction) -> bool {
    sq.chebyshev_to(sq + dir) <= 1
}

#[inline(always)]
/// Generate a random, mostly-empty bitboard by ANDing together three random
/// 64-bit integers, biasing the result toward few set bits.
fn random_sparse_bitboard() -> Bitboard {
    let mut result = Bitboard::new(fastrand::u64(..));
    for _ in 0..2 {
        result &= Bitboard::new(fastrand::u64(..));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_mask() {
        assert_eq!(
            get_rook_mask(Square::A1),
            Bitboard::new(0x0001_0101_0101_017E)
        );
        assert_eq!(
            get_rook_mask(Square::E1),
            Bitboard::new(0x0010_1010_1010_106E)
        );
        assert_eq!(
            get_rook_mask(Square::E5),
            Bitboard::new(0x0010_106E_1010_1000)
        );
    }

    #[test]
    fn bishop_mask() {
        assert_eq!(
            get_bishop_mask(Square::A1),
            Bitboard::new(0x0040_2010_0804_0200)
        );
        assert_eq!(
            get_bishop_mask(Square::E1),
            Bitboard::new(0x0000_0000_0244_2800)
        );
        assert_eq!(
            get_bishop_mask(Square::E5),
            Bitboard::new(0x0044_2800_2844_0200)
        );
    }

    #[test]
    fn valid_index_to_occupancy() {
        let mask = Bitboard::new(0b1111);
        for i in 0..16 {
            let occu = index_to_occupancy(i, mask);
            assert_eq!(occu, Bitboard::new(i as u64));
        }
    }

    #[test]
    fn directional_attacks_stop_at_blocker() {
        // bishop on A1 blocked by piece on B2 only attacks B2.
        let occupancy = Bitboard::new(0x0000_0000_0000_0201);
        let attack = directional_attacks(Square::A1, &Direction::BISHOP_DIRECTIONS, occupancy);
        assert_eq!(attack, Bitboard::new(0x0000_0000_0000_0200));
    }

    #[test]
    fn built_rook_attacks_match_ray_cast() {
        let table = AttacksTable::build().unwrap();
        let occupancy = Bitboard::new(0x103);
        assert_eq!(
            table.rook_attacks(occupancy, Square::A1),
            Bitboard::new(0x102)
        );
    }

    #[test]
    fn built_bishop_attacks_match_ray_cast() {
        let table = AttacksTable::build().unwrap();
        let occupancy = Bitboard::new(0x0000_0000_0000_0201);
        assert_eq!(
            table.bishop_attacks(occupancy, Square::A1),
            Bitboard::new(0x0000_0000_0000_0200)
        );
    }
}
