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

//! Error types for the search engine's boundary: the one genuinely fallible
//! ambient condition a parallel search can hit is a poisoned lock left
//! behind by a panicked worker thread.

use std::sync::PoisonError;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
/// An error produced while running a search.
pub enum SearchError {
    /// A worker thread panicked while holding `EngineState`'s lock, poisoning
    /// it for every other thread.
    #[error("a search worker panicked while holding a shared lock")]
    Poison,
}

impl<T> From<PoisonError<T>> for SearchError {
    #[inline(always)]
    fn from(_: PoisonError<T>) -> Self {
        SearchError::Poison
    }
}
