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

//! The process-wide state shared between the UCI dispatcher, the search
//! workers, and the deadline timer.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Mutex,
};

use rookery_base::Move;

use crate::error::SearchError;

const STOP: u8 = 1 << 0;
const DEBUG: u8 = 1 << 1;

#[derive(Debug, Default)]
/// Shared engine state: a pair of cooperative flags and the best move found
/// so far by the running (or most recently completed) search.
///
/// Meant to be wrapped in an `Arc` and shared across threads: `flags` is an
/// atomic so it can be polled and set without blocking, while `best_move`
/// is guarded by a `Mutex` entered only for the short critical section of
/// comparing and publishing a new best move.
pub struct EngineState {
    flags: AtomicU8,
    best_move: Mutex<Option<Move>>,
}

impl EngineState {
    #[must_use]
    pub fn new() -> EngineState {
        EngineState {
            flags: AtomicU8::new(0),
            best_move: Mutex::new(None),
        }
    }

    #[inline]
    #[must_use]
    /// Has a `stop` command been issued since the last `clear_stop`?
    pub fn is_stopped(&self) -> bool {
        self.flags.load(Ordering::Acquire) & STOP != 0
    }

    #[inline]
    /// Request that every running search wind down as soon as it next checks.
    pub fn set_stop(&self) {
        self.flags.fetch_or(STOP, Ordering::AcqRel);
    }

    #[inline]
    /// Clear the stop flag. Called at the start of every new search.
    pub fn clear_stop(&self) {
        self.flags.fetch_and(!STOP, Ordering::AcqRel);
    }

    #[inline]
    #[must_use]
    /// Is debug mode (verbose `info string` output) enabled?
    pub fn is_debug(&self) -> bool {
        self.flags.load(Ordering::Acquire) & DEBUG != 0
    }

    #[inline]
    /// Turn debug mode on or off.
    pub fn set_debug(&self, on: bool) {
        if on {
            self.flags.fetch_or(DEBUG, Ordering::AcqRel);
        } else {
            self.flags.fetch_and(!DEBUG, Ordering::AcqRel);
        }
    }

    /// Read the best move found so far.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Poison` if a search thread panicked while
    /// holding the lock.
    pub fn best_move(&self) -> Result<Option<Move>, SearchError> {
        Ok(*self.best_move.lock()?)
    }

    /// Publish a new best move, replacing whatever was there before.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Poison` if a search thread panicked while
    /// holding the lock.
    pub fn set_best_move(&self, m: Option<Move>) -> Result<(), SearchError> {
        *self.best_move.lock()? = m;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_flag_round_trips() {
        let state = EngineState::new();
        assert!(!state.is_stopped());
        state.set_stop();
        assert!(state.is_stopped());
        state.clear_stop();
        assert!(!state.is_stopped());
    }

    #[test]
    fn debug_flag_is_independent_of_stop_flag() {
        let state = EngineState::new();
        state.set_debug(true);
        assert!(state.is_debug());
        assert!(!state.is_stopped());
        state.set_stop();
        assert!(state.is_debug());
        assert!(state.is_stopped());
    }

    #[test]
    fn best_move_starts_empty() {
        let state = EngineState::new();
        assert_eq!(state.best_move().unwrap(), None);
    }
}
