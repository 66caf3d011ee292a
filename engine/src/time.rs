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

//! A minimal deadline timer: no time-management heuristics, just a clock
//! that sets the stop flag when it runs out.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use log::info;

use crate::EngineState;

/// Spawn a thread that sleeps for `duration` and then sets `state`'s stop
/// flag. Holds no locks while sleeping, so it never blocks the search or
/// the command dispatcher.
pub fn spawn_deadline(state: Arc<EngineState>, duration: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(duration);
        state.set_stop();
        info!("search deadline of {duration:?} elapsed, stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_sets_stop_flag_after_elapsing() {
        let state = Arc::new(EngineState::new());
        spawn_deadline(Arc::clone(&state), Duration::from_millis(10))
            .join()
            .unwrap();
        assert!(state.is_stopped());
    }
}
