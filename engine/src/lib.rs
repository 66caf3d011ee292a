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

//! The search engine: iterative-deepening negamax with alpha-beta pruning,
//! parallelized over root moves, plus the shared state the search and the
//! command dispatcher use to talk to each other.

mod config;
pub use config::SearchConfig;

mod error;
pub use error::SearchError;

mod state;
pub use state::EngineState;

mod search;
pub use search::alpha_beta;

mod thread;
pub use thread::MainSearch;

mod time;
pub use time::spawn_deadline;
