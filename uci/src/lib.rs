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

//! Parsing and formatting for the UCI text protocol, and the dispatcher
//! loop that drives the engine from a stream of command lines.

mod command;
pub use command::{parse_line, resolve_depth, GoOption, ParseResult, UciCommand};

mod message;
pub use message::{EngineInfo, OptionType, UciMessage};

mod dispatch;
pub use dispatch::Dispatcher;
