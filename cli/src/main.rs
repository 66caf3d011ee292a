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

//! The executable entry point: installs a logger, then either runs the UCI
//! loop over stdin/stdout or a direct `perft`/`bench` subcommand for
//! offline validation without a GUI in front.

use std::{env, io, process::ExitCode, time::Instant};

use rookery_base::{perft, Board};
use rookery_engine::{EngineState, MainSearch, SearchConfig};
use rookery_uci::Dispatcher;

/// A fried-liver-style middlegame used as a fixed benchmark position: sharp
/// enough that a slow move generator or a broken mutator shows up quickly
/// as a wrong or absurdly slow answer.
const BENCH_FEN: &str = "r1bq1b1r/ppp2kpp/2n5/3np3/2B5/8/PPPP1PPP/RNBQK2R w KQ - 0 7";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("perft") => run_perft(&args[2..]),
        Some("bench") => run_bench(),
        Some(other) => {
            eprintln!("unrecognized mode `{other}`; expected `perft`, `bench`, or no arguments");
            ExitCode::FAILURE
        }
        None => {
            Dispatcher::new().run(io::stdin().lock());
            ExitCode::SUCCESS
        }
    }
}

/// `rookery perft <depth> [FEN]`: run perft directly from the command line,
/// without going through UCI at all. `FEN` defaults to the starting
/// position if omitted.
fn run_perft(args: &[String]) -> ExitCode {
    let Some(depth_arg) = args.first() else {
        eprintln!("usage: rookery perft <depth> [FEN]");
        return ExitCode::FAILURE;
    };
    let Ok(depth) = depth_arg.parse::<u8>() else {
        eprintln!("`{depth_arg}` is not a valid depth");
        return ExitCode::FAILURE;
    };

    let board = if args.len() > 1 {
        let fen = args[1..].join(" ");
        match Board::load_fen(&fen) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("failed to load FEN `{fen}`: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Board::default_board()
    };

    let start = Instant::now();
    let info = perft::perft_parallel(&board, depth);
    let elapsed = start.elapsed();

    println!(
        "depth {depth}: nodes {} captures {} enpassants {} castles {} checks {} checkmates {} promotions {} in {:.3}s",
        info.nodes,
        info.captures,
        info.enpassants,
        info.castles,
        info.checks,
        info.checkmates,
        info.promotions,
        elapsed.as_secs_f64(),
    );
    ExitCode::SUCCESS
}

/// `rookery bench`: run a fixed-depth search on a fixed position, so that
/// search speed and move choice can be compared across changes without a
/// GUI driving the engine over UCI.
fn run_bench() -> ExitCode {
    let Ok(board) = Board::load_fen(BENCH_FEN) else {
        eprintln!("internal error: benchmark FEN failed to parse");
        return ExitCode::FAILURE;
    };

    let config = SearchConfig { depth: 8, ..SearchConfig::new() };
    let state = EngineState::new();
    let start = Instant::now();
    let result = MainSearch::new(config).search(&board, &state);
    let elapsed = start.elapsed();

    match result {
        Ok(m) => {
            println!("depth {}: {} in {:.3}s", config.depth, m.to_lan(), elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("benchmark search failed: {e}");
            ExitCode::FAILURE
        }
    }
}
