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

//! Parsing of UCI command lines sent by the GUI to the engine.

use log::warn;
use rookery_base::{movegen, Board, Move, Piece};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The set of commands the GUI can send to the engine over UCI.
pub enum UciCommand {
    /// `uci`: the engine must reply with its identity, its options, and
    /// finally `uciok`.
    Uci,
    /// `debug [on|off]`: toggle verbose `info string` output. Defaults to on
    /// when the argument is omitted, matching the protocol.
    Debug(bool),
    /// `isready`: the engine must reply `readyok` once it has caught up with
    /// every command sent before this one.
    IsReady,
    /// `setoption name <name> [value <value>]`.
    SetOption { name: String, value: Option<String> },
    /// `register ...`: stubbed, always acknowledged.
    Register,
    /// `ucinewgame`: the next position will be a new game.
    NewGame,
    /// `position [startpos | fen <fen>] [moves <lan>...]`.
    Position {
        /// The FEN to start from, or `None` for the standard starting
        /// position.
        fen: Option<String>,
        /// The moves to replay after setting up the position. Built by
        /// incrementally applying each LAN token to a scratch board, so
        /// every move here is guaranteed legal in the position it was
        /// played in; a token that fails to parse or is not legal is
        /// skipped (logged, not rejected outright).
        moves: Vec<Move>,
    },
    /// `go [subcommands...]`.
    Go(Vec<GoOption>),
    /// `stop`: cancel the running search and report its best move.
    Stop,
    /// `ponderhit`: the opponent played the suggested ponder move.
    PonderHit,
    /// `quit`: terminate the loop.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Subcommands of `go`.
pub enum GoOption {
    /// Restrict the root to only these moves.
    SearchMoves(Vec<Move>),
    /// Ponder on the position instead of searching normally.
    Ponder,
    /// White has this many milliseconds remaining.
    WhiteTime(u32),
    /// Black has this many milliseconds remaining.
    BlackTime(u32),
    /// White's increment per move, in milliseconds.
    WhiteInc(u32),
    /// Black's increment per move, in milliseconds.
    BlackInc(u32),
    /// Moves remaining until the next time control.
    MovesToGo(u8),
    /// Search to this many plies.
    Depth(u8),
    /// Search approximately this many nodes.
    Nodes(u64),
    /// Search for a mate in this many moves.
    Mate(u8),
    /// Search for this many milliseconds, then stop.
    MoveTime(u32),
    /// Search until `stop` is given.
    Infinite,
}

/// The result of parsing one line of UCI input.
pub type ParseResult = Result<UciCommand, String>;

/// Parse a single line of UCI input. `board` is the dispatcher's current
/// position, consulted only to resolve `position ... moves ...` and
/// `go searchmoves ...` LAN tokens into fully-typed `Move`s.
pub fn parse_line(line: &str, board: &Board) -> ParseResult {
    let mut tokens = line.split_ascii_whitespace();
    let first = tokens.next().ok_or("empty command line")?;
    match first {
        "uci" => Ok(UciCommand::Uci),
        "debug" => match tokens.next() {
            Some("on") | None => Ok(UciCommand::Debug(true)),
            Some("off") => Ok(UciCommand::Debug(false)),
            Some(other) => Err(format!("unrecognized `debug` argument `{other}`")),
        },
        "isready" => Ok(UciCommand::IsReady),
        "setoption" => parse_set_option(&mut tokens),
        "register" => Ok(UciCommand::Register),
        "ucinewgame" => Ok(UciCommand::NewGame),
        "position" => parse_position(&mut tokens),
        "go" => parse_go(&mut tokens, board),
        "stop" => Ok(UciCommand::Stop),
        "ponderhit" => Ok(UciCommand::PonderHit),
        "quit" => Ok(UciCommand::Quit),
        _ => Err(format!("unrecognized UCI command `{first}`")),
    }
}

fn parse_set_option(tokens: &mut dyn Iterator<Item = &str>) -> ParseResult {
    let name_tok = tokens
        .next()
        .ok_or("reached end of line while looking for `name` in `setoption`")?;
    if name_tok != "name" {
        return Err(format!("expected `name` in `setoption`, got `{name_tok}`"));
    }

    let mut name = String::new();
    loop {
        let tok = match tokens.next() {
            Some(tok) => tok,
            None => return Ok(UciCommand::SetOption { name, value: None }),
        };
        if tok == "value" {
            break;
        }
        if !name.is_empty() {
            name += " ";
        }
        name += tok;
    }

    let mut value = String::new();
    for tok in tokens {
        if !value.is_empty() {
            value += " ";
        }
        value += tok;
    }
    Ok(UciCommand::SetOption { name, value: Some(value) })
}

/// Parse the token stream that follows `startpos`/`fen ...` into a starting
/// board, then walk any trailing `moves ...` tokens against it, advancing a
/// scratch copy one move at a time and skipping (with a logged warning) any
/// token that fails to parse as LAN or does not name a legal move.
fn parse_position(tokens: &mut dyn Iterator<Item = &str>) -> ParseResult {
    let start_fen = match tokens.next().ok_or("reached EOL while parsing `position`")? {
        "fen" => {
            let mut fen = String::new();
            loop {
                let tok = tokens.next().ok_or("reached EOL while parsing FEN")?;
                if tok == "moves" {
                    break;
                }
                if !fen.is_empty() {
                    fen += " ";
                }
                fen += tok;
            }
            Some(fen)
        }
        "startpos" => {
            if let Some(tok) = tokens.next() {
                if tok != "moves" {
                    return Err(format!("expected `moves` after `startpos`, got `{tok}`"));
                }
            }
            None
        }
        other => return Err(format!("expected `fen` or `startpos`, got `{other}`")),
    };

    let mut scratch = match &start_fen {
        Some(fen) => Board::load_fen(fen).map_err(|e| e.to_string())?,
        None => Board::default_board(),
    };

    let moves = collect_legal_moves(tokens, &mut scratch);
    Ok(UciCommand::Position { fen: start_fen, moves })
}

/// Replay every LAN token in `tokens` against `board`, applying each move
/// that parses and is legal, and skipping (with a `warn!` diagnostic) every
/// token that doesn't. `board` ends up at the position after the last
/// accepted move.
fn collect_legal_moves(tokens: &mut dyn Iterator<Item = &str>, board: &mut Board) -> Vec<Move> {
    let mut moves = Vec::new();
    for tok in tokens {
        match resolve_lan(tok, board) {
            Some(m) => {
                rookery_base::mutator::apply(board, m);
                moves.push(m);
            }
            None => warn!("skipping illegal or malformed move `{tok}` in `position ... moves`"),
        }
    }
    moves
}

/// Resolve a LAN token against `board`'s current position into a fully
/// typed, legal `Move`, or `None` if the token is malformed or names a move
/// that is not legal here.
fn resolve_lan(tok: &str, board: &Board) -> Option<Move> {
    let (from, to, promotion) = Move::parse_lan(tok).ok()?;
    let (piece, color) = board.piece_at(from)?;
    if color != board.side_to_move() {
        return None;
    }
    let candidate = Move::encode(from, to, piece, promotion, color);
    movegen::generate_legal_moves(board)
        .into_iter()
        .find(|&m| m == candidate)
}

fn parse_go(tokens: &mut dyn Iterator<Item = &str>, board: &Board) -> ParseResult {
    let mut opts = Vec::new();
    let mut peeks = tokens.peekable();
    while let Some(tok) = peeks.next() {
        opts.push(match tok {
            "searchmoves" => {
                let mut moves = Vec::new();
                while let Some(&next_tok) = peeks.peek() {
                    match resolve_lan(next_tok, board) {
                        Some(m) => {
                            moves.push(m);
                            peeks.next();
                        }
                        None => break,
                    }
                }
                GoOption::SearchMoves(moves)
            }
            "ponder" => GoOption::Ponder,
            "wtime" => GoOption::WhiteTime(parse_int(peeks.next())? as u32),
            "btime" => GoOption::BlackTime(parse_int(peeks.next())? as u32),
            "winc" => GoOption::WhiteInc(parse_int(peeks.next())? as u32),
            "binc" => GoOption::BlackInc(parse_int(peeks.next())? as u32),
            "movestogo" => GoOption::MovesToGo(parse_int(peeks.next())? as u8),
            "depth" => GoOption::Depth(parse_int(peeks.next())? as u8),
            "nodes" => GoOption::Nodes(parse_int(peeks.next())?),
            "mate" => GoOption::Mate(parse_int(peeks.next())? as u8),
            "movetime" => GoOption::MoveTime(parse_int(peeks.next())? as u32),
            "infinite" => GoOption::Infinite,
            other => return Err(format!("unrecognized `go` subcommand `{other}`")),
        });
    }
    Ok(UciCommand::Go(opts))
}

fn parse_int(tok: Option<&str>) -> Result<u64, String> {
    tok.ok_or_else(|| "reached EOL while parsing an integer argument".to_string())?
        .parse()
        .map_err(|e| format!("not a valid integer: {e}"))
}

/// The depth to search to, given a fully-parsed `go` subcommand list, per
/// the precedence rules in the external interface: an explicit `depth` or
/// `mate` wins, `infinite` means 255, `nodes` is approximated as
/// `floor(log2(n))`, and the default is the configured search depth.
#[must_use]
pub fn resolve_depth(opts: &[GoOption], default_depth: u8) -> u8 {
    for opt in opts {
        match opt {
            GoOption::Depth(d) | GoOption::Mate(d) => return *d,
            GoOption::Infinite => return 255,
            GoOption::Nodes(n) if *n > 0 => {
                return u8::try_from(63 - n.leading_zeros()).unwrap_or(255)
            }
            _ => {}
        }
    }
    default_depth
}

/// The promotion letter a piece code maps to in LAN text, or `None` for
/// pieces that cannot be a promotion target.
#[must_use]
pub fn is_promotable(piece: Piece) -> bool {
    Piece::PROMOTE_TYPES.contains(&piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_base::Square;

    #[test]
    fn parses_uci_and_isready() {
        let board = Board::default_board();
        assert_eq!(parse_line("uci", &board), Ok(UciCommand::Uci));
        assert_eq!(parse_line("isready", &board), Ok(UciCommand::IsReady));
    }

    #[test]
    fn parses_debug_on_and_off() {
        let board = Board::default_board();
        assert_eq!(parse_line("debug on", &board), Ok(UciCommand::Debug(true)));
        assert_eq!(parse_line("debug off", &board), Ok(UciCommand::Debug(false)));
        assert_eq!(parse_line("debug", &board), Ok(UciCommand::Debug(true)));
    }

    #[test]
    fn parses_setoption_with_and_without_value() {
        let board = Board::default_board();
        assert_eq!(
            parse_line("setoption name MyOption", &board),
            Ok(UciCommand::SetOption { name: "MyOption".into(), value: None })
        );
        assert_eq!(
            parse_line("setoption name my option value 4 or 5", &board),
            Ok(UciCommand::SetOption {
                name: "my option".into(),
                value: Some("4 or 5".into())
            })
        );
    }

    #[test]
    fn parses_startpos_with_moves() {
        let board = Board::default_board();
        let cmd = parse_line("position startpos moves e2e4 e7e5", &board).unwrap();
        match cmd {
            UciCommand::Position { fen, moves } => {
                assert_eq!(fen, None);
                assert_eq!(moves.len(), 2);
                assert_eq!(moves[0].from_square(), Square::E2);
                assert_eq!(moves[0].to_square(), Square::E4);
                assert_eq!(moves[1].from_square(), Square::E7);
                assert_eq!(moves[1].to_square(), Square::E5);
            }
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn skips_an_illegal_move_in_the_move_list() {
        let board = Board::default_board();
        // e2e5 is not a legal pawn move; e7e5 afterwards is legal since the
        // illegal token is skipped rather than desynchronizing the board.
        let cmd = parse_line("position startpos moves e2e5 e7e5", &board).unwrap();
        match cmd {
            UciCommand::Position { moves, .. } => {
                assert_eq!(moves.len(), 1);
                assert_eq!(moves[0].from_square(), Square::E7);
                assert_eq!(moves[0].to_square(), Square::E5);
            }
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn parses_fen_position() {
        let board = Board::default_board();
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let cmd = parse_line(&format!("position fen {fen} moves"), &board).unwrap();
        assert_eq!(cmd, UciCommand::Position { fen: Some(fen.into()), moves: Vec::new() });
    }

    #[test]
    fn parses_go_with_several_subcommands() {
        let board = Board::default_board();
        let cmd = parse_line("go depth 7 nodes 25", &board).unwrap();
        assert_eq!(cmd, UciCommand::Go(vec![GoOption::Depth(7), GoOption::Nodes(25)]));
    }

    #[test]
    fn go_searchmoves_does_not_swallow_trailing_options() {
        let board = Board::default_board();
        let cmd = parse_line("go searchmoves e2e4 infinite", &board).unwrap();
        match cmd {
            UciCommand::Go(opts) => {
                assert_eq!(opts.len(), 2);
                assert_eq!(opts[1], GoOption::Infinite);
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn resolve_depth_prefers_explicit_depth() {
        let opts = vec![GoOption::Depth(5), GoOption::Infinite];
        assert_eq!(resolve_depth(&opts, 10), 5);
    }

    #[test]
    fn resolve_depth_falls_back_to_default() {
        let opts = vec![GoOption::Ponder];
        assert_eq!(resolve_depth(&opts, 8), 8);
    }

    #[test]
    fn resolve_depth_approximates_nodes_by_log2() {
        let opts = vec![GoOption::Nodes(1024)];
        assert_eq!(resolve_depth(&opts, 10), 10);
    }

    #[test]
    fn resolve_depth_infinite_is_255() {
        let opts = vec![GoOption::Infinite];
        assert_eq!(resolve_depth(&opts, 10), 255);
    }
}
