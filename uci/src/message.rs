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

//! Formatting of the lines the engine sends back to the GUI over UCI.

use std::{fmt, time::Duration};

use rookery_base::{Eval, Move};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The set of messages the engine can send to the GUI.
pub enum UciMessage<'a> {
    /// Identify the engine. Sent once, right after `uci`.
    Id { name: Option<&'a str>, author: Option<&'a str> },
    /// Sent after `id` and every `option`, to mark the end of UCI handshake.
    UciOk,
    /// Sent once the engine has caught up with every command given so far.
    ReadyOk,
    /// Advertise a single configurable option to the GUI.
    Option { name: &'a str, opt: OptionType<'a> },
    /// The result of a completed (or stopped) search.
    BestMove { m: Move, ponder: Option<Move> },
    /// A line of `info ...` diagnostics about the current search.
    Info(&'a [EngineInfo<'a>]),
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single piece of information about the search's progress. Limited to
/// what a root-move-parallel, table-free search can actually report: there
/// is no principal variation, node count, or hash table to speak of.
pub enum EngineInfo<'a> {
    /// The depth just completed.
    Depth(u8),
    /// Wall-clock time spent searching so far.
    Time(Duration),
    /// The current evaluation of the position.
    Score { eval: Eval, is_lower_bound: bool, is_upper_bound: bool },
    /// The root move currently being searched.
    CurrMove(Move),
    /// A free-form diagnostic string. Must not contain a newline.
    String(&'a str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The kind of widget the GUI should draw for a `setoption`-configurable
/// option, per the `option` UCI message.
pub enum OptionType<'a> {
    /// An integer spin box; the field values are the default, min, and max.
    Spin { default: i64, min: i64, max: i64 },
    /// A free-text field.
    String(Option<&'a str>),
    /// A checkbox.
    Check(Option<bool>),
    /// A selectable set of string choices.
    Combo { default: Option<&'a str>, vars: &'a [&'a str] },
    /// A button with no value, just an action.
    Button,
}

impl<'a> fmt::Display for UciMessage<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciMessage::Id { name, author } => {
                write!(f, "id")?;
                if let Some(n) = name {
                    write!(f, " name {n}")?;
                }
                if let Some(a) = author {
                    if name.is_some() {
                        write!(f, "\nid")?;
                    }
                    write!(f, " author {a}")?;
                }
            }
            UciMessage::UciOk => write!(f, "uciok")?,
            UciMessage::ReadyOk => write!(f, "readyok")?,
            UciMessage::Option { name, opt } => write_option(f, name, opt)?,
            UciMessage::BestMove { m, ponder } => {
                write!(f, "bestmove {}", m.to_lan())?;
                if let Some(pondermove) = ponder {
                    write!(f, " ponder {}", pondermove.to_lan())?;
                }
            }
            UciMessage::Info(infos) => write_info(f, infos)?,
        }
        Ok(())
    }
}

fn write_option(f: &mut fmt::Formatter, name: &str, opt: &OptionType) -> fmt::Result {
    write!(f, "option name {name} ")?;
    match opt {
        OptionType::Spin { default, min, max } => {
            write!(f, "type spin default {default} min {min} max {max}")?;
        }
        OptionType::String(s) => {
            write!(f, "type string")?;
            if let Some(st) = s {
                write!(f, " default {st}")?;
            }
        }
        OptionType::Check(default) => {
            write!(f, "type check")?;
            if let Some(d) = default {
                write!(f, " default {d}")?;
            }
        }
        OptionType::Combo { default, vars } => {
            write!(f, "type combo")?;
            if let Some(d) = default {
                write!(f, " default {d}")?;
            }
            for var in vars.iter() {
                write!(f, " var {var}")?;
            }
        }
        OptionType::Button => write!(f, "type button")?,
    }
    Ok(())
}

fn write_info(f: &mut fmt::Formatter, infos: &[EngineInfo]) -> fmt::Result {
    let mut new_line = false;
    write!(f, "info")?;
    for info in infos {
        if new_line {
            write!(f, "\ninfo")?;
            new_line = false;
        }
        match info {
            EngineInfo::Depth(depth) => write!(f, " depth {depth}")?,
            EngineInfo::Time(t) => write!(f, " time {}", t.as_millis())?,
            EngineInfo::Score { eval, is_lower_bound, is_upper_bound } => {
                write!(f, " score ")?;
                match eval.moves_to_mate() {
                    Some(plies) if *eval > Eval::DRAW => write!(f, "mate {plies}")?,
                    Some(plies) => write!(f, "mate -{plies}")?,
                    None => write!(f, "cp {}", eval.centipawn_val())?,
                }
                if *is_lower_bound && !is_upper_bound {
                    write!(f, " lowerbound")?;
                } else if *is_upper_bound {
                    write!(f, " upperbound")?;
                }
            }
            EngineInfo::CurrMove(m) => write!(f, " currmove {}", m.to_lan())?,
            EngineInfo::String(s) => {
                write!(f, " string {s}")?;
                new_line = true;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_base::{Color, Piece, Square};

    #[test]
    fn formats_id_on_two_lines() {
        assert_eq!(
            format!("{}", UciMessage::Id { name: Some("Rookery"), author: Some("The Rookery Authors") }),
            "id name Rookery\nid author The Rookery Authors"
        );
    }

    #[test]
    fn formats_bestmove_without_ponder() {
        let m = Move::encode(Square::E2, Square::E4, Piece::Pawn, None, Color::White);
        assert_eq!(format!("{}", UciMessage::BestMove { m, ponder: None }), "bestmove e2e4");
    }

    #[test]
    fn formats_option_check() {
        assert_eq!(
            format!("{}", UciMessage::Option { name: "Threads", opt: OptionType::Check(Some(true)) }),
            "option name Threads type check default true"
        );
    }

    #[test]
    fn formats_option_spin() {
        assert_eq!(
            format!(
                "{}",
                UciMessage::Option {
                    name: "Threads",
                    opt: OptionType::Spin { default: 4, min: 1, max: 512 }
                }
            ),
            "option name Threads type spin default 4 min 1 max 512"
        );
    }

    #[test]
    fn formats_info_with_score_and_currmove() {
        let m = Move::encode(Square::D3, Square::E4, Piece::Bishop, None, Color::White);
        let line = format!(
            "{}",
            UciMessage::Info(&[
                EngineInfo::Depth(4),
                EngineInfo::Score { eval: Eval::pawns(1.5), is_lower_bound: false, is_upper_bound: false },
                EngineInfo::CurrMove(m),
            ])
        );
        assert_eq!(line, "info depth 4 score cp 150 currmove d3e4");
    }

    #[test]
    fn formats_mate_score() {
        let line = format!(
            "{}",
            UciMessage::Info(&[EngineInfo::Score {
                eval: Eval::mate_in(3),
                is_lower_bound: false,
                is_upper_bound: false,
            }])
        );
        assert_eq!(line, "info score mate 3");
    }
}
