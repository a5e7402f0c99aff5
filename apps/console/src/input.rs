//! Line-oriented operator commands read from stdin.

use client_core::grid::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use shared::domain::LatLng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Key { name: String, repeat: bool },
    Click { row: usize, col: usize },
    Zoom(f64),
    /// The point's type is asked for on the following line.
    Map(LatLng),
    Robots,
    Show,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command '{0}' (try key, click, zoom, map, robots, show, quit)")]
    UnknownCommand(String),
    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{argument}: '{value}' is not a number")]
    InvalidNumber { argument: &'static str, value: String },
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("cell ({row}, {col}) is outside the {size}x{size} grid")]
    OutOfGrid { row: usize, col: usize, size: usize },
}

/// Parses one operator line. Clicks are checked against `grid_size` so only
/// rendered cells reach the grid store.
pub fn parse_line(line: &str, grid_size: usize) -> Result<ConsoleCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ParseError::Empty);
    };

    let parsed = match command {
        "key" => {
            let name = required(words.next(), "key", "key name")?.to_string();
            let repeat = match words.next() {
                None => false,
                Some("repeat") => true,
                Some(other) => return Err(ParseError::UnexpectedArgument(other.to_string())),
            };
            ConsoleCommand::Key { name, repeat }
        }
        "click" => {
            let row = number(required(words.next(), "click", "row")?, "row")?;
            let col = number(required(words.next(), "click", "col")?, "col")?;
            if row >= grid_size || col >= grid_size {
                return Err(ParseError::OutOfGrid {
                    row,
                    col,
                    size: grid_size,
                });
            }
            ConsoleCommand::Click { row, col }
        }
        "zoom" => match required(words.next(), "zoom", "in, out or a factor")? {
            "in" => ConsoleCommand::Zoom(ZOOM_IN_FACTOR),
            "out" => ConsoleCommand::Zoom(ZOOM_OUT_FACTOR),
            factor => ConsoleCommand::Zoom(number(factor, "factor")?),
        },
        "map" => ConsoleCommand::Map(LatLng::new(
            number(required(words.next(), "map", "lat")?, "lat")?,
            number(required(words.next(), "map", "lng")?, "lng")?,
        )),
        "robots" => ConsoleCommand::Robots,
        "show" => ConsoleCommand::Show,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.to_string())),
        None => Ok(parsed),
    }
}

fn required<'a>(
    word: Option<&'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    word.ok_or(ParseError::MissingArgument { command, argument })
}

fn number<T: std::str::FromStr>(value: &str, argument: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        argument,
        value: value.to_string(),
    })
}
