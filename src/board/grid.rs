use std::str::FromStr;

use crate::board::BoardError;
use crate::coords::{Direction, GridCoord};
use crate::types::{Person, Room};

/// Layout of the bundled board: 9 rooms, 6 start squares, two corner passages.
pub const CLASSIC_LAYOUT: &str = include_str!("../../maps/classic.csv");

/// Decoded meaning of one grid cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCode {
    /// `""`, outside the playable area.
    Empty,
    /// `"0"`, wall or room interior.
    Wall,
    /// `"1"`, an ordinary square.
    Square,
    /// `"s" + short id`, a start square for that person.
    Start(Person),
    /// `"d" + direction + ":" + room`, an entrance facing `direction`.
    Door { direction: Direction, room: Room },
}

impl CellCode {
    pub fn is_walkable_square(self) -> bool {
        matches!(self, CellCode::Square | CellCode::Start(_))
    }

    pub fn parse(code: &str, at: GridCoord) -> Result<CellCode, BoardError> {
        let unknown = || BoardError::UnknownCellCode {
            row: at.row,
            col: at.col,
            code: code.to_string(),
        };
        match code {
            "" => Ok(CellCode::Empty),
            "0" => Ok(CellCode::Wall),
            "1" => Ok(CellCode::Square),
            _ if code.starts_with('d') => {
                let mut chars = code.chars().skip(1);
                let direction = chars.next().and_then(Direction::from_code).ok_or_else(unknown)?;
                if chars.next() != Some(':') {
                    return Err(unknown());
                }
                let name = &code[3..];
                let room =
                    Room::from_str(name).map_err(|_| BoardError::UnknownRoom(name.to_string()))?;
                Ok(CellCode::Door { direction, room })
            }
            _ if code.starts_with('s') => Person::from_short_id(&code[1..])
                .map(CellCode::Start)
                .ok_or_else(|| BoardError::UnknownStart(code.to_string())),
            _ => Err(unknown()),
        }
    }
}

/// Splits comma separated rows into trimmed cell codes. Blank lines are skipped.
pub fn parse_grid(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

/// Decodes a raw grid, checking that it is non-empty and rectangular.
pub fn decode_grid<S: AsRef<str>>(grid: &[Vec<S>]) -> Result<Vec<Vec<CellCode>>, BoardError> {
    let width = grid.first().map(Vec::len).ok_or(BoardError::EmptyGrid)?;
    if width == 0 {
        return Err(BoardError::EmptyGrid);
    }
    grid.iter()
        .enumerate()
        .map(|(row, cells)| {
            if cells.len() != width {
                return Err(BoardError::RaggedGrid {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
            cells
                .iter()
                .enumerate()
                .map(|(col, code)| CellCode::parse(code.as_ref(), GridCoord::new(row, col)))
                .collect()
        })
        .collect()
}
