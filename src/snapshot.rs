//! Derived view of the board shared with renderers and move-selection
//! policies. The registry stays the source of truth; a snapshot is rebuilt
//! on demand and never written back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board::{BOARD_SIZE, Board, Position};
use crate::error::SnapshotError;
use crate::pieces::{PieceKind, PieceRegistry};

/// One cell of a snapshot.
///
/// Numeric encoding: attacker `1`, defender `-1`, king `-2`, empty `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Cell {
    Empty,
    Attacker,
    Defender,
    King,
}

impl Cell {
    pub fn code(self) -> i8 {
        match self {
            Cell::Empty => 0,
            Cell::Attacker => 1,
            Cell::Defender => -1,
            Cell::King => -2,
        }
    }

    pub fn piece(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Attacker => Some(PieceKind::Attacker),
            Cell::Defender => Some(PieceKind::Defender),
            Cell::King => Some(PieceKind::King),
        }
    }
}

impl From<Option<PieceKind>> for Cell {
    fn from(kind: Option<PieceKind>) -> Self {
        match kind {
            None => Cell::Empty,
            Some(PieceKind::Attacker) => Cell::Attacker,
            Some(PieceKind::Defender) => Cell::Defender,
            Some(PieceKind::King) => Cell::King,
        }
    }
}

impl From<Cell> for i8 {
    fn from(cell: Cell) -> i8 {
        cell.code()
    }
}

impl TryFrom<i8> for Cell {
    type Error = SnapshotError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Attacker),
            -1 => Ok(Cell::Defender),
            -2 => Ok(Cell::King),
            other => Err(SnapshotError::UnknownCode(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        BoardSnapshot {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn from_registry(registry: &PieceRegistry) -> Self {
        let mut snapshot = Self::empty();
        for piece in registry.iter() {
            snapshot.cells[piece.position.row][piece.position.col] = Cell::from(Some(piece.kind));
        }
        snapshot
    }

    pub fn get(&self, pos: Position) -> Cell {
        if pos.is_on_board() {
            self.cells[pos.row][pos.col]
        } else {
            Cell::Empty
        }
    }

    /// Numeric grid, row-major.
    pub fn to_codes(&self) -> [[i8; BOARD_SIZE]; BOARD_SIZE] {
        self.cells.map(|row| row.map(Cell::code))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    /// Occupied tiles in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, PieceKind)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.piece().map(|kind| (Position::new(row, col), kind))
            })
        })
    }

    pub fn king_position(&self) -> Option<Position> {
        self.pieces()
            .find(|(_, kind)| *kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }
}

/// Parses eleven rows of `A`, `D`, `K` and `.`; `X` and `T` are accepted
/// for an empty corner or throne. Blank lines and spaces are ignored.
impl FromStr for BoardSnapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(SnapshotError::RowCount(rows.len()));
        }

        let mut snapshot = Self::empty();
        for (row, chars) in rows.iter().enumerate() {
            if chars.len() != BOARD_SIZE {
                return Err(SnapshotError::RowLength {
                    row,
                    len: chars.len(),
                });
            }
            for (col, &ch) in chars.iter().enumerate() {
                snapshot.cells[row][col] = match ch {
                    '.' | 'X' | 'T' => Cell::Empty,
                    _ => match PieceKind::from_symbol(ch) {
                        Some(kind) => Cell::from(Some(kind)),
                        None => return Err(SnapshotError::UnknownSymbol { ch, row, col }),
                    },
                };
            }
        }
        Ok(snapshot)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = Board::standard();
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE {
            write!(f, "{:2} ", col)?;
        }
        writeln!(f)?;

        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{:2} ", row)?;
            for (col, cell) in cells.iter().enumerate() {
                let pos = Position::new(row, col);
                let c = match cell.piece() {
                    Some(kind) => kind.symbol(),
                    None if board.is_corner(pos) => 'X',
                    None if board.is_throne(pos) => 'T',
                    None => '.',
                };
                write!(f, " {} ", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
