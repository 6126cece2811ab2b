use crate::board::Position;
use crate::game::Move;
use crate::pieces::PieceId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: IllegalMoveReason },
    #[error("Coordinate ({row}, {col}) is off the board")]
    InvalidCoordinate { row: usize, col: usize },
    #[error("Game already over")]
    MoveAfterTerminal,
    #[error("Piece registry: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveReason {
    #[error("no piece on the origin tile")]
    EmptyOrigin,
    #[error("piece belongs to the side not on move")]
    WrongSide,
    #[error("destination is not reachable")]
    UnreachableDestination,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tile {0} is already occupied")]
    Occupied(Position),
    #[error("Tile {0} is off the board")]
    OffBoard(Position),
    #[error("A king is already on the board")]
    SecondKing,
    #[error("No king on the board")]
    MissingKing,
    #[error("Piece {0:?} is not on the board")]
    UnknownPiece(PieceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Expected 11 rows, found {0}")]
    RowCount(usize),
    #[error("Row {row} has {len} cells, expected 11")]
    RowLength { row: usize, len: usize },
    #[error("Unknown cell '{ch}' at ({row}, {col})")]
    UnknownSymbol { ch: char, row: usize, col: usize },
    #[error("Unknown cell code {0}")]
    UnknownCode(i8),
}
