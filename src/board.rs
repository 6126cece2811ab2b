use serde::{Deserialize, Serialize};
use std::fmt;

/// Board size of classical Hnefatafl
pub const BOARD_SIZE: usize = 11;

/// Row and column of the throne
pub const THRONE: Position = Position::new(BOARD_SIZE / 2, BOARD_SIZE / 2);

/// The four escape squares
pub const CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(0, BOARD_SIZE - 1),
    Position::new(BOARD_SIZE - 1, 0),
    Position::new(BOARD_SIZE - 1, BOARD_SIZE - 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Checked constructor for coordinates coming from outside the engine.
    pub fn try_new(row: usize, col: usize) -> Option<Self> {
        let pos = Position::new(row, col);
        pos.is_on_board().then_some(pos)
    }

    pub fn is_on_board(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// The adjacent tile in `direction`, or `None` past the edge.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Position::try_new(row, col)
    }

    /// Orthogonal neighbours that lie on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Direction::ALL.into_iter().filter_map(move |d| self.step(d))
    }

    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Normal,
    Corner,
    Throne,
}

/// Static tile layout. Built once per game and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    tiles: [[TileKind; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn standard() -> Self {
        let mut tiles = [[TileKind::Normal; BOARD_SIZE]; BOARD_SIZE];
        for corner in CORNERS {
            tiles[corner.row][corner.col] = TileKind::Corner;
        }
        tiles[THRONE.row][THRONE.col] = TileKind::Throne;
        Board { tiles }
    }

    /// Panics on off-board coordinates; callers validate first.
    pub fn classify(&self, pos: Position) -> TileKind {
        self.tiles[pos.row][pos.col]
    }

    pub fn is_corner(&self, pos: Position) -> bool {
        self.classify(pos) == TileKind::Corner
    }

    pub fn is_throne(&self, pos: Position) -> bool {
        self.classify(pos) == TileKind::Throne
    }

    /// Corners and throne: only the king may stop here, and they act as
    /// hostile territory in captures.
    pub fn is_hostile_special(&self, pos: Position) -> bool {
        self.classify(pos) != TileKind::Normal
    }

    pub fn corners(&self) -> [Position; 4] {
        CORNERS
    }

    pub fn throne(&self) -> Position {
        THRONE
    }

    /// Manhattan distance from `pos` to the closest corner.
    pub fn corner_distance(&self, pos: Position) -> usize {
        self.corners()
            .iter()
            .map(|c| c.row.abs_diff(pos.row) + c.col.abs_diff(pos.col))
            .min()
            .unwrap_or(0)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_positions() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|r| (0..BOARD_SIZE).map(move |c| Position::new(r, c)))
    }

    #[test]
    fn test_exactly_four_corners_and_one_throne() {
        let board = Board::standard();
        let corners: Vec<_> = all_positions().filter(|&p| board.is_corner(p)).collect();
        let thrones = all_positions().filter(|&p| board.is_throne(p)).count();
        assert_eq!(corners, board.corners());
        assert_eq!(thrones, 1);
        assert_eq!(board.throne(), Position::new(5, 5));
    }

    #[test]
    fn test_corner_identification() {
        let board = Board::standard();
        assert!(board.is_corner(Position::new(0, 0)));
        assert!(board.is_corner(Position::new(0, 10)));
        assert!(board.is_corner(Position::new(10, 0)));
        assert!(board.is_corner(Position::new(10, 10)));
        assert!(!board.is_corner(Position::new(0, 3)));
        assert!(!board.is_corner(Position::new(5, 5)));
    }

    #[test]
    fn test_hostile_special_set() {
        let board = Board::standard();
        assert!(board.is_hostile_special(Position::new(5, 5)));
        assert!(board.is_hostile_special(Position::new(10, 10)));
        assert!(!board.is_hostile_special(Position::new(4, 5)));
        assert_eq!(board.classify(Position::new(4, 5)), TileKind::Normal);
    }

    #[test]
    fn test_step_stops_at_edge() {
        let origin = Position::new(0, 10);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Right), None);
        assert_eq!(origin.step(Direction::Down), Some(Position::new(1, 10)));
        assert_eq!(origin.step(Direction::Left), Some(Position::new(0, 9)));
    }

    #[test]
    fn test_neighbors_are_in_board() {
        assert_eq!(Position::new(1, 0).neighbors().count(), 3);
        assert_eq!(Position::new(0, 0).neighbors().count(), 2);
        assert_eq!(Position::new(5, 5).neighbors().count(), 4);
    }

    #[test]
    fn test_corner_distance() {
        let board = Board::standard();
        assert_eq!(board.corner_distance(Position::new(5, 5)), 10);
        assert_eq!(board.corner_distance(Position::new(1, 0)), 1);
        assert_eq!(board.corner_distance(Position::new(9, 8)), 3);
    }
}
