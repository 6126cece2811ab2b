use serde::{Deserialize, Serialize};

use crate::board::{BOARD_SIZE, Position};
use crate::error::RegistryError;

/// Standard 11x11 starting formation: `A` attacker, `D` defender, `K` king.
pub const STARTING_LAYOUT: [&str; BOARD_SIZE] = [
    "...AAAAA...",
    ".....A.....",
    "...........",
    "A....D....A",
    "A...DDD...A",
    "AA.DDKDD.AA",
    "A...DDD...A",
    "A....D....A",
    "...........",
    ".....A.....",
    "...AAAAA...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Attacker,
    Defender,
    King,
}

impl PieceKind {
    pub fn side(&self) -> Side {
        match self {
            PieceKind::Attacker => Side::Attackers,
            PieceKind::Defender | PieceKind::King => Side::Defenders,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            PieceKind::Attacker => 'A',
            PieceKind::Defender => 'D',
            PieceKind::King => 'K',
        }
    }

    pub fn from_symbol(ch: char) -> Option<PieceKind> {
        match ch {
            'A' => Some(PieceKind::Attacker),
            'D' => Some(PieceKind::Defender),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attackers,
    Defenders,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attackers => Side::Defenders,
            Side::Defenders => Side::Attackers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub position: Position,
}

impl Piece {
    pub fn side(&self) -> Side {
        self.kind.side()
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }
}

/// Owns every live piece. Pieces enter during setup and leave only by capture.
///
/// Slots are never reused, so a `PieceId` stays unique for the lifetime of
/// the registry. The occupancy grid mirrors the slots for O(1) lookup.
#[derive(Debug, Clone)]
pub struct PieceRegistry {
    slots: Vec<Option<Piece>>,
    grid: [[Option<PieceId>; BOARD_SIZE]; BOARD_SIZE],
    king: Option<PieceId>,
}

impl PieceRegistry {
    pub fn empty() -> Self {
        PieceRegistry {
            slots: Vec::new(),
            grid: [[None; BOARD_SIZE]; BOARD_SIZE],
            king: None,
        }
    }

    /// Registry populated with the standard formation.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (row, line) in STARTING_LAYOUT.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if let Some(kind) = PieceKind::from_symbol(ch) {
                    registry.insert(kind, Position::new(row, col));
                }
            }
        }
        registry
    }

    pub fn place(
        &mut self,
        kind: PieceKind,
        row: usize,
        col: usize,
    ) -> Result<PieceId, RegistryError> {
        let pos = Position::new(row, col);
        if !pos.is_on_board() {
            return Err(RegistryError::OffBoard(pos));
        }
        if self.grid[row][col].is_some() {
            return Err(RegistryError::Occupied(pos));
        }
        if kind == PieceKind::King && self.king.is_some() {
            return Err(RegistryError::SecondKing);
        }
        Ok(self.insert(kind, pos))
    }

    fn insert(&mut self, kind: PieceKind, position: Position) -> PieceId {
        let id = PieceId(self.slots.len());
        self.slots.push(Some(Piece { id, kind, position }));
        self.grid[position.row][position.col] = Some(id);
        if kind == PieceKind::King {
            self.king = Some(id);
        }
        id
    }

    pub fn occupant_at(&self, pos: Position) -> Option<&Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.grid[pos.row][pos.col].and_then(|id| self.get(id))
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn remove(&mut self, id: PieceId) -> Result<Piece, RegistryError> {
        let piece = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(RegistryError::UnknownPiece(id))?;
        self.grid[piece.position.row][piece.position.col] = None;
        if piece.is_king() {
            self.king = None;
        }
        Ok(piece)
    }

    /// Relocate a live piece. The destination must be empty and on the board.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Position) -> Result<(), RegistryError> {
        if !to.is_on_board() {
            return Err(RegistryError::OffBoard(to));
        }
        if self.grid[to.row][to.col].is_some() {
            return Err(RegistryError::Occupied(to));
        }
        let piece = self
            .slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RegistryError::UnknownPiece(id))?;
        let from = piece.position;
        piece.position = to;
        self.grid[from.row][from.col] = None;
        self.grid[to.row][to.col] = Some(id);
        Ok(())
    }

    /// Live pieces of a side; the king counts as a defender.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.iter().filter(move |p| p.side() == side)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.slots.iter().flatten()
    }

    pub fn king(&self) -> Option<&Piece> {
        self.king.and_then(|id| self.get(id))
    }

    pub fn count(&self, kind: PieceKind) -> usize {
        self.iter().filter(|p| p.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PieceRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
