use std::collections::{BTreeMap, BTreeSet};

use crate::board::{Board, Direction, Position};
use crate::game::Move;
use crate::pieces::{Piece, PieceKind, PieceRegistry, Side};

/// Tiles a piece can slide to: any distance orthogonally, stopping before
/// the first occupied tile or the edge. Only the king may stop on a corner
/// or the throne; other pieces may still slide across an empty throne.
pub fn legal_destinations(
    board: &Board,
    registry: &PieceRegistry,
    piece: &Piece,
) -> BTreeSet<Position> {
    let mut destinations = BTreeSet::new();

    for direction in Direction::ALL {
        let mut current = piece.position;
        while let Some(next) = current.step(direction) {
            if registry.occupant_at(next).is_some() {
                break;
            }
            destinations.insert(next);
            current = next;
        }
    }

    if piece.kind != PieceKind::King {
        destinations.retain(|&pos| !board.is_hostile_special(pos));
    }

    destinations
}

/// Every legal move of one side, grouped by origin tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoves {
    side: Side,
    by_origin: BTreeMap<Position, BTreeSet<Position>>,
}

impl LegalMoves {
    /// Pieces without any destination are left out.
    pub fn generate(board: &Board, registry: &PieceRegistry, side: Side) -> Self {
        let by_origin = registry
            .pieces_of(side)
            .map(|piece| (piece.position, legal_destinations(board, registry, piece)))
            .filter(|(_, destinations)| !destinations.is_empty())
            .collect();
        LegalMoves { side, by_origin }
    }

    pub fn none(side: Side) -> Self {
        LegalMoves {
            side,
            by_origin: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn origins(&self) -> impl Iterator<Item = Position> + '_ {
        self.by_origin.keys().copied()
    }

    pub fn destinations(&self, origin: Position) -> Option<&BTreeSet<Position>> {
        self.by_origin.get(&origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &BTreeSet<Position>)> {
        self.by_origin.iter().map(|(origin, dests)| (*origin, dests))
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.by_origin
            .iter()
            .flat_map(|(&from, dests)| dests.iter().map(move |&to| Move::new(from, to)))
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.by_origin
            .get(&mv.from)
            .is_some_and(|dests| dests.contains(&mv.to))
    }

    /// Total number of moves, not pieces.
    pub fn len(&self) -> usize {
        self.by_origin.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}
