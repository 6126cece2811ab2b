use tracing::debug;

use crate::board::{Board, Direction, Position};
use crate::error::RegistryError;
use crate::pieces::{Piece, PieceKind, PieceRegistry, Side};

/// Pieces removed by a single move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    pub pieces: Vec<Piece>,
    pub king_captured: bool,
}

impl Captures {
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// Resolve captures caused by `mover` landing on `anchor`.
///
/// Each direction is judged against the board as it stood before any
/// removal; all captured pieces are then removed together. The king is
/// never taken by a two-sided sandwich, only by [`king_surrounded`].
pub fn resolve_captures(
    board: &Board,
    registry: &mut PieceRegistry,
    anchor: Position,
    mover: Side,
) -> Result<Captures, RegistryError> {
    let mut captured = Vec::new();
    let mut king_captured = false;
    let king_tile = registry.king().map(|k| k.position);

    for direction in Direction::ALL {
        let Some(adj) = anchor.step(direction) else {
            continue;
        };
        let Some(target) = registry.occupant_at(adj) else {
            continue;
        };
        if target.side() == mover {
            continue;
        }

        if target.is_king() {
            if king_surrounded(board, registry, adj) {
                king_captured = true;
                captured.push(target.id);
            }
            continue;
        }

        let Some(beyond) = adj.step(direction) else {
            continue;
        };
        let anvil = match registry.occupant_at(beyond) {
            Some(piece) => piece.side() == mover,
            None => false,
        };
        let hostile_square = board.is_hostile_special(beyond) && Some(beyond) != king_tile;
        if anvil || hostile_square {
            captured.push(target.id);
        }
    }

    let mut pieces = Vec::with_capacity(captured.len());
    for id in captured {
        let piece = registry.remove(id)?;
        debug!(kind = ?piece.kind, at = %piece.position, "captured");
        pieces.push(piece);
    }

    Ok(Captures {
        pieces,
        king_captured,
    })
}

/// Whether every on-board neighbour of the king that is not a corner or the
/// throne holds an attacker. Corners and the throne count as hostile.
pub fn king_surrounded(board: &Board, registry: &PieceRegistry, king: Position) -> bool {
    king.neighbors()
        .filter(|&pos| !board.is_hostile_special(pos))
        .all(|pos| {
            registry
                .occupant_at(pos)
                .is_some_and(|p| p.kind == PieceKind::Attacker)
        })
}
