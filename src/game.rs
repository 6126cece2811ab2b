use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::board::{Board, Position};
use crate::capture::resolve_captures;
use crate::error::{GameError, IllegalMoveReason, RegistryError};
use crate::movegen::{LegalMoves, legal_destinations};
use crate::pieces::{Piece, PieceKind, PieceRegistry, Side};
use crate::snapshot::BoardSnapshot;

/// Half-moves after which an undecided game is drawn
pub const DEFAULT_MOVE_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    /// The king reached a corner.
    DefendersWin,
    /// The king was surrounded.
    AttackersWin,
    /// The move limit ran out.
    Draw,
}

impl GameResult {
    pub fn is_terminal(&self) -> bool {
        *self != GameResult::InProgress
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::DefendersWin => Some(Side::Defenders),
            GameResult::AttackersWin => Some(Side::Attackers),
            GameResult::InProgress | GameResult::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::InProgress => write!(f, "In progress"),
            GameResult::DefendersWin => write!(f, "King escaped! Defenders win!"),
            GameResult::AttackersWin => write!(f, "King captured! Attackers win!"),
            GameResult::Draw => write!(f, "Draw by move limit"),
        }
    }
}

/// What one applied move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub piece: PieceKind,
    pub captured: Vec<Piece>,
    pub result: GameResult,
}

/// A single game: static board, live pieces, turn and result.
///
/// Instances share nothing; clone one to probe candidate moves.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    registry: PieceRegistry,
    current_player: Side,
    move_count: usize,
    move_limit: usize,
    result: GameResult,
}

impl GameState {
    /// Standard opening position, attackers to move.
    pub fn new() -> Self {
        GameState {
            board: Board::standard(),
            registry: PieceRegistry::standard(),
            current_player: Side::Attackers,
            move_count: 0,
            move_limit: DEFAULT_MOVE_LIMIT,
            result: GameResult::InProgress,
        }
    }

    /// Custom position. Exactly one king must be present.
    pub fn from_registry(registry: PieceRegistry, to_move: Side) -> Result<Self, GameError> {
        if registry.king().is_none() {
            return Err(RegistryError::MissingKing.into());
        }
        Ok(GameState {
            board: Board::standard(),
            registry,
            current_player: to_move,
            move_count: 0,
            move_limit: DEFAULT_MOVE_LIMIT,
            result: GameResult::InProgress,
        })
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot, to_move: Side) -> Result<Self, GameError> {
        let mut registry = PieceRegistry::empty();
        for (pos, kind) in snapshot.pieces() {
            registry.place(kind, pos.row, pos.col)?;
        }
        Self::from_registry(registry, to_move)
    }

    pub fn with_move_limit(mut self, move_limit: usize) -> Self {
        self.move_limit = move_limit;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn current_player(&self) -> Side {
        self.current_player
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_game_over(&self) -> bool {
        self.result.is_terminal()
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn move_limit(&self) -> usize {
        self.move_limit
    }

    pub fn piece_at(&self, pos: Position) -> Option<PieceKind> {
        self.registry.occupant_at(pos).map(|p| p.kind)
    }

    pub fn king_position(&self) -> Option<Position> {
        self.registry.king().map(|k| k.position)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_registry(&self.registry)
    }

    /// Destinations for the piece on `origin`, which must belong to the side
    /// to move. Once the game is over there is no side to move.
    pub fn legal_destinations(&self, origin: Position) -> Result<BTreeSet<Position>, GameError> {
        if self.is_game_over() {
            return Err(GameError::MoveAfterTerminal);
        }
        let piece = self.own_piece_at(origin, None)?;
        Ok(legal_destinations(&self.board, &self.registry, piece))
    }

    /// Every legal move of the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> LegalMoves {
        if self.is_game_over() {
            return LegalMoves::none(self.current_player);
        }
        LegalMoves::generate(&self.board, &self.registry, self.current_player)
    }

    pub fn make_move(&mut self, mv: Move) -> Result<MoveRecord, GameError> {
        self.apply_move(mv.from, mv.to)
    }

    /// Validate and apply one half-move. A rejected move leaves the state
    /// untouched.
    pub fn apply_move(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Result<MoveRecord, GameError> {
        if self.is_game_over() {
            return Err(GameError::MoveAfterTerminal);
        }
        check_coordinate(destination)?;

        let mv = Move::new(origin, destination);
        let piece = *self.own_piece_at(origin, Some(mv))?;
        if !legal_destinations(&self.board, &self.registry, &piece).contains(&destination) {
            return Err(GameError::IllegalMove {
                mv,
                reason: IllegalMoveReason::UnreachableDestination,
            });
        }

        self.registry.relocate(piece.id, destination)?;
        debug!(side = ?self.current_player, kind = ?piece.kind, %mv, "move applied");

        if piece.is_king() && self.board.is_corner(destination) {
            self.finish(GameResult::DefendersWin);
            return Ok(MoveRecord {
                mv,
                piece: piece.kind,
                captured: Vec::new(),
                result: self.result,
            });
        }

        let captures = resolve_captures(
            &self.board,
            &mut self.registry,
            destination,
            self.current_player,
        )?;
        if captures.king_captured {
            self.finish(GameResult::AttackersWin);
        } else {
            self.current_player = self.current_player.opponent();
            self.move_count += 1;
            if self.move_count >= self.move_limit {
                self.finish(GameResult::Draw);
            }
        }

        Ok(MoveRecord {
            mv,
            piece: piece.kind,
            captured: captures.pieces,
            result: self.result,
        })
    }

    fn own_piece_at(&self, origin: Position, mv: Option<Move>) -> Result<&Piece, GameError> {
        check_coordinate(origin)?;
        let illegal = |reason| GameError::IllegalMove {
            mv: mv.unwrap_or(Move::new(origin, origin)),
            reason,
        };
        let piece = self
            .registry
            .occupant_at(origin)
            .ok_or_else(|| illegal(IllegalMoveReason::EmptyOrigin))?;
        if piece.side() != self.current_player {
            return Err(illegal(IllegalMoveReason::WrongSide));
        }
        Ok(piece)
    }

    fn finish(&mut self, result: GameResult) {
        self.result = result;
        info!(%result, moves = self.move_count, "game over");
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        self.snapshot().to_string()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn check_coordinate(pos: Position) -> Result<(), GameError> {
    if pos.is_on_board() {
        Ok(())
    } else {
        Err(GameError::InvalidCoordinate {
            row: pos.row,
            col: pos.col,
        })
    }
}
