use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{GameResult, GameState, Move};
use crate::movegen::LegalMoves;
use crate::pieces::{PieceKind, Side};
use crate::snapshot::BoardSnapshot;

/// Trait that all move-selection policies implement.
///
/// A policy only ever sees a snapshot and the legal moves of the side to
/// move; it never touches the live game.
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Pick one of `legal_moves`, or `None` to give up.
    fn choose_move(
        &mut self,
        snapshot: &BoardSnapshot,
        legal_moves: &LegalMoves,
        time_limit: Duration,
    ) -> Option<Move>;

    /// Notified when the game starts
    fn game_start(&mut self, _side: Side) {}

    /// Notified when a move is made (by either player)
    fn notify_move(&mut self, _mv: Move) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Policies selectable from configuration. `Human` means no policy: the
/// side is played from the web front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Random,
    Heuristic,
    Human,
}

impl BotKind {
    /// `None` for [`BotKind::Human`].
    pub fn build(self, name: impl Into<String>, seed: Option<u64>) -> Option<Box<dyn Bot>> {
        match self {
            BotKind::Random => Some(Box::new(RandomBot::new(name.into(), seed))),
            BotKind::Heuristic => Some(Box::new(HeuristicBot::new(name.into()))),
            BotKind::Human => None,
        }
    }
}

/// Picks a random movable piece, then a random destination for it.
pub struct RandomBot {
    name: String,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(name: String, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomBot { name, rng }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(
        &mut self,
        _snapshot: &BoardSnapshot,
        legal_moves: &LegalMoves,
        _time_limit: Duration,
    ) -> Option<Move> {
        let from = legal_moves.origins().choose(&mut self.rng)?;
        let to = legal_moves.destinations(from)?.iter().choose(&mut self.rng)?;
        Some(Move::new(from, *to))
    }
}

/// One-ply search over material and the king's distance to the nearest
/// corner.
pub struct HeuristicBot {
    name: String,
}

impl HeuristicBot {
    pub fn new(name: String) -> Self {
        HeuristicBot { name }
    }

    /// Score from the attackers' point of view.
    fn evaluate(state: &GameState) -> f64 {
        match state.result() {
            GameResult::AttackersWin => return 1000.0,
            GameResult::DefendersWin => return -1000.0,
            GameResult::Draw => return 0.0,
            GameResult::InProgress => {}
        }

        let registry = state.registry();
        let attackers = registry.count(PieceKind::Attacker) as f64;
        let defenders = registry.count(PieceKind::Defender) as f64;
        let king_distance = state
            .king_position()
            .map(|pos| state.board().corner_distance(pos))
            .unwrap_or(0) as f64;

        attackers - defenders + 0.1 * king_distance
    }
}

impl Bot for HeuristicBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(
        &mut self,
        snapshot: &BoardSnapshot,
        legal_moves: &LegalMoves,
        _time_limit: Duration,
    ) -> Option<Move> {
        let side = legal_moves.side();
        let Ok(base) = GameState::from_snapshot(snapshot, side) else {
            return legal_moves.moves().next();
        };
        let sign = match side {
            Side::Attackers => 1.0,
            Side::Defenders => -1.0,
        };

        let mut best: Option<(Move, f64)> = None;
        for mv in legal_moves.moves() {
            let mut candidate = base.clone();
            if candidate.make_move(mv).is_err() {
                continue;
            }
            let score = sign * Self::evaluate(&candidate);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }
        best.map(|(mv, _)| mv)
    }
}
