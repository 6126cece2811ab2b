use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bot::Bot;
use crate::game::{DEFAULT_MOVE_LIMIT, GameResult, GameState, Move};
use crate::pieces::Side;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub time_per_move: Duration,
    pub move_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            time_per_move: Duration::from_secs(5),
            move_limit: DEFAULT_MOVE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    AttackersWin { winner_name: String, moves: usize },
    DefendersWin { winner_name: String, moves: usize },
    Draw { moves: usize },
    Timeout { violator: String, winner: String },
    IllegalMove { violator: String, winner: String },
    /// The side to move had no legal move or declined to play.
    Stalled { side: Side, moves: usize },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::AttackersWin { winner_name, .. } => Some(winner_name),
            MatchResult::DefendersWin { winner_name, .. } => Some(winner_name),
            MatchResult::Timeout { winner, .. } => Some(winner),
            MatchResult::IllegalMove { winner, .. } => Some(winner),
            MatchResult::Draw { .. } | MatchResult::Stalled { .. } => None,
        }
    }
}

/// Drives one game between two policies.
pub struct Match {
    config: MatchConfig,
    state: GameState,
    attacker_bot: Box<dyn Bot>,
    defender_bot: Box<dyn Bot>,
}

impl Match {
    pub fn new(
        attacker_bot: Box<dyn Bot>,
        defender_bot: Box<dyn Bot>,
        config: MatchConfig,
    ) -> Self {
        let state = GameState::new().with_move_limit(config.move_limit);
        Self::from_state(attacker_bot, defender_bot, config, state)
    }

    /// Start from an arbitrary position; the state's own move limit applies.
    pub fn from_state(
        attacker_bot: Box<dyn Bot>,
        defender_bot: Box<dyn Bot>,
        config: MatchConfig,
        state: GameState,
    ) -> Self {
        Match {
            config,
            state,
            attacker_bot,
            defender_bot,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn play(&mut self) -> MatchResult {
        self.attacker_bot.game_start(Side::Attackers);
        self.defender_bot.game_start(Side::Defenders);

        info!(
            attackers = self.attacker_bot.name(),
            defenders = self.defender_bot.name(),
            "match starting"
        );
        debug!("initial board:\n{}", self.state.display_board());

        let outcome = loop {
            if let Some(result) = self.play_move() {
                break result;
            }
        };

        self.attacker_bot.game_end();
        self.defender_bot.game_end();
        outcome
    }

    /// One half-move. Returns the match result once the game is decided.
    fn play_move(&mut self) -> Option<MatchResult> {
        let side = self.state.current_player();
        let snapshot = self.state.snapshot();
        let legal_moves = self.state.legal_moves();

        let bot = match side {
            Side::Attackers => &mut self.attacker_bot,
            Side::Defenders => &mut self.defender_bot,
        };
        debug!(
            ply = self.state.move_count() + 1,
            bot = bot.name(),
            legal = legal_moves.len(),
            "to play"
        );

        let start = Instant::now();
        let mv = bot.choose_move(&snapshot, &legal_moves, self.config.time_per_move);
        let elapsed = start.elapsed();

        self.handle_move_result(mv, elapsed, side)
    }

    fn handle_move_result(
        &mut self,
        mv: Option<Move>,
        elapsed: Duration,
        side: Side,
    ) -> Option<MatchResult> {
        let (bot_name, opponent_name) = match side {
            Side::Attackers => (self.attacker_bot.name(), self.defender_bot.name()),
            Side::Defenders => (self.defender_bot.name(), self.attacker_bot.name()),
        };

        if elapsed > self.config.time_per_move {
            warn!(
                bot = bot_name,
                ?elapsed,
                limit = ?self.config.time_per_move,
                "timeout"
            );
            return Some(MatchResult::Timeout {
                violator: bot_name.to_string(),
                winner: opponent_name.to_string(),
            });
        }

        let Some(mv) = mv else {
            warn!(bot = bot_name, "no move returned");
            return Some(MatchResult::Stalled {
                side,
                moves: self.state.move_count(),
            });
        };

        if let Err(e) = self.state.make_move(mv) {
            warn!(bot = bot_name, %mv, error = %e, "illegal move");
            return Some(MatchResult::IllegalMove {
                violator: bot_name.to_string(),
                winner: opponent_name.to_string(),
            });
        }
        debug!(bot = bot_name, %mv, ?elapsed, "played");

        self.attacker_bot.notify_move(mv);
        self.defender_bot.notify_move(mv);

        let moves = self.state.move_count();
        match self.state.result() {
            GameResult::InProgress => None,
            GameResult::AttackersWin => Some(MatchResult::AttackersWin {
                winner_name: self.attacker_bot.name().to_string(),
                moves,
            }),
            GameResult::DefendersWin => Some(MatchResult::DefendersWin {
                winner_name: self.defender_bot.name().to_string(),
                moves,
            }),
            GameResult::Draw => Some(MatchResult::Draw { moves }),
        }
    }
}
