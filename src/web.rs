use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::board::Position;
use crate::bot::{Bot, BotKind};
use crate::config::WebSettings;
use crate::error::GameError;
use crate::game::{GameResult, GameState, Move};
use crate::pieces::Side;
use crate::snapshot::BoardSnapshot;

const BOT_TIME_LIMIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    game: Arc<Mutex<WebGame>>,
    settings: Arc<WebSettings>,
}

/// One game in the browser: a human against a bot, or two humans sharing
/// the board when there is no bot.
struct WebGame {
    state: GameState,
    player_side: Side,
    bot: Option<Box<dyn Bot>>,
}

#[derive(Serialize, Deserialize)]
pub struct NewGameRequest {
    #[serde(default = "default_player_side")]
    player_side: Side,
    #[serde(default)]
    bot: Option<BotKind>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct MoveRequest {
    from_row: usize,
    from_col: usize,
    to_row: usize,
    to_col: usize,
}

#[derive(Serialize, Deserialize)]
pub struct TileQuery {
    row: usize,
    col: usize,
}

#[derive(Serialize)]
pub struct GameResponse {
    board: BoardSnapshot,
    current_player: Side,
    player_side: Side,
    hot_seat: bool,
    legal_moves: Vec<Move>,
    result: GameResult,
    move_count: usize,
    message: String,
}

/// JSON error body with a status chosen per engine error.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match err {
            GameError::MoveAfterTerminal => StatusCode::CONFLICT,
            GameError::IllegalMove { .. } | GameError::InvalidCoordinate { .. } => {
                StatusCode::BAD_REQUEST
            }
            GameError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({
                "error": self.message
            })),
        )
            .into_response()
    }
}

fn default_player_side() -> Side {
    Side::Attackers
}

impl AppState {
    pub fn new(settings: WebSettings) -> Self {
        let game = WebGame::new(default_player_side(), settings.bot, settings.seed);
        AppState {
            game: Arc::new(Mutex::new(game)),
            settings: Arc::new(settings),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WebGame> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WebGame {
    fn new(player_side: Side, bot_kind: BotKind, seed: Option<u64>) -> Self {
        let mut bot = bot_kind.build(format!("{:?} Bot", bot_kind), seed);
        if let Some(bot) = bot.as_mut() {
            bot.game_start(player_side.opponent());
        }
        WebGame {
            state: GameState::new(),
            player_side,
            bot,
        }
    }

    fn is_hot_seat(&self) -> bool {
        self.bot.is_none()
    }

    /// Whether a human may move now.
    fn human_to_move(&self) -> bool {
        self.is_hot_seat() || self.state.current_player() == self.player_side
    }

    /// Let the bot play if it is on move. Returns a status line for the UI.
    fn bot_reply(&mut self) -> String {
        if self.state.is_game_over() || self.human_to_move() {
            return String::new();
        }
        let Some(bot) = self.bot.as_mut() else {
            return String::new();
        };

        let snapshot = self.state.snapshot();
        let legal_moves = self.state.legal_moves();
        let Some(mv) = bot.choose_move(&snapshot, &legal_moves, BOT_TIME_LIMIT) else {
            return "Bot has no move".to_string();
        };

        match self.state.make_move(mv) {
            Ok(_) => {
                bot.notify_move(mv);
                format!("Bot played: {}", mv)
            }
            Err(e) => {
                warn!(bot = bot.name(), %mv, error = %e, "bot move rejected");
                format!("Bot failed to make a move: {}", e)
            }
        }
    }

    fn response(&self, message: String) -> GameResponse {
        let legal_moves = if self.human_to_move() {
            self.state.legal_moves().moves().collect()
        } else {
            Vec::new()
        };
        let message = match self.state.result() {
            GameResult::InProgress if message.is_empty() && self.is_hot_seat() => {
                format!("{:?} to move", self.state.current_player())
            }
            GameResult::InProgress if message.is_empty() => "Your turn!".to_string(),
            GameResult::InProgress => message,
            result => format!("{} {}", message, result).trim().to_string(),
        };

        GameResponse {
            board: self.state.snapshot(),
            current_player: self.state.current_player(),
            player_side: self.player_side,
            hot_seat: self.is_hot_seat(),
            legal_moves,
            result: self.state.result(),
            move_count: self.state.move_count(),
            message,
        }
    }
}

async fn new_game(
    State(app_state): State<AppState>,
    Json(req): Json<NewGameRequest>,
) -> Json<GameResponse> {
    let bot_kind = req.bot.unwrap_or(app_state.settings.bot);
    let seed = req.seed.or(app_state.settings.seed);

    let mut game = app_state.lock();
    *game = WebGame::new(req.player_side, bot_kind, seed);
    info!(player_side = ?req.player_side, bot = ?bot_kind, "new game");

    let message = game.bot_reply();
    Json(game.response(message))
}

async fn make_move(
    State(app_state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = app_state.lock();

    if game.state.is_game_over() {
        return Err(GameError::MoveAfterTerminal.into());
    }
    if !game.human_to_move() {
        return Err(ApiError {
            status: StatusCode::CONFLICT,
            message: "Not your turn".to_string(),
        });
    }

    let player_move = Move::new(
        Position::new(req.from_row, req.from_col),
        Position::new(req.to_row, req.to_col),
    );
    game.state.make_move(player_move)?;
    if let Some(bot) = game.bot.as_mut() {
        bot.notify_move(player_move);
    }

    let message = game.bot_reply();
    Ok(Json(game.response(message)))
}

async fn get_game_state(State(app_state): State<AppState>) -> Json<GameResponse> {
    let game = app_state.lock();
    Json(game.response(String::new()))
}

async fn get_legal_destinations(
    State(app_state): State<AppState>,
    Query(tile): Query<TileQuery>,
) -> Result<Json<Vec<Position>>, ApiError> {
    let game = app_state.lock();
    let destinations = game.state.legal_destinations(Position::new(tile.row, tile.col))?;
    Ok(Json(destinations.into_iter().collect()))
}

pub fn router(app_state: AppState) -> Router {
    let static_files = ServeDir::new(&app_state.settings.static_dir);
    Router::new()
        .route("/api/new-game", post(new_game))
        .route("/api/move", post(make_move))
        .route("/api/game-state", get(get_game_state))
        .route("/api/legal-destinations", get(get_legal_destinations))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run_server(settings: WebSettings) -> Result<(), Box<dyn std::error::Error>> {
    let bind = settings.bind.clone();
    let app = router(AppState::new(settings));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("web server running at http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::{PieceKind, PieceRegistry};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(WebSettings {
            seed: Some(11),
            ..WebSettings::default()
        })
    }

    async fn send(app_state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(app_state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_game_state_reports_numeric_board() {
        let state = test_state();
        let (status, body) = send(&state, get("/api/game-state")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["board"][5][5], -2);
        assert_eq!(body["board"][0][3], 1);
        assert_eq!(body["board"][5][4], -1);
        assert_eq!(body["current_player"], "Attackers");
        assert_eq!(body["result"], "InProgress");
        assert!(!body["legal_moves"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_player_move_gets_bot_reply() {
        let state = test_state();
        let request = post_json(
            "/api/move",
            json!({ "from_row": 0, "from_col": 3, "to_row": 2, "to_col": 3 }),
        );
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["board"][2][3], 1);
        assert_eq!(body["move_count"], 2);
        assert_eq!(body["current_player"], "Attackers");
        assert!(body["message"].as_str().unwrap().starts_with("Bot played"));
    }

    #[tokio::test]
    async fn test_illegal_move_is_bad_request() {
        let state = test_state();
        let request = post_json(
            "/api/move",
            json!({ "from_row": 0, "from_col": 3, "to_row": 0, "to_col": 0 }),
        );
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Illegal move"));

        let (_, body) = send(&state, get("/api/game-state")).await;
        assert_eq!(body["move_count"], 0);
    }

    #[tokio::test]
    async fn test_new_game_as_defenders_lets_bot_open() {
        let state = test_state();
        let request = post_json(
            "/api/new-game",
            json!({ "player_side": "Defenders", "bot": "random", "seed": 3 }),
        );
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["move_count"], 1);
        assert_eq!(body["current_player"], "Defenders");
        assert_eq!(body["player_side"], "Defenders");
    }

    #[tokio::test]
    async fn test_hot_seat_game_takes_moves_from_both_sides() {
        let state = test_state();
        let request = post_json("/api/new-game", json!({ "bot": "human" }));
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hot_seat"], true);
        assert_eq!(body["move_count"], 0);
        assert_eq!(body["message"], "Attackers to move");

        let request = post_json(
            "/api/move",
            json!({ "from_row": 0, "from_col": 3, "to_row": 2, "to_col": 3 }),
        );
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["move_count"], 1);
        assert_eq!(body["current_player"], "Defenders");
        let legal = body["legal_moves"].as_array().unwrap();
        let defender_move = json!({ "from": { "row": 3, "col": 5 }, "to": { "row": 2, "col": 5 } });
        assert!(legal.contains(&defender_move));

        let request = post_json(
            "/api/move",
            json!({ "from_row": 3, "from_col": 5, "to_row": 2, "to_col": 5 }),
        );
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["move_count"], 2);
        assert_eq!(body["board"][2][5], -1);
        assert_eq!(body["current_player"], "Attackers");
    }

    #[tokio::test]
    async fn test_legal_destinations_after_escape_conflict() {
        let state = test_state();
        {
            let mut registry = PieceRegistry::empty();
            registry.place(PieceKind::King, 0, 1).unwrap();
            let mut game = state.lock();
            game.state = GameState::from_registry(registry, Side::Defenders).unwrap();
            game.state.apply_move(Position::new(0, 1), Position::new(0, 0)).unwrap();
        }

        let (status, body) = send(&state, get("/api/legal-destinations?row=0&col=0")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_legal_destinations_query() {
        let state = test_state();
        let (status, body) = send(&state, get("/api/legal-destinations?row=0&col=3")).await;
        assert_eq!(status, StatusCode::OK);
        let tiles = body.as_array().unwrap();
        assert!(tiles.contains(&json!({ "row": 2, "col": 3 })));
        assert!(!tiles.contains(&json!({ "row": 0, "col": 0 })));

        let (status, _) = send(&state, get("/api/legal-destinations?row=11&col=3")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
