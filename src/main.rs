use hnefatafl_engine::*;
use hnefatafl_engine::web::run_server;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: hnefatafl-engine [match|serve] [--config <path>]";
const NEEDS_BOTS: &str = "a match needs a bot on each side; \"human\" is only valid for serve";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut command = "match".to_string();
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(args.next().ok_or(USAGE)?),
            "match" | "serve" => command = arg,
            _ => return Err(USAGE.into()),
        }
    }

    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if command == "serve" {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(run_server(config.web));
    }

    println!("Hnefatafl - Bot Match");
    println!("=====================\n");

    let settings = &config.arena;
    let attacker = settings
        .attacker
        .build(format!("{:?} (attackers)", settings.attacker), settings.seed)
        .ok_or(NEEDS_BOTS)?;
    let defender = settings
        .defender
        .build(
            format!("{:?} (defenders)", settings.defender),
            settings.seed.map(|s| s.wrapping_add(1)),
        )
        .ok_or(NEEDS_BOTS)?;

    let mut match_game = Match::new(attacker, defender, MatchConfig::from(settings));
    let result = match_game.play();

    println!("{}", match_game.state().display_board());
    println!("=====================");
    println!("Match Result:");
    match result {
        MatchResult::AttackersWin { winner_name, moves } => {
            println!("  {} wins as Attackers in {} moves!", winner_name, moves);
        }
        MatchResult::DefendersWin { winner_name, moves } => {
            println!("  {} wins as Defenders in {} moves!", winner_name, moves);
        }
        MatchResult::Draw { moves } => {
            println!("  Draw after {} moves", moves);
        }
        MatchResult::Timeout { violator, winner } => {
            println!("  {} wins by timeout (opponent: {})", winner, violator);
        }
        MatchResult::IllegalMove { violator, winner } => {
            println!("  {} wins by illegal move (opponent: {})", winner, violator);
        }
        MatchResult::Stalled { side, moves } => {
            println!("  {:?} could not move after {} moves", side, moves);
        }
    }
    println!("=====================");
    Ok(())
}
