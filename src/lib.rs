pub mod arena;
pub mod board;
pub mod bot;
pub mod capture;
pub mod config;
pub mod error;
pub mod game;
pub mod movegen;
pub mod pieces;
pub mod snapshot;
pub mod web;

pub use arena::*;
pub use board::*;
pub use bot::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use movegen::*;
pub use pieces::*;
pub use snapshot::*;
