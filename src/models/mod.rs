pub mod game;
pub mod player;

pub use game::{Game, GameMap, GamePlayer, GameRequest, Turn};
pub use player::Player;
