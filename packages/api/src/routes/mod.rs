pub mod channel;
pub mod game;
pub mod health;
pub mod lobby;
pub mod player;
