pub mod auth;
pub mod game_session;
pub mod lobby;
pub mod match_record;
pub mod requests;
pub mod responses;
pub mod user;
