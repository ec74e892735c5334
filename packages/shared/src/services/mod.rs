pub mod auth_service;
pub mod chess_service;
pub mod clock;
pub mod errors;
pub mod game_session_service;
pub mod lobby_service;
pub mod notifier;
pub mod rating_service;
pub mod session_directory;
pub mod user_service;
