pub mod auth_service_errors;
pub mod chess_service_errors;
pub mod game_session_service_errors;
pub mod lobby_service_errors;
pub mod notifier_errors;
pub mod rating_service_errors;
pub mod user_service_errors;
