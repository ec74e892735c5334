use std::sync::Arc;
use std::time::Duration;

use shared::repositories::match_repository::MatchRepository;
use shared::repositories::user_repository::UserRepository;
use shared::services::auth_service::AuthService;
use shared::services::chess_service::{ChessService, RulesEngine};
use shared::services::game_session_service::GameSessionService;
use shared::services::lobby_service::LobbyRegistry;
use shared::services::notifier::ChannelNotifier;
use shared::services::rating_service::RatingService;
use shared::services::session_directory::SessionDirectory;
use shared::services::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub lobby_registry: Arc<LobbyRegistry>,
    pub session_directory: Arc<SessionDirectory>,
    pub game_session_service: Arc<GameSessionService>,
    pub notifier: Arc<ChannelNotifier>,
}

impl AppState {
    pub fn new(
        auth_service: AuthService,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
        channel_capacity: usize,
        notify_timeout: Duration,
    ) -> Self {
        let rules: Arc<dyn RulesEngine> = Arc::new(ChessService::new());
        let notifier = Arc::new(ChannelNotifier::new(channel_capacity));
        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let rating_service = Arc::new(RatingService::new(user_repository));
        let lobby_registry = Arc::new(LobbyRegistry::new(user_service.clone()));
        let session_directory = Arc::new(SessionDirectory::new(
            lobby_registry.clone(),
            rules.clone(),
        ));
        let game_session_service = Arc::new(
            GameSessionService::new(
                session_directory.clone(),
                lobby_registry.clone(),
                rules,
                match_repository,
                rating_service,
                user_service.clone(),
                notifier.clone(),
            )
            .with_notify_timeout(notify_timeout),
        );

        AppState {
            auth_service: Arc::new(auth_service),
            user_service,
            lobby_registry,
            session_directory,
            game_session_service,
            notifier,
        }
    }
}
