use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use session_api::config::{AppConfig, LogFormat, StorageBackend};
use session_api::create_app;
use session_api::state::AppState;
use shared::repositories::match_repository::{
    DynamoDbMatchRepository, InMemoryMatchRepository, MatchRepository,
};
use shared::repositories::user_repository::{
    DynamoDbUserRepository, InMemoryUserRepository, UserRepository,
};
use shared::services::auth_service::AuthService;

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn MatchRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let (user_repository, match_repository) = repositories(&config).await;
    let app_state = AppState::new(
        AuthService::new(&config.jwt_secret),
        user_repository,
        match_repository,
        config.channel_capacity,
        config.notify_timeout,
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(
        "Listening on {} ({:?} storage)",
        config.bind_address, config.storage_backend
    );
    axum::serve(listener, create_app(app_state)).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "session_api=info,shared=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn repositories(config: &AppConfig) -> Repositories {
    match config.storage_backend {
        StorageBackend::Memory => {
            let users: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(InMemoryUserRepository::new());
            let matches: Arc<dyn MatchRepository + Send + Sync> =
                Arc::new(InMemoryMatchRepository::new());
            (users, matches)
        }
        StorageBackend::DynamoDb => {
            let aws_config = aws_config::load_from_env().await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            let users: Arc<dyn UserRepository + Send + Sync> = Arc::new(
                DynamoDbUserRepository::new(client.clone(), &config.users_table),
            );
            let matches: Arc<dyn MatchRepository + Send + Sync> =
                Arc::new(DynamoDbMatchRepository::new(client, &config.matches_table));
            (users, matches)
        }
    }
}
