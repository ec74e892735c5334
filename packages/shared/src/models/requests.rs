use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_public() -> bool {
    true
}

fn default_initial_time() -> i64 {
    300
}

fn default_increment() -> i64 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
    #[serde(default = "default_initial_time")]
    pub initial_time_seconds: i64,
    #[serde(default = "default_increment")]
    pub increment_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinLobbyRequest {
    pub lobby_id: Uuid,
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveLobbyRequest {
    pub lobby_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    pub lobby_id: Uuid,
    #[serde(alias = "from")]
    pub origin: String,
    #[serde(default, alias = "to")]
    pub destination: String,
    #[serde(default)]
    pub promotion: Option<String>,
    #[serde(default)]
    pub white_remaining_seconds: Option<i64>,
    #[serde(default)]
    pub black_remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncClockRequest {
    pub lobby_id: Uuid,
    pub white_remaining_seconds: i64,
    pub black_remaining_seconds: i64,
}
