use crate::models::match_record::MatchRecord;
use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Writes a finished game. Records are immutable once written.
    async fn save_match(&self, record: &MatchRecord) -> Result<(), MatchRepositoryError>;

    /// Newest first.
    async fn list_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError>;
}

pub struct DynamoDbMatchRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbMatchRepository {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl MatchRepository for DynamoDbMatchRepository {
    async fn save_match(&self, record: &MatchRecord) -> Result<(), MatchRepositoryError> {
        let item = serde_dynamo::to_item(record)
            .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(match_id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("ConditionalCheckFailed") {
                    Err(MatchRepositoryError::AlreadyRecorded(
                        record.match_id.clone(),
                    ))
                } else {
                    Err(MatchRepositoryError::DynamoDb(error_str))
                }
            }
        }
    }

    async fn list_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("white_player_id = :player OR black_player_id = :player")
            .expression_attribute_values(":player", AttributeValue::S(player_id.to_string()))
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        let mut records: Vec<MatchRecord> = output
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_dynamo::from_item(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Failed to parse match record: {:?}", e);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| b.end_time.cmp(&a.end_time));

        Ok(records)
    }
}

/// Process-local match store for development and tests.
#[derive(Default)]
pub struct InMemoryMatchRepository {
    records: RwLock<HashMap<String, MatchRecord>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn save_match(&self, record: &MatchRecord) -> Result<(), MatchRepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.match_id) {
            return Err(MatchRepositoryError::AlreadyRecorded(
                record.match_id.clone(),
            ));
        }
        records.insert(record.match_id.clone(), record.clone());
        Ok(())
    }

    async fn list_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let mut records: Vec<MatchRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.involves(player_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.end_time.cmp(&a.end_time));
        Ok(records)
    }
}
