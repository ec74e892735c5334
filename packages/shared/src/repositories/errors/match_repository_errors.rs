#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRepositoryError {
    /// A record with this id was already written.
    AlreadyRecorded(String),
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for MatchRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchRepositoryError::AlreadyRecorded(id) => {
                write!(f, "Match {} is already recorded", id)
            }
            MatchRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            MatchRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for MatchRepositoryError {}
