#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    Delivery(String),
    InvalidMessage(String),
}

impl std::fmt::Display for NotifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierError::Delivery(msg) => write!(f, "Delivery failed: {}", msg),
            NotifierError::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
        }
    }
}

impl std::error::Error for NotifierError {}
