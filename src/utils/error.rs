use crate::adapters::store::StoreError;

#[derive(Debug)]
pub enum PlangateError {
    ConfigError(String),
    StoreError(StoreError),
    RedisError(redis::RedisError),
    SerdeError(serde_json::Error),
}

impl std::fmt::Display for PlangateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlangateError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            PlangateError::StoreError(err) => write!(f, "Store error: {}", err),
            PlangateError::RedisError(err) => write!(f, "Redis error: {}", err),
            PlangateError::SerdeError(err) => write!(f, "Serde error: {}", err),
        }
    }
}

impl std::error::Error for PlangateError {}

impl From<StoreError> for PlangateError {
    fn from(err: StoreError) -> Self {
        PlangateError::StoreError(err)
    }
}

impl From<redis::RedisError> for PlangateError {
    fn from(err: redis::RedisError) -> Self {
        PlangateError::RedisError(err)
    }
}

impl From<serde_json::Error> for PlangateError {
    fn from(err: serde_json::Error) -> Self {
        PlangateError::SerdeError(err)
    }
}

impl From<config::ConfigError> for PlangateError {
    fn from(err: config::ConfigError) -> Self {
        PlangateError::ConfigError(err.to_string())
    }
}
