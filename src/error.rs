use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("storage failure for key `{key}`: {message}")]
    Storage { key: String, message: String },

    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl ChartError {
    pub(crate) fn storage(key: &str, message: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.to_owned(),
            message: message.to_string(),
        }
    }
}
