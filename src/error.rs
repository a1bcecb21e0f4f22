use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Quiz service request failed: {0}")]
    Service(String),

    #[error("Failed to write quiz output: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, QuizError::Configuration(_))
    }

    pub fn is_service(&self) -> bool {
        matches!(self, QuizError::Service(_))
    }
}
