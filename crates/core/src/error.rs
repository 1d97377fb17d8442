#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
