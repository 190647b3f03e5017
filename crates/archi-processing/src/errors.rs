// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ProcessingError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Estado inválido: {0}")]
  StateError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<serde_json::Error> for ProcessingError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}
