// errors.rs
use thiserror::Error;

/// Errores de la capa de almacenamiento (workspace de staging y ofertas
/// durables).
#[derive(Debug, Error)]
pub enum StorageError {
  /// Contenedor u objeto no encontrado.
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Operación inválida sobre un contenedor (ya existe, no vacío, etc.).
  #[error("Error de contenedor {container}: {reason}")]
  Container { container: String, reason: String },
  /// Fallo al persistir un informe; siempre nombra el artefacto afectado.
  #[error("No se pudo persistir el informe {artifact}: {reason}")]
  Report { artifact: String, reason: String },
  /// Error de E/S del backend de ficheros.
  #[error("Error de E/S: {0}")]
  Io(#[from] std::io::Error),
  /// Error de serialización del contenido.
  #[error("Error de serialización: {0}")]
  Serialization(#[from] serde_json::Error),
  /// Otro tipo de error.
  #[error("Otro: {0}")]
  Other(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, StorageError>;
