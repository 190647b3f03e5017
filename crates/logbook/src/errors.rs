// Archivo: errors.rs
// Propósito: definir los errores del dominio del logbook y el alias
// Result<T> usado por las APIs del crate.
use thiserror::Error;

/// Errores comunes del dominio del logbook.
///
/// - `NotFound`: entidad no encontrada.
/// - `Collaborator`: fallo de un servicio colaborador (lector de ciclos
///   de vida, fuente de definiciones de workflow).
/// - `Storage`: error al acceder al almacenamiento subyacente.
/// - `Serialization`: error de (de)serialización de documentos.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum LogbookError {
  /// Entidad no encontrada (por ejemplo, operación).
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Fallo de un colaborador remoto.
  #[error("Error de colaborador: {0}")]
  Collaborator(String),
  /// Error genérico de almacenamiento.
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Error de serialización de documentos.
  #[error("Error de serialización: {0}")]
  Serialization(#[from] serde_json::Error),
  /// Otro tipo de error.
  #[error("Otro: {0}")]
  Other(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, LogbookError>;
