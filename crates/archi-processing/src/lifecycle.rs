use crate::ProcessingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Política de registro de ciclo de vida aplicable a una acción.
///
/// `Temporary` indica que el ciclo de vida se registra en la colección
/// temporal (in-process) hasta el commit de la operación; cuenta como
/// "habilitado" a efectos de trazabilidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
  Enabled,
  Temporary,
  Disabled,
}

impl LifecycleState {
  /// Indica si esta política produce eventos de ciclo de vida.
  pub fn is_lifecycle_enabled(&self) -> bool {
    !matches!(self, LifecycleState::Disabled)
  }
}

impl fmt::Display for LifecycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      LifecycleState::Enabled => "ENABLED",
      LifecycleState::Temporary => "TEMPORARY",
      LifecycleState::Disabled => "DISABLED",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for LifecycleState {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ENABLED" => Ok(LifecycleState::Enabled),
      "TEMPORARY" => Ok(LifecycleState::Temporary),
      "DISABLED" => Ok(LifecycleState::Disabled),
      other => Err(ProcessingError::ValidationError(format!("LifecycleState desconocido: {}", other))),
    }
  }
}

impl Default for LifecycleState {
  fn default() -> Self {
    LifecycleState::Temporary
  }
}
