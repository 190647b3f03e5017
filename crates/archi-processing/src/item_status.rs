// item_status.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ProcessingError;

/// Escala cerrada de estados de ejecución, ordenada de mejor a peor.
/// El orden de las variantes define el nivel (`status_level`) usado para
/// agregar resultados: el peor estado observado gana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
  Unknown,
  Started,
  AlreadyExecuted,
  Ok,
  Warning,
  Ko,
  Fatal,
}

impl StatusCode {
  /// Nivel numérico del estado (posición en la escala).
  pub fn status_level(&self) -> usize {
    *self as usize
  }

  /// Devuelve el peor de los dos estados.
  pub fn merge(self, other: StatusCode) -> StatusCode {
    if other.status_level() > self.status_level() {
      other
    } else {
      self
    }
  }

  pub fn is_greater_or_equal_to_ko(&self) -> bool {
    self.status_level() >= StatusCode::Ko.status_level()
  }

  pub fn is_greater_or_equal_to_fatal(&self) -> bool {
    self.status_level() >= StatusCode::Fatal.status_level()
  }

  /// Cantidad de variantes de la escala (dimensión del contador por estado).
  pub const COUNT: usize = 7;
}

impl Default for StatusCode {
  fn default() -> Self {
    StatusCode::Unknown
  }
}

impl fmt::Display for StatusCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      StatusCode::Unknown => "UNKNOWN",
      StatusCode::Started => "STARTED",
      StatusCode::AlreadyExecuted => "ALREADY_EXECUTED",
      StatusCode::Ok => "OK",
      StatusCode::Warning => "WARNING",
      StatusCode::Ko => "KO",
      StatusCode::Fatal => "FATAL",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for StatusCode {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "UNKNOWN" => Ok(StatusCode::Unknown),
      "STARTED" => Ok(StatusCode::Started),
      "ALREADY_EXECUTED" => Ok(StatusCode::AlreadyExecuted),
      "OK" => Ok(StatusCode::Ok),
      "WARNING" => Ok(StatusCode::Warning),
      "KO" => Ok(StatusCode::Ko),
      "FATAL" => Ok(StatusCode::Fatal),
      other => Err(ProcessingError::ValidationError(format!("StatusCode desconocido: {}", other))),
    }
  }
}

/// Resultado agregado de la ejecución de un paso o de una acción.
///
/// Mantiene el estado global (peor estado observado), un contador por
/// nivel de estado y los resultados de las sub-tareas en orden de
/// inserción. Es el valor que el plano de control consulta después de
/// cada paso para decidir si el workflow continúa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatus {
  pub item_id: String,
  pub message: String,
  pub global_status: StatusCode,
  /// Contador de ocurrencias por nivel de `StatusCode`.
  pub status_meter: Vec<u64>,
  /// Resultados de sub-tareas, en orden de llegada.
  pub sub_task_status: IndexMap<String, ItemStatus>,
}

impl ItemStatus {
  pub fn new(item_id: impl Into<String>) -> Self {
    Self { item_id: item_id.into(),
           message: String::new(),
           global_status: StatusCode::Unknown,
           status_meter: vec![0; StatusCode::COUNT],
           sub_task_status: IndexMap::new() }
  }

  /// Registra una ocurrencia del estado dado y actualiza el estado global.
  pub fn increment(&mut self, code: StatusCode) -> &mut Self {
    self.status_meter[code.status_level()] += 1;
    self.global_status = self.global_status.merge(code);
    self
  }

  /// Incorpora el resultado de una sub-tarea: suma su contador, propaga
  /// el peor estado y conserva el detalle bajo su `item_id`.
  pub fn set_item_status(&mut self, child: ItemStatus) -> &mut Self {
    for (level, count) in child.status_meter.iter().enumerate() {
      self.status_meter[level] += count;
    }
    self.global_status = self.global_status.merge(child.global_status);
    self.sub_task_status.insert(child.item_id.clone(), child);
    self
  }

  pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
    self.message = message.into();
    self
  }

  /// Indica si este resultado debe detener el paso que lo produjo.
  /// FATAL detiene siempre; KO sólo cuando el paso es bloqueante.
  pub fn shall_stop(&self, blocking: bool) -> bool {
    self.global_status.is_greater_or_equal_to_fatal()
      || (blocking && self.global_status.is_greater_or_equal_to_ko())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_keeps_the_worst_code() {
    assert_eq!(StatusCode::Ok.merge(StatusCode::Warning), StatusCode::Warning);
    assert_eq!(StatusCode::Fatal.merge(StatusCode::Ok), StatusCode::Fatal);
    assert_eq!(StatusCode::Started.merge(StatusCode::Started), StatusCode::Started);
  }

  #[test]
  fn shall_stop_matrix() {
    let mut ok = ItemStatus::new("ok");
    ok.increment(StatusCode::Ok);
    assert!(!ok.shall_stop(true));
    assert!(!ok.shall_stop(false));

    let mut ko = ItemStatus::new("ko");
    ko.increment(StatusCode::Ko);
    assert!(ko.shall_stop(true));
    assert!(!ko.shall_stop(false));

    let mut fatal = ItemStatus::new("fatal");
    fatal.increment(StatusCode::Fatal);
    assert!(fatal.shall_stop(true));
    assert!(fatal.shall_stop(false));
  }

  #[test]
  fn set_item_status_aggregates_meter_and_global() {
    let mut step = ItemStatus::new("step");
    let mut a = ItemStatus::new("a");
    a.increment(StatusCode::Ok);
    let mut b = ItemStatus::new("b");
    b.increment(StatusCode::Ko);
    step.set_item_status(a);
    step.set_item_status(b);
    assert_eq!(step.global_status, StatusCode::Ko);
    assert_eq!(step.status_meter[StatusCode::Ok.status_level()], 1);
    assert_eq!(step.status_meter[StatusCode::Ko.status_level()], 1);
    assert_eq!(step.sub_task_status.len(), 2);
  }
}
