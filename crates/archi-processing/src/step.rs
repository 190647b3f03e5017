use crate::{Action, Distribution, ItemStatus, LifecycleState, ProcessingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Comportamiento de un paso ante un resultado no-OK: un paso bloqueante
/// detiene el workflow cuando su resultado agregado llega a KO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessBehavior {
  Blocking,
  #[serde(rename = "NOBLOCKING")]
  NoBlocking,
}

impl ProcessBehavior {
  pub fn is_blocking(&self) -> bool {
    matches!(self, ProcessBehavior::Blocking)
  }
}

impl Default for ProcessBehavior {
  fn default() -> Self {
    ProcessBehavior::NoBlocking
  }
}

/// Bandera de control fijada por el plano de control sobre el paso en
/// curso. `ActionRun` es el estado inicial; `ActionComplete` el terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseOrCancelAction {
  ActionRun,
  ActionPause,
  ActionRecover,
  ActionReplay,
  ActionCancel,
  ActionComplete,
}

impl Default for PauseOrCancelAction {
  fn default() -> Self {
    PauseOrCancelAction::ActionRun
  }
}

impl fmt::Display for PauseOrCancelAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      PauseOrCancelAction::ActionRun => "ACTION_RUN",
      PauseOrCancelAction::ActionPause => "ACTION_PAUSE",
      PauseOrCancelAction::ActionRecover => "ACTION_RECOVER",
      PauseOrCancelAction::ActionReplay => "ACTION_REPLAY",
      PauseOrCancelAction::ActionCancel => "ACTION_CANCEL",
      PauseOrCancelAction::ActionComplete => "ACTION_COMPLETE",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for PauseOrCancelAction {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ACTION_RUN" => Ok(PauseOrCancelAction::ActionRun),
      "ACTION_PAUSE" => Ok(PauseOrCancelAction::ActionPause),
      "ACTION_RECOVER" => Ok(PauseOrCancelAction::ActionRecover),
      "ACTION_REPLAY" => Ok(PauseOrCancelAction::ActionReplay),
      "ACTION_CANCEL" => Ok(PauseOrCancelAction::ActionCancel),
      "ACTION_COMPLETE" => Ok(PauseOrCancelAction::ActionComplete),
      other => Err(ProcessingError::ValidationError(format!("PauseOrCancelAction desconocida: {}", other))),
    }
  }
}

/// Paso de un workflow: afinidad de grupo de workers, comportamiento,
/// política de distribución y acciones ordenadas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
  #[serde(default = "Uuid::new_v4")]
  pub id: Uuid,
  pub worker_group_id: String,
  pub step_name: String,
  #[serde(default)]
  pub behavior: ProcessBehavior,
  #[serde(default)]
  pub distribution: Distribution,
  #[serde(default)]
  pub actions: Vec<Action>,
  /// Estado de control en runtime; no forma parte de la definición.
  #[serde(skip)]
  pub pause_or_cancel_action: PauseOrCancelAction,
}

impl Step {
  /// Fija la bandera de control (fluido, como el resto de setters del
  /// plano de control).
  pub fn set_pause_or_cancel_action(&mut self, action: PauseOrCancelAction) -> &mut Self {
    self.pause_or_cancel_action = action;
    self
  }

  /// Resuelve la política de ciclo de vida efectiva de cada acción.
  ///
  /// Un paso distribuido produce trazas por elemento, así que sus
  /// acciones heredan la política por defecto salvo valor explícito. Un
  /// paso `Ref` sólo registra a nivel de operación: se fuerza `Disabled`
  /// ignorando cualquier valor declarado.
  pub fn default_lifecycle_log(&mut self, default: LifecycleState) {
    for action in &mut self.actions {
      if self.distribution.is_distributed() {
        action.definition.default_lifecycle_state(default);
      } else {
        action.definition.set_lifecycle_state(LifecycleState::Disabled);
      }
    }
  }

  /// Evalúa si el resultado agregado del paso debe detener el workflow.
  pub fn shall_stop(&self, last_status: &ItemStatus) -> bool {
    last_status.shall_stop(self.behavior.is_blocking())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::StatusCode;

  fn step(behavior: ProcessBehavior) -> Step {
    Step { id: uuid::Uuid::new_v4(),
           worker_group_id: "DefaultWorker".into(),
           step_name: "STP_TEST".into(),
           behavior,
           distribution: Distribution::default(),
           actions: Vec::new(),
           pause_or_cancel_action: PauseOrCancelAction::default() }
  }

  #[test]
  fn control_flag_starts_at_run_and_is_fluent() {
    let mut s = step(ProcessBehavior::Blocking);
    assert_eq!(s.pause_or_cancel_action, PauseOrCancelAction::ActionRun);
    s.set_pause_or_cancel_action(PauseOrCancelAction::ActionPause)
     .set_pause_or_cancel_action(PauseOrCancelAction::ActionComplete);
    assert_eq!(s.pause_or_cancel_action, PauseOrCancelAction::ActionComplete);
  }

  #[test]
  fn blocking_step_halts_on_ko_non_blocking_continues() {
    let mut ko = ItemStatus::new("item");
    ko.increment(StatusCode::Ko);
    assert!(step(ProcessBehavior::Blocking).shall_stop(&ko));
    assert!(!step(ProcessBehavior::NoBlocking).shall_stop(&ko));

    let mut fatal = ItemStatus::new("item");
    fatal.increment(StatusCode::Fatal);
    assert!(step(ProcessBehavior::NoBlocking).shall_stop(&fatal));
  }
}
