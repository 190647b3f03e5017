use crate::{LifecycleState, ProcessingError, Step};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Definición inmutable de un workflow de preservación: identidad,
/// política de ciclo de vida por defecto y secuencia ordenada de pasos.
///
/// Se carga una única vez desde su definición serializada al arrancar el
/// proceso y es de sólo lectura a partir de ahí; el motor de coherencia
/// la consulta para conocer los eventTypes legítimos del workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkFlow {
  pub id: String,
  pub identifier: String,
  pub name: String,
  pub type_proc: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  /// Política de ciclo de vida del workflow; `None` aplica el defecto
  /// del sistema (`Temporary`) al resolver.
  #[serde(default, rename = "lifecycleLog", skip_serializing_if = "Option::is_none")]
  pub lifecycle_log: Option<LifecycleState>,
  #[serde(default)]
  pub steps: Vec<Step>,
}

impl WorkFlow {
  /// Propaga la política de ciclo de vida a todas las acciones.
  /// La precedencia es: valor explícito del workflow > `default`.
  pub fn default_lifecycle_log(&mut self, default: LifecycleState) {
    let effective = self.lifecycle_log.unwrap_or(default);
    for step in &mut self.steps {
      step.default_lifecycle_log(effective);
    }
  }

  /// Conjunto de eventTypes legítimos de este workflow:
  /// {identifier} ∪ {step_name} ∪ {action_key}.
  pub fn event_types(&self) -> HashSet<String> {
    let mut out = HashSet::new();
    out.insert(self.identifier.clone());
    for step in &self.steps {
      out.insert(step.step_name.clone());
      for action in &step.actions {
        out.insert(action.definition.action_key.clone());
      }
    }
    out
  }
}

/// Carga una definición de workflow desde JSON y resuelve las políticas
/// de ciclo de vida en una sola pasada. Un literal de enum desconocido
/// hace fallar la carga completa; no hay carga parcial.
pub fn load_workflow(json: &str) -> Result<WorkFlow, ProcessingError> {
  let mut workflow: WorkFlow = serde_json::from_str(json)?;
  workflow.default_lifecycle_log(LifecycleState::Temporary);
  Ok(workflow)
}
