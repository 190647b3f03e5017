use crate::{LifecycleState, ProcessBehavior, ProcessingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origen/destino de un parámetro de entrada/salida de una acción.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UriPrefix {
  Workspace,
  Memory,
  Value,
}

impl fmt::Display for UriPrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      UriPrefix::Workspace => "WORKSPACE",
      UriPrefix::Memory => "MEMORY",
      UriPrefix::Value => "VALUE",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for UriPrefix {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "WORKSPACE" => Ok(UriPrefix::Workspace),
      "MEMORY" => Ok(UriPrefix::Memory),
      "VALUE" => Ok(UriPrefix::Value),
      other => Err(ProcessingError::ValidationError(format!("UriPrefix desconocido: {}", other))),
    }
  }
}

/// URI de binding `PREFIX:path` usada en las definiciones de acciones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingUri {
  pub prefix: UriPrefix,
  pub path: String,
}

impl ProcessingUri {
  pub fn new(prefix: UriPrefix, path: impl Into<String>) -> Self {
    Self { prefix, path: path.into() }
  }
}

impl fmt::Display for ProcessingUri {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.prefix, self.path)
  }
}

impl FromStr for ProcessingUri {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (prefix, path) = s.split_once(':').ok_or_else(|| {
      ProcessingError::ValidationError(format!("URI de binding sin prefijo: {}", s))
    })?;
    Ok(Self { prefix: prefix.parse()?, path: path.to_string() })
  }
}

// La forma textual `PREFIX:path` es también la forma serializada.
impl Serialize for ProcessingUri {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for ProcessingUri {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

/// Binding de un parámetro de entrada o salida de una acción.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoParameter {
  pub name: String,
  pub uri: ProcessingUri,
  #[serde(default)]
  pub optional: bool,
}

/// Definición declarativa de una acción dentro de un paso.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
  /// Clave de la acción; es el eventType que queda registrado en el logbook.
  pub action_key: String,
  #[serde(default)]
  pub behavior: ProcessBehavior,
  /// Política de ciclo de vida declarada; `None` hereda del workflow/paso.
  #[serde(default, rename = "lifecycleLog", skip_serializing_if = "Option::is_none")]
  pub lifecycle_state: Option<LifecycleState>,
  #[serde(default, rename = "in", skip_serializing_if = "Vec::is_empty")]
  pub in_params: Vec<IoParameter>,
  #[serde(default, rename = "out", skip_serializing_if = "Vec::is_empty")]
  pub out_params: Vec<IoParameter>,
}

impl ActionDefinition {
  /// Fija la política sólo si no fue declarada explícitamente.
  pub fn default_lifecycle_state(&mut self, default: LifecycleState) {
    if self.lifecycle_state.is_none() {
      self.lifecycle_state = Some(default);
    }
  }

  pub fn set_lifecycle_state(&mut self, state: LifecycleState) {
    self.lifecycle_state = Some(state);
  }

  /// Política efectiva; `Disabled` mientras no haya sido resuelta.
  pub fn lifecycle_enabled(&self) -> bool {
    self.lifecycle_state.map(|s| s.is_lifecycle_enabled()).unwrap_or(false)
  }
}

/// Acción de un paso; envoltorio del formato de definición.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
  #[serde(rename = "action")]
  pub definition: ActionDefinition,
}
