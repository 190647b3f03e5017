use crate::ProcessingError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Enumeración cerrada de los nombres de parámetro reconocidos por los
/// workers. La forma textual es la clave usada en el payload de
/// transporte entre procesos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerParameterName {
  UrlMetadata,
  UrlWorkspace,
  ObjectId,
  ObjectName,
  ObjectNameList,
  ObjectMetadata,
  ObjectMetadataList,
  WorkerGuid,
  ContainerName,
  CurrentStep,
  StepUniqId,
  ProcessId,
  RequestId,
  LogbookTypeProcess,
  WorkflowIdentifier,
}

impl fmt::Display for WorkerParameterName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      WorkerParameterName::UrlMetadata => "urlMetadata",
      WorkerParameterName::UrlWorkspace => "urlWorkspace",
      WorkerParameterName::ObjectId => "objectId",
      WorkerParameterName::ObjectName => "objectName",
      WorkerParameterName::ObjectNameList => "objectNameList",
      WorkerParameterName::ObjectMetadata => "objectMetadata",
      WorkerParameterName::ObjectMetadataList => "objectMetadataList",
      WorkerParameterName::WorkerGuid => "workerGuid",
      WorkerParameterName::ContainerName => "containerName",
      WorkerParameterName::CurrentStep => "currentStep",
      WorkerParameterName::StepUniqId => "stepUniqId",
      WorkerParameterName::ProcessId => "processId",
      WorkerParameterName::RequestId => "requestId",
      WorkerParameterName::LogbookTypeProcess => "logbookTypeProcess",
      WorkerParameterName::WorkflowIdentifier => "workflowIdentifier",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for WorkerParameterName {
  type Err = ProcessingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "urlMetadata" => Ok(WorkerParameterName::UrlMetadata),
      "urlWorkspace" => Ok(WorkerParameterName::UrlWorkspace),
      "objectId" => Ok(WorkerParameterName::ObjectId),
      "objectName" => Ok(WorkerParameterName::ObjectName),
      "objectNameList" => Ok(WorkerParameterName::ObjectNameList),
      "objectMetadata" => Ok(WorkerParameterName::ObjectMetadata),
      "objectMetadataList" => Ok(WorkerParameterName::ObjectMetadataList),
      "workerGuid" => Ok(WorkerParameterName::WorkerGuid),
      "containerName" => Ok(WorkerParameterName::ContainerName),
      "currentStep" => Ok(WorkerParameterName::CurrentStep),
      "stepUniqId" => Ok(WorkerParameterName::StepUniqId),
      "processId" => Ok(WorkerParameterName::ProcessId),
      "requestId" => Ok(WorkerParameterName::RequestId),
      "logbookTypeProcess" => Ok(WorkerParameterName::LogbookTypeProcess),
      "workflowIdentifier" => Ok(WorkerParameterName::WorkflowIdentifier),
      other => Err(ProcessingError::ValidationError(format!("Parámetro de worker desconocido: {}", other))),
    }
  }
}

/// Subconjunto obligatorio por defecto de un contexto de ejecución.
pub const DEFAULT_MANDATORY: &[WorkerParameterName] = &[WorkerParameterName::UrlMetadata,
                                                        WorkerParameterName::UrlWorkspace,
                                                        WorkerParameterName::ObjectName,
                                                        WorkerParameterName::CurrentStep,
                                                        WorkerParameterName::ContainerName];

/// Contexto tipado de parámetros pasado a cada invocación de paso/acción.
///
/// Mantiene los valores en orden de inserción y aplica el contrato de
/// obligatoriedad en escritura. Los parámetros con valor JSON (listas,
/// metadatos) se guardan serializados y se deserializan perezosamente en
/// lectura; un blob corrupto es una violación de contrato aguas arriba y
/// se señala como `StateError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerParameters {
  values: IndexMap<WorkerParameterName, String>,
  #[serde(skip, default = "default_mandatory_set")]
  mandatory: HashSet<WorkerParameterName>,
}

fn default_mandatory_set() -> HashSet<WorkerParameterName> {
  DEFAULT_MANDATORY.iter().copied().collect()
}

impl Default for WorkerParameters {
  fn default() -> Self {
    Self::new()
  }
}

impl WorkerParameters {
  pub fn new() -> Self {
    Self { values: IndexMap::new(), mandatory: default_mandatory_set() }
  }

  /// Construye un contexto con un subconjunto obligatorio propio.
  pub fn with_mandatory(mandatory: &[WorkerParameterName]) -> Self {
    Self { values: IndexMap::new(), mandatory: mandatory.iter().copied().collect() }
  }

  /// Escribe un parámetro (fluido). Falla si el nombre pertenece al
  /// subconjunto obligatorio y el valor llega vacío.
  pub fn put_parameter_value(&mut self,
                             name: WorkerParameterName,
                             value: impl Into<String>)
                             -> Result<&mut Self, ProcessingError> {
    let value = value.into();
    if value.trim().is_empty() && self.mandatory.contains(&name) {
      return Err(ProcessingError::ValidationError(format!("El parámetro obligatorio {} no admite valor vacío", name)));
    }
    self.values.insert(name, value);
    Ok(self)
  }

  pub fn get_parameter_value(&self, name: WorkerParameterName) -> Option<&str> {
    self.values.get(&name).map(String::as_str)
  }

  /// Importa un mapa plano de transporte. Sólo se aceptan claves que son
  /// miembros de la enumeración; las desconocidas se ignoran en silencio
  /// para tolerar payloads de versiones posteriores.
  pub fn set_map(&mut self, map: &HashMap<String, String>) -> &mut Self {
    for (key, value) in map {
      if let Ok(name) = key.parse::<WorkerParameterName>() {
        self.values.insert(name, value.clone());
      }
    }
    self
  }

  /// Exporta el contexto como mapa plano para transporte.
  pub fn to_map(&self) -> HashMap<String, String> {
    self.values.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
  }

  /// Verifica que todo el subconjunto obligatorio está presente y no
  /// vacío antes de considerar el contexto listo para ejecutar.
  pub fn check_mandatory_parameters(&self) -> Result<(), ProcessingError> {
    for name in &self.mandatory {
      match self.values.get(name) {
        Some(v) if !v.trim().is_empty() => {}
        _ => {
          return Err(ProcessingError::ValidationError(format!("Falta el parámetro obligatorio {}", name)));
        }
      }
    }
    Ok(())
  }

  pub fn set_object_name_list(&mut self, list: &[String]) -> Result<&mut Self, ProcessingError> {
    let serialized = serde_json::to_string(list)?;
    self.values.insert(WorkerParameterName::ObjectNameList, serialized);
    Ok(self)
  }

  /// Lista de nombres de objeto, deserializada perezosamente.
  pub fn object_name_list(&self) -> Result<Vec<String>, ProcessingError> {
    self.read_json_parameter(WorkerParameterName::ObjectNameList)
  }

  /// Metadatos de objeto como JSON, deserializados perezosamente.
  pub fn object_metadata(&self) -> Result<JsonValue, ProcessingError> {
    self.read_json_parameter(WorkerParameterName::ObjectMetadata)
  }

  pub fn object_metadata_list(&self) -> Result<Vec<JsonValue>, ProcessingError> {
    self.read_json_parameter(WorkerParameterName::ObjectMetadataList)
  }

  fn read_json_parameter<T: serde::de::DeserializeOwned>(&self,
                                                         name: WorkerParameterName)
                                                         -> Result<T, ProcessingError> {
    let raw = self.values
                  .get(&name)
                  .ok_or_else(|| ProcessingError::ValidationError(format!("Parámetro {} no presente", name)))?;
    serde_json::from_str(raw).map_err(|e| {
      ProcessingError::StateError(format!("Parámetro {} con contenido JSON corrupto: {}", name, e))
    })
  }
}
