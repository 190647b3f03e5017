// report.rs
// Persistencia de los informes del control de coherencia: el informe se
// serializa, se deposita en un contenedor de staging de nombre único, se
// transfiere a la oferta durable bajo la categoría dedicada y el
// contenedor de staging se elimina.
use crate::errors::{Result, StorageError};
use crate::stores::{ObjectDescriptor, OfferStore, WorkspaceStore, REPORTS_CATEGORY};
use chrono::{DateTime, Utc};
use log::warn;
use logbook::model::{LogbookCheckError, LogbookCheckEvent, LogbookCheckResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Envoltorio serializado del informe: resultado de la pasada más la
/// fecha de generación.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
  pub tenant: i32,
  pub generated_at: DateTime<Utc>,
  pub checked_events: Vec<LogbookCheckEvent>,
  pub check_errors: Vec<LogbookCheckError>,
}

impl CheckReport {
  pub fn from_result(result: &LogbookCheckResult) -> Self {
    Self { tenant: result.tenant,
           generated_at: Utc::now(),
           checked_events: result.checked_events.clone(),
           check_errors: result.check_errors.clone() }
  }
}

/// Servicio de persistencia de informes sobre un workspace de staging y
/// una oferta durable inyectados.
pub struct ReportStorageService<W, O>
  where W: WorkspaceStore,
        O: OfferStore
{
  workspace: Arc<W>,
  offer: Arc<O>,
  strategy: String,
}

impl<W, O> ReportStorageService<W, O>
  where W: WorkspaceStore,
        O: OfferStore
{
  pub fn new(workspace: Arc<W>, offer: Arc<O>, strategy: impl Into<String>) -> Self {
    Self { workspace, offer, strategy: strategy.into() }
  }

  /// Persiste el informe en la oferta durable pasando por staging.
  ///
  /// Un resultado sin errores no genera ninguna llamada y devuelve
  /// `Ok(None)`. En caso contrario devuelve el nombre del objeto
  /// archivado. Cualquier fallo de staging o de la oferta se envuelve en
  /// `StorageError::Report` nombrando el artefacto; el contenedor de
  /// staging se elimina tras el éxito y su fallo de limpieza también se
  /// propaga.
  pub fn store_reports_in_storage(&self, result: &LogbookCheckResult) -> Result<Option<String>> {
    if result.is_empty() {
      return Ok(None);
    }

    let report = CheckReport::from_result(result);
    let payload = serde_json::to_vec(&report)?;

    let container = Uuid::new_v4().to_string();
    let object_name = format!("report_{}_{}.json", result.tenant, Uuid::new_v4());

    self.workspace
        .create_container(&container)
        .map_err(|e| report_error(&object_name, "staging", e))?;

    if let Err(e) = self.workspace.put_object(&container, &object_name, &payload) {
      self.cleanup_best_effort(&container);
      return Err(report_error(&object_name, "staging", e));
    }

    let descriptor = ObjectDescriptor { workspace_container: container.clone(),
                                        workspace_object_uri: object_name.clone() };
    if let Err(e) = self.offer
                        .store_from_staging(&self.strategy, REPORTS_CATEGORY, &object_name, &descriptor)
    {
      self.cleanup_best_effort(&container);
      return Err(report_error(&object_name, "oferta durable", e));
    }

    // la limpieza del staging forma parte del camino de éxito; su fallo
    // no se silencia
    self.workspace
        .delete_container(&container, true)
        .map_err(|e| report_error(&object_name, "limpieza de staging", e))?;

    Ok(Some(object_name))
  }

  fn cleanup_best_effort(&self, container: &str) {
    if let Err(e) = self.workspace.delete_container(container, true) {
      warn!("No se pudo limpiar el contenedor de staging {}: {}", container, e);
    }
  }
}

fn report_error(artifact: &str, stage: &str, source: StorageError) -> StorageError {
  StorageError::Report { artifact: artifact.to_string(), reason: format!("{}: {}", stage, source) }
}
