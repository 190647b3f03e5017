use archi_storage::stubs::{InMemoryOfferStore, InMemoryWorkspaceStore};
use archi_storage::{ReportStorageService, StorageError, DEFAULT_STRATEGY, REPORTS_CATEGORY};
use logbook::model::{LogbookCheckError, LogbookCheckResult};
use std::sync::Arc;

fn result_with_errors(tenant: i32, count: usize) -> LogbookCheckResult {
  let check_errors = (0..count).map(|i| {
                                 LogbookCheckError::new(format!("op-{}", i),
                                                        "",
                                                        "CHECK_DIGEST",
                                                        "The saved event outcome value is KO",
                                                        "The expected logbook operation outcome value is OK")
                               })
                               .collect();
  LogbookCheckResult { tenant, checked_events: Vec::new(), check_errors }
}

#[test]
fn empty_result_performs_zero_storage_calls() {
  let workspace = Arc::new(InMemoryWorkspaceStore::new());
  let offer = Arc::new(InMemoryOfferStore::new(workspace.clone()));
  let service = ReportStorageService::new(workspace.clone(), offer.clone(), DEFAULT_STRATEGY);

  let stored = service.store_reports_in_storage(&result_with_errors(0, 0)).unwrap();
  assert_eq!(stored, None);
  assert_eq!(workspace.call_count(), 0);
  assert_eq!(offer.call_count(), 0);
}

#[test]
fn report_is_staged_stored_and_staging_is_cleaned_up() {
  let workspace = Arc::new(InMemoryWorkspaceStore::new());
  let offer = Arc::new(InMemoryOfferStore::new(workspace.clone()));
  let service = ReportStorageService::new(workspace.clone(), offer.clone(), DEFAULT_STRATEGY);

  let stored = service.store_reports_in_storage(&result_with_errors(1, 2)).unwrap();
  let object_name = stored.expect("el informe debió almacenarse");
  assert!(object_name.starts_with("report_1_"));
  assert!(object_name.ends_with(".json"));

  // el objeto quedó en la oferta bajo la categoría dedicada
  let archived = offer.stored_object(REPORTS_CATEGORY, &object_name).expect("objeto archivado");
  let report: serde_json::Value = serde_json::from_slice(&archived).unwrap();
  assert_eq!(report["tenant"], 1);
  assert_eq!(report["checkErrors"].as_array().unwrap().len(), 2);

  // el contenedor de staging no sobrevive al éxito
  assert_eq!(workspace.container_count(), 0);
}

#[test]
fn durable_store_failure_is_wrapped_naming_the_artifact() {
  let workspace = Arc::new(InMemoryWorkspaceStore::new());
  let offer = Arc::new(InMemoryOfferStore::failing(workspace.clone()));
  let service = ReportStorageService::new(workspace.clone(), offer, DEFAULT_STRATEGY);

  let err = service.store_reports_in_storage(&result_with_errors(2, 1)).unwrap_err();
  match err {
    StorageError::Report { artifact, .. } => assert!(artifact.starts_with("report_2_")),
    other => panic!("se esperaba StorageError::Report, no {:?}", other),
  }
  // la limpieza best-effort no deja contenedores colgando
  assert_eq!(workspace.container_count(), 0);
}
