use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use archi_processing::load_workflow;
use archi_storage::stubs::InMemoryOfferStore;
use archi_storage::{new_workspace_from_env, ReportStorageService, WorkspaceFileSystem, DEFAULT_STRATEGY};
use logbook::config::check_config_from_env;
use logbook::model::{LifecycleDocument, OperationDocument, RawEvent};
use logbook::repository::LifeCycleStatus;
use logbook::stubs::{InMemoryLifecycleReader, InMemoryOperationRepository, InMemoryWorkflowSource};
use logbook::LogbookCheckConsistencyService;

/// Pequeño menú interactivo de administración del logbook: ejecuta el
/// control de coherencia por tenant sobre un juego de datos de
/// demostración y permite almacenar el informe resultante.
///
/// Opciones soportadas:
/// 1) Ejecutar control de coherencia de un tenant
/// 2) Ejecutar control y almacenar el informe
/// 3) Salir
fn main() -> Result<(), Box<dyn Error>> {
    let mut config = check_config_from_env()?;
    if config.op_with_lfc.is_empty() {
        // el juego de datos de demo usa el workflow de ingesta
        config.op_with_lfc.push("PROCESS_SIP_UNITARY".to_string());
    }

    let operations = Arc::new(InMemoryOperationRepository::new());
    let lifecycles = Arc::new(InMemoryLifecycleReader::new());
    seed_demo_data(&operations, &lifecycles);

    let workflows = Arc::new(InMemoryWorkflowSource::new(vec![demo_workflow()?]));
    let engine = LogbookCheckConsistencyService::new(config, operations, lifecycles, workflows);

    loop {
        println!("\n== Logbook admin menu ==");
        println!("1) Ejecutar control de coherencia de un tenant");
        println!("2) Ejecutar control y almacenar el informe");
        println!("3) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                let tenant = prompt_tenant()?;
                match engine.logbook_coherence_check_by_tenant(tenant) {
                    Ok(result) => {
                        println!("Eventos examinados: {}", result.checked_events.len());
                        println!("Inconsistencias: {}", result.check_errors.len());
                        for error in &result.check_errors {
                            println!("- [{}] {} | guardado: {} | esperado: {}",
                                     error.operation_id, error.checked_property, error.saved, error.expected);
                        }
                    }
                    Err(e) => eprintln!("Error ejecutando el control: {}", e),
                }
            }
            "2" => {
                let tenant = prompt_tenant()?;
                match engine.logbook_coherence_check_by_tenant(tenant) {
                    Ok(result) => {
                        let workspace = Arc::new(demo_workspace()?);
                        let offer = Arc::new(InMemoryOfferStore::new(workspace.clone()));
                        let storage = ReportStorageService::new(workspace, offer, DEFAULT_STRATEGY);
                        match storage.store_reports_in_storage(&result) {
                            Ok(Some(name)) => println!("Informe almacenado: {}", name),
                            Ok(None) => println!("Sin inconsistencias: no se almacena informe"),
                            Err(e) => eprintln!("Error almacenando el informe: {}", e),
                        }
                    }
                    Err(e) => eprintln!("Error ejecutando el control: {}", e),
                }
            }
            "3" => break,
            other => println!("Opción no reconocida: {}", other),
        }
    }

    Ok(())
}

fn prompt_tenant() -> Result<i32, Box<dyn Error>> {
    print!("Tenant (enter para 0): ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    Ok(trimmed.parse()?)
}

/// Workspace de staging: el configurado por entorno o, en su defecto, un
/// directorio temporal local.
fn demo_workspace() -> Result<WorkspaceFileSystem, Box<dyn Error>> {
    match new_workspace_from_env() {
        Ok(workspace) => Ok(workspace),
        Err(_) => Ok(WorkspaceFileSystem::new(std::env::temp_dir().join("archiflow-workspace"))?),
    }
}

fn demo_workflow() -> Result<archi_processing::WorkFlow, Box<dyn Error>> {
    let definition = serde_json::json!({
        "id": "DefaultIngestWorkflow",
        "identifier": "PROCESS_SIP_UNITARY",
        "name": "Default Ingest Workflow",
        "typeProc": "INGEST",
        "steps": [{
            "workerGroupId": "DefaultWorker",
            "stepName": "STP_INGEST_CONTROL",
            "behavior": "BLOCKING",
            "distribution": { "kind": "LIST_IN_FILE", "element": "units" },
            "actions": [{ "action": { "actionKey": "CHECK_DIGEST", "behavior": "BLOCKING" } }]
        }]
    });
    Ok(load_workflow(&definition.to_string())?)
}

fn raw(ev_id: &str, parent: Option<&str>, operation: &str, ev_type: &str, outcome: &str) -> RawEvent {
    RawEvent { ev_id: ev_id.into(),
               ev_parent_id: parent.map(str::to_string),
               ev_id_proc: operation.into(),
               ev_type: ev_type.into(),
               outcome: outcome.into(),
               out_detail: format!("{}.{}", ev_type, outcome),
               ev_date_time: None }
}

/// Dos operaciones de ejemplo en el tenant 0: una coherente y otra cuyo
/// ciclo de vida discrepa del diario de operaciones.
fn seed_demo_data(operations: &InMemoryOperationRepository, lifecycles: &InMemoryLifecycleReader) {
    let op_ok = "demo-operation-consistent";
    operations.add_operation(0,
                             OperationDocument { id: op_ok.into(),
                                                 event: raw(op_ok, None, op_ok, "PROCESS_SIP_UNITARY", "OK"),
                                                 events: vec![raw("ev-s1", None, op_ok, "STP_INGEST_CONTROL", "OK"),
                                                              raw("ev-a1",
                                                                  Some("ev-s1"),
                                                                  op_ok,
                                                                  "CHECK_DIGEST",
                                                                  "OK")] });
    lifecycles.add_unit_lifecycle(op_ok,
                                  LifeCycleStatus::Committed,
                                  LifecycleDocument { id: "unit-demo-1".into(),
                                                      event: raw("unit-demo-1", None, op_ok, "LFC.LFC_CREATION", "OK"),
                                                      events: vec![raw("lfc-1",
                                                                       None,
                                                                       op_ok,
                                                                       "LFC.CHECK_DIGEST",
                                                                       "OK")] });

    let op_ko = "demo-operation-divergent";
    operations.add_operation(0,
                             OperationDocument { id: op_ko.into(),
                                                 event: raw(op_ko, None, op_ko, "PROCESS_SIP_UNITARY", "OK"),
                                                 events: vec![raw("ev-s2", None, op_ko, "STP_INGEST_CONTROL", "OK"),
                                                              raw("ev-a2",
                                                                  Some("ev-s2"),
                                                                  op_ko,
                                                                  "CHECK_DIGEST",
                                                                  "OK")] });
    lifecycles.add_unit_lifecycle(op_ko,
                                  LifeCycleStatus::Committed,
                                  LifecycleDocument { id: "unit-demo-2".into(),
                                                      event: raw("unit-demo-2", None, op_ko, "LFC.LFC_CREATION", "OK"),
                                                      events: vec![raw("lfc-2",
                                                                       None,
                                                                       op_ko,
                                                                       "LFC.CHECK_DIGEST",
                                                                       "KO")] });
}
