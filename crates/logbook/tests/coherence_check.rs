use archi_processing::load_workflow;
use logbook::coherence::{classified_operation_block, LogbookCheckConsistencyService};
use logbook::config::CheckConfig;
use logbook::model::{LifecycleDocument, LogbookEventType, OperationDocument, RawEvent};
use logbook::repository::LifeCycleStatus;
use logbook::stubs::{InMemoryLifecycleReader, InMemoryOperationRepository, InMemoryWorkflowSource};
use serde_json::json;
use std::sync::Arc;

const OP_ID: &str = "aeeaaaaaacgxemkbaaxjsaln3dbx2kaaaaaq";
const WORKFLOW_ID: &str = "PROCESS_SIP_UNITARY";

fn raw(ev_id: &str, parent: Option<&str>, operation: &str, ev_type: &str, outcome: &str) -> RawEvent {
  RawEvent { ev_id: ev_id.into(),
             ev_parent_id: parent.map(str::to_string),
             ev_id_proc: operation.into(),
             ev_type: ev_type.into(),
             outcome: outcome.into(),
             out_detail: format!("{}.{}", ev_type, outcome),
             ev_date_time: None }
}

fn operation_document(events: Vec<RawEvent>) -> OperationDocument {
  OperationDocument { id: OP_ID.into(),
                      event: raw(OP_ID, None, OP_ID, WORKFLOW_ID, "OK"),
                      events }
}

fn unit_lifecycle(id: &str, events: Vec<RawEvent>) -> LifecycleDocument {
  LifecycleDocument { id: id.into(),
                      event: raw(id, None, OP_ID, "LFC.LFC_CREATION", "OK"),
                      events }
}

fn ingest_workflow() -> archi_processing::WorkFlow {
  load_workflow(&json!({
    "id": "DefaultIngestWorkflow",
    "identifier": WORKFLOW_ID,
    "name": "Default Ingest Workflow",
    "typeProc": "INGEST",
    "steps": [{
      "workerGroupId": "DefaultWorker",
      "stepName": "STP_INGEST_CONTROL",
      "behavior": "BLOCKING",
      "distribution": { "kind": "LIST_IN_FILE", "element": "units" },
      "actions": [{ "action": { "actionKey": "CHECK_DIGEST", "behavior": "BLOCKING" } },
                  { "action": { "actionKey": "CHECK_STORAGE", "behavior": "NOBLOCKING" } }]
    }]
  }).to_string()).unwrap()
}

struct Fixture {
  operations: Arc<InMemoryOperationRepository>,
  lifecycles: Arc<InMemoryLifecycleReader>,
}

fn engine_with(config: CheckConfig,
               source: InMemoryWorkflowSource)
               -> (LogbookCheckConsistencyService<InMemoryOperationRepository,
                                                  InMemoryLifecycleReader,
                                                  InMemoryWorkflowSource>,
                   Fixture) {
  let operations = Arc::new(InMemoryOperationRepository::new());
  let lifecycles = Arc::new(InMemoryLifecycleReader::new());
  let engine = LogbookCheckConsistencyService::new(config,
                                                   operations.clone(),
                                                   lifecycles.clone(),
                                                   Arc::new(source));
  (engine, Fixture { operations, lifecycles })
}

fn lfc_config() -> CheckConfig {
  CheckConfig { op_with_lfc: vec![WORKFLOW_ID.to_string()], ..CheckConfig::default() }
}

#[test]
fn empty_tenant_produces_an_empty_result() {
  let (engine, _fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));
  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert!(result.check_errors.is_empty());
  assert!(result.checked_events.is_empty());
  assert!(result.is_empty());
}

#[test]
fn consistent_operation_and_lifecycles_yield_no_errors() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  let terminal = raw("ev-final", None, OP_ID, WORKFLOW_ID, "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action, terminal]));

  let lfc_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "OK");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::Committed, unit_lifecycle("unit-1", vec![lfc_action]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
  // el prefijo LFC. queda limpio en los eventos examinados
  assert!(result.checked_events.iter().any(|e| e.ev_type == "CHECK_DIGEST"));
  assert!(result.checked_events.iter().all(|e| !e.ev_type.starts_with("LFC.")));
}

#[test]
fn terminal_outcome_disagreement_is_reported_with_the_shared_ev_type() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));

  // el ciclo de vida registró KO para la misma acción
  let lfc_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "KO");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::Committed, unit_lifecycle("unit-1", vec![lfc_action]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors.len(), 1);
  assert_eq!(result.check_errors[0].checked_property, "CHECK_DIGEST");
}

#[test]
fn lifecycle_only_and_operation_only_events_are_both_reported() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));

  // el ciclo de vida registró otra acción que la operación no declara
  let foreign = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_STORAGE", "OK");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::Committed, unit_lifecycle("unit-1", vec![foreign]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  let properties: Vec<&str> = result.check_errors.iter().map(|e| e.checked_property.as_str()).collect();
  // CHECK_STORAGE sólo en ciclos de vida; CHECK_DIGEST sólo en la operación
  assert!(properties.contains(&"CHECK_STORAGE"));
  assert!(properties.contains(&"CHECK_DIGEST"));
  assert_eq!(result.check_errors.len(), 2);
}

#[test]
fn worst_outcome_wins_in_the_aggregation() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  // la acción se reintentó: primero KO, después OK; el agregado debe ser KO
  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let first = raw("ev-a1", Some("ev-step"), OP_ID, "CHECK_DIGEST", "KO");
  let second = raw("ev-a2", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, first, second]));

  let lfc_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "KO");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::Committed, unit_lifecycle("unit-1", vec![lfc_action]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn event_outside_the_workflow_is_reported() {
  let (engine, fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_NOT_DECLARED", "OK");
  fx.operations.add_operation(0, operation_document(vec![step]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors.len(), 1);
  assert_eq!(result.check_errors[0].checked_property, "STP_NOT_DECLARED");
  assert!(result.check_errors[0].saved.contains("not present in the workflow"));
}

#[test]
fn started_markers_are_exempt_from_the_workflow_check() {
  let (engine, fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let marker = raw("ev-marker", None, OP_ID, "STP_INGEST_CONTROL.STARTED", "STARTED");
  fx.operations.add_operation(0, operation_document(vec![marker]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn configured_exemptions_skip_the_workflow_check() {
  let config = CheckConfig { op_events_not_in_wf: vec!["STP_SANITY_CHECK".to_string()], ..CheckConfig::default() };
  let (engine, fx) = engine_with(config, InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_SANITY_CHECK", "OK");
  fx.operations.add_operation(0, operation_document(vec![step]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn unreachable_workflow_source_degrades_to_no_membership_check() {
  let (engine, fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::failing());

  let step = raw("ev-step", None, OP_ID, "STP_NOT_DECLARED", "OK");
  fx.operations.add_operation(0, operation_document(vec![step]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn unknown_operation_event_type_skips_the_membership_check() {
  // el workflow cargado no corresponde al eventType de la operación
  let other = load_workflow(&json!({
    "id": "Other", "identifier": "OTHER_PROCESS", "name": "Other", "typeProc": "AUDIT", "steps": []
  }).to_string()).unwrap();
  let (engine, fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::new(vec![other]));

  let step = raw("ev-step", None, OP_ID, "STP_NOT_DECLARED", "OK");
  fx.operations.add_operation(0, operation_document(vec![step]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn empty_operation_event_list_is_an_error() {
  let (engine, fx) = engine_with(CheckConfig::default(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));
  fx.operations.add_operation(0, operation_document(vec![]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors.len(), 1);
  assert!(result.check_errors[0].saved.contains("event list is empty"));
}

#[test]
fn lifecycle_scan_stops_after_the_matching_block() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));

  // historial del ciclo de vida: una operación anterior, el bloque de la
  // operación bajo control y una posterior con gramática inválida
  let earlier = raw("lfc-ev-0", None, "other-operation-1", "LFC.INGEST_OLD", "BROKEN_OUTCOME");
  let matching = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "OK");
  let later = raw("lfc-ev-2", None, "other-operation-2", "LFC.CHECK_TRAILING", "BROKEN_OUTCOME");
  fx.lifecycles.add_unit_lifecycle(OP_ID,
                                   LifeCycleStatus::Committed,
                                   unit_lifecycle("unit-1", vec![earlier, matching, later]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  // ni los eventos previos ni los posteriores al bloque se evalúan
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn in_process_lifecycles_are_also_scanned() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));

  // el ciclo de vida aún no consolidado discrepa
  let lfc_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "WARNING");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::InProcess, unit_lifecycle("unit-1", vec![lfc_action]));

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors.len(), 1);
  assert_eq!(result.check_errors[0].checked_property, "CHECK_DIGEST");
}

#[test]
fn object_group_lifecycles_participate_in_the_cross_check() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));

  let og_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "OK");
  let document = LifecycleDocument { id: "og-1".into(),
                                     event: raw("og-1", None, OP_ID, "LFC.LFC_CREATION", "OK"),
                                     events: vec![og_action] };
  fx.lifecycles.add_object_group_lifecycle(OP_ID, LifeCycleStatus::Committed, document);

  let result = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(result.check_errors, vec![]);
}

#[test]
fn two_runs_over_the_same_dataset_produce_identical_reports() {
  let (engine, fx) = engine_with(lfc_config(), InMemoryWorkflowSource::new(vec![ingest_workflow()]));

  let step = raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK");
  let action = raw("ev-action", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK");
  fx.operations.add_operation(0, operation_document(vec![step, action]));
  let lfc_action = raw("lfc-ev-1", None, OP_ID, "LFC.CHECK_DIGEST", "KO");
  fx.lifecycles.add_unit_lifecycle(OP_ID, LifeCycleStatus::Committed, unit_lifecycle("unit-1", vec![lfc_action]));

  let first = engine.logbook_coherence_check_by_tenant(0).unwrap();
  let second = engine.logbook_coherence_check_by_tenant(0).unwrap();
  assert_eq!(first.check_errors, second.check_errors);
  assert_eq!(first.checked_events, second.checked_events);
}

#[test]
fn classification_fold_over_an_operation_stream() {
  let events = vec![raw("ev-step", None, OP_ID, "STP_INGEST_CONTROL", "OK"),
                    raw("ev-a1", Some("ev-step"), OP_ID, "CHECK_SEDA", "OK"),
                    raw("ev-t1", Some("ev-a1"), OP_ID, "CHECK_SEDA.VALIDATION", "OK"),
                    raw("ev-t2", Some("ev-a1"), OP_ID, "CHECK_SEDA.FORMAT", "OK"),
                    raw("ev-a2", Some("ev-step"), OP_ID, "CHECK_DIGEST", "OK"),
                    raw("ev-step2", None, OP_ID, "STP_STORAGE", "OK")];

  let models = classified_operation_block(LogbookEventType::Operation, OP_ID, None, &events);
  let roles: Vec<LogbookEventType> = models.iter().map(|m| m.logbook_event_type).collect();
  assert_eq!(roles,
             vec![LogbookEventType::Step,
                  LogbookEventType::Action,
                  LogbookEventType::Task,
                  LogbookEventType::Task,
                  LogbookEventType::Action,
                  LogbookEventType::Step]);
  // las tareas heredan el evType de la acción que las precede
  assert_eq!(models[2].ev_type_parent.as_deref(), Some("CHECK_SEDA"));
  assert_eq!(models[3].ev_type_parent.as_deref(), Some("CHECK_SEDA"));
  assert_eq!(models[4].ev_type_parent, None);
}

#[test]
fn classification_fold_over_a_lifecycle_stream() {
  let events = vec![raw("lfc-a", None, OP_ID, "LFC.CHECK_DIGEST", "OK"),
                    raw("lfc-t", Some("lfc-a"), OP_ID, "LFC.CHECK_DIGEST.CALC", "OK")];

  let models = classified_operation_block(LogbookEventType::UnitLfc, OP_ID, Some("unit-1"), &events);
  assert_eq!(models[0].logbook_event_type, LogbookEventType::Action);
  assert_eq!(models[1].logbook_event_type, LogbookEventType::Task);
  assert_eq!(models[1].ev_type_parent.as_deref(), Some("CHECK_DIGEST"));
  assert_eq!(models[1].lfc_id.as_deref(), Some("unit-1"));
}
