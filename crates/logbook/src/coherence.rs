// Archivo: coherence.rs
// Propósito: motor de control de coherencia del logbook. Reconstruye la
// jerarquía esperada de eventos (STEP→ACTION→TASK) a partir del flujo
// almacenado, valida cada evento, controla la pertenencia al workflow y
// cruza los agregados de la operación contra los ciclos de vida.
use crate::config::CheckConfig;
use crate::details_check::LogbookDetailsCheckService;
use crate::errors::Result;
use crate::model::{clear_lfc_prefix, EventModel, LogbookCheckError, LogbookCheckEvent, LogbookCheckResult,
                   LogbookEventType, OperationDocument, OutcomeStatus, RawEvent, STEP_STARTED_SUFFIX};
use crate::repository::{LifeCycleStatus, LifecycleReader, OperationRepository, WorkflowDefinitionSource};
use log::{error, warn};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

const SAVED_WORKFLOW_NOT_EXISTS_MSG: &str = "The saved logbook event evType value %s, is not present in the workflow";
const EXPECTED_WORKFLOW_NOT_EXISTS_MSG: &str = "The logbook event %s, must be present in the workflow";
const SAVED_EVENTS_EMPTY_MSG: &str = "The logbook operation's event list is empty";
const EXPECTED_EVENTS_EMPTY_MSG: &str = "The logbook operation's event list must not be empty";

/// Clasifica el bloque de eventos de un documento que pertenece a la
/// operación indicada: selecciona el bloque contiguo de eventos cuyo
/// `ev_id_proc` coincide y clasifica cada uno plegando sobre el evento
/// anterior (la clasificación depende del rol calculado del vecino
/// inmediato, por lo que el recorrido es inherentemente secuencial).
///
/// Nota sobre la regla de contigüidad: se asume que los eventos de una
/// misma operación se anexan contiguos al documento; el escaneo se corta
/// en el primer evento de otra operación posterior al bloque. Los
/// documentos de ciclo de vida mezclan el historial de varias
/// operaciones; lo que siga al bloque no se evalúa.
pub fn classified_operation_block(stream: LogbookEventType,
                                  operation_id: &str,
                                  lfc_id: Option<&str>,
                                  events: &[RawEvent])
                                  -> Vec<EventModel> {
    let mut out: Vec<EventModel> = Vec::new();
    let mut seen = false;
    for raw in events {
        if raw.ev_id_proc == operation_id {
            seen = true;
        } else if seen {
            break;
        } else {
            continue;
        }

        let (role, parent) = classify_one(stream, raw.ev_parent_id.as_deref(), out.last());
        let mut model = EventModel::from_raw(raw, operation_id, lfc_id, role);
        model.ev_type_parent = parent;
        out.push(model);
    }
    out
}

/// Un paso del plegado de clasificación: calcula el rol del evento y su
/// evType padre a partir del evento anterior ya clasificado.
fn classify_one(stream: LogbookEventType,
                ev_parent_id: Option<&str>,
                previous: Option<&EventModel>)
                -> (LogbookEventType, Option<String>) {
    match stream {
        LogbookEventType::Operation => match ev_parent_id {
            // sin padre: evento de nivel STEP
            None => (LogbookEventType::Step, None),
            Some(parent_id) => match previous {
                Some(prev) => {
                    if prev.ev_parent_id.as_deref() == Some(parent_id) {
                        // mismo nivel que el anterior: mismo rol y mismo padre
                        (prev.logbook_event_type, prev.ev_type_parent.clone())
                    } else {
                        // cambio de nivel respecto del anterior
                        match prev.logbook_event_type {
                            LogbookEventType::Step => (LogbookEventType::Action, None),
                            LogbookEventType::Action => (LogbookEventType::Task, Some(prev.ev_type.clone())),
                            LogbookEventType::Task => (LogbookEventType::Action, None),
                            _ => (LogbookEventType::Default, None),
                        }
                    }
                }
                None => (LogbookEventType::Default, None),
            },
        },
        // los ciclos de vida no tienen nivel STEP: sólo acciones y tareas
        LogbookEventType::UnitLfc | LogbookEventType::ObjectgroupLfc => match ev_parent_id {
            None => (LogbookEventType::Action, None),
            Some(_) => (LogbookEventType::Task, previous.map(|p| p.ev_type.clone())),
        },
        _ => (LogbookEventType::Default, None),
    }
}

#[derive(Clone, Copy)]
enum LfcDocumentKind {
    Unit,
    ObjectGroup,
}

/// Motor de control de coherencia del logbook.
///
/// Es una pasada administrativa, síncrona y por tenant. Los colaboradores
/// se inyectan por constructor; el mapa de eventTypes legítimos por
/// workflow se calcula una sola vez de forma perezosa (seguro ante un
/// primer acceso concurrente) y un fallo de carga degrada el control de
/// pertenencia a no-op en lugar de abortar la pasada.
pub struct LogbookCheckConsistencyService<OP, LFC, WF>
    where OP: OperationRepository,
          LFC: LifecycleReader,
          WF: WorkflowDefinitionSource
{
    config: CheckConfig,
    operations: Arc<OP>,
    lifecycles: Arc<LFC>,
    workflows: Arc<WF>,
    details: LogbookDetailsCheckService,
    workflow_event_types: OnceCell<HashMap<String, HashSet<String>>>,
}

impl<OP, LFC, WF> LogbookCheckConsistencyService<OP, LFC, WF>
    where OP: OperationRepository,
          LFC: LifecycleReader,
          WF: WorkflowDefinitionSource
{
    pub fn new(config: CheckConfig, operations: Arc<OP>, lifecycles: Arc<LFC>, workflows: Arc<WF>) -> Self {
        Self { config,
               operations,
               lifecycles,
               workflows,
               details: LogbookDetailsCheckService::new(),
               workflow_event_types: OnceCell::new() }
    }

    /// Control de coherencia completo de un tenant. Las inconsistencias
    /// nunca se lanzan: se acumulan y se devuelven en el resultado.
    pub fn logbook_coherence_check_by_tenant(&self, tenant: i32) -> Result<LogbookCheckResult> {
        let allowed_map = self.workflow_event_types();

        let mut errors: Vec<LogbookCheckError> = Vec::new();
        let mut checked: HashSet<LogbookCheckEvent> = HashSet::new();

        // recorrido por lotes: sólo una página de operaciones en memoria
        let mut offset = 0usize;
        loop {
            let batch = self.operations.operations_by_tenant(tenant, offset, self.config.batch_size)?;
            let batch_len = batch.len();
            for operation in &batch {
                self.check_operation(operation, allowed_map, &mut checked, &mut errors);
            }
            if batch_len < self.config.batch_size {
                break;
            }
            offset += self.config.batch_size;
        }

        // orden estable para que dos pasadas sobre los mismos datos
        // produzcan informes idénticos
        let mut checked_events: Vec<LogbookCheckEvent> = checked.into_iter().collect();
        checked_events.sort_by(|a, b| {
            (&a.ev_type, &a.outcome, &a.out_detail).cmp(&(&b.ev_type, &b.outcome, &b.out_detail))
        });

        Ok(LogbookCheckResult { tenant, checked_events, check_errors: errors })
    }

    /// Controla todos los tenants configurados, en secuencia.
    pub fn check_all_tenants(&self, tenants: &[i32]) -> Result<Vec<LogbookCheckResult>> {
        tenants.iter().map(|tenant| self.logbook_coherence_check_by_tenant(*tenant)).collect()
    }

    fn check_operation(&self,
                       operation: &OperationDocument,
                       allowed_map: &HashMap<String, HashSet<String>>,
                       checked: &mut HashSet<LogbookCheckEvent>,
                       errors: &mut Vec<LogbookCheckError>) {
        let operation_id = operation.id.as_str();
        let operation_ev_type = clear_lfc_prefix(&operation.event.ev_type).to_string();

        // sin entrada en el mapa no hay control de pertenencia (workflow
        // desconocido o definiciones no cargadas)
        let allowed = allowed_map.get(&operation_ev_type);

        // evento raíz de la operación
        let root = EventModel::from_raw(&operation.event, operation_id, None, LogbookEventType::Operation);
        errors.extend(self.details.check_event(&root));

        let mut map_op_events: BTreeMap<String, EventModel> = BTreeMap::new();
        if operation.events.is_empty() {
            errors.push(LogbookCheckError::new(operation_id,
                                               "",
                                               root.ev_type.clone(),
                                               SAVED_EVENTS_EMPTY_MSG,
                                               EXPECTED_EVENTS_EMPTY_MSG));
        } else {
            let models =
                classified_operation_block(LogbookEventType::Operation, operation_id, None, &operation.events);
            self.check_events(&models, allowed, &mut map_op_events, checked, errors);
        }

        // sólo los tipos de operación con ciclos de vida se cruzan
        if !self.config.op_with_lfc.contains(&operation_ev_type) {
            return;
        }

        let mut map_lfc_events: BTreeMap<String, EventModel> = BTreeMap::new();
        for status in [LifeCycleStatus::Committed, LifeCycleStatus::InProcess] {
            if let Err(e) = self.scan_lifecycles(LfcDocumentKind::Unit, status, operation_id, allowed,
                                                 &mut map_lfc_events, checked, errors)
            {
                error!("Fallo leyendo los ciclos de vida de unidades de {}: {}", operation_id, e);
            }
            if let Err(e) = self.scan_lifecycles(LfcDocumentKind::ObjectGroup, status, operation_id, allowed,
                                                 &mut map_lfc_events, checked, errors)
            {
                error!("Fallo leyendo los ciclos de vida de grupos de objetos de {}: {}", operation_id, e);
            }
        }

        // el evento terminal de la operación y los eventTypes excluidos
        // no participan del cruce
        map_op_events.remove(&operation_ev_type);
        for skipped in &self.config.op_lfc_events_to_skip {
            map_op_events.remove(skipped);
        }

        errors.extend(self.details.check_lfc_and_operation(&map_op_events, &map_lfc_events));
    }

    /// Controla una lista de eventos ya clasificados: pertenencia al
    /// workflow (STEP/ACTION), gramática por evento y agregación del peor
    /// resultado por eventType.
    fn check_events(&self,
                    models: &[EventModel],
                    allowed: Option<&HashSet<String>>,
                    map_events: &mut BTreeMap<String, EventModel>,
                    checked: &mut HashSet<LogbookCheckEvent>,
                    errors: &mut Vec<LogbookCheckError>) {
        for model in models {
            checked.insert(LogbookCheckEvent { ev_type: model.ev_type.clone(),
                                               outcome: model.outcome.clone(),
                                               out_detail: model.out_detail.clone() });

            if matches!(model.logbook_event_type, LogbookEventType::Step | LogbookEventType::Action) {
                if let Some(allowed) = allowed {
                    if !allowed.contains(&model.ev_type)
                       && !model.ev_type.ends_with(STEP_STARTED_SUFFIX)
                       && !self.config.op_events_not_in_wf.contains(&model.ev_type)
                    {
                        errors.push(LogbookCheckError::new(model.operation_id.as_str(),
                                                           model.lfc_id.clone().unwrap_or_default(),
                                                           model.ev_type.as_str(),
                                                           SAVED_WORKFLOW_NOT_EXISTS_MSG.replace("%s", &model.ev_type),
                                                           EXPECTED_WORKFLOW_NOT_EXISTS_MSG.replace("%s",
                                                                                                    &model.ev_type)));
                    }
                }
            }

            errors.extend(self.details.check_event(model));

            // los STEP y los marcadores "...STARTED" no se agregan
            if model.logbook_event_type != LogbookEventType::Step && !model.ev_type.ends_with(STEP_STARTED_SUFFIX) {
                aggregate_worst(map_events, model);
            }
        }
    }

    fn scan_lifecycles(&self,
                       kind: LfcDocumentKind,
                       status: LifeCycleStatus,
                       operation_id: &str,
                       allowed: Option<&HashSet<String>>,
                       map_lfc_events: &mut BTreeMap<String, EventModel>,
                       checked: &mut HashSet<LogbookCheckEvent>,
                       errors: &mut Vec<LogbookCheckError>)
                       -> Result<()> {
        let limit = self.config.lifecycle_page_size;
        let mut offset = 0usize;
        loop {
            let documents = match kind {
                LfcDocumentKind::Unit => {
                    self.lifecycles.unit_lifecycles_by_operation(operation_id, status, offset, limit)?
                }
                LfcDocumentKind::ObjectGroup => {
                    self.lifecycles.object_group_lifecycles_by_operation(operation_id, status, offset, limit)?
                }
            };
            let page_len = documents.len();

            let stream = match kind {
                LfcDocumentKind::Unit => LogbookEventType::UnitLfc,
                LfcDocumentKind::ObjectGroup => LogbookEventType::ObjectgroupLfc,
            };
            for document in documents {
                // evento raíz del documento de ciclo de vida
                let root = EventModel::from_raw(&document.event, operation_id, Some(&document.id), stream);
                errors.extend(self.details.check_event(&root));

                if !document.events.is_empty() {
                    let models =
                        classified_operation_block(stream, operation_id, Some(&document.id), &document.events);
                    self.check_events(&models, allowed, map_lfc_events, checked, errors);
                }
            }

            if page_len < limit {
                return Ok(());
            }
            offset += limit;
        }
    }

    /// Mapa workflowIdentifier → eventTypes legítimos, calculado una sola
    /// vez. Un fallo del colaborador degrada a mapa vacío: el control de
    /// pertenencia se omite en esta pasada.
    fn workflow_event_types(&self) -> &HashMap<String, HashSet<String>> {
        self.workflow_event_types.get_or_init(|| {
            match self.workflows.list_workflow_definitions() {
                Ok(workflows) => {
                    workflows.iter().map(|wf| (wf.identifier.clone(), wf.event_types())).collect()
                }
                Err(e) => {
                    warn!("No se pudieron cargar las definiciones de workflow: {}", e);
                    HashMap::new()
                }
            }
        })
    }
}

/// Conserva en el mapa el peor evento visto por eventType (mayor peso de
/// `OutcomeStatus`). Un outcome no reconocido nunca desplaza a uno
/// reconocido.
fn aggregate_worst(map_events: &mut BTreeMap<String, EventModel>, model: &EventModel) {
    match map_events.get(&model.ev_type) {
        None => {
            map_events.insert(model.ev_type.clone(), model.clone());
        }
        Some(existing) => {
            let candidate = model.outcome.parse::<OutcomeStatus>();
            let current = existing.outcome.parse::<OutcomeStatus>();
            let replace = match (candidate, current) {
                (Ok(new), Ok(old)) => new.weight() > old.weight(),
                (Ok(_), Err(())) => true,
                _ => false,
            };
            if replace {
                map_events.insert(model.ev_type.clone(), model.clone());
            }
        }
    }
}
