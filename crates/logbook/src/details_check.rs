// Archivo: details_check.rs
// Propósito: controles de detalle por evento (gramática de evType,
// outcome y outDetail) y cruce de agregados operación/ciclos de vida.
// Las violaciones no son errores del programa: son datos de primera
// clase que se acumulan en el informe.
use crate::model::{EventModel, LogbookCheckError, LogbookEventType, OutcomeStatus};
use regex::Regex;
use std::collections::BTreeMap;

const SAVED_EVTYPE_MSG: &str = "The saved event evType value is";
const EXPECTED_EVTYPE_MSG: &str = "The event evType value must be prefixed by the parent evType";
const SAVED_OUTCOME_MSG: &str = "The saved event outcome value is";
const EXPECTED_OUTCOME_MSG: &str = "The outcome value must be one of the allowed status tokens";
const SAVED_OUTDETAIL_MSG: &str = "The saved event outDetail value is";
const EXPECTED_OUTDETAIL_MSG: &str = "The outDetail value must match evType(.subtask)*.outcome";
const SAVED_LFC_OUTCOME_MSG: &str = "The saved lifecycle event outcome value is";
const EXPECTED_OP_OUTCOME_MSG: &str = "The expected logbook operation outcome value is";
const SAVED_LFC_NOT_IN_OP_MSG: &str = "The lifecycle event is not present in the logbook operation";
const EXPECTED_LFC_IN_OP_MSG: &str = "The event must be present in the logbook operation";
const SAVED_OP_NOT_IN_LFC_MSG: &str = "The logbook operation event is not present in the lifecycles";
const EXPECTED_OP_IN_LFC_MSG: &str = "The event must be present in the unit or object-group lifecycles";

/// Servicio de control de propiedades de eventos del logbook.
///
/// No mantiene estado: cada método devuelve la lista (posiblemente
/// vacía) de inconsistencias detectadas y nunca corta el escaneo.
#[derive(Debug, Default)]
pub struct LogbookDetailsCheckService;

impl LogbookDetailsCheckService {
    pub fn new() -> Self {
        Self
    }

    /// Controla la gramática de un evento: prefijo del evType para las
    /// tareas, pertenencia del outcome al conjunto cerrado y forma del
    /// outDetail (`^evType(\.\w+)*\.outcome$`).
    pub fn check_event(&self, event: &EventModel) -> Vec<LogbookCheckError> {
        let mut errors = Vec::new();

        // el evType de una TASK debe heredar el de su padre
        if event.logbook_event_type == LogbookEventType::Task {
            let well_prefixed = event.ev_type_parent
                                     .as_deref()
                                     .map(|parent| event.ev_type.starts_with(&format!("{}.", parent)))
                                     .unwrap_or(false);
            if !well_prefixed {
                errors.push(LogbookCheckError::new(event.operation_id.as_str(),
                                                   event.lfc_id.clone().unwrap_or_default(),
                                                   event.ev_type.as_str(),
                                                   format!("{} {}", SAVED_EVTYPE_MSG, event.ev_type),
                                                   format!("{} {}",
                                                           EXPECTED_EVTYPE_MSG,
                                                           event.ev_type_parent.as_deref().unwrap_or(""))));
            }
        }

        let outcome_known = event.outcome.parse::<OutcomeStatus>().is_ok();
        if !outcome_known {
            errors.push(LogbookCheckError::new(event.operation_id.as_str(),
                                               event.lfc_id.clone().unwrap_or_default(),
                                               event.ev_type.as_str(),
                                               format!("{} {}", SAVED_OUTCOME_MSG, event.outcome),
                                               EXPECTED_OUTCOME_MSG));
        }

        // el patrón depende del evType y del outcome del propio evento
        let pattern = format!("^{}(\\.\\w+)*\\.{}$",
                              regex::escape(&event.ev_type),
                              regex::escape(&event.outcome));
        let matches = Regex::new(&pattern).map(|re| re.is_match(&event.out_detail)).unwrap_or(false);
        if !matches {
            errors.push(LogbookCheckError::new(event.operation_id.as_str(),
                                               event.lfc_id.clone().unwrap_or_default(),
                                               event.ev_type.as_str(),
                                               format!("{} {}", SAVED_OUTDETAIL_MSG, event.out_detail),
                                               EXPECTED_OUTDETAIL_MSG));
        }

        errors
    }

    /// Cruza el agregado de eventos de la operación contra el agregado de
    /// los ciclos de vida: todo evType del ciclo de vida debe existir en
    /// la operación con el mismo outcome, y viceversa.
    pub fn check_lfc_and_operation(&self,
                                   map_op_events: &BTreeMap<String, EventModel>,
                                   map_lfc_events: &BTreeMap<String, EventModel>)
                                   -> Vec<LogbookCheckError> {
        let mut errors = Vec::new();
        let mut remaining: BTreeMap<&str, &EventModel> =
            map_op_events.iter().map(|(k, v)| (k.as_str(), v)).collect();

        for (ev_type, lfc_event) in map_lfc_events {
            match remaining.remove(ev_type.as_str()) {
                Some(op_event) => {
                    if op_event.outcome != lfc_event.outcome {
                        errors.push(LogbookCheckError::new(lfc_event.operation_id.as_str(),
                                                           lfc_event.lfc_id.clone().unwrap_or_default(),
                                                           ev_type.as_str(),
                                                           format!("{} {}", SAVED_LFC_OUTCOME_MSG, lfc_event.outcome),
                                                           format!("{} {}",
                                                                   EXPECTED_OP_OUTCOME_MSG,
                                                                   op_event.outcome)));
                    }
                }
                None => {
                    errors.push(LogbookCheckError::new(lfc_event.operation_id.as_str(),
                                                       lfc_event.lfc_id.clone().unwrap_or_default(),
                                                       ev_type.as_str(),
                                                       format!("{} ({})", SAVED_LFC_NOT_IN_OP_MSG, ev_type),
                                                       EXPECTED_LFC_IN_OP_MSG));
                }
            }
        }

        // lo que queda en la operación no fue confirmado por ningún ciclo
        for (ev_type, op_event) in remaining {
            errors.push(LogbookCheckError::new(op_event.operation_id.as_str(),
                                               op_event.lfc_id.clone().unwrap_or_default(),
                                               ev_type,
                                               format!("{} ({})", SAVED_OP_NOT_IN_LFC_MSG, ev_type),
                                               EXPECTED_OP_IN_LFC_MSG));
        }

        errors
    }
}
