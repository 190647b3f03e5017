// Archivo: model.rs
// Propósito: modelo tipado de los eventos del logbook y de los resultados
// del control de coherencia. La única frontera "stringly-typed" con la
// representación de almacenamiento son los tipos Raw* y la función de
// mapeo `EventModel::from_raw`.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefijo con el que los documentos de ciclo de vida marcan los códigos
/// copiados de la operación; el control de coherencia es agnóstico a él.
pub const LFC_EVENT_TYPE_PREFIX: &str = "LFC.";

/// Sufijo de los marcadores de arranque de paso.
pub const STEP_STARTED_SUFFIX: &str = ".STARTED";

/// Rol estructural de un evento dentro de su documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogbookEventType {
    Operation,
    UnitLfc,
    ObjectgroupLfc,
    Step,
    Action,
    Task,
    Default,
}

/// Conjunto cerrado de resultados admitidos en `outcome`, con su peso
/// para la agregación "el peor gana".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Started,
    AlreadyExecuted,
    Ok,
    Warning,
    Ko,
    Fatal,
}

impl OutcomeStatus {
    pub fn weight(&self) -> u32 {
        match self {
            OutcomeStatus::Started => 0,
            OutcomeStatus::AlreadyExecuted => 1,
            OutcomeStatus::Ok => 2,
            OutcomeStatus::Warning => 3,
            OutcomeStatus::Ko => 4,
            OutcomeStatus::Fatal => 5,
        }
    }

    pub const ALL: &'static [OutcomeStatus] = &[OutcomeStatus::Started,
                                                OutcomeStatus::AlreadyExecuted,
                                                OutcomeStatus::Ok,
                                                OutcomeStatus::Warning,
                                                OutcomeStatus::Ko,
                                                OutcomeStatus::Fatal];
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeStatus::Started => "STARTED",
            OutcomeStatus::AlreadyExecuted => "ALREADY_EXECUTED",
            OutcomeStatus::Ok => "OK",
            OutcomeStatus::Warning => "WARNING",
            OutcomeStatus::Ko => "KO",
            OutcomeStatus::Fatal => "FATAL",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OutcomeStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(OutcomeStatus::Started),
            "ALREADY_EXECUTED" => Ok(OutcomeStatus::AlreadyExecuted),
            "OK" => Ok(OutcomeStatus::Ok),
            "WARNING" => Ok(OutcomeStatus::Warning),
            "KO" => Ok(OutcomeStatus::Ko),
            "FATAL" => Ok(OutcomeStatus::Fatal),
            _ => Err(()),
        }
    }
}

/// Evento tal y como llega del almacenamiento, con los nombres de campo
/// del formato persistido.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub ev_id: String,
    #[serde(default)]
    pub ev_parent_id: Option<String>,
    pub ev_id_proc: String,
    pub ev_type: String,
    pub outcome: String,
    pub out_detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_date_time: Option<String>,
}

/// Documento de operación: evento raíz más la lista ordenada de eventos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub event: RawEvent,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Documento de ciclo de vida (unidad u objeto) con su historial completo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub event: RawEvent,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Evento del logbook ya clasificado y con los prefijos de ciclo de vida
/// eliminados. Es la única representación sobre la que trabajan los
/// servicios de control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventModel {
    pub ev_id: String,
    pub ev_parent_id: Option<String>,
    pub outcome: String,
    pub ev_type: String,
    pub ev_type_parent: Option<String>,
    pub out_detail: String,
    pub logbook_event_type: LogbookEventType,
    pub operation_id: String,
    pub lfc_id: Option<String>,
}

impl EventModel {
    /// Mapea un evento crudo al modelo tipado: limpia el prefijo "LFC."
    /// de `ev_type`/`out_detail` y anota la procedencia.
    pub fn from_raw(raw: &RawEvent,
                    operation_id: &str,
                    lfc_id: Option<&str>,
                    logbook_event_type: LogbookEventType)
                    -> Self {
        Self { ev_id: raw.ev_id.clone(),
               ev_parent_id: raw.ev_parent_id.clone(),
               outcome: raw.outcome.clone(),
               ev_type: clear_lfc_prefix(&raw.ev_type).to_string(),
               ev_type_parent: None,
               out_detail: clear_lfc_prefix(&raw.out_detail).to_string(),
               logbook_event_type,
               operation_id: operation_id.to_string(),
               lfc_id: lfc_id.map(str::to_string) }
    }
}

/// Elimina el prefijo "LFC." si está presente.
pub fn clear_lfc_prefix(property: &str) -> &str {
    property.strip_prefix(LFC_EVENT_TYPE_PREFIX).unwrap_or(property)
}

/// Una inconsistencia detectada: valor guardado frente a valor/regla
/// esperada. Se crea una vez y no se muta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookCheckError {
    pub operation_id: String,
    pub lfc_id: String,
    pub checked_property: String,
    pub saved: String,
    pub expected: String,
}

impl LogbookCheckError {
    pub fn new(operation_id: impl Into<String>,
               lfc_id: impl Into<String>,
               checked_property: impl Into<String>,
               saved: impl Into<String>,
               expected: impl Into<String>)
               -> Self {
        Self { operation_id: operation_id.into(),
               lfc_id: lfc_id.into(),
               checked_property: checked_property.into(),
               saved: saved.into(),
               expected: expected.into() }
    }
}

/// Evento examinado durante una pasada de control; se conserva en el
/// informe para auditar la cobertura del escaneo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookCheckEvent {
    pub ev_type: String,
    pub outcome: String,
    pub out_detail: String,
}

/// Resultado completo de una pasada de control sobre un tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookCheckResult {
    pub tenant: i32,
    pub checked_events: Vec<LogbookCheckEvent>,
    pub check_errors: Vec<LogbookCheckError>,
}

impl LogbookCheckResult {
    /// Un informe sin errores no se persiste.
    pub fn is_empty(&self) -> bool {
        self.check_errors.is_empty()
    }
}
