//! Crate `logbook` — modelo de eventos del diario de operaciones y motor
//! de control de coherencia.
//!
//! Este crate define el modelo tipado de los eventos del logbook
//! (`EventModel`, documentos crudos de operación y de ciclo de vida), los
//! contratos de los colaboradores que el motor consume
//! (`OperationRepository`, `LifecycleReader`, `WorkflowDefinitionSource`)
//! y una implementación en memoria útil para pruebas. El motor
//! (`LogbookCheckConsistencyService`) reconstruye la jerarquía
//! STEP→ACTION→TASK esperada, valida la gramática de cada evento y cruza
//! los agregados de operación contra los ciclos de vida de unidades y
//! grupos de objetos.
//!
//! Diseño resumido:
//! - Las inconsistencias son datos (`LogbookCheckError`), nunca errores
//!   del programa: una pasada debe informar de todo lo encontrado.
//! - El recorrido dentro de un documento es estrictamente secuencial: la
//!   clasificación de cada evento depende del rol calculado del anterior.
//! - El mapa de eventTypes legítimos por workflow se carga una única vez
//!   y de forma perezosa; su fallo degrada el control de pertenencia.
pub mod coherence;
pub mod config;
pub mod details_check;
pub mod errors;
pub mod model;
pub mod repository;
pub mod stubs;

pub use coherence::*;
pub use config::*;
pub use details_check::*;
pub use errors::*;
pub use model::*;
pub use repository::*;
