//! Modelo de procesamiento de la plataforma de preservación: definición
//! declarativa de workflows (pasos, acciones, distribución), máquina de
//! estados de control de proceso y contexto tipado de parámetros de
//! worker. Todo el modelo es serializable; las definiciones se cargan con
//! `load_workflow` y fallan en bloque ante literales desconocidos.

mod action;
mod distribution;
mod errors;
mod item_status;
mod lifecycle;
mod step;
mod workflow;
mod worker_parameters;

pub use action::{Action, ActionDefinition, IoParameter, ProcessingUri, UriPrefix};
pub use distribution::{Distribution, DistributionKind};
pub use errors::ProcessingError;
pub use item_status::{ItemStatus, StatusCode};
pub use lifecycle::LifecycleState;
pub use step::{PauseOrCancelAction, ProcessBehavior, Step};
pub use workflow::{load_workflow, WorkFlow};
pub use worker_parameters::{WorkerParameterName, WorkerParameters, DEFAULT_MANDATORY};
