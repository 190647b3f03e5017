//! Capa de almacenamiento de la plataforma: workspace de staging (sobre
//! sistema de ficheros o en memoria), oferta durable por categorías y el
//! servicio de persistencia de informes del control de coherencia. Los
//! backends se seleccionan por inyección; `new_workspace_from_env` sigue
//! la convención de configuración por entorno del workspace.

mod errors;
mod report;
mod stores;
pub mod stubs;
mod workspace_fs;

pub use errors::{Result, StorageError};
pub use report::{CheckReport, ReportStorageService};
pub use stores::{ObjectDescriptor, OfferStore, StoredObjectInfo, WorkspaceStore, DEFAULT_STRATEGY,
                 REPORTS_CATEGORY};
pub use workspace_fs::{compute_digest, new_workspace_from_env, WorkspaceFileSystem};
