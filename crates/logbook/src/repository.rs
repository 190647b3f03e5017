// Archivo: repository.rs
// Propósito: definir los contratos de los colaboradores que el motor de
// coherencia consume: almacén de operaciones, lector de ciclos de vida y
// fuente de definiciones de workflow. Las implementaciones concretas
// (REST, base documental, in-memory) viven fuera del motor.
use crate::errors::Result;
use crate::model::{LifecycleDocument, OperationDocument};
use archi_processing::WorkFlow;

/// Vista del estado de commit de un ciclo de vida. Un mismo ciclo debe
/// poder leerse tanto en su versión consolidada como en la temporal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeCycleStatus {
    Committed,
    InProcess,
}

/// Fuente de definiciones de workflow; se consulta una única vez para
/// construir el mapa de eventTypes legítimos.
pub trait WorkflowDefinitionSource: Send + Sync {
    fn list_workflow_definitions(&self) -> Result<Vec<WorkFlow>>;
}

/// Lector de ciclos de vida de unidades y grupos de objetos. Las lecturas
/// son paginadas: `offset`/`limit` recorren los documentos asociados a la
/// operación indicada.
pub trait LifecycleReader: Send + Sync {
    fn unit_lifecycles_by_operation(&self,
                                    operation_id: &str,
                                    status: LifeCycleStatus,
                                    offset: usize,
                                    limit: usize)
                                    -> Result<Vec<LifecycleDocument>>;

    fn object_group_lifecycles_by_operation(&self,
                                            operation_id: &str,
                                            status: LifeCycleStatus,
                                            offset: usize,
                                            limit: usize)
                                            -> Result<Vec<LifecycleDocument>>;
}

/// Cursor bloqueante y por lotes sobre las operaciones de un tenant.
/// Una página más corta que `limit` señala el final de la colección.
pub trait OperationRepository: Send + Sync {
    fn operations_by_tenant(&self, tenant: i32, offset: usize, limit: usize) -> Result<Vec<OperationDocument>>;
}
