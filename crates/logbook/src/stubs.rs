// Archivo: stubs.rs
// Propósito: implementaciones en memoria de los colaboradores para
// pruebas y wiring rápido. No son durables; se usan en demos y tests.
use crate::errors::{LogbookError, Result};
use crate::model::{LifecycleDocument, OperationDocument};
use crate::repository::{LifeCycleStatus, LifecycleReader, OperationRepository, WorkflowDefinitionSource};
use archi_processing::WorkFlow;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<'a, T>(m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, LogbookError> {
    m.lock().map_err(|e| LogbookError::Storage(format!("mutex poisoned: {:?}", e)))
}

/// Almacén de operaciones en memoria, indexado por tenant.
#[derive(Default)]
pub struct InMemoryOperationRepository {
    operations: Mutex<HashMap<i32, Vec<OperationDocument>>>,
}

impl InMemoryOperationRepository {
    pub fn new() -> Self {
        Self { operations: Mutex::new(HashMap::new()) }
    }

    /// Añade una operación al tenant indicado (orden de inserción).
    pub fn add_operation(&self, tenant: i32, document: OperationDocument) {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(tenant)
            .or_default()
            .push(document);
    }
}

impl OperationRepository for InMemoryOperationRepository {
    fn operations_by_tenant(&self, tenant: i32, offset: usize, limit: usize) -> Result<Vec<OperationDocument>> {
        let operations = lock(&self.operations)?;
        let page = operations.get(&tenant)
                             .map(|docs| docs.iter().skip(offset).take(limit).cloned().collect())
                             .unwrap_or_default();
        Ok(page)
    }
}

/// Lector de ciclos de vida en memoria. Los documentos se registran por
/// (operación, vista de estado) tanto para unidades como para grupos.
#[derive(Default)]
pub struct InMemoryLifecycleReader {
    units: Mutex<HashMap<(String, LifeCycleStatus), Vec<LifecycleDocument>>>,
    object_groups: Mutex<HashMap<(String, LifeCycleStatus), Vec<LifecycleDocument>>>,
}

impl InMemoryLifecycleReader {
    pub fn new() -> Self {
        Self { units: Mutex::new(HashMap::new()), object_groups: Mutex::new(HashMap::new()) }
    }

    pub fn add_unit_lifecycle(&self, operation_id: &str, status: LifeCycleStatus, document: LifecycleDocument) {
        self.units
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((operation_id.to_string(), status))
            .or_default()
            .push(document);
    }

    pub fn add_object_group_lifecycle(&self,
                                      operation_id: &str,
                                      status: LifeCycleStatus,
                                      document: LifecycleDocument) {
        self.object_groups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((operation_id.to_string(), status))
            .or_default()
            .push(document);
    }

    fn page(map: &Mutex<HashMap<(String, LifeCycleStatus), Vec<LifecycleDocument>>>,
            operation_id: &str,
            status: LifeCycleStatus,
            offset: usize,
            limit: usize)
            -> Result<Vec<LifecycleDocument>> {
        let map = lock(map)?;
        let page = map.get(&(operation_id.to_string(), status))
                      .map(|docs| docs.iter().skip(offset).take(limit).cloned().collect())
                      .unwrap_or_default();
        Ok(page)
    }
}

impl LifecycleReader for InMemoryLifecycleReader {
    fn unit_lifecycles_by_operation(&self,
                                    operation_id: &str,
                                    status: LifeCycleStatus,
                                    offset: usize,
                                    limit: usize)
                                    -> Result<Vec<LifecycleDocument>> {
        Self::page(&self.units, operation_id, status, offset, limit)
    }

    fn object_group_lifecycles_by_operation(&self,
                                            operation_id: &str,
                                            status: LifeCycleStatus,
                                            offset: usize,
                                            limit: usize)
                                            -> Result<Vec<LifecycleDocument>> {
        Self::page(&self.object_groups, operation_id, status, offset, limit)
    }
}

/// Fuente de definiciones de workflow en memoria. `failing()` simula un
/// colaborador caído para probar la degradación del control de
/// pertenencia.
pub struct InMemoryWorkflowSource {
    workflows: Vec<WorkFlow>,
    failing: bool,
}

impl InMemoryWorkflowSource {
    pub fn new(workflows: Vec<WorkFlow>) -> Self {
        Self { workflows, failing: false }
    }

    pub fn failing() -> Self {
        Self { workflows: Vec::new(), failing: true }
    }
}

impl WorkflowDefinitionSource for InMemoryWorkflowSource {
    fn list_workflow_definitions(&self) -> Result<Vec<WorkFlow>> {
        if self.failing {
            return Err(LogbookError::Collaborator("servicio de definiciones no disponible".into()));
        }
        Ok(self.workflows.clone())
    }
}
