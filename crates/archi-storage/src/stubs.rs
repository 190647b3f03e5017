// stubs.rs
// Implementaciones en memoria de los dos niveles de almacenamiento, para
// pruebas y wiring rápido. Registran el número de llamadas recibidas para
// poder verificar contratos como "una lista vacía no toca la red".
use crate::errors::{Result, StorageError};
use crate::stores::{ObjectDescriptor, OfferStore, StoredObjectInfo, WorkspaceStore};
use crate::workspace_fs::compute_digest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<'a, T>(m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, StorageError> {
  m.lock().map_err(|e| StorageError::Other(format!("mutex poisoned: {:?}", e)))
}

/// Workspace de staging en memoria.
#[derive(Default)]
pub struct InMemoryWorkspaceStore {
  containers: Mutex<HashMap<String, HashMap<String, Vec<u8>>>>,
  calls: AtomicUsize,
}

impl InMemoryWorkspaceStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Número total de llamadas recibidas por el stub.
  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn container_exists(&self, name: &str) -> bool {
    self.containers.lock().unwrap_or_else(|e| e.into_inner()).contains_key(name)
  }

  pub fn container_count(&self) -> usize {
    self.containers.lock().unwrap_or_else(|e| e.into_inner()).len()
  }
}

impl WorkspaceStore for InMemoryWorkspaceStore {
  fn create_container(&self, name: &str) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let mut containers = lock(&self.containers)?;
    if containers.contains_key(name) {
      return Err(StorageError::Container { container: name.to_string(), reason: "ya existe".into() });
    }
    containers.insert(name.to_string(), HashMap::new());
    Ok(())
  }

  fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let mut containers = lock(&self.containers)?;
    let objects = containers.get_mut(container)
                            .ok_or_else(|| StorageError::NotFound(format!("contenedor {}", container)))?;
    objects.insert(name.to_string(), data.to_vec());
    Ok(())
  }

  fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let containers = lock(&self.containers)?;
    containers.get(container)
              .and_then(|objects| objects.get(name))
              .cloned()
              .ok_or_else(|| StorageError::NotFound(format!("objeto {}/{}", container, name)))
  }

  fn delete_container(&self, name: &str, _recursive: bool) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let mut containers = lock(&self.containers)?;
    containers.remove(name)
              .map(|_| ())
              .ok_or_else(|| StorageError::NotFound(format!("contenedor {}", name)))
  }
}

/// Oferta durable en memoria. Recoge el contenido desde el workspace
/// indicado en el descriptor, como haría el motor de almacenamiento real.
pub struct InMemoryOfferStore {
  workspace: Arc<dyn WorkspaceStore>,
  stored: Mutex<HashMap<(String, String), Vec<u8>>>,
  calls: AtomicUsize,
  failing: bool,
}

impl InMemoryOfferStore {
  pub fn new(workspace: Arc<dyn WorkspaceStore>) -> Self {
    Self { workspace, stored: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0), failing: false }
  }

  /// Variante que falla siempre, para probar la propagación de errores.
  pub fn failing(workspace: Arc<dyn WorkspaceStore>) -> Self {
    Self { workspace, stored: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0), failing: true }
  }

  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Contenido archivado bajo (categoría, nombre), si existe.
  pub fn stored_object(&self, category: &str, object_name: &str) -> Option<Vec<u8>> {
    self.stored
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&(category.to_string(), object_name.to_string()))
        .cloned()
  }
}

impl OfferStore for InMemoryOfferStore {
  fn store_from_staging(&self,
                        _strategy: &str,
                        category: &str,
                        object_name: &str,
                        descriptor: &ObjectDescriptor)
                        -> Result<StoredObjectInfo> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.failing {
      return Err(StorageError::Other("oferta durable no disponible".into()));
    }
    let data = self.workspace
                   .get_object(&descriptor.workspace_container, &descriptor.workspace_object_uri)?;
    let info = StoredObjectInfo { category: category.to_string(),
                                  object_name: object_name.to_string(),
                                  digest: compute_digest(&data),
                                  size: data.len() as u64 };
    let mut stored = lock(&self.stored)?;
    stored.insert((category.to_string(), object_name.to_string()), data);
    Ok(info)
  }
}
