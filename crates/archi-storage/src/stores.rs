// stores.rs
// Contratos de los dos niveles de almacenamiento: el workspace de staging
// (contenedores efímeros) y la oferta durable direccionada por categoría.
use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// Categoría bajo la que se archivan los informes del control de
/// coherencia en la oferta durable.
pub const REPORTS_CATEGORY: &str = "checklogbookreports";

/// Estrategia de almacenamiento por defecto.
pub const DEFAULT_STRATEGY: &str = "default";

/// Almacén de staging: contenedores efímeros con objetos nombrados.
pub trait WorkspaceStore: Send + Sync {
  /// Crea un contenedor vacío. Falla si ya existe.
  fn create_container(&self, name: &str) -> Result<()>;

  /// Escribe un objeto dentro de un contenedor existente.
  fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<()>;

  /// Lee un objeto de un contenedor.
  fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>>;

  /// Elimina un contenedor; con `recursive` borra también su contenido.
  fn delete_container(&self, name: &str, recursive: bool) -> Result<()>;
}

/// Referencia a un objeto en staging que la oferta durable debe recoger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
  pub workspace_container: String,
  pub workspace_object_uri: String,
}

/// Resultado de un almacenamiento durable: identidad y huella del objeto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObjectInfo {
  pub category: String,
  pub object_name: String,
  pub digest: String,
  pub size: u64,
}

/// Oferta durable: recoge un objeto del staging y lo archiva bajo una
/// categoría con la estrategia indicada.
pub trait OfferStore: Send + Sync {
  fn store_from_staging(&self,
                        strategy: &str,
                        category: &str,
                        object_name: &str,
                        descriptor: &ObjectDescriptor)
                        -> Result<StoredObjectInfo>;
}
