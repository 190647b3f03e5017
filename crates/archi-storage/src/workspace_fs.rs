// workspace_fs.rs
// Workspace de staging respaldado por sistema de ficheros: cada
// contenedor es un directorio bajo la raíz configurada.
use crate::errors::{Result, StorageError};
use crate::stores::WorkspaceStore;
use log::debug;
use sha2::{Digest, Sha512};
use std::fs;
use std::path::{Path, PathBuf};

/// Calcula la huella SHA-512 (hex) de un contenido.
pub fn compute_digest(data: &[u8]) -> String {
  let mut hasher = Sha512::new();
  hasher.update(data);
  let digest = hasher.finalize();
  digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Workspace sobre el sistema de ficheros local.
pub struct WorkspaceFileSystem {
  root: PathBuf,
}

impl WorkspaceFileSystem {
  /// Crea el workspace sobre `root`, creando el directorio si no existe.
  pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root)?;
    Ok(Self { root })
  }

  fn container_path(&self, name: &str) -> Result<PathBuf> {
    // los nombres de contenedor no pueden escapar de la raíz
    if name.is_empty() || name.contains('/') || name.contains("..") {
      return Err(StorageError::Container { container: name.to_string(),
                                           reason: "nombre de contenedor inválido".into() });
    }
    Ok(self.root.join(name))
  }

  fn object_path(&self, container: &str, name: &str) -> Result<PathBuf> {
    let base = self.container_path(container)?;
    if name.is_empty() || Path::new(name).is_absolute() || name.contains("..") {
      return Err(StorageError::Container { container: container.to_string(),
                                           reason: format!("nombre de objeto inválido: {}", name) });
    }
    Ok(base.join(name))
  }
}

impl WorkspaceStore for WorkspaceFileSystem {
  fn create_container(&self, name: &str) -> Result<()> {
    let path = self.container_path(name)?;
    if path.exists() {
      return Err(StorageError::Container { container: name.to_string(), reason: "ya existe".into() });
    }
    fs::create_dir(&path)?;
    debug!("contenedor creado: {}", name);
    Ok(())
  }

  fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<()> {
    let path = self.object_path(container, name)?;
    if !self.container_path(container)?.is_dir() {
      return Err(StorageError::NotFound(format!("contenedor {}", container)));
    }
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&path, data)?;
    Ok(())
  }

  fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>> {
    let path = self.object_path(container, name)?;
    if !path.is_file() {
      return Err(StorageError::NotFound(format!("objeto {}/{}", container, name)));
    }
    Ok(fs::read(&path)?)
  }

  fn delete_container(&self, name: &str, recursive: bool) -> Result<()> {
    let path = self.container_path(name)?;
    if !path.is_dir() {
      return Err(StorageError::NotFound(format!("contenedor {}", name)));
    }
    if recursive {
      fs::remove_dir_all(&path)?;
    } else {
      fs::remove_dir(&path).map_err(|e| StorageError::Container { container: name.to_string(),
                                                                  reason: format!("no vacío o no borrable: {}", e) })?;
    }
    debug!("contenedor eliminado: {}", name);
    Ok(())
  }
}

/// Construye el workspace desde el entorno (`ARCHIFLOW_WORKSPACE_DIR`),
/// siguiendo la convención `*_from_env` del workspace.
pub fn new_workspace_from_env() -> Result<WorkspaceFileSystem> {
  dotenvy::dotenv().ok();
  let root = std::env::var("ARCHIFLOW_WORKSPACE_DIR")
    .map_err(|_| StorageError::Other("ARCHIFLOW_WORKSPACE_DIR no está definida".into()))?;
  WorkspaceFileSystem::new(root)
}
