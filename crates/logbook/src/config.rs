// Archivo: config.rs
// Propósito: parámetros de ajuste del control de coherencia. Se cargan
// desde un fichero JSON señalado por la variable de entorno
// ARCHIFLOW_CHECK_CONF, o se usan los valores por defecto.
use crate::errors::{LogbookError, Result};
use serde::{Deserialize, Serialize};

/// Configuración del motor de control de coherencia.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckConfig {
    /// Tipos de operación que llevan ciclos de vida asociados; sólo para
    /// ellos se cruza operación contra ciclos de vida.
    pub op_with_lfc: Vec<String>,
    /// EventTypes de operación excluidos del cruce con los ciclos de vida.
    pub op_lfc_events_to_skip: Vec<String>,
    /// EventTypes que una operación genera pero que no están declarados
    /// en el workflow; se excluyen del control de pertenencia.
    pub op_events_not_in_wf: Vec<String>,
    /// Tamaño de lote del cursor de operaciones.
    pub batch_size: usize,
    /// Tamaño de página del lector de ciclos de vida.
    pub lifecycle_page_size: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { op_with_lfc: Vec::new(),
               op_lfc_events_to_skip: Vec::new(),
               op_events_not_in_wf: Vec::new(),
               batch_size: 1000,
               lifecycle_page_size: 1000 }
    }
}

/// Carga la configuración desde el entorno (convención `*_from_env`).
/// Sin variable definida se devuelven los valores por defecto.
pub fn check_config_from_env() -> Result<CheckConfig> {
    dotenvy::dotenv().ok();
    match std::env::var("ARCHIFLOW_CHECK_CONF") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| LogbookError::Other(format!("No se pudo leer {}: {}", path, e)))?;
            Ok(serde_json::from_str(&raw)?)
        }
        Err(_) => Ok(CheckConfig::default()),
    }
}
