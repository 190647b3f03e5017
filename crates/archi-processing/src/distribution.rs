use crate::StatusCode;
use serde::{Deserialize, Serialize};

/// Modo de expansión del trabajo de un paso: por referencia única o por
/// lotes obtenidos de un fichero/directorio del workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionKind {
  Ref,
  ListInFile,
  ListInJsonlFile,
  ListOrderingInFile,
  ListInDirectory,
}

impl DistributionKind {
  /// Sólo `Ref` ejecuta sobre un único elemento; el resto distribuye.
  pub fn is_distributed(&self) -> bool {
    !matches!(self, DistributionKind::Ref)
  }
}

impl Default for DistributionKind {
  fn default() -> Self {
    DistributionKind::Ref
  }
}

/// Política de distribución de un paso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
  #[serde(default)]
  pub kind: DistributionKind,
  /// Recurso del workspace a expandir (fichero o directorio), si aplica.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub element: Option<String>,
  /// Estado a reportar cuando la expansión no produce ningún elemento.
  #[serde(default = "Distribution::default_status_on_empty")]
  pub status_on_empty: StatusCode,
  /// Tamaño de lote para distribución agrupada.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bulk_size: Option<usize>,
}

impl Distribution {
  fn default_status_on_empty() -> StatusCode {
    StatusCode::Warning
  }

  pub fn is_distributed(&self) -> bool {
    self.kind.is_distributed()
  }
}

impl Default for Distribution {
  fn default() -> Self {
    Self { kind: DistributionKind::Ref,
           element: None,
           status_on_empty: Self::default_status_on_empty(),
           bulk_size: None }
  }
}
