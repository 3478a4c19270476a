// crates/engine/src/domain/error.rs
use thiserror::Error;

use super::verdict::RejectReason;

#[derive(Debug, Error)]
pub enum TrustError {
  /// Trust was actively denied for the presented chain.
  #[error("server certificate rejected: {0}")]
  Rejected(RejectReason),

  /// The chain oracle could not complete the evaluation.
  #[error("trust evaluation failed: {0}")]
  Oracle(String),

  #[error("precondition violated: {0}")]
  Precondition(&'static str),

  #[error("feature not enabled: {0}")]
  Feature(&'static str),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl TrustError {
  /// True when the server was actively distrusted.
  pub fn is_rejection(&self) -> bool {
    matches!(self, TrustError::Rejected(_))
  }

  /// True when trust could not be determined at all.
  pub fn is_indeterminate(&self) -> bool {
    matches!(self, TrustError::Oracle(_))
  }

  pub fn reject_reason(&self) -> Option<&RejectReason> {
    match self {
      TrustError::Rejected(reason) => Some(reason),
      _ => None,
    }
  }
}

pub type EngineResult<T> = Result<T, TrustError>;
