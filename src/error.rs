use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TandemError {
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("No item is currently assigned to this session")]
    NoActiveItem,

    #[error("Item store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
