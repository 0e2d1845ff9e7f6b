pub mod documents;
pub mod password;
pub mod session;
pub mod workflow;

use std::sync::Arc;

use shared::error::{ApiError, ErrorCode};
use storage::{DocumentStore, WorkflowStore};
use tracing::error;

pub use session::{login, AccountConfig, Directory, Session, SessionKeys};

/// Everything a request handler needs besides the caller's session.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn WorkflowStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub directory: Arc<Directory>,
    pub sessions: SessionKeys,
}

impl ApiContext {
    /// Builds a context whose workflow and document stores are the same
    /// backend, which is how both `Storage` and `MemoryStore` are used.
    pub fn with_backend<S>(backend: S, directory: Directory, sessions: SessionKeys) -> Self
    where
        S: WorkflowStore + DocumentStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            store: backend.clone(),
            documents: backend,
            directory: Arc::new(directory),
            sessions,
        }
    }
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.store.health_check().await.map_err(|e| {
        error!(error = %e, "storage health check failed");
        ApiError::new(ErrorCode::Unavailable, "storage unavailable")
    })
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = ?err, "storage operation failed");
    ApiError::new(ErrorCode::Internal, "internal storage error")
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
