pub mod category_editor;
pub mod category_service;

pub use category_editor::{CategoryEditor, EditorState};
pub use category_service::CategoryService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the category store. None are fatal: the committed
/// collection is left unchanged by every erroring operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Cycle(String),
}
