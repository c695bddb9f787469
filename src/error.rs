use thiserror::Error;

pub type ExplorerResult<T> = Result<T, ExplorerError>;

#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The dataset is unusable at load time; the session cannot start.
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    /// A control reported a value outside its declared domain; the write is
    /// rejected and input state is left unchanged.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The map widget collaborator rejected an update; the previous rendered
    /// marker set stays in place.
    #[error("render failure: {0}")]
    RenderFailure(String),
}
