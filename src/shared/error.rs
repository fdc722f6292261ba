/// Failure taxonomy shared by every service in the crate.
///
/// All of these are logical/user errors surfaced to the caller; none are
/// transient, so nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid stage: {0}")]
    InvalidStage(String),
    #[error("Store error: {0}")]
    Store(String),
}
