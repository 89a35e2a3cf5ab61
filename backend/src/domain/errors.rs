/// Errors returned by store operations.
///
/// A failed operation never changes state and never schedules a write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("A {kind} with id {id} already exists")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Store has not finished loading saved data")]
    NotHydrated,
}

/// Errors from saving a submitted entry form
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    /// The form did not validate; holds the message to show inline
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
