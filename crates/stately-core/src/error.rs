use thiserror::Error;

/// Errors raised while declaring component state.
///
/// Transitions (`replace_state`, `merge_state`) never fail; only the
/// construction-time declaration API does.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("initialState can only be defined once")]
    InvalidStateDeclaration,
    #[error("initialState must be declared before the component finishes initializing")]
    DeclaredAfterInitialize,
}
