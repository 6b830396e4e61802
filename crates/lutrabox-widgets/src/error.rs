//! Error types for widget construction.

/// Error raised while constructing widget state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WidgetError {
    /// A popup needs at least one candidate.
    #[error("popup for field '{field}' has no candidates")]
    EmptyCandidates {
        /// Field the popup was meant to control.
        field: String,
    },

    /// Field name outside the fixed vocabulary.
    #[error("unknown field name: {0}")]
    UnknownField(String),
}
