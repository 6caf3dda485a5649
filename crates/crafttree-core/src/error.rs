//! Errors reported by the crafting core.

/// Everything that can go wrong while registering recipes or analysing a
/// target. Registration errors leave the registry untouched; analysis
/// errors have no side effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CraftError {
    /// Empty name, unparsable or non-positive quantity, malformed recipe spec.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A recipe references an item that is neither a base material nor a
    /// craftable.
    #[error("'{ingredient}' is not a base material or craftable item (in recipe for '{craftable}')")]
    UnknownIngredient {
        craftable: String,
        ingredient: String,
    },

    /// The analysis target is not a registered craftable.
    #[error("target '{0}' must be a craftable item")]
    InvalidTarget(String),

    /// The name is already registered as the other kind of item.
    #[error("'{name}' is already registered as a {existing}")]
    NameConflict { name: String, existing: &'static str },

    /// The recipe graph contains a cycle along the given path.
    #[error("recipe cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// Expansion went deeper than the configured limit.
    #[error("recipe expansion exceeded maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Expansion reached more distinct items than the configured limit.
    #[error("recipe expansion reached more than {limit} items")]
    SizeExceeded { limit: usize },

    /// The balance equation for the target has no solution.
    #[error("no solution for the balance equation of '{0}'")]
    NoSolution(String),
}

impl CraftError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        CraftError::InvalidInput {
            reason: reason.into(),
        }
    }
}
