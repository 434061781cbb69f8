//! Errors raised while registering or requesting tags.

/// Failure to register, parse, or look up a tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// The name is empty, has an empty segment, or contains whitespace.
    #[error("invalid tag name `{0}`")]
    InvalidName(String),

    /// The name is well formed but the registry does not know it.
    #[error("tag `{0}` is not registered")]
    NotRegistered(String),
}
