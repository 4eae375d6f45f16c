//! Deferred container lookups.

/// A request to resolve a container key when a parameter is bound.
///
/// A `Reference` is not a value itself. When the resolver finds one among
/// the candidate values for a parameter it asks the container for
/// [`target`](Reference::target) and binds the result instead. If the key
/// cannot be resolved the parameter receives null.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{reference, Reference};
///
/// let db = reference("db.connection");
/// assert_eq!(db.target(), "db.connection");
/// assert_eq!(Reference::new("cache").target(), "cache");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    target: String,
}

impl Reference {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Shorthand for [`Reference::new`].
pub fn reference(target: impl Into<String>) -> Reference {
    Reference::new(target)
}
