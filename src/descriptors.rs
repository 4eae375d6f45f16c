//! Service descriptors for introspection and diagnostics.

use crate::lifetime::Lifetime;

/// Service descriptor for introspection and diagnostics
///
/// A snapshot of one key known to a container: either a definition (with
/// its concrete target and lifetime) or a bare instance stored with
/// [`Container::instance`](crate::Container::instance).
///
/// # Use Cases
///
/// - **Debugging**: Inspect what keys are defined and their lifetimes
/// - **Validation**: Ensure all required services are defined at startup
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Lifetime, TypeDescriptor, TypeRegistry, Value};
///
/// let types = TypeRegistry::new().with_type(TypeDescriptor::class("Database"));
/// let container = Container::new(types);
/// container.define_shared("db", "Database").unwrap();
/// container.instance("app.name", Value::from("demo"));
///
/// let descriptors = container.service_descriptors();
///
/// let db = descriptors.iter().find(|d| d.key == "db").unwrap();
/// assert_eq!(db.lifetime, Lifetime::Shared);
/// assert_eq!(db.concrete.as_deref(), Some("Database"));
/// assert!(!db.resolved);
///
/// let name = descriptors.iter().find(|d| d.key == "app.name").unwrap();
/// assert!(name.is_instance());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// The container key
    pub key: String,
    /// Lifetime of the definition; instances report `Shared`
    pub lifetime: Lifetime,
    /// Display name of the definition's concrete target, `None` for bare instances
    pub concrete: Option<String>,
    /// Whether a cached instance exists for the key
    pub resolved: bool,
}

impl ServiceDescriptor {
    /// True for keys holding a stored value with no definition behind it.
    pub fn is_instance(&self) -> bool {
        self.concrete.is_none()
    }
}
