//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior
///
/// A definition's lifetime decides whether [`Container::get`](crate::Container::get)
/// keeps the value it builds. [`Container::make`](crate::Container::make) ignores
/// the lifetime and always builds a fresh value.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Lifetime, TypeDescriptor, TypeRegistry};
///
/// let types = TypeRegistry::new()
///     .with_type(TypeDescriptor::class("Database"))
///     .with_type(TypeDescriptor::class("RequestModel"));
/// let container = Container::new(types);
///
/// container.define_shared("Database", ()).unwrap();
/// container.define("RequestModel", ()).unwrap();
///
/// // Shared: the same instance on every lookup
/// let db1 = container.get("Database").unwrap();
/// let db2 = container.get("Database").unwrap();
/// assert_eq!(db1, db2);
///
/// // Transient: a new instance every time
/// let m1 = container.get("RequestModel").unwrap();
/// let m2 = container.get("RequestModel").unwrap();
/// assert_ne!(m1, m2);
///
/// assert_eq!(container.definition("Database").unwrap().lifetime(), Lifetime::Shared);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Lifetime {
    /// Built once per container and cached
    ///
    /// The first lookup resolves the definition and stores the result as an
    /// instance; later lookups return the stored value until the key is
    /// overridden or forgotten.
    Shared,
    /// New value per lookup, never cached
    #[default]
    Transient,
}

impl Lifetime {
    pub fn is_shared(self) -> bool {
        self == Lifetime::Shared
    }
}

impl From<bool> for Lifetime {
    fn from(shared: bool) -> Self {
        if shared {
            Lifetime::Shared
        } else {
            Lifetime::Transient
        }
    }
}
