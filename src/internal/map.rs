//! Hash map alias used for the registries.

/// Map with the `ahash` hasher when the `ahash` feature is on.
#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;

/// Map with the standard hasher.
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
