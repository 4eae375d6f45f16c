//! Dynamic runtime values and argument bags.

use std::fmt;

use indexmap::IndexMap;

use crate::reference::Reference;
use crate::types::{Callable, Object};

/// A runtime value flowing through the container.
///
/// Values are what definitions produce, what parameters are bound to and
/// what constructor, method and function bodies receive. Objects and
/// callables are shared handles, so cloning a value never copies an
/// instance.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Value};
///
/// let name = Value::from("John");
/// assert_eq!(name.as_str(), Some("John"));
/// assert_eq!(name.kind_name(), "string");
///
/// let mut nested = Args::new();
/// nested.insert("port", 5432);
/// let db = Value::from(nested);
/// assert_eq!(db.kind_name(), "array");
/// ```
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Ordered mapping
    Map(Args),
    Callable(Callable),
    Object(Object),
    /// Deferred container lookup
    Reference(Reference),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Args> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Semantic type name that does not need a type registry.
    ///
    /// Strings are always reported as `string` here; use
    /// [`TypeRegistry::semantic_type`](crate::TypeRegistry::semantic_type) to
    /// classify strings that name callables.
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) | Value::Map(_) => "array",
            Value::Callable(_) => "callable",
            Value::Object(o) => o.type_name(),
            Value::Reference(_) => "reference",
        }
    }

    /// Turns a value into an argument bag for a method invocation.
    ///
    /// Maps are used as-is, lists become positional entries, null is an
    /// empty bag and any other value is a single positional entry.
    pub fn into_args(self) -> Args {
        match self {
            Value::Map(m) => m,
            Value::Null => Args::new(),
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            other => {
                let mut args = Args::new();
                args.insert("0", other);
                args
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(l) => f.debug_tuple("List").field(l).finish(),
            Value::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Value::Callable(c) => write!(f, "Callable({})", c.name()),
            Value::Object(o) => write!(f, "Object({})", o.type_name()),
            Value::Reference(r) => write!(f, "Reference({})", r.target()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Handles compare by identity
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Reference(a), Value::Reference(b)) => a.target() == b.target(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Args> for Value {
    fn from(v: Args) -> Self {
        Value::Map(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Callable> for Value {
    fn from(v: Callable) -> Self {
        Value::Callable(v)
    }
}

impl From<Reference> for Value {
    fn from(v: Reference) -> Self {
        Value::Reference(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Insertion-ordered mapping from names to values.
///
/// Used for call-site arguments, definition parameter overrides, contextual
/// bindings, object properties and the configuration tree. Backed by an
/// [`IndexMap`], so lookups are hashed and iteration follows the order
/// callers wrote the entries in.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::Args;
///
/// let args = Args::new().with("first", "John").with("last", "Doe");
/// assert_eq!(args.get("first").and_then(|v| v.as_str()), Some("John"));
/// assert_eq!(args.keys().collect::<Vec<_>>(), vec!["first", "last"]);
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Args {
    entries: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a value, shifting later entries down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl IntoIterator for Args {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Args {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Recursively merges two argument trees.
///
/// Every key of `primary` is kept with its value; keys only present in
/// `secondary` are appended. When both sides hold a map under the same key
/// the two maps are merged recursively with the same rule, which lets callers
/// override part of a structured parameter. Two lists merge the same way by
/// index: `[x]` over `[a, b, c]` gives `[x, b, c]`.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{merge_tree, Args, Value};
///
/// let stored = Args::new()
///     .with("db", Args::new().with("host", "localhost").with("port", 5432))
///     .with("debug", false);
/// let extra = Args::new().with("db", Args::new().with("host", "db.internal"));
///
/// let merged = merge_tree(&extra, &stored);
/// let db = merged.get("db").and_then(Value::as_map).unwrap();
/// assert_eq!(db.get("host"), Some(&Value::from("db.internal")));
/// assert_eq!(db.get("port"), Some(&Value::from(5432)));
/// assert_eq!(merged.get("debug"), Some(&Value::from(false)));
/// ```
pub fn merge_tree(primary: &Args, secondary: &Args) -> Args {
    let mut merged = primary.clone();
    for (key, theirs) in secondary.iter() {
        match merged.get_mut(key) {
            Some(ours) => merge_into(ours, theirs),
            None => {
                merged.insert(key, theirs.clone());
            }
        }
    }
    merged
}

fn merge_into(ours: &mut Value, theirs: &Value) {
    match (ours, theirs) {
        (Value::Map(a), Value::Map(b)) => *a = merge_tree(a, b),
        (Value::List(a), Value::List(b)) => {
            for (index, item) in b.iter().enumerate() {
                match a.get_mut(index) {
                    Some(existing) => merge_into(existing, item),
                    None => a.push(item.clone()),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut args = Args::new().with("a", 1).with("b", 2);
        assert_eq!(args.insert("a", 3), Some(Value::Int(1)));
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(args.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn scalar_collision_keeps_primary() {
        let primary = Args::new().with("text", "extra");
        let secondary = Args::new().with("text", "stored").with("other", 1);
        let merged = merge_tree(&primary, &secondary);
        assert_eq!(merged.get("text"), Some(&Value::from("extra")));
        assert_eq!(merged.get("other"), Some(&Value::Int(1)));
    }

    #[test]
    fn map_against_scalar_keeps_primary() {
        let primary = Args::new().with("opts", Args::new().with("a", 1));
        let secondary = Args::new().with("opts", "flat");
        let merged = merge_tree(&primary, &secondary);
        assert!(merged.get("opts").and_then(Value::as_map).is_some());
    }

    #[test]
    fn lists_merge_by_index() {
        let primary = Args::new().with("hosts", Value::List(vec!["x".into()]));
        let secondary = Args::new().with("hosts", Value::List(vec!["a".into(), "b".into(), "c".into()]));
        let merged = merge_tree(&primary, &secondary);
        assert_eq!(
            merged.get("hosts"),
            Some(&Value::List(vec!["x".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn remove_keeps_order() {
        let mut args = Args::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(args.remove("a"), Some(Value::Int(1)));
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn list_into_args_is_positional() {
        let args = Value::List(vec!["x".into(), "y".into()]).into_args();
        assert_eq!(args.get("0"), Some(&Value::from("x")));
        assert_eq!(args.get("1"), Some(&Value::from("y")));
        assert_eq!(Value::from("solo").into_args().get("0"), Some(&Value::from("solo")));
        assert!(Value::Null.into_args().is_empty());
    }
}
