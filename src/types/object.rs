//! Instances built by the resolver.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::{Args, Value};

/// Shared handle to an instance of a registered type.
///
/// An object records the name of its type and a property table. Properties
/// are written by constructor bodies, by method bodies and by definition
/// setup steps; cloning the handle shares the same instance.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Object, Value};
///
/// let a = Object::new("Greeter", Args::new().with("text", "hi"));
/// let b = a.clone();
/// b.set("text", "hello");
///
/// assert_eq!(a.get("text"), Value::from("hello"));
/// assert!(a.ptr_eq(&b));
/// assert_eq!(a.type_name(), "Greeter");
/// ```
#[derive(Clone)]
pub struct Object {
    inner: Rc<Instance>,
}

struct Instance {
    type_name: String,
    properties: RefCell<Args>,
}

impl Object {
    pub fn new(type_name: impl Into<String>, properties: Args) -> Self {
        Self {
            inner: Rc::new(Instance {
                type_name: type_name.into(),
                properties: RefCell::new(properties),
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Current value of a property, null when unset.
    pub fn get(&self, name: &str) -> Value {
        self.inner.properties.borrow().get(name).cloned().unwrap_or_default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.properties.borrow_mut().insert(name, value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.properties.borrow().contains_key(name)
    }

    /// Snapshot of all properties.
    pub fn properties(&self) -> Args {
        self.inner.properties.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.inner.type_name)
            .field("properties", &*self.inner.properties.borrow())
            .finish()
    }
}
