//! Contextual bindings: "when building X, give it Y for Z".

use crate::container::Container;
use crate::target::{Receiver, Target};
use crate::types::Callable;
use crate::value::Value;

/// What a contextual binding hands to the dependent type.
#[derive(Debug, Clone)]
pub enum Implementation {
    /// A type or key name, looked up through the container; function names
    /// and `Type::method` strings are called
    Name(String),
    /// A target invoked through the resolver
    Target(Target),
    /// A literal value, used as-is
    Value(Value),
    /// A configuration entry read when the binding is resolved
    Config { key: String, default: Value },
}

impl Implementation {
    /// The value kept when resolving the implementation fails.
    pub(crate) fn raw(&self) -> Value {
        match self {
            Implementation::Name(name) => Value::String(name.clone()),
            Implementation::Target(Target::Name(name)) => Value::String(name.clone()),
            Implementation::Target(Target::Callable(c)) => Value::Callable(c.clone()),
            Implementation::Target(Target::Method(Receiver::Type(ty), method)) => {
                Value::String(format!("{}::{}", ty, method))
            }
            Implementation::Target(Target::Method(Receiver::Instance(obj), method)) => {
                Value::List(vec![Value::Object(obj.clone()), Value::String(method.clone())])
            }
            Implementation::Value(v) => v.clone(),
            Implementation::Config { default, .. } => default.clone(),
        }
    }
}

impl From<&str> for Implementation {
    fn from(name: &str) -> Self {
        Implementation::Name(name.to_string())
    }
}

impl From<String> for Implementation {
    fn from(name: String) -> Self {
        Implementation::Name(name)
    }
}

impl From<Target> for Implementation {
    fn from(target: Target) -> Self {
        Implementation::Target(target)
    }
}

impl From<Callable> for Implementation {
    fn from(callable: Callable) -> Self {
        Implementation::Target(Target::Callable(callable))
    }
}

impl From<Value> for Implementation {
    fn from(value: Value) -> Self {
        Implementation::Value(value)
    }
}

impl From<crate::Reference> for Implementation {
    fn from(reference: crate::Reference) -> Self {
        Implementation::Value(Value::Reference(reference))
    }
}

/// First half of `container.when(..).needs(..).give(..)`.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Param, TypeDescriptor, TypeRegistry, Value};
///
/// let types = TypeRegistry::new()
///     .with_type(TypeDescriptor::interface("Filesystem"))
///     .with_type(TypeDescriptor::class("LocalDisk").implements("Filesystem"))
///     .with_type(TypeDescriptor::class("S3Disk").implements("Filesystem"))
///     .with_type(
///         TypeDescriptor::class("PhotoController")
///             .constructor(vec![Param::new("disk").typed("Filesystem")], |this, args| {
///                 this.set("disk", args[0].clone());
///                 Ok(())
///             }),
///     );
/// let container = Container::new(types);
/// container.when("PhotoController").needs("Filesystem").give("S3Disk");
///
/// let controller = container.call("PhotoController", Default::default()).unwrap();
/// let disk = controller.as_object().unwrap().get("disk");
/// assert_eq!(disk.as_object().unwrap().type_name(), "S3Disk");
/// ```
pub struct ContextualBindingBuilder<'c> {
    container: &'c Container,
    concretes: Vec<String>,
}

impl<'c> ContextualBindingBuilder<'c> {
    pub(crate) fn new(container: &'c Container, concretes: Vec<String>) -> Self {
        Self { container, concretes }
    }

    /// Names the dependency: a type name or a `$parameter` name.
    pub fn needs(self, abstract_name: impl Into<String>) -> ContextualBinding<'c> {
        ContextualBinding {
            container: self.container,
            concretes: self.concretes,
            needs: abstract_name.into(),
        }
    }
}

/// Second half of `container.when(..).needs(..).give(..)`.
pub struct ContextualBinding<'c> {
    container: &'c Container,
    concretes: Vec<String>,
    needs: String,
}

impl ContextualBinding<'_> {
    pub fn give(self, implementation: impl Into<Implementation>) {
        let implementation = implementation.into();
        for concrete in &self.concretes {
            self.container
                .add_contextual_binding(concrete, &self.needs, implementation.clone());
        }
    }

    /// Binds the configuration entry `key`, falling back to `default`.
    pub fn give_config(self, key: impl Into<String>, default: impl Into<Value>) {
        self.give(Implementation::Config {
            key: key.into(),
            default: default.into(),
        })
    }
}
