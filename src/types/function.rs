//! Free functions and closures.

use std::fmt;
use std::rc::Rc;

use crate::error::DiResult;
use crate::types::param::{bind_signature, ParameterDescriptor};
use crate::value::Value;

/// Body of a free function or closure, receiving positional arguments.
pub type FunctionBody = dyn Fn(&[Value]) -> DiResult<Value>;

/// Invocable value: a named free function or an anonymous closure.
///
/// The signature is declared up front so the resolver can bind every
/// argument before the body runs. Bodies receive the bound arguments in
/// declaration order.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Callable, Container, Param, TypeRegistry, Value};
///
/// let full_name = Callable::closure(
///     vec![Param::new("first"), Param::new("last")],
///     |args| {
///         let first = args[0].as_str().unwrap_or_default();
///         let last = args[1].as_str().unwrap_or_default();
///         Ok(Value::from(format!("{} {}", first, last)))
///     },
/// );
///
/// let container = Container::new(TypeRegistry::new());
/// let args = Args::new().with("first", "John").with("last", "Doe");
/// assert_eq!(container.call(full_name, args).unwrap(), Value::from("John Doe"));
/// ```
#[derive(Clone)]
pub struct Callable {
    inner: Rc<FunctionDescriptor>,
}

struct FunctionDescriptor {
    name: String,
    params: Vec<ParameterDescriptor>,
    body: Box<FunctionBody>,
}

/// Name given to anonymous closures.
pub const CLOSURE_NAME: &str = "{closure}";

impl Callable {
    pub fn new<F>(name: impl Into<String>, mut params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&[Value]) -> DiResult<Value> + 'static,
    {
        let name = name.into();
        bind_signature(&mut params, None, &name);
        Self {
            inner: Rc::new(FunctionDescriptor {
                name,
                params,
                body: Box::new(body),
            }),
        }
    }

    pub fn closure<F>(params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&[Value]) -> DiResult<Value> + 'static,
    {
        Self::new(CLOSURE_NAME, params, body)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.inner.params
    }

    /// Runs the body with already bound arguments.
    pub fn invoke(&self, args: &[Value]) -> DiResult<Value> {
        (self.inner.body)(args)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.inner.name)
            .field("params", &self.inner.params.len())
            .finish()
    }
}
