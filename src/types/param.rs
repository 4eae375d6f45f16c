//! Type hints and parameter descriptors.

use std::fmt;

use crate::value::Value;

/// Primitive kinds a parameter can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    String,
    Int,
    Float,
    Bool,
    Array,
    Callable,
    Object,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::String => "string",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Array => "array",
            Builtin::Callable => "callable",
            Builtin::Object => "object",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => Builtin::String,
            "int" => Builtin::Int,
            "float" => Builtin::Float,
            "bool" => Builtin::Bool,
            "array" => Builtin::Array,
            "callable" => Builtin::Callable,
            "object" => Builtin::Object,
            _ => return None,
        })
    }
}

/// Declared type of a parameter.
///
/// Builtin names (`string`, `int`, `float`, `bool`, `array`, `callable`,
/// `object`) parse into [`TypeHint::Builtin`]; anything else names a type or
/// interface known to the registry (or a plain container key).
///
/// ```rust
/// use ferrous_autowire::{Builtin, TypeHint};
///
/// assert_eq!(TypeHint::from("int"), TypeHint::Builtin(Builtin::Int));
/// assert_eq!(TypeHint::from("Logger").name(), "Logger");
/// assert!(!TypeHint::from("Logger").is_builtin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHint {
    Builtin(Builtin),
    Named(String),
}

impl TypeHint {
    pub fn parse(name: &str) -> Self {
        match Builtin::parse(name) {
            Some(b) => TypeHint::Builtin(b),
            None => TypeHint::Named(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeHint::Builtin(b) => b.name(),
            TypeHint::Named(n) => n,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, TypeHint::Builtin(_))
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for TypeHint {
    fn from(name: &str) -> Self {
        TypeHint::parse(name)
    }
}

impl From<String> for TypeHint {
    fn from(name: String) -> Self {
        TypeHint::parse(&name)
    }
}

impl From<Builtin> for TypeHint {
    fn from(b: Builtin) -> Self {
        TypeHint::Builtin(b)
    }
}

/// One formal parameter of a constructor, method or function signature.
///
/// Descriptors are written with the builder methods and completed with their
/// position and declaring type when the owning signature is registered.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Param, Value};
///
/// let text = Param::new("text").typed("string").nullable();
/// assert!(text.allows_null());
/// assert!(text.is_builtin());
///
/// let retries = Param::new("retries").typed("int").with_default(3);
/// assert_eq!(retries.default_value(), Some(&Value::Int(3)));
/// assert!(!retries.allows_null());
///
/// // Untyped parameters accept anything, including null
/// assert!(Param::new("payload").allows_null());
/// ```
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: String,
    hint: Option<TypeHint>,
    nullable: bool,
    default: Option<Value>,
    position: usize,
    declaring_type: Option<String>,
    declaring_function: String,
}

/// Short alias used when writing signatures.
pub type Param = ParameterDescriptor;

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            nullable: false,
            default: None,
            position: 0,
            declaring_type: None,
            declaring_function: String::new(),
        }
    }

    pub fn typed(mut self, hint: impl Into<TypeHint>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_hint(&self) -> Option<&TypeHint> {
        self.hint.as_ref()
    }

    /// Declared type name, `mixed` when untyped.
    pub fn type_name(&self) -> &str {
        self.hint.as_ref().map_or("mixed", TypeHint::name)
    }

    /// Declared non-builtin type name, if any.
    pub fn class_name(&self) -> Option<&str> {
        match &self.hint {
            Some(TypeHint::Named(n)) => Some(n),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.hint.as_ref().is_some_and(TypeHint::is_builtin)
    }

    /// Zero-based position within the signature.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Nullable hint, no hint at all, or an implicit null default.
    pub fn allows_null(&self) -> bool {
        self.nullable || self.hint.is_none() || matches!(self.default, Some(Value::Null))
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    pub fn declaring_function(&self) -> &str {
        &self.declaring_function
    }

    /// `Type::method` for members, the bare name for free functions.
    pub fn qualified_function(&self) -> String {
        match &self.declaring_type {
            Some(ty) => format!("{}::{}", ty, self.declaring_function),
            None => self.declaring_function.clone(),
        }
    }

    pub(crate) fn bind(&mut self, position: usize, declaring_type: Option<&str>, function: &str) {
        self.position = position;
        self.declaring_type = declaring_type.map(str::to_string);
        self.declaring_function = function.to_string();
    }
}

/// Completes every descriptor of a signature with its position and owner.
pub(crate) fn bind_signature(params: &mut [ParameterDescriptor], declaring_type: Option<&str>, function: &str) {
    for (position, param) in params.iter_mut().enumerate() {
        param.bind(position, declaring_type, function);
    }
}
