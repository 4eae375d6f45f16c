//! Invocation targets.

use std::fmt;

use crate::types::{Callable, Object};

/// Receiver of a method target.
#[derive(Debug, Clone)]
pub enum Receiver {
    /// Type name; built first unless the method is static
    Type(String),
    /// Existing instance
    Instance(Object),
}

impl Receiver {
    pub fn type_name(&self) -> &str {
        match self {
            Receiver::Type(name) => name,
            Receiver::Instance(obj) => obj.type_name(),
        }
    }
}

/// Anything the resolver can build or invoke.
///
/// A bare name is either a type (constructor mode) or a registered free
/// function; `"Type::method"` strings are split into a method target when
/// converted.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Receiver, Target};
///
/// let ctor = Target::from("Mailer");
/// assert_eq!(ctor.display_name(), "Mailer");
///
/// let method = Target::from("Mailer::send");
/// assert!(matches!(method, Target::Method(Receiver::Type(ref t), ref m) if t == "Mailer" && m == "send"));
/// assert_eq!(method.display_name(), "Mailer::send");
/// ```
#[derive(Debug, Clone)]
pub enum Target {
    Name(String),
    Method(Receiver, String),
    Callable(Callable),
}

impl Target {
    /// Human readable form used in errors and descriptors.
    pub fn display_name(&self) -> String {
        match self {
            Target::Name(name) => name.clone(),
            Target::Method(receiver, method) => format!("{}::{}", receiver.type_name(), method),
            Target::Callable(c) => c.name().to_string(),
        }
    }

    /// Parses a string, splitting `Type::method` forms.
    pub fn parse(s: &str) -> Self {
        match split_method_target(s) {
            Some((ty, method)) => Target::Method(Receiver::Type(ty.to_string()), method.to_string()),
            None => Target::Name(s.to_string()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Splits `"Type::method"` into its halves; both must be non-empty.
pub(crate) fn split_method_target(s: &str) -> Option<(&str, &str)> {
    let (ty, method) = s.split_once("::")?;
    if ty.is_empty() || method.is_empty() || method.contains("::") {
        return None;
    }
    Some((ty, method))
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::parse(s)
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::parse(&s)
    }
}

impl From<&String> for Target {
    fn from(s: &String) -> Self {
        Target::parse(s)
    }
}

impl From<Callable> for Target {
    fn from(c: Callable) -> Self {
        Target::Callable(c)
    }
}

impl From<(&str, &str)> for Target {
    fn from((ty, method): (&str, &str)) -> Self {
        Target::Method(Receiver::Type(ty.to_string()), method.to_string())
    }
}

impl From<(Object, &str)> for Target {
    fn from((obj, method): (Object, &str)) -> Self {
        Target::Method(Receiver::Instance(obj), method.to_string())
    }
}

impl From<(&Object, &str)> for Target {
    fn from((obj, method): (&Object, &str)) -> Self {
        Target::Method(Receiver::Instance(obj.clone()), method.to_string())
    }
}
