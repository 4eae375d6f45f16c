//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Represents the failure kinds that can occur while building definitions,
/// binding parameters, invoking targets or looking up container entries.
///
/// Errors raised deeper in a resolution are kept as the `source` of the
/// error that wraps them, so the whole chain stays available through
/// [`DiError::chain`] and [`DiError::root_cause`].
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Callable, Container, DiError, Param, TypeRegistry};
///
/// let container = Container::new(TypeRegistry::new());
/// let greet = Callable::closure(vec![Param::new("name").typed("string")], |args| Ok(args[0].clone()));
///
/// let err = container.call(greet, Args::new()).unwrap_err();
/// assert!(err.is_resolver());
/// assert!(err.full_message().contains("Parameter $name (type: string)"));
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// A definition's concrete target cannot be reflected
    #[error("{0}")]
    InvalidDefinition(String),
    /// A setup/return action is neither a property (`$`) nor a method (`@`)
    #[error("{0}")]
    InvalidActionName(String),
    /// A single parameter could not be bound
    #[error("{message}")]
    FailedResolveParameter {
        message: String,
        #[source]
        source: Option<Box<DiError>>,
    },
    /// Construction, invocation or parameter resolution failed
    #[error("{message}")]
    Resolver {
        message: String,
        #[source]
        source: Option<Box<DiError>>,
    },
    /// Key is not known to the container
    #[error("{message}")]
    NotFound {
        message: String,
        #[source]
        source: Option<Box<DiError>>,
    },
    /// Alias lookup failed
    #[error("Alias name \"{0}\" does not exist.")]
    AliasNotFound(String),
    /// Definition lookup failed
    #[error("Service definition {0} does not exist in the container.")]
    DefinitionNotFound(String),
    /// `define` was called for a key that already exists
    #[error("Key \"{0}\" already defined in this container. Use extend() to modify its definition or override_definition() to replace it.")]
    OverwriteExistingService(String),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Service provider registration or boot failure
    #[error("{0}")]
    Container(String),
    /// `boot_services` was called twice
    #[error("Services are already booted")]
    ServicesAlreadyBooted,
    /// Error raised by a constructor, method or function body
    #[error("{0}")]
    Invocation(String),
    /// Configuration could not be loaded or read
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    pub(crate) fn resolver(message: impl Into<String>) -> Self {
        DiError::Resolver { message: message.into(), source: None }
    }

    pub(crate) fn resolver_with(message: impl Into<String>, source: DiError) -> Self {
        DiError::Resolver { message: message.into(), source: Some(Box::new(source)) }
    }

    pub(crate) fn failed_parameter(message: impl Into<String>, source: Option<DiError>) -> Self {
        DiError::FailedResolveParameter { message: message.into(), source: source.map(Box::new) }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        DiError::NotFound { message: message.into(), source: None }
    }

    pub(crate) fn not_found_with(message: impl Into<String>, source: DiError) -> Self {
        DiError::NotFound { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Returns the error that caused this one, if any.
    pub fn cause(&self) -> Option<&DiError> {
        match self {
            DiError::FailedResolveParameter { source, .. }
            | DiError::Resolver { source, .. }
            | DiError::NotFound { source, .. } => source.as_deref(),
            _ => None,
        }
    }

    /// Iterates this error followed by each of its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &DiError> {
        std::iter::successors(Some(self), |e| e.cause())
    }

    /// Returns the innermost error of the chain.
    pub fn root_cause(&self) -> &DiError {
        self.chain().last().unwrap_or(self)
    }

    /// Joins the messages of the whole chain with `": "`.
    pub fn full_message(&self) -> String {
        self.chain()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }

    pub fn is_resolver(&self) -> bool {
        matches!(self, DiError::Resolver { .. })
    }

    pub fn is_failed_parameter(&self) -> bool {
        matches!(self, DiError::FailedResolveParameter { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::NotFound { .. })
    }

    /// True when a cycle or depth overflow appears anywhere in the chain.
    ///
    /// Such errors are never swallowed by the fallback steps of parameter
    /// binding.
    pub fn is_cycle(&self) -> bool {
        self.chain()
            .any(|e| matches!(e, DiError::CyclicDependency(_) | DiError::DepthExceeded(_)))
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
