//! # ferrous-autowire
//!
//! Autowiring dependency injection container driven by runtime type
//! descriptors.
//!
//! Types, their constructors, methods and parameter signatures are described
//! once in a [`TypeRegistry`]. The container then builds instances and calls
//! methods and functions, binding every parameter from explicit arguments,
//! contextual bindings, other container keys and declared defaults.
//!
//! ## Features
//!
//! - **Autowiring**: constructor and method parameters are bound by name,
//!   position, contextual binding or type
//! - **Definitions**: reusable recipes with parameter overrides, setup
//!   steps (`$property` assignments and `@method` calls) and return steps
//! - **Lifetimes**: shared definitions are cached, transient ones rebuilt on
//!   every lookup
//! - **Contextual bindings**: `when(..).needs(..).give(..)` per dependent type,
//!   inherited by subtypes and implementers
//! - **Service providers**: modular registration, optionally deferred until
//!   one of the provided keys is looked up
//! - **Circular dependency detection**: cycles fail with the full key path
//! - **Observability**: `tracing` events and pluggable [`DiObserver`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_autowire::{Args, Container, Param, TypeDescriptor, TypeRegistry, Value};
//!
//! let types = TypeRegistry::new()
//!     .with_type(TypeDescriptor::class("Config").property("dsn", "postgres://localhost"))
//!     .with_type(
//!         TypeDescriptor::class("Database")
//!             .constructor(vec![Param::new("config").typed("Config")], |this, args| {
//!                 let config = args[0].as_object().map(|c| c.get("dsn")).unwrap_or_default();
//!                 this.set("dsn", config);
//!                 Ok(())
//!             }),
//!     );
//!
//! let container = Container::new(types);
//! container.define_shared("Config", ()).unwrap();
//! container.define_shared("Database", ()).unwrap();
//!
//! let db = container.get("Database").unwrap();
//! assert_eq!(db.as_object().unwrap().get("dsn"), Value::from("postgres://localhost"));
//! assert_eq!(db, container.get("Database").unwrap());
//! ```
//!
//! ## Definitions
//!
//! ```rust
//! use ferrous_autowire::{Args, Container, Definition, Param, TypeDescriptor, TypeRegistry, Value};
//!
//! let types = TypeRegistry::new().with_type(
//!     TypeDescriptor::class("Mailer")
//!         .property("from", Value::Null)
//!         .constructor(vec![Param::new("host").typed("string")], |this, args| {
//!             this.set("host", args[0].clone());
//!             Ok(())
//!         }),
//! );
//!
//! let container = Container::new(types);
//! let mut mailer = Definition::with_args(container.types(), "Mailer", [("host", "smtp.local")]).unwrap();
//! mailer.add_setup("$from", "noreply@local").unwrap();
//! container.define("mailer", mailer).unwrap();
//!
//! let built = container.get("mailer").unwrap();
//! let built = built.as_object().unwrap();
//! assert_eq!(built.get("host"), Value::from("smtp.local"));
//! assert_eq!(built.get("from"), Value::from("noreply@local"));
//! ```
//!
//! ## Calling Functions
//!
//! ```rust
//! use ferrous_autowire::{Args, Callable, Container, Param, TypeRegistry, Value};
//!
//! let container = Container::new(TypeRegistry::new());
//!
//! let greet = Callable::closure(
//!     vec![Param::new("greeting").typed("string"), Param::new("name").with_default("World")],
//!     |args| {
//!         let greeting = args[0].as_str().unwrap_or_default();
//!         let name = args[1].as_str().unwrap_or_default();
//!         Ok(Value::from(format!("{} {}", greeting, name)))
//!     },
//! );
//!
//! // `greeting` is bound by position, `name` falls back to its default
//! let out = container.call(greet, Args::new().with("0", "Hello")).unwrap();
//! assert_eq!(out, Value::from("Hello World"));
//! ```

pub mod config;
pub mod container;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod lifetime;
pub mod observer;
pub mod reference;
pub mod resolver;
pub mod target;
pub mod traits;
pub mod types;
pub mod value;

mod internal;

pub use config::{Config, ConfigSource, ContainerOptions, EnvironmentSource, MapSource};
pub use container::{
    Container, ContextualBinding, ContextualBindingBuilder, DefinitionSource, Implementation, ServiceProvider,
};
pub use definition::{Definition, ParamSpec, SetupStep};
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver, MetricsObserver};
pub use reference::{reference, Reference};
pub use resolver::Resolver;
pub use target::{Receiver, Target};
pub use traits::ContainerContract;
pub use types::{
    Builtin, Callable, ConstructorDescriptor, MethodDescriptor, Object, Param, ParameterDescriptor, TypeDescriptor,
    TypeHint, TypeKind, TypeRegistry, Visibility, FACTORY_CONTRACT, FACTORY_METHOD, INJECTOR_PREFIX,
};
pub use value::{merge_tree, Args, Value};
