//! Explicit type model used in place of runtime reflection.
//!
//! Every constructible type, interface, mixin and free function the resolver
//! can work with is described up front and collected in a [`TypeRegistry`].

pub mod descriptor;
pub mod function;
pub mod object;
pub mod param;
pub mod registry;

pub use descriptor::{ConstructorDescriptor, MethodDescriptor, TypeDescriptor, TypeKind, Visibility};
pub use function::Callable;
pub use object::Object;
pub use param::{Builtin, Param, ParameterDescriptor, TypeHint};
pub use registry::TypeRegistry;

/// Interface marking a type whose instances build the real service.
///
/// After a type implementing it is constructed, its `create` method is
/// resolved and invoked and the result is returned in place of the factory.
pub const FACTORY_CONTRACT: &str = "Factory";

/// Name of the method a factory must expose.
pub const FACTORY_METHOD: &str = "create";

/// Prefix of post-construction injector methods.
pub const INJECTOR_PREFIX: &str = "inject";
