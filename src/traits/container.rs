//! The collaborator contract the resolver and definitions work against.

use crate::error::DiResult;
use crate::target::Target;
use crate::types::TypeRegistry;
use crate::value::{Args, Value};

/// Operations the resolution core needs from a container.
///
/// [`Resolver`](crate::Resolver) and [`Definition`](crate::Definition) only
/// ever talk to a container through this trait. [`Container`](crate::Container)
/// is the full implementation; tests and embedders can provide their own.
pub trait ContainerContract {
    /// Resolves a key, raising [`DiError::NotFound`](crate::DiError::NotFound)
    /// when it cannot be resolved.
    fn get(&self, key: &str) -> DiResult<Value>;

    /// Builds or invokes a target, binding its parameters from `args`.
    fn call(&self, target: &Target, args: Args) -> DiResult<Value>;

    /// Already-resolved contextual bindings for a declaring type.
    ///
    /// Keys are either `$parameter` names or type names. An empty map means
    /// the type has no contextual bindings. Errors are reserved for failures
    /// that must not be hidden, such as dependency cycles.
    fn contextual_bindings(&self, declaring_type: &str) -> DiResult<Args>;

    /// Registry used to reflect on types and functions.
    fn types(&self) -> &TypeRegistry;
}
