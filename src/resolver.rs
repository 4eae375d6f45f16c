//! The autowiring engine.
//!
//! [`Resolver`] classifies a [`Target`] into one of three modes (constructor,
//! method, free function), binds every declared parameter from the caller's
//! arguments, contextual bindings and the container, then invokes the target.
//!
//! Parameter binding tries the following sources in order, first match wins:
//!
//! 1. a caller argument named like the parameter (or at its position),
//! 2. a caller argument keyed by the parameter's declared type,
//! 3. the declaring type's contextual binding for `$name`,
//! 4. the declaring type's contextual binding for the declared type,
//! 5. the container entry for the declared type,
//! 6. the parameter's default value,
//! 7. null, when the parameter allows it.
//!
//! Values from sources 1-4 go through a type check before they are used.

use tracing::{debug, trace};

use crate::error::{DiError, DiResult};
use crate::target::{Receiver, Target};
use crate::traits::ContainerContract;
use crate::types::{
    Builtin, Callable, Object, ParameterDescriptor, TypeHint, TypeRegistry, FACTORY_CONTRACT, FACTORY_METHOD,
    INJECTOR_PREFIX,
};
use crate::value::{Args, Value};

/// Binds parameters and invokes targets on behalf of a container.
///
/// The resolver is a short-lived view over a [`ContainerContract`]; it holds
/// no state of its own, so creating one per call is free.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{
///     Args, Container, ContainerOptions, Param, Resolver, Target, TypeDescriptor, TypeRegistry, Value,
/// };
///
/// let types = TypeRegistry::new()
///     .with_type(TypeDescriptor::class("Clock").method("now", vec![], |_, _| Ok(Value::Int(42))))
///     .with_type(
///         TypeDescriptor::class("Scheduler")
///             .constructor(vec![Param::new("clock").typed("Clock")], |this, args| {
///                 this.set("clock", args[0].clone());
///                 Ok(())
///             }),
///     );
/// let options = ContainerOptions { autowire: true, ..Default::default() };
/// let container = Container::with_options(types, options);
///
/// let resolver = Resolver::new(&container);
/// let scheduler = resolver.resolve(&Target::from("Scheduler"), &Args::new()).unwrap();
/// let clock = scheduler.as_object().unwrap().get("clock");
/// assert_eq!(clock.as_object().unwrap().type_name(), "Clock");
/// ```
pub struct Resolver<'c> {
    container: &'c dyn ContainerContract,
}

impl<'c> Resolver<'c> {
    pub fn new(container: &'c dyn ContainerContract) -> Self {
        Self { container }
    }

    fn types(&self) -> &'c TypeRegistry {
        self.container.types()
    }

    /// Builds or invokes `target` with `args`.
    pub fn resolve(&self, target: &Target, args: &Args) -> DiResult<Value> {
        match target {
            Target::Name(name) => {
                if let Some(function) = self.types().function(name) {
                    return self.resolve_function(function, args);
                }
                self.resolve_type(name, args)
            }
            Target::Method(receiver, method) => self.resolve_method(receiver, method, args),
            Target::Callable(callable) => self.resolve_function(callable, args),
        }
    }

    /// Resolves a dynamic value used as a target.
    ///
    /// Strings are type names, function names or `Type::method`; a two
    /// element list is a `[receiver, method]` pair; callables are invoked.
    pub fn resolve_value(&self, target: &Value, args: &Args) -> DiResult<Value> {
        let target = target_from_value(target)?;
        self.resolve(&target, args)
    }

    fn resolve_type(&self, name: &str, args: &Args) -> DiResult<Value> {
        let types = self.types();
        let ty = types
            .get(name)
            .ok_or_else(|| DiError::resolver(format!("Class \"{}\" does not exist", name)))?;
        if !ty.is_instantiable() {
            return Err(DiError::resolver(format!("Class \"{}\" is not instantiable.", name)));
        }

        let object = Object::new(name, types.default_properties(name));
        if let Some(ctor) = types.constructor(name) {
            if !ctor.is_public() {
                return Err(DiError::resolver(format!(
                    "{} can not be instantiated because its constructor is not public.",
                    name
                )));
            }
            let bound = self.resolve_parameters(ctor.parameters(), args).map_err(into_resolver)?;
            ctor.invoke(&object, &bound).map_err(|e| {
                DiError::resolver_with(format!("Class {} could not be instantiated.", name), e)
            })?;
        }

        // Positional entries belong to the constructor signature
        let named = named_only(args);
        self.resolve_injectors(&object, &named)?;

        if types.is_subtype(name, FACTORY_CONTRACT) {
            return self.create_from_factory(object, &named);
        }
        Ok(Value::Object(object))
    }

    /// Invokes every public `inject*` method of the instance once.
    fn resolve_injectors(&self, object: &Object, args: &Args) -> DiResult<()> {
        let injectors: Vec<String> = self
            .types()
            .methods(object.type_name())
            .into_iter()
            .filter(|m| m.is_public() && !m.is_abstract() && m.name().starts_with(INJECTOR_PREFIX))
            .map(|m| m.name().to_string())
            .collect();

        for injector in injectors {
            trace!(target_type = object.type_name(), injector = %injector, "running injector");
            self.resolve_method(&Receiver::Instance(object.clone()), &injector, args)?;
        }
        Ok(())
    }

    fn create_from_factory(&self, factory: Object, args: &Args) -> DiResult<Value> {
        let name = factory.type_name().to_string();
        let create = self.types().find_method(&name, FACTORY_METHOD).ok_or_else(|| {
            DiError::resolver(format!("Factory object '{}' does not implement create() method.", name))
        })?;
        if !create.is_public() || create.is_static() || create.is_abstract() {
            return Err(DiError::resolver(format!(
                "Factory method '{}::create()' must be a public and non static.",
                name
            )));
        }
        self.resolve_method(&Receiver::Instance(factory), FACTORY_METHOD, args)
    }

    fn resolve_method(&self, receiver: &Receiver, method_name: &str, args: &Args) -> DiResult<Value> {
        let type_name = receiver.type_name();
        let method = self.types().find_method(type_name, method_name).ok_or_else(|| {
            DiError::resolver(format!("Method {}::{}() does not exist", type_name, method_name))
        })?;
        let qualified = method.qualified_name();

        let instance = if method.is_static() {
            None
        } else {
            Some(self.receiver_instance(receiver, &qualified)?)
        };

        if !method.is_public() {
            return Err(DiError::resolver(format!("Method {}() could not be invoked.", qualified)));
        }

        let bound = self.resolve_parameters(method.parameters(), args).map_err(|e| {
            wrap_parameters(format!("Failed resolving method {} parameters.", qualified), e)
        })?;

        method
            .invoke(instance.as_ref(), &bound)
            .map_err(|e| DiError::resolver_with(format!("Method {}() could not be invoked.", qualified), e))
    }

    fn receiver_instance(&self, receiver: &Receiver, qualified: &str) -> DiResult<Object> {
        let type_name = match receiver {
            Receiver::Instance(object) => return Ok(object.clone()),
            Receiver::Type(type_name) => type_name,
        };
        let cannot_build = |source: DiError| {
            DiError::resolver_with(
                format!(
                    "Method {}() could not be invoked because its declaring class could not be instantiated.",
                    qualified
                ),
                source,
            )
        };
        match self.resolve_type(type_name, &Args::new()) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(other) => Err(cannot_build(DiError::resolver(format!(
                "Class {} resolved to {} instead of an object.",
                type_name,
                other.kind_name()
            )))),
            Err(e) => Err(cannot_build(e)),
        }
    }

    fn resolve_function(&self, function: &Callable, args: &Args) -> DiResult<Value> {
        let bound = self.resolve_parameters(function.parameters(), args).map_err(|e| {
            wrap_parameters(format!("Failed resolving function {} parameters.", function.name()), e)
        })?;
        function.invoke(&bound).map_err(|e| {
            DiError::resolver_with(format!("Function {}() could not be invoked.", function.name()), e)
        })
    }

    /// Binds a whole signature, in declaration order.
    ///
    /// A parameter failure is wrapped with the 1-based position and the
    /// qualified name of the owning function.
    pub fn resolve_parameters(&self, params: &[ParameterDescriptor], args: &Args) -> DiResult<Vec<Value>> {
        let mut bound = Vec::with_capacity(params.len());
        for param in params {
            match self.resolve_parameter(param, args) {
                Ok(value) => bound.push(value),
                Err(e) if e.is_failed_parameter() => {
                    return Err(DiError::failed_parameter(
                        format!(
                            "Failed resolve the #{} {}() parameter.",
                            param.position() + 1,
                            param.qualified_function()
                        ),
                        Some(e),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(bound)
    }

    /// Binds a single parameter with the precedence chain.
    pub fn resolve_parameter(&self, param: &ParameterDescriptor, args: &Args) -> DiResult<Value> {
        if let Some(value) = provided(args, param.name()).or_else(|| provided(args, &param.position().to_string())) {
            trace!(param = param.name(), source = "argument", "binding parameter");
            return self.check_provided_value(param, value.clone());
        }

        if let Some(value) = param.class_name().and_then(|class| provided(args, class)) {
            trace!(param = param.name(), source = "argument by type", "binding parameter");
            return self.check_provided_value(param, value.clone());
        }

        let bindings = match param.declaring_type() {
            Some(declaring) => self.container.contextual_bindings(declaring)?,
            None => Args::new(),
        };

        if let Some(value) = bindings.get(&format!("${}", param.name())) {
            trace!(param = param.name(), source = "contextual", "binding parameter");
            return self.check_provided_value(param, value.clone());
        }

        if let Some(value) = param.class_name().and_then(|class| bindings.get(class)) {
            trace!(param = param.name(), source = "contextual by type", "binding parameter");
            return self.check_provided_value(param, value.clone());
        }

        let mut error = None;
        if let Some(class) = param.class_name() {
            match self.container.get(class) {
                Ok(value) => {
                    trace!(param = param.name(), source = "container", "binding parameter");
                    return Ok(value);
                }
                Err(e) if e.is_cycle() => return Err(e),
                Err(e) => {
                    debug!(param = param.name(), dependency = class, error = %e, "auto-resolution failed, falling back");
                    error = Some(e);
                }
            }
        }

        if let Some(default) = param.default_value() {
            return Ok(default.clone());
        }

        if param.allows_null() {
            return Ok(Value::Null);
        }

        let message = if param.is_builtin() {
            format!(
                "Parameter ${} (type: {}) is not allowing null and no default value provided.",
                param.name(),
                param.type_name()
            )
        } else {
            format!(
                "Parameter ${} (type: {}) could not be resolved automatically, it is not allowing null and no default value provided.",
                param.name(),
                param.type_name()
            )
        };
        Err(DiError::failed_parameter(message, error))
    }

    /// Dereferences a [`Reference`](crate::Reference) and checks the value
    /// against the declared type.
    fn check_provided_value(&self, param: &ParameterDescriptor, value: Value) -> DiResult<Value> {
        let value = match value {
            Value::Reference(reference) => match self.container.get(reference.target()) {
                Ok(resolved) => resolved,
                Err(e) if e.is_cycle() => return Err(e),
                Err(e) => {
                    debug!(param = param.name(), reference = reference.target(), error = %e, "reference lookup failed, using null");
                    Value::Null
                }
            },
            other => other,
        };

        let Some(hint) = param.type_hint() else {
            return Ok(value);
        };
        if value.is_null() && param.allows_null() {
            return Ok(value);
        }

        let types = self.types();
        let actual = types.semantic_type(&value);
        if actual == hint.name() || is_compatible(types, hint, &value) {
            return Ok(value);
        }

        let expected = match hint {
            TypeHint::Builtin(b) => b.name().to_string(),
            TypeHint::Named(name) => format!("an instance of {}", name),
        };
        Err(DiError::failed_parameter(
            format!("Parameter ${} expects {}. Provided {}.", param.name(), expected, actual),
            None,
        ))
    }
}

/// Caller argument under `key`; null entries count as absent.
fn named_only(args: &Args) -> Args {
    let mut named = args.clone();
    named.retain(|key, _| key.parse::<usize>().is_err());
    named
}

fn provided<'a>(args: &'a Args, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

fn is_compatible(types: &TypeRegistry, hint: &TypeHint, value: &Value) -> bool {
    match (hint, value) {
        (TypeHint::Builtin(Builtin::Callable), _) => types.is_invocable(value),
        (TypeHint::Builtin(Builtin::String), Value::String(_)) => true,
        (TypeHint::Builtin(Builtin::Object), Value::Object(_)) => true,
        (TypeHint::Named(expected), Value::Object(object)) => types.is_subtype(object.type_name(), expected),
        _ => false,
    }
}

/// Normalizes a parameter failure into a resolver error with the same message.
fn into_resolver(error: DiError) -> DiError {
    match error {
        DiError::FailedResolveParameter { message, source } => DiError::Resolver { message, source },
        other => other,
    }
}

fn wrap_parameters(message: String, error: DiError) -> DiError {
    if error.is_failed_parameter() {
        DiError::resolver_with(message, error)
    } else {
        error
    }
}

fn target_from_value(value: &Value) -> DiResult<Target> {
    match value {
        Value::String(s) => Ok(Target::parse(s)),
        Value::Callable(c) => Ok(Target::Callable(c.clone())),
        Value::List(items) => match items.as_slice() {
            [Value::Object(object), Value::String(method)] => {
                Ok(Target::Method(Receiver::Instance(object.clone()), method.clone()))
            }
            [Value::String(type_name), Value::String(method)] => {
                Ok(Target::Method(Receiver::Type(type_name.clone()), method.clone()))
            }
            _ => Err(invalid_target(value)),
        },
        _ => Err(invalid_target(value)),
    }
}

fn invalid_target(value: &Value) -> DiError {
    DiError::resolver(format!(
        "A target must be a type name, a function, a [receiver, method] pair or a callable. Provided {}.",
        value.kind_name()
    ))
}
