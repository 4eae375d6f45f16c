//! Definition recipes: how to build and finish the value of a container key.

use std::fmt;

use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::target::{Receiver, Target};
use crate::traits::ContainerContract;
use crate::types::{Object, TypeRegistry};
use crate::value::{merge_tree, Args, Value};

/// A post-construction step run against the built object.
///
/// Steps are parsed once when they are added to a definition. The string
/// form accepted by [`Definition::add_setup`] and [`Definition::returns`]
/// uses `$name` for a property and `@name` for a method.
///
/// ```rust
/// use ferrous_autowire::{SetupStep, Value};
///
/// let step = SetupStep::parse("$text", Value::from("hi")).unwrap();
/// assert!(matches!(step, SetupStep::PropertyAssignment { ref name, .. } if name == "text"));
/// assert_eq!(step.to_string(), "$text");
///
/// assert!(SetupStep::parse("text", Value::Null).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SetupStep {
    /// Assign `value` to the property `name`
    PropertyAssignment { name: String, value: Value },
    /// Invoke the method `name` through the resolver with `args`
    MethodInvocation { name: String, args: Args },
}

impl SetupStep {
    pub fn property(name: impl Into<String>, value: impl Into<Value>) -> Self {
        SetupStep::PropertyAssignment { name: name.into(), value: value.into() }
    }

    pub fn method(name: impl Into<String>, args: Args) -> Self {
        SetupStep::MethodInvocation { name: name.into(), args }
    }

    /// Parses `$property` or `@method`; the value becomes the assigned value
    /// or the method's argument bag.
    pub fn parse(action: &str, value: impl Into<Value>) -> DiResult<Self> {
        let value = value.into();
        if let Some(name) = action.strip_prefix('$').filter(|n| !n.is_empty()) {
            return Ok(SetupStep::property(name, value));
        }
        if let Some(name) = action.strip_prefix('@').filter(|n| !n.is_empty()) {
            return Ok(SetupStep::method(name, value.into_args()));
        }
        Err(DiError::InvalidActionName(format!(
            "The action \"{}\" must be a property (prefixed with $) or method name (prefixed with @).",
            action
        )))
    }

    pub fn name(&self) -> &str {
        match self {
            SetupStep::PropertyAssignment { name, .. } | SetupStep::MethodInvocation { name, .. } => name,
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::PropertyAssignment { name, .. } => write!(f, "${}", name),
            SetupStep::MethodInvocation { name, .. } => write!(f, "@{}", name),
        }
    }
}

/// One entry handed to [`Definition::set_params`].
#[derive(Debug, Clone)]
pub enum ParamSpec {
    /// Override a parameter with a value
    Named(String, Value),
    /// Require a parameter to be supplied by the caller
    Required(String),
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for ParamSpec {
    fn from((key, value): (K, V)) -> Self {
        ParamSpec::Named(key.into(), value.into())
    }
}

impl From<&str> for ParamSpec {
    fn from(name: &str) -> Self {
        ParamSpec::Required(name.to_string())
    }
}

impl From<String> for ParamSpec {
    fn from(name: String) -> Self {
        ParamSpec::Required(name)
    }
}

/// Recipe describing how to build and finish the value of a key.
///
/// A definition holds a concrete target (a type to construct, a function,
/// a closure or a method), parameter overrides merged into every call,
/// ordered setup steps run on the built object and an optional return step
/// whose result replaces the object.
///
/// The concrete target is validated against the type registry when the
/// definition is created, never later.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Container, Definition, Param, TypeDescriptor, TypeRegistry, Value};
///
/// let types = TypeRegistry::new().with_type(
///     TypeDescriptor::class("Greeter")
///         .constructor(vec![Param::new("text").typed("string")], |this, args| {
///             this.set("text", args[0].clone());
///             Ok(())
///         })
///         .method("getText", vec![], |this, _| Ok(this.get("text"))),
/// );
///
/// let mut greeting = Definition::new(&types, "Greeter").unwrap();
/// greeting.set_param("text", "foo");
/// greeting.returns("@getText", Value::Null).unwrap();
///
/// let container = Container::new(types);
/// assert_eq!(greeting.resolve(&container, Args::new()).unwrap(), Value::from("foo"));
/// ```
#[derive(Debug, Clone)]
pub struct Definition {
    concrete: Target,
    parameters: Args,
    setup: Vec<SetupStep>,
    returns: Option<SetupStep>,
    lifetime: Lifetime,
}

impl Definition {
    /// Creates a definition, failing with [`DiError::InvalidDefinition`] when
    /// the concrete cannot be reflected.
    pub fn new(types: &TypeRegistry, concrete: impl Into<Target>) -> DiResult<Self> {
        let concrete = concrete.into();
        if !is_reflectable(types, &concrete) {
            return Err(DiError::InvalidDefinition(format!(
                "Factory concrete definition must be a callable or a fully qualified class name. Provided \"{}\".",
                concrete
            )));
        }
        Ok(Self {
            concrete,
            parameters: Args::new(),
            setup: Vec::new(),
            returns: None,
            lifetime: Lifetime::Transient,
        })
    }

    /// [`new`](Self::new) followed by [`set_params`](Self::set_params).
    pub fn with_args<I, P>(types: &TypeRegistry, concrete: impl Into<Target>, params: I) -> DiResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamSpec>,
    {
        let mut definition = Self::new(types, concrete)?;
        definition.set_params(params);
        Ok(definition)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(key, value);
        self
    }

    /// Stores several overrides.
    ///
    /// A [`ParamSpec::Required`] entry stores the name with a null value,
    /// which leaves the parameter to be supplied at call time.
    pub fn set_params<I, P>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamSpec>,
    {
        for param in params {
            match param.into() {
                ParamSpec::Named(key, value) => self.set_param(key, value),
                ParamSpec::Required(key) => self.set_param(key, Value::Null),
            };
        }
        self
    }

    pub fn set_shared(&mut self, shared: bool) -> &mut Self {
        self.lifetime = Lifetime::from(shared);
        self
    }

    pub fn is_shared(&self) -> bool {
        self.lifetime.is_shared()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Appends a `$property` or `@method` step.
    pub fn add_setup(&mut self, action: &str, value: impl Into<Value>) -> DiResult<&mut Self> {
        let step = SetupStep::parse(action, value)?;
        Ok(self.push_setup(step))
    }

    pub fn push_setup(&mut self, step: SetupStep) -> &mut Self {
        self.setup.push(step);
        self
    }

    /// Sets the return step, replacing an earlier one.
    pub fn returns(&mut self, action: &str, value: impl Into<Value>) -> DiResult<&mut Self> {
        let step = SetupStep::parse(action, value)?;
        Ok(self.set_return(step))
    }

    pub fn set_return(&mut self, step: SetupStep) -> &mut Self {
        self.returns = Some(step);
        self
    }

    pub fn concrete(&self) -> &Target {
        &self.concrete
    }

    pub fn parameters(&self) -> &Args {
        &self.parameters
    }

    pub fn setup_steps(&self) -> &[SetupStep] {
        &self.setup
    }

    pub fn return_step(&self) -> Option<&SetupStep> {
        self.returns.as_ref()
    }

    /// Builds the value: calls the concrete with `args` merged over the stored
    /// parameters, runs the setup steps in order, then the return step.
    pub fn resolve(&self, container: &dyn ContainerContract, args: Args) -> DiResult<Value> {
        let built = container.call(&self.concrete, merge_tree(&args, &self.parameters))?;

        for step in &self.setup {
            let object = self.step_receiver(&built, step)?;
            match step {
                SetupStep::PropertyAssignment { name, value } => object.set(name.as_str(), value.clone()),
                SetupStep::MethodInvocation { name, args } => {
                    invoke_on(container, object, name, args.clone())?;
                }
            }
        }

        let Some(step) = &self.returns else {
            return Ok(built);
        };
        let object = self.step_receiver(&built, step)?;
        match step {
            SetupStep::PropertyAssignment { name, .. } => Ok(object.get(name)),
            SetupStep::MethodInvocation { name, args } => invoke_on(container, object, name, args.clone()),
        }
    }

    fn step_receiver<'v>(&self, built: &'v Value, step: &SetupStep) -> DiResult<&'v Object> {
        built.as_object().ok_or_else(|| {
            DiError::resolver(format!(
                "Setup step \"{}\" of {} needs an object, the concrete resolved to {}.",
                step,
                self.concrete,
                built.kind_name()
            ))
        })
    }
}

fn invoke_on(container: &dyn ContainerContract, object: &Object, method: &str, args: Args) -> DiResult<Value> {
    let target = Target::Method(Receiver::Instance(object.clone()), method.to_string());
    container.call(&target, args)
}

fn is_reflectable(types: &TypeRegistry, concrete: &Target) -> bool {
    match concrete {
        Target::Name(name) => types.contains_type(name) || types.contains_function(name),
        Target::Method(receiver, method) => types.find_method(receiver.type_name(), method).is_some(),
        Target::Callable(_) => true,
    }
}
