//! Type, constructor and method descriptors.

use std::fmt;
use std::rc::Rc;

use crate::error::{DiError, DiResult};
use crate::types::object::Object;
use crate::types::param::{bind_signature, ParameterDescriptor};
use crate::value::{Args, Value};

/// Body run on a freshly allocated instance with the bound constructor arguments.
pub type ConstructorBody = dyn Fn(&Object, &[Value]) -> DiResult<()>;
/// Body of an instance method.
pub type MethodBody = dyn Fn(&Object, &[Value]) -> DiResult<Value>;
/// Body of a static method.
pub type StaticBody = dyn Fn(&[Value]) -> DiResult<Value>;

/// What kind of type a descriptor declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete, instantiable type
    Class,
    /// Cannot be instantiated, may be extended
    Abstract,
    /// Capability other types declare they implement
    Interface,
    /// Bundle of methods copied into the types that use it
    Mixin,
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Constructor signature and body.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    params: Vec<ParameterDescriptor>,
    visibility: Visibility,
    body: Rc<ConstructorBody>,
}

/// Function name used for constructors in error messages.
pub const CONSTRUCTOR_NAME: &str = "constructor";

impl ConstructorDescriptor {
    pub fn new<F>(params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> DiResult<()> + 'static,
    {
        Self {
            params,
            visibility: Visibility::Public,
            body: Rc::new(body),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub(crate) fn invoke(&self, instance: &Object, args: &[Value]) -> DiResult<()> {
        (self.body)(instance, args)
    }
}

#[derive(Clone)]
enum MethodKind {
    Instance(Rc<MethodBody>),
    Static(Rc<StaticBody>),
    Abstract,
}

/// A named method of a type.
///
/// ```rust
/// use ferrous_autowire::{MethodDescriptor, Param, Value, Visibility};
///
/// let m = MethodDescriptor::static_fn("version", vec![], |_| Ok(Value::from("1.0")));
/// assert!(m.is_static());
///
/// let hidden = MethodDescriptor::instance("secret", vec![Param::new("x")], |_, _| Ok(Value::Null))
///     .visibility(Visibility::Private);
/// assert!(!hidden.is_public());
/// ```
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParameterDescriptor>,
    visibility: Visibility,
    kind: MethodKind,
    declaring_type: String,
}

impl MethodDescriptor {
    pub fn instance<F>(name: impl Into<String>, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> DiResult<Value> + 'static,
    {
        Self::with_kind(name, params, MethodKind::Instance(Rc::new(body)))
    }

    pub fn static_fn<F>(name: impl Into<String>, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&[Value]) -> DiResult<Value> + 'static,
    {
        Self::with_kind(name, params, MethodKind::Static(Rc::new(body)))
    }

    pub fn abstract_fn(name: impl Into<String>, params: Vec<ParameterDescriptor>) -> Self {
        Self::with_kind(name, params, MethodKind::Abstract)
    }

    fn with_kind(name: impl Into<String>, params: Vec<ParameterDescriptor>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            params,
            visibility: Visibility::Public,
            kind,
            declaring_type: String::new(),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, MethodKind::Static(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, MethodKind::Abstract)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Type that declares the method. A mixin method looked up through a type
    /// using the mixin reports that type.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    /// Copy of a mixin method as declared by `host`, the type using the mixin.
    pub(crate) fn rebound_to(&self, host: &str) -> MethodDescriptor {
        let mut method = self.clone();
        method.declaring_type = host.to_string();
        bind_signature(&mut method.params, Some(host), &method.name);
        method
    }

    pub(crate) fn invoke(&self, receiver: Option<&Object>, args: &[Value]) -> DiResult<Value> {
        match (&self.kind, receiver) {
            (MethodKind::Static(body), _) => body(args),
            (MethodKind::Instance(body), Some(this)) => body(this, args),
            (MethodKind::Instance(_), None) => Err(DiError::Invocation(format!(
                "Non-static method {}() cannot be called statically.",
                self.qualified_name()
            ))),
            (MethodKind::Abstract, _) => Err(DiError::Invocation(format!(
                "Cannot call abstract method {}().",
                self.qualified_name()
            ))),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.qualified_name())
            .field("params", &self.params)
            .field("static", &self.is_static())
            .field("abstract", &self.is_abstract())
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Everything the resolver needs to know about a type.
///
/// Descriptors replace runtime reflection: they declare the type's kind,
/// its parent and interfaces (its capability set), default property values,
/// its constructor signature and its methods in declaration order.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Param, TypeDescriptor, Value};
///
/// let greeter = TypeDescriptor::class("Greeter")
///     .implements("Greets")
///     .constructor(vec![Param::new("text").typed("string").nullable()], |this, args| {
///         this.set("text", args[0].clone());
///         Ok(())
///     })
///     .method("getText", vec![], |this, _| Ok(this.get("text")));
///
/// assert!(greeter.is_instantiable());
/// assert_eq!(greeter.interfaces(), ["Greets".to_string()]);
/// assert!(greeter.own_method("getText").is_some());
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    parent: Option<String>,
    interfaces: Vec<String>,
    mixins: Vec<String>,
    properties: Args,
    constructor: Option<ConstructorDescriptor>,
    methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            mixins: Vec::new(),
            properties: Args::new(),
            constructor: None,
            methods: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Abstract)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Interface)
    }

    pub fn mixin(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Mixin)
    }

    /// Sets the parent type; for interfaces, adds an extended interface.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        if self.kind == TypeKind::Interface {
            self.interfaces.push(parent.into());
        } else {
            self.parent = Some(parent.into());
        }
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn uses(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.push(mixin.into());
        self
    }

    /// Declares a property and the value new instances start with.
    pub fn property(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.properties.insert(name, default);
        self
    }

    pub fn constructor<F>(self, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> DiResult<()> + 'static,
    {
        self.with_constructor(ConstructorDescriptor::new(params, body))
    }

    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn method<F>(self, name: impl Into<String>, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> DiResult<Value> + 'static,
    {
        self.with_method(MethodDescriptor::instance(name, params, body))
    }

    pub fn static_method<F>(self, name: impl Into<String>, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&[Value]) -> DiResult<Value> + 'static,
    {
        self.with_method(MethodDescriptor::static_fn(name, params, body))
    }

    pub fn abstract_method(self, name: impl Into<String>, params: Vec<ParameterDescriptor>) -> Self {
        self.with_method(MethodDescriptor::abstract_fn(name, params))
    }

    /// Adds a method, replacing an earlier one with the same name.
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        match self.methods.iter().position(|m| m.name == method.name) {
            Some(pos) => self.methods[pos] = method,
            None => self.methods.push(method),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Class
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn mixins(&self) -> &[String] {
        &self.mixins
    }

    pub fn properties(&self) -> &Args {
        &self.properties
    }

    /// Constructor declared by this type itself, ignoring inherited ones.
    pub fn own_constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructor.as_ref()
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn own_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Stamps positions and owners on every signature of the type.
    pub(crate) fn finalize(&mut self) {
        if let Some(ctor) = self.constructor.as_mut() {
            bind_signature(&mut ctor.params, Some(&self.name), CONSTRUCTOR_NAME);
        }
        for method in &mut self.methods {
            method.declaring_type = self.name.clone();
            bind_signature(&mut method.params, Some(&self.name), &method.name);
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("mixins", &self.mixins)
            .field("constructor", &self.constructor.as_ref().map(|c| c.params.len()))
            .field("methods", &self.methods.iter().map(|m| m.name.as_str()).collect::<Vec<_>>())
            .finish()
    }
}
