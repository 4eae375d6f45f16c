//! Injected registry of known types and free functions.

use std::borrow::Cow;
use std::rc::Rc;

use crate::internal::FastMap;
use crate::target::split_method_target;
use crate::types::descriptor::{ConstructorDescriptor, MethodDescriptor, TypeDescriptor};
use crate::types::function::Callable;
use crate::value::{Args, Value};

/// Registry of every type and free function the resolver can reflect on.
///
/// The registry answers the questions runtime reflection would: does a type
/// exist, is it instantiable, what are its constructor and methods, which
/// ancestors and interfaces make up its capability set. It is built once and
/// handed to the container; nothing is looked up from global state.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{TypeDescriptor, TypeRegistry};
///
/// let mut types = TypeRegistry::new();
/// types
///     .register(TypeDescriptor::interface("Cache"))
///     .register(TypeDescriptor::abstract_class("BaseCache").implements("Cache"))
///     .register(TypeDescriptor::class("MemoryCache").extends("BaseCache"));
///
/// assert!(types.is_subtype("MemoryCache", "Cache"));
/// assert!(types.is_subtype("MemoryCache", "BaseCache"));
/// assert!(!types.is_subtype("BaseCache", "MemoryCache"));
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: FastMap<String, Rc<TypeDescriptor>>,
    functions: FastMap<String, Callable>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any earlier descriptor with the same name.
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> &mut Self {
        descriptor.finalize();
        self.types.insert(descriptor.name().to_string(), Rc::new(descriptor));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Registers a named free function so it can be targeted by name.
    pub fn register_function(&mut self, function: Callable) -> &mut Self {
        self.functions.insert(function.name().to_string(), function);
        self
    }

    pub fn with_function(mut self, function: Callable) -> Self {
        self.register_function(function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name).map(|d| &**d)
    }

    pub fn function(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Parent chain of a type, nearest first.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = self.get(name).and_then(TypeDescriptor::parent);
        while let Some(parent) = current {
            if parent == name || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.get(parent).and_then(TypeDescriptor::parent);
        }
        chain
    }

    /// Every interface a type implements, directly, through its ancestors or
    /// through interfaces extending other interfaces.
    pub fn interfaces(&self, name: &str) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        if let Some(ty) = self.get(name) {
            pending.extend(ty.interfaces().iter().map(String::as_str));
        }
        for ancestor in self.ancestors(name) {
            if let Some(ty) = self.get(ancestor) {
                pending.extend(ty.interfaces().iter().map(String::as_str));
            }
        }

        while let Some(iface) = pending.pop() {
            if found.contains(&iface) {
                continue;
            }
            found.push(iface);
            if let Some(ty) = self.get(iface) {
                pending.extend(ty.interfaces().iter().map(String::as_str));
            }
        }
        found
    }

    /// Whether a value of type `candidate` satisfies a declared `expected` type.
    pub fn is_subtype(&self, candidate: &str, expected: &str) -> bool {
        candidate == expected
            || self.ancestors(candidate).contains(&expected)
            || self.interfaces(candidate).contains(&expected)
    }

    /// Constructor of a type, inherited from the nearest ancestor declaring one.
    pub fn constructor(&self, name: &str) -> Option<&ConstructorDescriptor> {
        if let Some(ctor) = self.get(name).and_then(TypeDescriptor::own_constructor) {
            return Some(ctor);
        }
        self.ancestors(name)
            .into_iter()
            .find_map(|a| self.get(a).and_then(TypeDescriptor::own_constructor))
    }

    /// Looks a method up on the type, its mixins, then its ancestors.
    ///
    /// Mixin methods come back rebound to the type using the mixin, so their
    /// parameters pick up that type's contextual bindings.
    pub fn find_method(&self, type_name: &str, method: &str) -> Option<Cow<'_, MethodDescriptor>> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|(host, ty)| ty.own_method(method).map(|m| as_declared_by(host, ty, m)))
    }

    /// All methods visible on a type, one per name.
    ///
    /// Order is deterministic: the type's own methods in declaration order,
    /// then its mixins', then each ancestor's (with their mixins), skipping
    /// names already seen.
    pub fn methods(&self, type_name: &str) -> Vec<Cow<'_, MethodDescriptor>> {
        let mut methods: Vec<Cow<'_, MethodDescriptor>> = Vec::new();
        for (host, ty) in self.lineage(type_name) {
            for method in ty.methods() {
                if !methods.iter().any(|m| m.name() == method.name()) {
                    methods.push(as_declared_by(host, ty, method));
                }
            }
        }
        methods
    }

    /// Initial property table for a new instance, ancestors first.
    pub fn default_properties(&self, name: &str) -> Args {
        let mut props = Args::new();
        let mut lineage = self.lineage(name);
        lineage.reverse();
        for (_, ty) in lineage {
            for (key, value) in ty.properties().iter() {
                props.insert(key, value.clone());
            }
        }
        props
    }

    /// True for registered function names and `Type::method` strings naming
    /// an existing method.
    pub fn is_callable_name(&self, name: &str) -> bool {
        match split_method_target(name) {
            Some((ty, method)) => self.find_method(ty, method).is_some(),
            None => self.contains_function(name),
        }
    }

    /// Semantic type name of a value, used in compatibility checks and error
    /// messages.
    ///
    /// ```rust
    /// use ferrous_autowire::{Callable, TypeRegistry, Value};
    ///
    /// let types = TypeRegistry::new()
    ///     .with_function(Callable::new("strlen", vec![], |_| Ok(Value::Int(0))));
    ///
    /// assert_eq!(types.semantic_type(&Value::Int(0)), "int");
    /// assert_eq!(types.semantic_type(&Value::from("strlen")), "callable");
    /// assert_eq!(types.semantic_type(&Value::from("plain")), "string");
    /// ```
    pub fn semantic_type(&self, value: &Value) -> String {
        match value {
            Value::String(s) if self.is_callable_name(s) => "callable".to_string(),
            other => other.kind_name().to_string(),
        }
    }

    /// Whether a value can be invoked.
    pub fn is_invocable(&self, value: &Value) -> bool {
        match value {
            Value::Callable(_) => true,
            Value::String(s) => self.is_callable_name(s),
            _ => false,
        }
    }

    /// The type, its mixins (recursively), then each ancestor with its mixins.
    ///
    /// Each entry is paired with its host: the type itself, or the class in
    /// the parent chain that pulled the mixin in.
    fn lineage(&self, name: &str) -> Vec<(&str, &TypeDescriptor)> {
        let mut out: Vec<(&str, &TypeDescriptor)> = Vec::new();
        let mut chain = vec![name];
        chain.extend(self.ancestors(name));
        for link in chain {
            if let Some(ty) = self.get(link) {
                self.push_with_mixins(ty.name(), ty, &mut out);
            }
        }
        out
    }

    fn push_with_mixins<'a>(
        &'a self,
        host: &'a str,
        ty: &'a TypeDescriptor,
        out: &mut Vec<(&'a str, &'a TypeDescriptor)>,
    ) {
        if out.iter().any(|(_, t)| t.name() == ty.name()) {
            return;
        }
        out.push((host, ty));
        for mixin in ty.mixins() {
            if let Some(m) = self.get(mixin) {
                self.push_with_mixins(host, m, out);
            }
        }
    }
}

fn as_declared_by<'a>(host: &str, ty: &TypeDescriptor, method: &'a MethodDescriptor) -> Cow<'a, MethodDescriptor> {
    if host == ty.name() {
        Cow::Borrowed(method)
    } else {
        Cow::Owned(method.rebound_to(host))
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.types.keys().collect();
        types.sort();
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("TypeRegistry")
            .field("types", &types)
            .field("functions", &functions)
            .finish()
    }
}
