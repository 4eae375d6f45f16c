//! The container: definitions, instances, aliases and everything around them.

pub mod contextual;
pub mod provider;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{Config, ContainerOptions};
use crate::definition::{Definition, ParamSpec};
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::{FastMap, ResolutionStack};
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::resolver::Resolver;
use crate::target::Target;
use crate::traits::ContainerContract;
use crate::types::{Callable, TypeRegistry};
use crate::value::{Args, Value};

pub use contextual::{ContextualBinding, ContextualBindingBuilder, Implementation};
pub use provider::ServiceProvider;

type BeforeHook = Rc<dyn Fn(&Definition, &Container)>;
type AfterHook = Rc<dyn Fn(&Value, &Container)>;

/// What [`Container::define`] builds a definition from.
#[derive(Debug, Clone)]
pub enum DefinitionSource {
    /// A ready definition, stored as-is
    Definition(Definition),
    /// A target wrapped in a new definition
    Target(Target),
    /// The key itself is the concrete
    Key,
}

impl From<Definition> for DefinitionSource {
    fn from(definition: Definition) -> Self {
        DefinitionSource::Definition(definition)
    }
}

impl From<Target> for DefinitionSource {
    fn from(target: Target) -> Self {
        DefinitionSource::Target(target)
    }
}

impl From<&str> for DefinitionSource {
    fn from(concrete: &str) -> Self {
        DefinitionSource::Target(Target::from(concrete))
    }
}

impl From<String> for DefinitionSource {
    fn from(concrete: String) -> Self {
        DefinitionSource::Target(Target::from(concrete))
    }
}

impl From<Callable> for DefinitionSource {
    fn from(callable: Callable) -> Self {
        DefinitionSource::Target(Target::Callable(callable))
    }
}

impl From<(&str, &str)> for DefinitionSource {
    fn from(pair: (&str, &str)) -> Self {
        DefinitionSource::Target(Target::from(pair))
    }
}

impl From<()> for DefinitionSource {
    fn from(_: ()) -> Self {
        DefinitionSource::Key
    }
}

/// Dependency injection container.
///
/// Maps keys to [`Definition`]s and stored instances, caches shared values,
/// follows aliases, applies contextual bindings and lazily registers service
/// providers. All operations take `&self`; the container is a
/// single-threaded object and is shared with `Rc` when several owners need
/// it.
///
/// Keys that are not defined can be autowired: with
/// [`ContainerOptions::autowire`] on, looking up a registered type name
/// defines it on the fly.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Container, ContainerOptions, Param, TypeDescriptor, TypeRegistry, Value};
///
/// let types = TypeRegistry::new()
///     .with_type(TypeDescriptor::class("Database"))
///     .with_type(
///         TypeDescriptor::class("UserRepository")
///             .constructor(vec![Param::new("db").typed("Database")], |this, args| {
///                 this.set("db", args[0].clone());
///                 Ok(())
///             }),
///     );
///
/// let options = ContainerOptions { autowire: true, ..Default::default() };
/// let container = Container::with_options(types, options);
/// container.define_shared("Database", ()).unwrap();
///
/// let repo = container.get("UserRepository").unwrap();
/// let db = container.get("Database").unwrap();
/// assert_eq!(repo.as_object().unwrap().get("db"), db);
/// ```
pub struct Container {
    types: Rc<TypeRegistry>,
    autowire: Cell<bool>,
    shared_by_default: Cell<bool>,
    definitions: RefCell<FastMap<String, Definition>>,
    instances: RefCell<FastMap<String, Value>>,
    aliases: RefCell<FastMap<String, String>>,
    before_resolve: RefCell<FastMap<String, Vec<BeforeHook>>>,
    after_resolve: RefCell<FastMap<String, Vec<AfterHook>>>,
    contextual: RefCell<FastMap<String, Vec<(String, Implementation)>>>,
    resolved_bindings: RefCell<FastMap<String, Args>>,
    providers: RefCell<Vec<Rc<dyn ServiceProvider>>>,
    unregistered_providers: RefCell<Vec<Rc<dyn ServiceProvider>>>,
    services_booted: Cell<bool>,
    delegates: RefCell<Vec<Rc<Container>>>,
    config: RefCell<Config>,
    observers: RefCell<Observers>,
    stack: ResolutionStack,
}

impl Container {
    /// Creates a container with default options (no autowiring, transient by
    /// default).
    pub fn new(types: impl Into<Rc<TypeRegistry>>) -> Self {
        Self::with_options(types, ContainerOptions::default())
    }

    pub fn with_options(types: impl Into<Rc<TypeRegistry>>, options: ContainerOptions) -> Self {
        Self {
            types: types.into(),
            autowire: Cell::new(options.autowire),
            shared_by_default: Cell::new(options.shared_by_default),
            definitions: RefCell::default(),
            instances: RefCell::default(),
            aliases: RefCell::default(),
            before_resolve: RefCell::default(),
            after_resolve: RefCell::default(),
            contextual: RefCell::default(),
            resolved_bindings: RefCell::default(),
            providers: RefCell::default(),
            unregistered_providers: RefCell::default(),
            services_booted: Cell::new(false),
            delegates: RefCell::default(),
            config: RefCell::default(),
            observers: RefCell::default(),
            stack: ResolutionStack::new(options.max_depth),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Shared handle to the type registry.
    pub fn types_rc(&self) -> Rc<TypeRegistry> {
        Rc::clone(&self.types)
    }

    pub fn set_autowire(&self, enable: bool) {
        self.autowire.set(enable);
    }

    pub fn set_shared_by_default(&self, shared: bool) {
        self.shared_by_default.set(shared);
    }

    pub fn options(&self) -> ContainerOptions {
        ContainerOptions {
            autowire: self.autowire.get(),
            shared_by_default: self.shared_by_default.get(),
            max_depth: self.stack.max_depth(),
        }
    }

    // ----- definitions -------------------------------------------------

    /// Defines a key.
    ///
    /// Fails with [`DiError::OverwriteExistingService`] when the key already
    /// has a definition or an instance, and with
    /// [`DiError::InvalidDefinition`] when the concrete cannot be reflected.
    pub fn define(&self, key: &str, source: impl Into<DefinitionSource>) -> DiResult<()> {
        self.define_with_lifetime(key, source.into(), None)
    }

    /// [`define`](Self::define) and mark the definition shared.
    pub fn define_shared(&self, key: &str, source: impl Into<DefinitionSource>) -> DiResult<()> {
        self.define_with_lifetime(key, source.into(), Some(Lifetime::Shared))
    }

    fn define_with_lifetime(&self, key: &str, source: DefinitionSource, lifetime: Option<Lifetime>) -> DiResult<()> {
        if self.has_definition(key) || self.resolved(key) {
            return Err(DiError::OverwriteExistingService(key.to_string()));
        }
        let definition = self.build_definition(key, source, lifetime)?;
        self.definitions.borrow_mut().insert(key.to_string(), definition);
        debug!(key, "service defined");
        Ok(())
    }

    /// Defines several keys.
    pub fn add_definitions<I, K, S>(&self, definitions: I) -> DiResult<()>
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: Into<DefinitionSource>,
    {
        for (key, source) in definitions {
            self.define(key.as_ref(), source)?;
        }
        Ok(())
    }

    /// Defines or replaces a key, dropping any cached instance.
    pub fn override_definition(&self, key: &str, source: impl Into<DefinitionSource>) -> DiResult<()> {
        self.override_with_lifetime(key, source.into(), None)
    }

    /// [`override_definition`](Self::override_definition) and mark it shared.
    pub fn override_shared(&self, key: &str, source: impl Into<DefinitionSource>) -> DiResult<()> {
        self.override_with_lifetime(key, source.into(), Some(Lifetime::Shared))
    }

    fn override_with_lifetime(&self, key: &str, source: DefinitionSource, lifetime: Option<Lifetime>) -> DiResult<()> {
        let definition = self.build_definition(key, source, lifetime)?;
        self.definitions.borrow_mut().insert(key.to_string(), definition);
        self.instances.borrow_mut().remove(key);
        debug!(key, "service overridden");
        Ok(())
    }

    fn build_definition(&self, key: &str, source: DefinitionSource, lifetime: Option<Lifetime>) -> DiResult<Definition> {
        let mut definition = match source {
            DefinitionSource::Definition(definition) => definition,
            DefinitionSource::Target(target) => Definition::new(&self.types, target)?,
            DefinitionSource::Key => Definition::new(&self.types, key)?,
        };
        if let Some(lifetime) = lifetime {
            definition.set_shared(lifetime.is_shared());
        }
        Ok(definition)
    }

    /// Modifies an existing definition in place.
    ///
    /// ```rust
    /// use ferrous_autowire::{Container, Param, TypeDescriptor, TypeRegistry, Value};
    ///
    /// let types = TypeRegistry::new().with_type(
    ///     TypeDescriptor::class("Greeter")
    ///         .constructor(vec![Param::new("text").typed("string")], |this, args| {
    ///             this.set("text", args[0].clone());
    ///             Ok(())
    ///         }),
    /// );
    /// let container = Container::new(types);
    /// container.define("greeter", "Greeter").unwrap();
    /// container
    ///     .extend("greeter", |def| {
    ///         def.set_param("text", "hello");
    ///         def.returns("$text", Value::Null)?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(container.get("greeter").unwrap(), Value::from("hello"));
    /// ```
    pub fn extend<F>(&self, key: &str, modify: F) -> DiResult<()>
    where
        F: FnOnce(&mut Definition) -> DiResult<()>,
    {
        if !self.lookup_definition(key)? {
            return Err(DiError::not_found(format!(
                "Key \"{}\" can not be extended because it is not defined in this container.",
                key
            )));
        }
        let taken = self.definitions.borrow_mut().remove(key);
        let Some(mut definition) = taken else {
            return Err(DiError::DefinitionNotFound(key.to_string()));
        };
        let outcome = modify(&mut definition);
        self.definitions.borrow_mut().insert(key.to_string(), definition);
        outcome
    }

    /// Copy of the definition of `key`.
    pub fn definition(&self, key: &str) -> DiResult<Definition> {
        if !self.lookup_definition(key)? {
            return Err(DiError::DefinitionNotFound(key.to_string()));
        }
        self.definitions
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| DiError::DefinitionNotFound(key.to_string()))
    }

    pub fn has_definition(&self, key: &str) -> bool {
        self.definitions.borrow().contains_key(key)
    }

    /// Every definition, sorted by key.
    pub fn export(&self) -> Vec<(String, Definition)> {
        let mut all: Vec<_> = self
            .definitions
            .borrow()
            .iter()
            .map(|(k, d)| (k.clone(), d.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Definition recipe for `concrete` against this container's registry.
    pub fn factory(&self, concrete: impl Into<Target>) -> DiResult<Definition> {
        Definition::new(&self.types, concrete)
    }

    pub fn factory_with<I, P>(&self, concrete: impl Into<Target>, params: I) -> DiResult<Definition>
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamSpec>,
    {
        Definition::with_args(&self.types, concrete, params)
    }

    // ----- instances and aliases ----------------------------------------

    /// Stores a ready value under `key`.
    pub fn instance(&self, key: &str, value: impl Into<Value>) {
        self.instances.borrow_mut().insert(key.to_string(), value.into());
    }

    /// Whether a value is stored for `key`.
    pub fn resolved(&self, key: &str) -> bool {
        self.instances.borrow().contains_key(key)
    }

    pub fn alias(&self, name: &str, target: &str) {
        self.aliases.borrow_mut().insert(name.to_string(), target.to_string());
    }

    pub fn is_alias(&self, key: &str) -> bool {
        self.aliases.borrow().contains_key(key)
    }

    pub fn get_alias(&self, key: &str) -> DiResult<String> {
        self.aliases
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| DiError::AliasNotFound(key.to_string()))
    }

    /// Walks the alias chain from `key` until `known` accepts a key or the
    /// chain ends. A chain that comes back to one of its keys is a cycle.
    fn follow_aliases(&self, key: &str, known: impl Fn(&str) -> DiResult<bool>) -> DiResult<(String, bool)> {
        let mut path = vec![key.to_string()];
        loop {
            let current = &path[path.len() - 1];
            if known(current.as_str())? {
                return Ok((current.clone(), true));
            }
            let Ok(target) = self.get_alias(current) else {
                return Ok((current.clone(), false));
            };
            let looped = path.contains(&target);
            path.push(target);
            if looped {
                return Err(DiError::CyclicDependency(path));
            }
        }
    }

    /// Whether `key` has an instance or a definition.
    ///
    /// Looking a key up may register the lazy provider that provides it or
    /// copy the definition from a bound container.
    pub fn has(&self, key: &str) -> bool {
        if self.resolved(key) {
            return true;
        }
        self.lookup_definition(key).unwrap_or_else(|e| {
            warn!(key, error = %e.full_message(), "service provider registration failed");
            false
        })
    }

    /// Drops the definition and the instance of `key`.
    pub fn forget(&self, key: &str) -> DiResult<()> {
        if !self.has_definition(key) && !self.resolved(key) {
            return Err(DiError::not_found(format!(
                "Service \"{}\" does not exist in the container.",
                key
            )));
        }
        self.definitions.borrow_mut().remove(key);
        self.instances.borrow_mut().remove(key);
        Ok(())
    }

    // ----- resolution ---------------------------------------------------

    /// Resolves `key`.
    ///
    /// Aliases are followed; unknown keys are autowired when enabled. Shared
    /// definitions (or every definition when shared by default) are built
    /// once and cached.
    pub fn get(&self, key: &str) -> DiResult<Value> {
        let (key, known) = self.follow_aliases(key, |k| Ok(self.resolved(k) || self.lookup_definition(k)?))?;
        let key = key.as_str();
        if !known {
            if !self.autowire.get() {
                return Err(DiError::not_found(format!("Key \"{}\" is not found in this container.", key)));
            }
            if let Err(e) = self.define(key, ()) {
                return Err(DiError::not_found_with(
                    format!(
                        "Key \"{}\" is not found in this container and could not be defined automatically using autowiring.",
                        key
                    ),
                    e,
                ));
            }
            debug!(key, "service autowired");
        }

        let definition = self.definitions.borrow().get(key).cloned();
        let Some(definition) = definition else {
            return self
                .cached(key)
                .ok_or_else(|| DiError::not_found(format!("Key \"{}\" is not found in this container.", key)));
        };

        if !definition.is_shared() && !self.shared_by_default.get() {
            return self.resolve_definition(key, &definition, Args::new());
        }
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        let value = self.resolve_definition(key, &definition, Args::new())?;
        self.instances.borrow_mut().insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// [`get`](Self::get), returning `default` when the key is not found.
    /// Other errors still propagate.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> DiResult<Value> {
        match self.get(key) {
            Err(e) if e.is_not_found() => Ok(default.into()),
            other => other,
        }
    }

    /// Builds a fresh value for `key`, ignoring any cached instance.
    pub fn make(&self, key: &str) -> DiResult<Value> {
        self.make_with(key, Args::new())
    }

    /// [`make`](Self::make) with extra arguments merged over the definition's
    /// parameters.
    pub fn make_with(&self, key: &str, args: Args) -> DiResult<Value> {
        let (key, known) = self.follow_aliases(key, |k| self.lookup_definition(k))?;
        let key = key.as_str();
        if !known {
            if !self.autowire.get() {
                return Err(DiError::not_found(format!("No definition found for key \"{}\".", key)));
            }
            if let Err(e) = self.define(key, ()) {
                return Err(DiError::not_found_with(
                    format!(
                        "No definition found for key \"{}\" and it could not be defined automatically using autowiring.",
                        key
                    ),
                    e,
                ));
            }
        }
        let definition = self.definition(key)?;
        self.resolve_definition(key, &definition, args)
    }

    /// Builds or invokes a target, binding its parameters.
    ///
    /// ```rust
    /// use ferrous_autowire::{Args, Callable, Container, Param, TypeRegistry, Value};
    ///
    /// let container = Container::new(TypeRegistry::new());
    /// let greet = Callable::closure(vec![Param::new("name").typed("string")], |args| {
    ///     Ok(Value::from(format!("Hello {}", args[0].as_str().unwrap_or_default())))
    /// });
    ///
    /// let out = container.call(greet, Args::new().with("name", "Ada")).unwrap();
    /// assert_eq!(out, Value::from("Hello Ada"));
    /// ```
    pub fn call(&self, target: impl Into<Target>, args: Args) -> DiResult<Value> {
        Resolver::new(self).resolve(&target.into(), &args)
    }

    /// [`call`](Self::call) with a dynamic value as the target.
    pub fn call_value(&self, target: &Value, args: Args) -> DiResult<Value> {
        Resolver::new(self).resolve_value(target, &args)
    }

    fn cached(&self, key: &str) -> Option<Value> {
        self.instances.borrow().get(key).cloned()
    }

    fn resolve_definition(&self, key: &str, definition: &Definition, args: Args) -> DiResult<Value> {
        let _guard = self.stack.enter(key)?;

        let before = self.before_resolve.borrow().get(key).cloned().unwrap_or_default();
        for hook in before {
            hook(definition, self);
        }

        let observers = self.observers.borrow().clone();
        let started = observers.has_observers().then(Instant::now);
        observers.resolving(key);
        let value = match definition.resolve(self, args) {
            Ok(value) => {
                if let Some(started) = started {
                    observers.resolved(key, started.elapsed());
                }
                value
            }
            Err(e) => {
                observers.failed(key, &e);
                return Err(e);
            }
        };

        let after = self.after_resolve.borrow().get(key).cloned().unwrap_or_default();
        for hook in after {
            hook(&value, self);
        }
        Ok(value)
    }

    /// Finds a definition for `key`, registering a lazy provider or copying a
    /// delegate's definition when needed.
    fn lookup_definition(&self, key: &str) -> DiResult<bool> {
        if self.has_definition(key) {
            return Ok(true);
        }

        let provider = self
            .unregistered_providers
            .borrow()
            .iter()
            .find(|p| p.provides().iter().any(|k| k == key))
            .cloned();
        if let Some(provider) = provider {
            self.unregistered_providers
                .borrow_mut()
                .retain(|p| !Rc::ptr_eq(p, &provider));
            debug!(provider = provider.name(), key, "registering deferred service provider");
            provider.register(self)?;
            return Ok(self.has_definition(key) || self.resolved(key));
        }

        let delegates = self.delegates.borrow().clone();
        for delegate in delegates {
            if let Ok(definition) = delegate.definition(key) {
                self.definitions.borrow_mut().insert(key.to_string(), definition);
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ----- hooks --------------------------------------------------------

    /// Registers a callback run before `key`'s definition is resolved.
    pub fn before_resolving<F>(&self, key: &str, hook: F)
    where
        F: Fn(&Definition, &Container) + 'static,
    {
        self.before_resolve
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push(Rc::new(hook));
    }

    /// Registers a callback run with the value built for `key`.
    pub fn after_resolving<F>(&self, key: &str, hook: F)
    where
        F: Fn(&Value, &Container) + 'static,
    {
        self.after_resolve
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push(Rc::new(hook));
    }

    pub fn add_observer(&self, observer: Rc<dyn DiObserver>) {
        self.observers.borrow_mut().add(observer);
    }

    // ----- contextual bindings ------------------------------------------

    /// Starts a contextual binding for one dependent type.
    pub fn when(&self, concrete: &str) -> ContextualBindingBuilder<'_> {
        ContextualBindingBuilder::new(self, vec![concrete.to_string()])
    }

    /// Starts a contextual binding shared by several dependent types.
    pub fn when_any<I, S>(&self, concretes: I) -> ContextualBindingBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContextualBindingBuilder::new(self, concretes.into_iter().map(Into::into).collect())
    }

    /// Binds `implementation` for `needs` whenever `concrete` is built.
    ///
    /// `needs` is a type name or a `$parameter` name; aliases are resolved.
    pub fn add_contextual_binding(&self, concrete: &str, needs: &str, implementation: Implementation) {
        let needs = self.get_alias(needs).unwrap_or_else(|_| needs.to_string());
        {
            let mut contextual = self.contextual.borrow_mut();
            let bindings = contextual.entry(concrete.to_string()).or_default();
            match bindings.iter_mut().find(|(n, _)| *n == needs) {
                Some(slot) => slot.1 = implementation,
                None => bindings.push((needs, implementation)),
            }
        }
        self.resolved_bindings.borrow_mut().clear();
    }

    /// Raw bindings for `name`, falling back to its ancestors, then to its
    /// interfaces.
    fn find_contextual_binding(&self, name: &str) -> Option<Vec<(String, Implementation)>> {
        let contextual = self.contextual.borrow();
        let own = |n: &str| contextual.get(n).filter(|b| !b.is_empty()).cloned();

        if let Some(found) = own(name) {
            return Some(found);
        }
        self.types
            .ancestors(name)
            .into_iter()
            .chain(self.types.interfaces(name))
            .find_map(own)
    }

    fn resolve_implementation(&self, implementation: &Implementation) -> DiResult<Value> {
        let result = match implementation {
            Implementation::Value(value) => return Ok(value.clone()),
            Implementation::Config { key, default } => return Ok(self.config_value(key, default.clone())),
            Implementation::Name(name) if self.has(name) || self.is_alias(name) => self.get(name),
            Implementation::Name(name) if self.types.contains_type(name) => self.call(name.as_str(), Args::new()),
            Implementation::Name(name) => self.call(Target::parse(name), Args::new()),
            Implementation::Target(target) => self.call(target.clone(), Args::new()),
        };
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_cycle() => Err(e),
            Err(e) => {
                debug!(error = %e.full_message(), "contextual binding kept unresolved");
                Ok(implementation.raw())
            }
        }
    }

    // ----- service providers --------------------------------------------

    /// Hands a provider to the container.
    ///
    /// Runs `init`, adds the provider's aliases, then registers it now (empty
    /// [`provides`](ServiceProvider::provides)) or on first lookup of one of
    /// its keys.
    pub fn register_service_provider(&self, provider: impl ServiceProvider + 'static) -> DiResult<()> {
        let provider: Rc<dyn ServiceProvider> = Rc::new(provider);
        let name = provider.name().to_string();
        if self.service_provider_exists(&name) {
            return Err(DiError::Container(format!(
                "Service provider {} is already registered.",
                name
            )));
        }
        self.providers.borrow_mut().push(Rc::clone(&provider));

        for (alias, target) in provider.aliases() {
            self.alias(&alias, &target);
        }
        provider.init(self)?;

        if provider.provides().is_empty() {
            provider.register(self)?;
        } else {
            self.unregistered_providers.borrow_mut().push(provider);
        }
        debug!(provider = %name, "service provider registered");
        Ok(())
    }

    pub fn service_provider_exists(&self, name: &str) -> bool {
        self.providers.borrow().iter().any(|p| p.name() == name)
    }

    /// Runs every provider's `boot`, then every provider's `boot_deferred`.
    ///
    /// Fails with [`DiError::ServicesAlreadyBooted`] on a second call.
    pub fn boot_services(&self) -> DiResult<()> {
        if self.services_booted.get() {
            return Err(DiError::ServicesAlreadyBooted);
        }
        let providers = self.providers.borrow().clone();
        for provider in &providers {
            provider.boot(self)?;
        }
        for provider in &providers {
            provider.boot_deferred(self)?;
        }
        self.services_booted.set(true);
        Ok(())
    }

    pub fn services_booted(&self) -> bool {
        self.services_booted.get()
    }

    /// Adds a container whose definitions are copied in on lookup miss.
    pub fn bind_container(&self, other: Rc<Container>) -> &Self {
        self.delegates.borrow_mut().push(other);
        self
    }

    // ----- configuration and introspection ------------------------------

    /// The configuration repository.
    ///
    /// The returned guard must be dropped before resolving anything that
    /// writes to the configuration.
    pub fn config(&self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub fn config_mut(&self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    /// Value at a dotted configuration key, or `default`.
    pub fn config_value(&self, key: &str, default: impl Into<Value>) -> Value {
        self.config.borrow().get_or(key, default)
    }

    pub fn merge_config(&self, incoming: impl Into<Config>) {
        self.config.borrow_mut().merge(incoming);
    }

    /// Descriptors of every definition and stored instance, sorted by key.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        let definitions = self.definitions.borrow();
        let instances = self.instances.borrow();

        let mut descriptors: Vec<ServiceDescriptor> = definitions
            .iter()
            .map(|(key, definition)| ServiceDescriptor {
                key: key.clone(),
                lifetime: definition.lifetime(),
                concrete: Some(definition.concrete().display_name()),
                resolved: instances.contains_key(key),
            })
            .collect();
        descriptors.extend(
            instances
                .keys()
                .filter(|key| !definitions.contains_key(*key))
                .map(|key| ServiceDescriptor {
                    key: key.clone(),
                    lifetime: Lifetime::Shared,
                    concrete: None,
                    resolved: true,
                }),
        );
        descriptors.sort_by(|a, b| a.key.cmp(&b.key));
        descriptors
    }
}

impl ContainerContract for Container {
    fn get(&self, key: &str) -> DiResult<Value> {
        Container::get(self, key)
    }

    fn call(&self, target: &Target, args: Args) -> DiResult<Value> {
        Container::call(self, target.clone(), args)
    }

    fn contextual_bindings(&self, declaring_type: &str) -> DiResult<Args> {
        if let Some(cached) = self.resolved_bindings.borrow().get(declaring_type) {
            return Ok(cached.clone());
        }

        let mut resolved = Args::new();
        if let Some(bindings) = self.find_contextual_binding(declaring_type) {
            for (needs, implementation) in bindings {
                let value = self.resolve_implementation(&implementation)?;
                resolved.insert(needs, value);
            }
        }

        self.resolved_bindings
            .borrow_mut()
            .insert(declaring_type.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut definitions: Vec<_> = self.definitions.borrow().keys().cloned().collect();
        definitions.sort();
        let mut instances: Vec<_> = self.instances.borrow().keys().cloned().collect();
        instances.sort();
        f.debug_struct("Container")
            .field("definitions", &definitions)
            .field("instances", &instances)
            .field("autowire", &self.autowire.get())
            .field("shared_by_default", &self.shared_by_default.get())
            .field("providers", &self.providers.borrow().len())
            .field("resolving", &self.stack.depth())
            .finish()
    }
}
