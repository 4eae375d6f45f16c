//! Configuration repository and container options.
//!
//! [`Config`] is a dot-notation key-value tree owned by the container. It is
//! filled programmatically or from [`ConfigSource`]s and read by services
//! (and by contextual `give_config` bindings) at resolution time.

use std::env;

use crate::error::{DiError, DiResult};
use crate::internal::circular::DEFAULT_MAX_DEPTH;
use crate::value::{merge_tree, Args, Value};

/// Dot-notation configuration repository.
///
/// Keys such as `db.host` address nested maps; setting a nested key creates
/// the intermediate maps.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, Config, Value};
///
/// let mut config = Config::new();
/// config.set("db.host", "localhost");
/// config.set("db.port", 5432);
///
/// assert_eq!(config.get("db.host"), Some(Value::from("localhost")));
/// assert!(config.get("db").and_then(|v| v.as_map().cloned()).is_some());
/// assert_eq!(config.get_or("db.user", "root"), Value::from("root"));
///
/// config.merge(Args::new().with("db", Args::new().with("port", 6432)));
/// assert_eq!(config.get_int("db.port").unwrap(), 6432);
/// assert_eq!(config.get_string("db.host").unwrap(), "localhost");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    items: Args,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_args(items: Args) -> Self {
        Self { items }
    }

    /// Value at a dotted key.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.items.get(first)?;
        for part in parts {
            current = current.as_map()?.get(part)?;
        }
        Some(current.clone())
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a dotted key, replacing non-map intermediate values.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let parts: Vec<&str> = key.split('.').collect();
        set_path(&mut self.items, &parts, value);
    }

    /// Merges a tree in; incoming values win, nested maps are merged.
    pub fn merge(&mut self, incoming: impl Into<Config>) {
        let incoming = incoming.into();
        self.items = merge_tree(&incoming.items, &self.items);
    }

    /// Copies every key a source knows about into the repository.
    pub fn load_from(&mut self, source: &dyn ConfigSource) {
        for key in source.keys() {
            if let Some(value) = source.get(&key) {
                self.set(&key, value);
            }
        }
    }

    pub fn get_string(&self, key: &str) -> DiResult<String> {
        match self.require(key)? {
            Value::String(s) => Ok(s),
            other => Err(type_error(key, "string", &other)),
        }
    }

    pub fn get_int(&self, key: &str) -> DiResult<i64> {
        match self.require(key)? {
            Value::Int(i) => Ok(i),
            other => Err(type_error(key, "int", &other)),
        }
    }

    pub fn get_bool(&self, key: &str) -> DiResult<bool> {
        match self.require(key)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_error(key, "bool", &other)),
        }
    }

    pub fn all(&self) -> &Args {
        &self.items
    }

    fn require(&self, key: &str) -> DiResult<Value> {
        self.get(key)
            .ok_or_else(|| DiError::Config(format!("key \"{}\" not found", key)))
    }
}

impl From<Args> for Config {
    fn from(items: Args) -> Self {
        Config::from_args(items)
    }
}

fn set_path(map: &mut Args, parts: &[&str], value: Value) {
    match parts {
        [] => {}
        [last] => {
            map.insert(*last, value);
        }
        [head, rest @ ..] => {
            if !matches!(map.get(head), Some(Value::Map(_))) {
                map.insert(*head, Args::new());
            }
            if let Some(Value::Map(child)) = map.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

fn type_error(key: &str, expected: &str, actual: &Value) -> DiError {
    DiError::Config(format!("key \"{}\" expects {}, found {}", key, expected, actual.kind_name()))
}

/// Configuration source trait
pub trait ConfigSource: std::fmt::Debug {
    /// Get a configuration value by dotted key
    fn get(&self, key: &str) -> Option<Value>;

    /// Every dotted key this source provides
    fn keys(&self) -> Vec<String>;
}

/// In-memory source backed by a flat map of dotted keys.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    entries: Args,
}

impl MapSource {
    pub fn new(entries: Args) -> Self {
        Self { entries }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().map(str::to_string).collect()
    }
}

/// Environment variable configuration source
///
/// `APP_DB__HOST=localhost` with prefix `app` provides the key `db.host`:
/// the prefix is stripped, `__` separates nesting levels and names are
/// lower-cased. Values are parsed as integers, floats and booleans before
/// falling back to strings.
#[derive(Debug, Default)]
pub struct EnvironmentSource {
    /// Prefix to filter environment variables
    prefix: Option<String>,
}

impl EnvironmentSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }

    fn env_key(&self, key: &str) -> String {
        let key = key.replace('.', "__").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key),
            None => key,
        }
    }
}

impl ConfigSource for EnvironmentSource {
    fn get(&self, key: &str) -> Option<Value> {
        env::var(self.env_key(key)).ok().map(|raw| parse_scalar(&raw))
    }

    fn keys(&self) -> Vec<String> {
        let prefix = self.prefix.as_ref().map(|p| format!("{}_", p.to_uppercase()));
        env::vars()
            .filter_map(|(key, _)| match &prefix {
                Some(prefix) => key.strip_prefix(prefix.as_str()).map(str::to_string),
                None => Some(key),
            })
            .map(|key| key.to_lowercase().replace("__", "."))
            .collect()
    }
}

fn parse_scalar(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::Bool(b)
    } else {
        Value::String(raw.to_string())
    }
}

#[cfg(feature = "config")]
impl Config {
    /// Builds a repository from a JSON object.
    pub fn from_json(json: &serde_json::Value) -> DiResult<Self> {
        match value_from_json(json) {
            Value::Map(items) => Ok(Self { items }),
            other => Err(DiError::Config(format!(
                "configuration root must be an object, found {}",
                other.kind_name()
            ))),
        }
    }

    /// Parses a JSON document into a repository.
    pub fn from_json_str(source: &str) -> DiResult<Self> {
        let json: serde_json::Value =
            serde_json::from_str(source).map_err(|e| DiError::Config(e.to_string()))?;
        Self::from_json(&json)
    }
}

#[cfg(feature = "config")]
fn value_from_json(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        Json::Object(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), value_from_json(v))).collect()),
    }
}

/// Behaviour switches of a [`Container`](crate::Container).
///
/// With the `config` feature the options deserialize from any serde format;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Define unknown type keys automatically on lookup
    pub autowire: bool,
    /// Cache every definition as if it were shared
    pub shared_by_default: bool,
    /// Deepest nesting of key resolutions before failing
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            autowire: false,
            shared_by_default: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    /// Reads `container.autowire`, `container.shared_by_default` and
    /// `container.max_depth`, keeping defaults for missing keys.
    pub fn from_config(config: &Config) -> DiResult<Self> {
        let mut options = Self::default();
        if config.has("container.autowire") {
            options.autowire = config.get_bool("container.autowire")?;
        }
        if config.has("container.shared_by_default") {
            options.shared_by_default = config.get_bool("container.shared_by_default")?;
        }
        if config.has("container.max_depth") {
            let depth = config.get_int("container.max_depth")?;
            options.max_depth = usize::try_from(depth)
                .map_err(|_| DiError::Config(format!("container.max_depth must be positive, found {}", depth)))?;
        }
        Ok(options)
    }
}
