//! The result of a lookup
// (c) 2024 Ross Younger

use std::collections::BTreeMap;

use figment::Figment;
use serde::de::DeserializeOwned;

use super::{
    errors::ExtractError,
    tokens::DEFAULT_PORT,
    values::{Value, ValueProvider},
    Error, Result,
};

/// The configuration that applies to a particular host.
///
/// Keys are always lowercase; the accessors lowercase the key they are given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedConfig {
    /// The host this configuration was looked up for
    pub(super) host: String,
    pub(super) data: BTreeMap<String, Value>,
}

impl ResolvedConfig {
    /// Creates an empty configuration for `host`
    #[must_use]
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_owned(),
            data: BTreeMap::new(),
        }
    }

    /// The host name this configuration was looked up for, as given to the lookup
    #[must_use]
    pub fn target(&self) -> &str {
        &self.host
    }

    /// Raw access to a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(&key.to_lowercase())
    }

    /// A single value, as a string.
    ///
    /// Returns `None` if the key is absent, holds a list, or holds the no-op marker.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// A value as a list of strings. An absent key gives an empty list.
    #[must_use]
    pub fn get_list(&self, key: &str) -> &[String] {
        self.get(key).map(Value::as_slice).unwrap_or_default()
    }

    /// The host name to connect to.
    /// This is always present in the result of a lookup.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.get_str("hostname")
    }

    /// The configured remote user name, if any
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.get_str("user")
    }

    /// The port to connect to; 22 if not configured
    pub fn port(&self) -> Result<u16> {
        let value = self.get_str("port").unwrap_or(DEFAULT_PORT);
        value.parse().map_err(|_| Error::InvalidValue {
            key: "port".into(),
            value: value.into(),
        })
    }

    /// Interprets a value as a boolean.
    ///
    /// Only the exact string `yes` is true; anything else, including an absent key, is false.
    #[must_use]
    pub fn as_bool(&self, key: &str) -> bool {
        self.get_str(key) == Some("yes")
    }

    /// Interprets a value as an integer
    pub fn as_int(&self, key: &str) -> Result<i64> {
        let key = key.to_lowercase();
        let Some(value) = self.data.get(&key) else {
            return Err(Error::MissingValue { key });
        };
        let text = match value {
            Value::Single(s) => s.as_str(),
            Value::List(_) => "<list>",
            Value::NoOp => "none",
        };
        text.trim().parse().map_err(|_| Error::InvalidValue {
            key,
            value: text.into(),
        })
    }

    /// Sets a value, replacing any previous one.
    /// Returns the previous value, if there was one.
    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) -> Option<Value> {
        self.data.insert(key.to_lowercase(), value.into())
    }

    /// Iterates over the configuration, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// The number of keys set
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Is anything set?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extracts a typed structure from the configuration.
    ///
    /// Field names are the lowercase keywords. Conversion is lenient: `"22"` satisfies an integer
    /// field and `yes`/`no` a boolean one. Lists become sequences; the no-op marker becomes `None`.
    pub fn extract<T: DeserializeOwned>(&self) -> std::result::Result<T, ExtractError> {
        Figment::from(ValueProvider::new(&self.host, self))
            .extract_lossy()
            .map_err(ExtractError::from)
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

///////////////////////////////////////////////////////////////////////////////////////
