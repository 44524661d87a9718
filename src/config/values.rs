//! Individual configured values
// (c) 2024 Ross Younger

use figment::{Metadata, Profile, Source};

use super::ResolvedConfig;

/// Keywords which may be given more than once, accumulating a list of values in order
pub(super) const APPEND_KEYS: &[&str] = &["identityfile", "localforward", "remoteforward"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// A setting we read from a config file
pub enum Value {
    /// A plain value, with one layer of surrounding double quotes removed
    Single(String),
    /// The accumulated values of a keyword that may be given more than once (`IdentityFile`, `LocalForward`, `RemoteForward`)
    List(Vec<String>),
    /// An explicit "do nothing", e.g. `ProxyCommand none`.
    ///
    /// This is distinct from the literal string `"none"`.
    NoOp,
}

impl Value {
    /// The value as a string, if it is a single value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Single(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a list of strings.
    /// A single value is presented as a list of one; the no-op marker as an empty list.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Value::Single(s) => std::slice::from_ref(s),
            Value::List(v) => v,
            Value::NoOp => &[],
        }
    }

    /// Is this the no-op marker?
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Value::NoOp)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Single(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Single(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<bool> for Value {
    /// Booleans are stored the way ssh_config spells them
    fn from(value: bool) -> Self {
        Value::Single(if value { "yes" } else { "no" }.to_owned())
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// Wraps a resolved configuration into something Figment can deal with
pub(super) struct ValueProvider<'a> {
    host: &'a str,
    data: &'a ResolvedConfig,
}

impl<'a> ValueProvider<'a> {
    pub(super) fn new(host: &'a str, data: &'a ResolvedConfig) -> Self {
        Self { host, data }
    }
}

impl figment::Provider for ValueProvider<'_> {
    fn metadata(&self) -> figment::Metadata {
        Metadata::from(
            "resolved configuration",
            Source::Custom(format!("lookup of {host}", host = self.host)),
        )
        .interpolater(|_profile, path| {
            let key = path.to_vec();
            format!("key `{key}`", key = key.join("."))
        })
    }

    fn data(
        &self,
    ) -> std::result::Result<
        figment::value::Map<figment::Profile, figment::value::Dict>,
        figment::Error,
    > {
        use figment::value::{Dict, Empty, Tag, Value as FigValue};
        let mut dict = Dict::new();
        for (key, value) in self.data.iter() {
            let value: FigValue = match value {
                Value::Single(s) => s.clone().into(),
                Value::List(v) => v.clone().into(),
                Value::NoOp => FigValue::Empty(Tag::Default, Empty::None),
            };
            let _ = dict.insert(key.clone(), value);
        }
        Ok(Profile::Default.collect(dict))
    }
}
