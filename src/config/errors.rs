//! Error types
// (c) 2024 Ross Younger

use figment::error::{Kind, OneOf};

/// Everything that can go wrong while reading a configuration or resolving a host against it
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed line, `Match` criteria sequence or quoting
    #[error("{origin} line {line_number}: {message}")]
    Parse {
        /// Where the text came from: a file name, or a placeholder for in-memory text
        origin: String,
        /// One-based line number
        line_number: usize,
        /// What was wrong with it
        message: String,
    },
    /// Hostname canonicalization was required, but no candidate name resolved
    #[error("could not canonicalize hostname {0}")]
    CouldNotCanonicalize(String),
    /// The configuration needs a capability the lookup context does not provide
    #[error("{0} is not supported in this context")]
    UnsupportedFeature(&'static str),
    /// A value could not be coerced to the requested type
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// The configuration key
        key: String,
        /// The offending value
        value: String,
    },
    /// A typed accessor was asked for a key that has no value
    #[error("no value for {key}")]
    MissingValue {
        /// The configuration key
        key: String,
    },
    /// Reading a configuration source failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for this module
pub type Result<T, E = Error> = std::result::Result<T, E>;

///////////////////////////////////////////////////////////////////////////////////////

/// A failure to extract a typed structure from a resolved configuration.
///
/// This wraps a `figment::Error` with a more readable `Display`.
#[derive(Debug)]
pub struct ExtractError(figment::Error);

impl From<figment::Error> for ExtractError {
    fn from(value: figment::Error) -> Self {
        Self(value)
    }
}

impl ExtractError {
    /// The underlying figment error
    #[must_use]
    pub fn inner(&self) -> &figment::Error {
        &self.0
    }

    fn rewrite_expected_type(s: &str) -> String {
        match s {
            "a boolean" => format!(
                "a boolean ({})",
                OneOf(&["yes", "no", "true", "false", "1", "0"])
            ),
            _ => s.to_owned(),
        }
    }

    fn fmt_kind(kind: &Kind, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match kind {
            Kind::InvalidType(v, exp) => write!(
                f,
                "invalid type: found {v}, expected {exp}",
                exp = Self::rewrite_expected_type(exp)
            ),
            Kind::UnknownVariant(v, exp) => {
                write!(f, "unknown variant: found {v}, expected {}", OneOf(exp))
            }
            Kind::MissingField(field) => write!(f, "no value for {field}"),
            _ => std::fmt::Display::fmt(&kind, f),
        }
    }
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let e = &self.0;
        Self::fmt_kind(&e.kind, f)?;

        if let (Some(profile), Some(md)) = (&e.profile, &e.metadata) {
            if !e.path.is_empty() {
                let key = md.interpolate(profile, &e.path);
                write!(f, " for {key}")?;
            }
        }

        if let Some(md) = &e.metadata {
            if let Some(source) = &md.source {
                write!(f, " in {source}")?;
            } else {
                write!(f, " in {}", md.name)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn messages() {
        let e = Error::Parse {
            origin: "/etc/ssh/ssh_config".into(),
            line_number: 12,
            message: "unterminated quote".into(),
        };
        assert_eq!(
            e.to_string(),
            "/etc/ssh/ssh_config line 12: unterminated quote"
        );
        assert_eq!(
            Error::CouldNotCanonicalize("web".into()).to_string(),
            "could not canonicalize hostname web"
        );
        assert_eq!(
            Error::InvalidValue {
                key: "port".into(),
                value: "ssh".into()
            }
            .to_string(),
            "invalid value for port: ssh"
        );
    }
}
