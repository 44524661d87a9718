//! Percent-token expansion
// (c) 2024 Ross Younger

use sha1::{Digest as _, Sha1};
use tracing::trace;

use super::LocalIdentity;

/// Which tokens may be expanded in which keys.
/// `match-exec` is not a real keyword; it stands for the command of a `Match exec` criterion.
const TOKEN_TABLE: &[(&str, &[&str])] = &[
    ("controlpath", &["%C", "%h", "%l", "%L", "%n", "%p", "%r", "%u"]),
    ("hostname", &["%h"]),
    ("identityfile", &["%C", "~", "%d", "%h", "%l", "%u", "%r"]),
    ("proxycommand", &["~", "%h", "%p", "%r"]),
    ("proxyjump", &["%h", "%p", "%r"]),
    ("match-exec", &["%C", "%d", "%h", "%L", "%l", "%n", "%p", "%r", "%u"]),
];

pub(super) const DEFAULT_PORT: &str = "22";

fn allowed_tokens(key: &str) -> Option<&'static [&'static str]> {
    TOKEN_TABLE
        .iter()
        .find_map(|(k, tokens)| (*k == key).then_some(*tokens))
}

/// The values tokens expand to, for one expansion run
pub(super) struct Tokens<'a> {
    pub(super) identity: &'a LocalIdentity,
    /// `%h`
    pub(super) hostname: &'a str,
    /// The host name of the current lookup pass, which feeds `%C`
    pub(super) pass_host: &'a str,
    /// `%n`
    pub(super) original_host: &'a str,
    /// `%p`
    pub(super) port: &'a str,
    /// `%r`
    pub(super) remote_user: &'a str,
    /// `%L`, computed on demand
    pub(super) local_fqdn: &'a dyn Fn() -> String,
}

impl Tokens<'_> {
    /// `%C`: a hash of the connection parameters
    fn connection_hash(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.identity.hostname.as_bytes());
        hasher.update(self.pass_host.as_bytes());
        hasher.update(self.port.as_bytes());
        hasher.update(self.remote_user.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn value_of(&self, token: char) -> Option<String> {
        Some(match token {
            'C' => self.connection_hash(),
            'd' => self.identity.home_dir.clone(),
            'h' => self.hostname.to_owned(),
            'l' => self.identity.hostname.clone(),
            'L' => (self.local_fqdn)(),
            'n' => self.original_host.to_owned(),
            'p' => self.port.to_owned(),
            'r' => self.remote_user.to_owned(),
            'u' => self.identity.user.clone(),
            _ => return None,
        })
    }

    /// Expands the tokens that `key` allows in `value`.
    ///
    /// This is a single pass: text produced by an expansion is not itself expanded.
    /// Keys without an entry in the token table are returned unchanged.
    pub(super) fn expand(&self, key: &str, value: &str) -> String {
        let Some(allowed) = allowed_tokens(key) else {
            return value.to_owned();
        };
        let mut output = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '~' if allowed.contains(&"~") => output.push_str(&self.identity.home_dir),
                '%' => {
                    let replacement = chars
                        .peek()
                        .filter(|next| allowed.contains(&format!("%{next}").as_str()))
                        .and_then(|next| self.value_of(*next));
                    if let Some(replacement) = replacement {
                        let _ = chars.next();
                        output.push_str(&replacement);
                    } else {
                        output.push('%');
                    }
                }
                _ => output.push(ch),
            }
        }
        if output != value {
            trace!("expanded {key} {value:?} to {output:?}");
        }
        output
    }
}
