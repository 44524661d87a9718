//! Capabilities a lookup depends on
// (c) 2024 Ross Younger

use std::fmt::Debug;

use crate::util::{AddressFamily, SystemResolver};

/// Who and where we are.
///
/// These feed `Match localuser`, the `%u`, `%l`, `%L`, `%d` tokens and `~` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Local user name
    pub user: String,
    /// Local host name, without any domain part
    pub hostname: String,
    /// The user's home directory
    pub home_dir: String,
}

impl LocalIdentity {
    /// Determines the identity of the current process
    #[must_use]
    pub fn current() -> Self {
        let hostname = gethostname::gethostname().to_string_lossy().to_string();
        let hostname = hostname
            .split('.')
            .next()
            .unwrap_or_default()
            .to_owned();
        let home_dir = dirs::home_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            user: whoami::username(),
            hostname,
            home_dir,
        }
    }
}

/// One result of a name lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedName {
    /// The canonical name reported by the resolver, if any
    pub canonical_name: Option<String>,
}

/// Host name resolution, used for hostname canonicalization and to find the local FQDN.
pub trait Resolver: Debug {
    /// Looks up `host`, restricted to `family`.
    ///
    /// An empty list or an error both mean "not found"; lookups are never retried.
    fn resolve(&self, host: &str, family: AddressFamily) -> anyhow::Result<Vec<ResolvedName>>;
}

/// Runs `Match exec` commands.
pub trait CommandRunner: Debug {
    /// Runs `command_line`, returning whether it exited successfully.
    ///
    /// Errors (failure to spawn, timeouts) are treated by the caller as "did not succeed".
    fn run(&self, command_line: &str) -> anyhow::Result<bool>;
}

/// Everything a lookup needs from the outside world
#[derive(Debug, Clone, Copy)]
pub struct LookupContext<'a> {
    /// The local identity
    pub identity: &'a LocalIdentity,
    /// Name resolution
    pub resolver: &'a dyn Resolver,
    /// Command execution for `Match exec`. If `None`, `Match exec` is an error.
    pub runner: Option<&'a dyn CommandRunner>,
}

impl<'a> LookupContext<'a> {
    /// Creates a context with no command runner
    #[must_use]
    pub fn new(identity: &'a LocalIdentity, resolver: &'a dyn Resolver) -> Self {
        Self {
            identity,
            resolver,
            runner: None,
        }
    }

    /// Adds a command runner
    #[must_use]
    pub fn with_runner(mut self, runner: &'a dyn CommandRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    /// The context of the running process: system DNS, and (with the `exec` feature) the system shell.
    #[must_use]
    pub fn system(identity: &'a LocalIdentity) -> Self {
        let context = Self::new(identity, &SystemResolver);
        #[cfg(feature = "exec")]
        let context = context.with_runner(&crate::util::ShellRunner::DEFAULT);
        context
    }
}
