// (c) 2024 Ross Younger
//! # ssh_config host resolution
//!
//! This module reads configuration files in the format of OpenSSH's `ssh_config` and works out
//! which settings apply to a given host, the way `ssh -G` does.
//!
//! A configuration is an ordered list of blocks. Each block starts with a `Host` line (a list of
//! patterns to match the host name against) or a `Match` line (a list of criteria), and contains
//! `Keyword value` settings. Settings before the first `Host` or `Match` line form an implicit
//! `Host *` block.
//!
//! ### Example
//!
//! ```text
//! Host web
//!     HostName web.example.com
//!     Port 2222
//!
//! Match host *.example.com !user root
//!     IdentityFile ~/.ssh/id_%h
//!
//! Host *
//!     ProxyCommand nc %h %p
//! ```
//!
//! ## Lookup rules
//!
//! 1. Like OpenSSH, for each setting we use the value from the _first_ block that applies.
//! 1. `IdentityFile`, `LocalForward` and `RemoteForward` accumulate across blocks, in order.
//!    Duplicate identity files are dropped.
//! 1. `Match` criteria are evaluated against the settings found so far, so a `Match host` block
//!    sees the `HostName` set by an earlier block.
//! 1. If `CanonicalizeHostname` is in force, the host name is qualified with each of the
//!    `CanonicalDomains` in turn until one resolves, and the lookup is run again for the new name.
//!    Otherwise a final pass picks up any `Match final` blocks.
//! 1. Finally, percent-tokens such as `%h` (host) and `%p` (port) are expanded in the keys that
//!    support them.
//!
//! ```
//! use sshconf::config::SshConfig;
//!
//! let config = SshConfig::from_text("Host web\n  HostName web.example.com\n  Port 2222\n")?;
//! let resolved = config.lookup("web")?;
//! assert_eq!(resolved.hostname(), Some("web.example.com"));
//! assert_eq!(resolved.port()?, 2222);
//! # Ok::<(), sshconf::config::Error>(())
//! ```
//!
//! Name resolution, command execution and the local user's identity are provided by a
//! [`LookupContext`]; [`SshConfig::lookup`] uses the system's.

mod conditions;
pub use conditions::{MatchCondition, MatchKind};

mod context;
pub use context::{CommandRunner, LocalIdentity, LookupContext, ResolvedName, Resolver};

mod errors;
pub use errors::{Error, ExtractError, Result};

mod files;
pub use files::{ConfigBlock, SshConfig};

mod lines;
mod lookup;

pub mod matching;

mod resolved;
pub use resolved::ResolvedConfig;

mod tokens;

mod values;
pub use values::Value;
