//! OpenSSH-style host configuration resolution
// (c) 2024 Ross Younger
//!
//! This crate reads `ssh_config` files and computes the settings that apply to a connection to a
//! particular host, following the rules OpenSSH uses: `Host` and `Match` blocks in file order,
//! first value wins, hostname canonicalization and percent-token expansion.
//!
//! The entry point is [`config::SshConfig`]:
//!
//! ```
//! use sshconf::config::SshConfig;
//!
//! let config = SshConfig::from_text(r"
//!     Host *.example.com
//!         User admin
//!     Host *
//!         ProxyCommand nc %h %p
//! ")?;
//! let resolved = config.lookup("db.example.com")?;
//! assert_eq!(resolved.user(), Some("admin"));
//! assert_eq!(resolved.get_str("proxycommand"), Some("nc db.example.com 22"));
//! # Ok::<(), sshconf::config::Error>(())
//! ```
//!
//! The companion `sshconf` binary prints the resolved configuration for a host, much like `ssh -G`.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

mod cli;
pub use cli::cli;

pub mod config;
/// OS abstraction layer
pub mod os;
/// Utilities
pub mod util;
