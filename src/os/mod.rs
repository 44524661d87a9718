//! OS abstraction layer
// (c) 2024 Ross Younger

use std::path::PathBuf;

use anyhow::Result;

/// General platform abstraction trait.
/// The active implementation should be pulled into this crate
/// Implementations should be called `Platform`, e.g. [unix::Platform].
///
/// Usage:
/// ```
///    use sshconf::os::Platform;
///    use sshconf::os::AbstractPlatform as _;
///    println!("{}", Platform::system_ssh_config());
/// ```
pub trait AbstractPlatform {
    /// Path to the system ssh config file.
    /// On most platforms this will be `/etc/ssh/ssh_config`
    fn system_ssh_config() -> &'static str;

    /// Path to the user ssh config file.
    /// On most platforms this will be `${HOME}/.ssh/config`
    /// # Note
    /// This is a _theoretical_ path construction; it does not guarantee that the path actually exists.
    /// That is up to the caller to determine and reason about.
    /// # Errors
    /// If the current user's home directory could not be determined
    fn user_ssh_config() -> Result<PathBuf>;

    /// The configuration files to read by default, highest priority first.
    ///
    /// Files that cannot be located are left out.
    fn default_ssh_configs() -> Vec<PathBuf> {
        let mut files = Vec::new();
        match Self::user_ssh_config() {
            Ok(path) => files.push(path),
            Err(e) => tracing::warn!("{e:#}"),
        }
        files.push(PathBuf::from(Self::system_ssh_config()));
        files
    }
}

#[cfg(any(unix, doc))]
pub mod unix;

#[cfg(any(unix, doc))]
pub use unix::Platform;

static_assertions::assert_cfg!(unix, "This OS is not yet supported");
