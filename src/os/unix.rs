//! OS abstraction layer - Unix implementation
// (c) 2024 Ross Younger

use std::path::PathBuf;

use anyhow::Result;

use super::AbstractPlatform;

#[derive(Debug, Clone, Copy)]
/// OS abstraction layer for Unix-like platforms
pub struct Platform {}

impl AbstractPlatform for Platform {
    fn system_ssh_config() -> &'static str {
        "/etc/ssh/ssh_config"
    }

    fn user_ssh_config() -> Result<PathBuf> {
        let Some(mut pb) = dirs::home_dir() else {
            anyhow::bail!("could not determine home directory");
        };
        pb.push(".ssh");
        pb.push("config");
        Ok(pb)
    }
}
