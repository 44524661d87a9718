//! Main CLI entrypoint
// (c) 2024 Ross Younger

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tabled::{settings::style::Style, Table, Tabled};
use tracing::{debug, warn};

use super::{
    args::CliArgs,
    styles::{ERROR, KEY, MUTED},
};
use crate::{
    config::{Error, ResolvedConfig, SshConfig, Value},
    os::{AbstractPlatform as _, Platform},
    util::setup_tracing,
};

/// Main CLI entrypoint
pub fn cli() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    setup_tracing(args.trace_level(), args.log_file.as_deref())
        .inspect_err(|e| anstream::eprintln!("{ERROR}Error:{ERROR:#} {e:?}"))?;

    run(&args)
        .inspect_err(|e| tracing::error!("{e:#}"))
        .or_else(|_| Ok(false))
        .map(|success| {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        })
}

fn run(args: &CliArgs) -> anyhow::Result<bool> {
    let config = load_config(args)?;
    if args.hosts {
        for pattern in config.hostnames() {
            anstream::println!("{pattern}");
        }
        return Ok(true);
    }
    let Some(host) = args.host.as_deref() else {
        anyhow::bail!("no host specified");
    };
    let resolved = config
        .lookup(host)
        .with_context(|| format!("resolving configuration for {host}"))?;
    let entries = entries(&resolved, &args.key);
    if args.table {
        anstream::println!("{}", Table::new(entries).with(Style::sharp()));
    } else {
        for entry in entries {
            if entry.is_noop {
                anstream::println!("{KEY}{}{KEY:#} {MUTED}{}{MUTED:#}", entry.key, entry.value);
            } else {
                anstream::println!("{KEY}{}{KEY:#} {}", entry.key, entry.value);
            }
        }
    }
    Ok(true)
}

/// Reads the configuration file(s) and applies any overrides
fn load_config(args: &CliArgs) -> anyhow::Result<SshConfig> {
    let mut config = if let Some(file) = &args.config_file {
        SshConfig::from_path(file).with_context(|| format!("reading {file}"))?
    } else {
        let mut config = SshConfig::default();
        for path in Platform::default_ssh_configs() {
            if !path.exists() {
                debug!("{} does not exist", path.display());
                continue;
            }
            match SshConfig::from_path(&path) {
                Ok(file) => config.append(file),
                Err(Error::Io(e)) => warn!("ignoring {}: {e}", path.display()),
                Err(e) => return Err(e.into()),
            }
        }
        config
    };
    for (key, value) in &args.options {
        config
            .set_option(key, value)
            .with_context(|| format!("option {key}={value}"))?;
    }
    Ok(config)
}

/// One line of output
#[derive(Tabled, Debug, PartialEq)]
struct Entry {
    key: String,
    value: String,
    #[tabled(skip)]
    is_noop: bool,
}

/// Flattens the resolved configuration for output, optionally restricted to some keys.
///
/// List values give one entry per item; the no-op marker is shown as `none`.
fn entries(resolved: &ResolvedConfig, only: &[String]) -> Vec<Entry> {
    let only: Vec<String> = only.iter().map(|k| k.to_lowercase()).collect();
    let mut output = Vec::new();
    for (key, value) in resolved {
        if !only.is_empty() && !only.contains(key) {
            continue;
        }
        let entry = |value: &str, is_noop| Entry {
            key: key.clone(),
            value: value.to_owned(),
            is_noop,
        };
        match value {
            Value::NoOp => output.push(entry("none", true)),
            _ => output.extend(value.as_slice().iter().map(|v| entry(v, false))),
        }
    }
    output
}
