//! DNS helpers
// (c) 2024 Ross Younger

use anyhow::Context as _;
use dns_lookup::AddrInfoHints;
use nix::libc::{AF_INET, AF_INET6, AF_UNSPEC, AI_CANONNAME, SOCK_DGRAM};
use strum::{Display, EnumString};

use crate::config::{ResolvedName, Resolver};

/// The address family restriction for a name lookup,
/// as spelled by the `AddressFamily` configuration keyword.
// I am a little surprised that this enum, or something similar, doesn't appear in std::net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AddressFamily {
    /// Either family
    #[default]
    #[strum(serialize = "any")]
    Any,
    /// IPv4 only
    #[strum(serialize = "inet")]
    IPv4,
    /// IPv6 only
    #[strum(serialize = "inet6")]
    IPv6,
}

impl AddressFamily {
    /// Interprets an `addressfamily` setting. Anything unrecognised, or absent, means [`AddressFamily::Any`].
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    fn to_raw(self) -> i32 {
        match self {
            AddressFamily::Any => AF_UNSPEC,
            AddressFamily::IPv4 => AF_INET,
            AddressFamily::IPv6 => AF_INET6,
        }
    }
}

/// Name resolution through the system resolver (`getaddrinfo`), asking for canonical names.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str, family: AddressFamily) -> anyhow::Result<Vec<ResolvedName>> {
        let hints = AddrInfoHints {
            flags: AI_CANONNAME,
            address: family.to_raw(),
            socktype: SOCK_DGRAM,
            protocol: 0,
        };
        let entries = dns_lookup::getaddrinfo(Some(host), None, Some(hints))
            .map_err(std::io::Error::from)
            .with_context(|| format!("host name lookup for {host} failed"))?;
        let names = entries
            .map(|entry| {
                entry.map(|info| ResolvedName {
                    canonical_name: info.canonname,
                })
            })
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading lookup results for {host}"))?;
        tracing::trace!("{host} ({family}) resolved to {} record(s)", names.len());
        Ok(names)
    }
}
