//! Host lookup: applying blocks, canonicalization and token expansion
// (c) 2024 Ross Younger

use std::{cell::OnceCell, collections::BTreeSet};

use tracing::debug;

use super::{
    matching::{matches, matches_list},
    tokens::{Tokens, DEFAULT_PORT},
    values::APPEND_KEYS,
    ConfigBlock, Error, LookupContext, MatchCondition, MatchKind, ResolvedConfig, Result, Value,
};
use crate::util::AddressFamily;

/// Keywords whose accumulated values are deduplicated as they are merged
const DEDUP_KEYS: &[&str] = &["identityfile"];

const DEFAULT_MAX_DOTS: usize = 1;

/// The state flags of a lookup pass
#[derive(Debug, Clone, Copy)]
struct Pass {
    canonical: bool,
    final_: bool,
}

impl Pass {
    const FIRST: Pass = Pass {
        canonical: false,
        final_: false,
    };
    const FINAL: Pass = Pass {
        canonical: false,
        final_: true,
    };
    const CANONICAL: Pass = Pass {
        canonical: true,
        final_: true,
    };
}

/// The working state of a single call to [`resolve`]
struct Lookup<'a> {
    blocks: &'a [ConfigBlock],
    context: LookupContext<'a>,
    original_host: &'a str,
    local_fqdn: OnceCell<String>,
}

/// Computes the configuration for `host`
pub(super) fn resolve(
    blocks: &[ConfigBlock],
    host: &str,
    context: &LookupContext<'_>,
) -> Result<ResolvedConfig> {
    let lookup = Lookup {
        blocks,
        context: *context,
        original_host: host,
        local_fqdn: OnceCell::new(),
    };
    lookup.run()
}

impl Lookup<'_> {
    fn run(&self) -> Result<ResolvedConfig> {
        let host = self.original_host;
        let mut state = ResolvedConfig::new(host);
        let mut applied = BTreeSet::new();
        self.resolve_pass(host, Pass::FIRST, &mut state, &mut applied)?;
        if state.get("hostname").is_none() {
            let _ = state.insert("hostname", host);
        }

        let pass_host = if let Some(canonical) = self.canonicalize(&state)? {
            let mut fresh = ResolvedConfig::new(host);
            let _ = fresh.insert("hostname", canonical.as_str());
            self.resolve_pass(&canonical, Pass::CANONICAL, &mut fresh, &mut BTreeSet::new())?;
            state = fresh;
            canonical
        } else {
            // Blocks already merged are not merged again; the final sweep only picks up
            // blocks that did not apply the first time round.
            self.resolve_pass(host, Pass::FINAL, &mut state, &mut applied)?;
            host.to_owned()
        };

        self.expand_all(&mut state, &pass_host);
        Ok(state)
    }

    /// Folds every applicable block into `state`.
    /// `applied` holds the indices of blocks already merged; they are skipped.
    fn resolve_pass(
        &self,
        pass_host: &str,
        pass: Pass,
        state: &mut ResolvedConfig,
        applied: &mut BTreeSet<usize>,
    ) -> Result<()> {
        for (index, block) in self.blocks.iter().enumerate() {
            if applied.contains(&index) || !self.block_applies(block, pass_host, pass, state)? {
                continue;
            }
            debug!(
                "{pass_host}: applying block at {} line {} ({pass:?})",
                block.origin, block.line_number
            );
            merge(state, block);
            let _ = applied.insert(index);
        }
        Ok(())
    }

    fn block_applies(
        &self,
        block: &ConfigBlock,
        pass_host: &str,
        pass: Pass,
        state: &ResolvedConfig,
    ) -> Result<bool> {
        if block.is_match() {
            self.conditions_hold(&block.match_conditions, pass_host, pass, state)
        } else {
            Ok(matches(&block.host_patterns, pass_host))
        }
    }

    /// Evaluates `Match` criteria, left to right, against the state so far
    fn conditions_hold(
        &self,
        conditions: &[MatchCondition],
        pass_host: &str,
        pass: Pass,
        state: &ResolvedConfig,
    ) -> Result<bool> {
        let local_user = self.context.identity.user.as_str();
        for condition in conditions {
            let parameter = condition.parameter.as_deref().unwrap_or_default();
            let passed = match condition.kind {
                MatchKind::Canonical => pass.canonical,
                MatchKind::Final => pass.final_,
                // `all` may only follow `canonical`, which has already passed
                MatchKind::All => return Ok(true),
                MatchKind::Host => {
                    matches_list(parameter, state.hostname().unwrap_or(pass_host))
                }
                MatchKind::OriginalHost => matches_list(parameter, self.original_host),
                MatchKind::User => matches_list(parameter, state.user().unwrap_or(local_user)),
                MatchKind::LocalUser => matches_list(parameter, local_user),
                MatchKind::Exec => self.exec(parameter, pass_host, state)?,
            };
            if passed == condition.negated {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn exec(&self, command: &str, pass_host: &str, state: &ResolvedConfig) -> Result<bool> {
        let Some(runner) = self.context.runner else {
            return Err(Error::UnsupportedFeature("Match exec"));
        };
        let hostname = state.hostname().unwrap_or(pass_host);
        let command = self.with_tokens(state, hostname, pass_host, |tokens| {
            tokens.expand("match-exec", command)
        });
        debug!("running Match exec command `{command}`");
        match runner.run(&command) {
            Ok(success) => Ok(success),
            Err(e) => {
                debug!("Match exec command `{command}` failed: {e:#}");
                Ok(false)
            }
        }
    }

    /// Works out whether canonicalization applies, and if so performs it.
    /// Returns the canonical host name, or `None` if canonicalization is not in force.
    fn canonicalize(&self, state: &ResolvedConfig) -> Result<Option<String>> {
        let host = self.original_host;
        if !matches!(
            state.get_str("canonicalizehostname"),
            Some("yes" | "always")
        ) {
            return Ok(None);
        }
        let max_dots = match state.get_str("canonicalizemaxdots") {
            None => DEFAULT_MAX_DOTS,
            Some(v) => v.parse().map_err(|_| Error::InvalidValue {
                key: "canonicalizemaxdots".into(),
                value: v.into(),
            })?,
        };
        if host.matches('.').count() > max_dots {
            return Ok(None);
        }

        let family = AddressFamily::from_setting(state.get_str("addressfamily"));
        let domains = state
            .get_str("canonicaldomains")
            .unwrap_or_default()
            .split_whitespace();
        for domain in domains {
            let candidate = format!("{host}.{domain}");
            debug!("trying canonical name {candidate} ({family})");
            match self.context.resolver.resolve(&candidate, family) {
                Ok(records) if !records.is_empty() => return Ok(Some(candidate)),
                Ok(_) => (),
                Err(e) => debug!("{candidate}: {e:#}"),
            }
        }

        if state
            .get_str("canonicalizefallbacklocal")
            .map_or(true, |v| v == "yes")
        {
            debug!("no canonical name found for {host}; falling back to it as given");
            Ok(Some(host.to_owned()))
        } else {
            Err(Error::CouldNotCanonicalize(host.to_owned()))
        }
    }

    /// The fully-qualified local host name, looked up at most once per lookup
    fn local_fqdn(&self, family: AddressFamily) -> String {
        self.local_fqdn
            .get_or_init(|| {
                let short = &self.context.identity.hostname;
                self.context
                    .resolver
                    .resolve(short, family)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|r| r.canonical_name)
                    .find(|name| name.contains('.'))
                    .unwrap_or_else(|| short.clone())
            })
            .clone()
    }

    /// Sets up token values from the current state and hands them to `f`.
    /// `%h` is `hostname`.
    fn with_tokens<T>(
        &self,
        state: &ResolvedConfig,
        hostname: &str,
        pass_host: &str,
        f: impl FnOnce(&Tokens<'_>) -> T,
    ) -> T {
        let identity = self.context.identity;
        let family = AddressFamily::from_setting(state.get_str("addressfamily"));
        let fqdn = || self.local_fqdn(family);
        let tokens = Tokens {
            identity,
            hostname,
            pass_host,
            original_host: self.original_host,
            port: state.get_str("port").unwrap_or(DEFAULT_PORT),
            remote_user: state.user().unwrap_or(&identity.user),
            local_fqdn: &fqdn,
        };
        f(&tokens)
    }

    /// Expands tokens in every value.
    /// `hostname` goes first, with `%h` as the pass host name; the others see its expanded value.
    fn expand_all(&self, state: &mut ResolvedConfig, pass_host: &str) {
        let snapshot = state.clone();
        let raw = snapshot.hostname().unwrap_or(pass_host);
        let hostname = self.with_tokens(&snapshot, pass_host, pass_host, |tokens| {
            tokens.expand("hostname", raw)
        });

        self.with_tokens(&snapshot, &hostname, pass_host, |tokens| {
            for (key, value) in &mut state.data {
                match value {
                    Value::Single(s) => *s = tokens.expand(key, s),
                    Value::List(list) => {
                        for s in list.iter_mut() {
                            *s = tokens.expand(key, s);
                        }
                    }
                    Value::NoOp => (),
                }
            }
        });
        let _ = state.insert("hostname", hostname);
    }
}

/// Merges a block's settings into the state.
///
/// Single values are first-wins. List values are appended; `identityfile` entries already
/// present are skipped.
fn merge(state: &mut ResolvedConfig, block: &ConfigBlock) {
    for (key, value) in &block.settings {
        if APPEND_KEYS.contains(&key.as_str()) {
            let entry = state
                .data
                .entry(key.clone())
                .or_insert_with(|| Value::List(Vec::new()));
            let Value::List(existing) = entry else {
                continue;
            };
            let dedup = DEDUP_KEYS.contains(&key.as_str());
            for item in value.as_slice() {
                if !(dedup && existing.contains(item)) {
                    existing.push(item.clone());
                }
            }
        } else {
            let _ = state
                .data
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use anyhow::{anyhow, Result};
    use assertables::assert_contains_as_result;

    use crate::config::{
        test_support::{identity, FakeResolver, FakeRunner},
        Error, LookupContext, ResolvedConfig, SshConfig, Value,
    };
    use crate::util::AddressFamily;

    fn lookup(text: &str, host: &str) -> Result<ResolvedConfig> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]);
        let runner = FakeRunner::new(&[]);
        let context = LookupContext::new(&identity, &resolver).with_runner(&runner);
        Ok(SshConfig::from_text(text)?.lookup_with(host, &context)?)
    }

    #[test]
    fn hostname_always_present() -> Result<()> {
        let cfg = lookup("", "plain")?;
        assert_eq!(cfg.hostname(), Some("plain"));
        assert_eq!(cfg.len(), 1);

        let cfg = lookup("Host plain\n  HostName real.example.com\n", "plain")?;
        assert_eq!(cfg.hostname(), Some("real.example.com"));
        Ok(())
    }

    #[test]
    fn first_match_wins() -> Result<()> {
        let text = r"
            Host web*
              Port 1111
              User first
            Host *
              Port 2222
              User second
              Compression yes
        ";
        let cfg = lookup(text, "web1")?;
        assert_eq!(cfg.get_str("port"), Some("1111"));
        assert_eq!(cfg.user(), Some("first"));
        assert!(cfg.as_bool("compression"));

        let cfg = lookup(text, "db1")?;
        assert_eq!(cfg.get_str("port"), Some("2222"));
        Ok(())
    }

    #[test]
    fn negated_host_patterns() -> Result<()> {
        let text = "Host *.example.com !bad.example.com\n  User someone\n";
        assert_eq!(lookup(text, "good.example.com")?.user(), Some("someone"));
        assert_eq!(lookup(text, "bad.example.com")?.user(), None);
        Ok(())
    }

    #[test]
    fn identity_files_accumulate() -> Result<()> {
        let text = r"
            IdentityFile ~/.ssh/global
            Host web
              IdentityFile ~/.ssh/web
              IdentityFile ~/.ssh/global
            Host *
              IdentityFile ~/.ssh/web
              IdentityFile ~/.ssh/last
        ";
        let cfg = lookup(text, "web")?;
        assert_eq!(
            cfg.get_list("identityfile"),
            [
                "/home/alice/.ssh/global",
                "/home/alice/.ssh/web",
                "/home/alice/.ssh/last"
            ]
        );
        Ok(())
    }

    #[test]
    fn forwards_append_in_block_order() -> Result<()> {
        let text = r"
            Host web
              LocalForward 8080 localhost:80
            Host *
              LocalForward 8080 localhost:80
              RemoteForward 9000 localhost:9000
        ";
        let cfg = lookup(text, "web")?;
        assert_eq!(cfg.get_list("localforward").len(), 2);
        assert_eq!(cfg.get_list("remoteforward"), ["9000 localhost:9000"]);
        Ok(())
    }

    #[test]
    fn proxycommand_expansion() -> Result<()> {
        let cfg = lookup("Host myhost\n  ProxyCommand nc %h %p\n", "myhost")?;
        assert_eq!(cfg.get_str("proxycommand"), Some("nc myhost 22"));

        let cfg = lookup(
            "Host myhost\n  HostName %h.example.com\n  Port 2200\n  ProxyCommand ssh -W %h:%p %r@gw\n",
            "myhost",
        )?;
        assert_eq!(cfg.hostname(), Some("myhost.example.com"));
        assert_eq!(
            cfg.get_str("proxycommand"),
            Some("ssh -W myhost.example.com:2200 alice@gw")
        );
        Ok(())
    }

    #[test]
    fn hostname_only_expands_h() -> Result<()> {
        let cfg = lookup("Host x\n  HostName %h-%p.%r\n", "x")?;
        assert_eq!(cfg.hostname(), Some("x-%p.%r"));
        Ok(())
    }

    #[test]
    fn expanded_hostname_feeds_other_keys() -> Result<()> {
        let cfg = lookup(
            "Host db\n  HostName %h.internal\n  IdentityFile ~/.ssh/%h\n  ControlPath /tmp/%h-%n\n",
            "db",
        )?;
        assert_eq!(cfg.hostname(), Some("db.internal"));
        assert_eq!(cfg.get_list("identityfile"), ["/home/alice/.ssh/db.internal"]);
        assert_eq!(cfg.get_str("controlpath"), Some("/tmp/db.internal-db"));
        Ok(())
    }

    #[test]
    fn unexpanded_keys_stay_literal() -> Result<()> {
        let cfg = lookup("Host x\n  User %u\n  LocalCommand echo %h\n", "x")?;
        assert_eq!(cfg.user(), Some("%u"));
        assert_eq!(cfg.get_str("localcommand"), Some("echo %h"));
        Ok(())
    }

    #[test]
    fn proxycommand_none() -> Result<()> {
        let text = "Host x\n  ProxyCommand none\nHost *\n  ProxyCommand nc %h %p\n";
        let cfg = lookup(text, "x")?;
        assert_eq!(cfg.get("proxycommand"), Some(&Value::NoOp));
        assert_eq!(cfg.get_str("proxycommand"), None);
        let cfg = lookup(text, "y")?;
        assert_eq!(cfg.get_str("proxycommand"), Some("nc y 22"));
        Ok(())
    }

    #[test]
    fn global_port_is_an_integer() -> Result<()> {
        let cfg = lookup("Host *\n  Port 2222\n", "anywhere")?;
        assert_eq!(cfg.as_int("port")?, 2222);
        assert_eq!(cfg.port()?, 2222);
        Ok(())
    }

    #[test]
    fn match_sees_earlier_state() -> Result<()> {
        let text = r"
            Host short
              HostName long.example.com
            Match host *.example.com
              User matched
            Match originalhost short
              Port 1234
            Match host short
              Compression yes
        ";
        let cfg = lookup(text, "short")?;
        assert_eq!(cfg.user(), Some("matched"));
        assert_eq!(cfg.get_str("port"), Some("1234"));
        // `host` looks at the configured HostName once one is set
        assert_eq!(cfg.get_str("compression"), None);
        Ok(())
    }

    #[test]
    fn match_user_and_localuser() -> Result<()> {
        let text = r"
            Match user alice
              Port 1
            Match localuser alice
              Compression yes
            Match !localuser alice
              ForwardAgent yes
        ";
        let cfg = lookup(text, "x")?;
        assert_eq!(cfg.get_str("port"), Some("1"));
        assert!(cfg.as_bool("compression"));
        assert!(!cfg.as_bool("forwardagent"));

        // a configured User takes over from the local user
        let cfg = lookup(&format!("User bob\n{text}"), "x")?;
        assert_eq!(cfg.get_str("port"), None);
        Ok(())
    }

    #[test]
    fn match_all_and_final() -> Result<()> {
        let text = r"
            Match final
              User from-final
            Match all
              Port 42
            Match !final
              Compression yes
        ";
        let cfg = lookup(text, "x")?;
        assert_eq!(cfg.user(), Some("from-final"));
        assert_eq!(cfg.get_str("port"), Some("42"));
        // only the first pass is not final
        assert!(cfg.as_bool("compression"));
        Ok(())
    }

    #[test]
    fn canonical_blocks_need_canonicalization() -> Result<()> {
        let text = "Match canonical\n  User canon\nMatch !canonical\n  Port 5\n";
        let cfg = lookup(text, "x")?;
        assert_eq!(cfg.user(), None);
        assert_eq!(cfg.get_str("port"), Some("5"));
        Ok(())
    }

    const CANON: &str = r"
        CanonicalizeHostname yes
        CanonicalDomains nowhere.test example.com example.org
        Match canonical host *.example.com
          User canonical-user
        Host web.example.com
          Port 2022
        Host web
          Port 9
    ";

    #[test]
    fn canonicalization_success() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&["web.example.com", "web.example.org"]);
        let context = LookupContext::new(&identity, &resolver);
        let cfg = SshConfig::from_text(CANON)?.lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web.example.com"));
        assert_eq!(cfg.user(), Some("canonical-user"));
        // the second pass starts afresh
        assert_eq!(cfg.get_str("port"), Some("2022"));
        let queries: Vec<_> = resolver
            .queries
            .borrow()
            .iter()
            .map(|(h, _)| h.clone())
            .collect();
        assert_eq!(queries, ["web.nowhere.test", "web.example.com"]);
        Ok(())
    }

    #[test]
    fn canonicalization_fallback() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]);
        let context = LookupContext::new(&identity, &resolver);
        let cfg = SshConfig::from_text(CANON)?.lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web"));
        assert_eq!(cfg.get_str("port"), Some("9"));
        assert_eq!(cfg.user(), None);

        let text = format!("CanonicalizeFallbackLocal yes\n{CANON}");
        let cfg = SshConfig::from_text(&text)?.lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web"));
        Ok(())
    }

    #[test]
    fn canonicalization_failure() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]);
        let context = LookupContext::new(&identity, &resolver);
        let text = format!("CanonicalizeFallbackLocal no\n{CANON}");
        let err = SshConfig::from_text(&text)?
            .lookup_with("web", &context)
            .unwrap_err();
        assert!(matches!(err, Error::CouldNotCanonicalize(ref h) if h == "web"));
        Ok(())
    }

    #[test]
    fn canonicalization_max_dots() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&["a.b.c.example.com"]);
        let context = LookupContext::new(&identity, &resolver);
        let config = SshConfig::from_text(CANON)?;
        // one dot is allowed by default; two is too many
        let cfg = config.lookup_with("a.b.c", &context)?;
        assert_eq!(cfg.hostname(), Some("a.b.c"));
        assert_eq!(resolver.calls.get(), 0);

        let text = format!("CanonicalizeMaxDots 2\n{CANON}");
        let cfg = SshConfig::from_text(&text)?.lookup_with("a.b.c", &context)?;
        assert_eq!(cfg.hostname(), Some("a.b.c.example.com"));

        let text = format!("CanonicalizeMaxDots lots\n{CANON}");
        let err = SshConfig::from_text(&text)?
            .lookup_with("a.b.c", &context)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "canonicalizemaxdots"));
        Ok(())
    }

    #[test]
    fn canonicalization_address_family() -> Result<()> {
        let identity = identity();
        let resolver =
            FakeResolver::new(&["web.example.com", "web.example.org"]).only(AddressFamily::IPv6);
        let context = LookupContext::new(&identity, &resolver);
        let text = format!("AddressFamily inet6\n{CANON}");
        let cfg = SshConfig::from_text(&text)?.lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web.example.com"));

        let text = format!("AddressFamily inet\n{CANON}");
        let cfg = SshConfig::from_text(&text)?.lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web"));
        assert!(resolver
            .queries
            .borrow()
            .iter()
            .all(|(_, f)| *f != AddressFamily::Any));
        Ok(())
    }

    #[test]
    fn canonicalization_without_domains() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&["web.example.com"]);
        let context = LookupContext::new(&identity, &resolver);
        let cfg = SshConfig::from_text("CanonicalizeHostname always\n")?
            .lookup_with("web", &context)?;
        assert_eq!(cfg.hostname(), Some("web"));
        assert_eq!(resolver.calls.get(), 0);
        Ok(())
    }

    #[test]
    fn match_exec() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]);
        let runner = FakeRunner::new(&["test-host gw 22 alice"]);
        let context = LookupContext::new(&identity, &resolver).with_runner(&runner);
        let text = r#"
            Host gw
              HostName gateway.example.com
            Match exec "test-host %h %p %r"
              User never
            Match exec boom
              User never
            Match exec "test-host %n %p %u"
              User via-exec
        "#;
        let cfg = SshConfig::from_text(text)?.lookup_with("gw", &context)?;
        assert_eq!(cfg.user(), Some("via-exec"));
        let ran = runner.ran.borrow();
        assert!(ran.contains(&"test-host gateway.example.com 22 alice".to_string()));
        assert!(ran.contains(&"boom".to_string()));
        Ok(())
    }

    #[test]
    fn match_exec_without_runner() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]);
        let context = LookupContext::new(&identity, &resolver);
        let config = SshConfig::from_text("Match exec true\n  User x\n")?;
        let err = config.lookup_with("host", &context).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeature(_)));
        assert_contains_as_result!(err.to_string(), "Match exec").map_err(|e| anyhow!(e))?;

        // criteria are evaluated left to right; a failed host check means exec is never reached
        let config = SshConfig::from_text("Match host other exec true\n  User x\n")?;
        assert_eq!(config.lookup_with("host", &context)?.user(), None);
        Ok(())
    }

    #[test]
    fn local_fqdn_resolved_once() -> Result<()> {
        let identity = identity();
        let resolver = FakeResolver::new(&[]).with_canonical("laptop", "laptop.corp.example");
        let context = LookupContext::new(&identity, &resolver);
        let config = SshConfig::from_text("ControlPath /tmp/%L-%l-%n\nIdentityFile %L\n")?;
        let cfg = config.lookup_with("web", &context)?;
        assert_eq!(
            cfg.get_str("controlpath"),
            Some("/tmp/laptop.corp.example-laptop-web")
        );
        // %L is not allowed in identityfile
        assert_eq!(cfg.get_list("identityfile"), ["%L"]);
        assert_eq!(resolver.calls.get(), 1);

        // no qualified name available: fall back to the short name
        let resolver = FakeResolver::new(&[]);
        let context = LookupContext::new(&identity, &resolver);
        let cfg = config.lookup_with("web", &context)?;
        assert_eq!(cfg.get_str("controlpath"), Some("/tmp/laptop-laptop-web"));
        Ok(())
    }

    #[test]
    fn concurrent_lookups() -> Result<()> {
        let config = SshConfig::from_text("Host web*\n  User shared\nHost *\n  Port 2\n")?;
        std::thread::scope(|s| -> Result<()> {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let config = &config;
                    s.spawn(move || {
                        let identity = identity();
                        let resolver = FakeResolver::new(&[]);
                        let context = LookupContext::new(&identity, &resolver);
                        config.lookup_with(&format!("web{i}"), &context)
                    })
                })
                .collect();
            for handle in handles {
                let cfg = handle
                    .join()
                    .map_err(|_| anyhow!("lookup thread panicked"))??;
                assert_eq!(cfg.user(), Some("shared"));
                assert_eq!(cfg.get_str("port"), Some("2"));
            }
            Ok(())
        })
    }
}
