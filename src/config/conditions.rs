//! `Match` criteria
// (c) 2024 Ross Younger

use std::collections::VecDeque;

use anyhow::Result;
use strum::{Display, EnumString};

/// The criteria keywords understood by a `Match` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MatchKind {
    /// Pattern-match the currently configured `HostName` (or the target host, if none yet)
    Host,
    /// Pattern-match the host name as originally given to the lookup
    OriginalHost,
    /// Pattern-match the configured remote `User` (or the local user, if none yet)
    User,
    /// Pattern-match the local user
    LocalUser,
    /// Run a command; passes if it exits successfully
    Exec,
    /// Passes only in the lookup pass that follows hostname canonicalization
    Canonical,
    /// Passes only in the final lookup pass
    Final,
    /// Always passes
    All,
}

impl MatchKind {
    /// Does this keyword take a parameter?
    #[must_use]
    pub fn takes_parameter(self) -> bool {
        !matches!(self, MatchKind::All | MatchKind::Canonical | MatchKind::Final)
    }
}

/// One criterion of a `Match` line, e.g. `!host *.example.com`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCondition {
    /// What to test
    pub kind: MatchKind,
    /// Pattern list or command; `None` for keywords without a parameter
    pub parameter: Option<String>,
    /// Whether the result of the test is inverted
    pub negated: bool,
}

/// Turns the (already shell-split) arguments of a `Match` line into conditions,
/// validating the keyword sequence as we go.
pub(super) fn parse_conditions(args: Vec<String>) -> Result<Vec<MatchCondition>> {
    let mut tokens = VecDeque::from(args);
    let mut conditions = Vec::new();
    while let Some(token) = tokens.pop_front() {
        let (negated, keyword) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token.as_str()),
        };
        let kind: MatchKind = keyword
            .parse()
            .map_err(|_| anyhow::anyhow!("unsupported Match keyword '{keyword}'"))?;
        let parameter = if kind.takes_parameter() {
            let Some(param) = tokens.pop_front() else {
                anyhow::bail!("missing parameter to Match '{keyword}' keyword");
            };
            Some(param)
        } else {
            None
        };
        conditions.push(MatchCondition {
            kind,
            parameter,
            negated,
        });
    }
    anyhow::ensure!(!conditions.is_empty(), "Match requires at least one keyword");
    validate_all(&conditions)?;
    Ok(conditions)
}

/// `all` may only be accompanied by `canonical`, and `canonical` must come first.
fn validate_all(conditions: &[MatchCondition]) -> Result<()> {
    let Some(all_index) = conditions.iter().position(|c| c.kind == MatchKind::All) else {
        return Ok(());
    };
    anyhow::ensure!(
        conditions
            .iter()
            .all(|c| matches!(c.kind, MatchKind::All | MatchKind::Canonical)),
        "Match does not allow 'all' mixed with anything but 'canonical'"
    );
    anyhow::ensure!(
        !conditions[all_index..]
            .iter()
            .any(|c| c.kind == MatchKind::Canonical),
        "Match does not allow 'all' before 'canonical'"
    );
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////////////
