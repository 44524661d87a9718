//! Configuration files and their blocks
// (c) 2024 Ross Younger

use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use super::{
    conditions::parse_conditions, lines::Line, lookup, values::APPEND_KEYS, Error, LocalIdentity,
    LookupContext, MatchCondition, ResolvedConfig, Result, Value,
};

/// One `Host` or `Match` block, with the settings that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    /// The patterns of a `Host` line. Empty for a `Match` block.
    pub host_patterns: Vec<String>,
    /// The criteria of a `Match` line. Empty for a `Host` block.
    pub match_conditions: Vec<MatchCondition>,
    /// Settings, keyed by lowercase keyword
    pub settings: BTreeMap<String, Value>,
    /// Where the block came from
    pub origin: String,
    /// The line the block started on; 0 for the implicit block at the top of a file
    pub line_number: usize,
}

impl ConfigBlock {
    /// The implicit `Host *` block that collects settings before the first `Host` or `Match` line
    fn global(origin: &str) -> Self {
        Self::for_hosts(vec!["*".into()], origin, 0)
    }

    fn for_hosts(host_patterns: Vec<String>, origin: &str, line_number: usize) -> Self {
        Self {
            host_patterns,
            match_conditions: Vec::new(),
            settings: BTreeMap::new(),
            origin: origin.to_owned(),
            line_number,
        }
    }

    fn for_conditions(conditions: Vec<MatchCondition>, origin: &str, line_number: usize) -> Self {
        Self {
            host_patterns: Vec::new(),
            match_conditions: conditions,
            settings: BTreeMap::new(),
            origin: origin.to_owned(),
            line_number,
        }
    }

    /// Is this a `Match` block?
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.match_conditions.is_empty()
    }

    /// Stores a setting.
    ///
    /// List keywords accumulate. Other keywords keep their first value, unless `replace` is set.
    fn store(&mut self, keyword: String, value: &str, replace: bool) {
        let value = if keyword == "proxycommand" && value.eq_ignore_ascii_case("none") {
            Value::NoOp
        } else {
            let value = strip_quotes(value).to_owned();
            if APPEND_KEYS.contains(&keyword.as_str()) {
                if let Value::List(list) = self
                    .settings
                    .entry(keyword)
                    .or_insert_with(|| Value::List(Vec::new()))
                {
                    list.push(value);
                }
                return;
            }
            Value::Single(value)
        };
        if replace {
            let _ = self.settings.insert(keyword, value);
        } else {
            let _ = self.settings.entry(keyword).or_insert(value);
        }
    }
}

/// Removes one layer of surrounding double quotes
fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// The business end of reading a config file.
///
/// # Note
/// You can only use this struct once. If for some reason you want to re-parse a file,
/// you must create a fresh `Parser` to do so.
struct Parser<R>
where
    R: Read,
{
    line_number: usize,
    reader: BufReader<R>,
    origin: String,
}

impl Parser<File> {
    fn for_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::for_reader(file, path.to_string_lossy().to_string()))
    }
}

impl<'a> Parser<&'a [u8]> {
    fn for_str(s: &'a str) -> Self {
        Self::for_reader(s.as_bytes(), "<string>".into())
    }
}

impl<R: Read> Parser<R> {
    fn for_reader(reader: R, origin: String) -> Self {
        Self {
            line_number: 0,
            reader: BufReader::new(reader),
            origin,
        }
    }

    fn error(&self, e: &anyhow::Error) -> Error {
        Error::Parse {
            origin: self.origin.clone(),
            line_number: self.line_number,
            message: e.to_string(),
        }
    }

    fn parse(mut self) -> Result<Vec<ConfigBlock>> {
        let mut blocks = Vec::new();
        let mut current = ConfigBlock::global(&self.origin);
        let mut line = String::new();

        loop {
            line.clear();
            self.line_number += 1;
            if 0 == self.reader.read_line(&mut line)? {
                break; // EOF
            }
            match Line::parse(&line, self.line_number).map_err(|e| self.error(&e))? {
                Line::Empty => (),
                Line::Host { line_number, args } => {
                    if args.is_empty() {
                        let e = anyhow::anyhow!("Host requires at least one pattern");
                        return Err(self.error(&e));
                    }
                    let next = ConfigBlock::for_hosts(args, &self.origin, line_number);
                    blocks.push(std::mem::replace(&mut current, next));
                }
                Line::Match { line_number, args } => {
                    let conditions = parse_conditions(args).map_err(|e| self.error(&e))?;
                    let next = ConfigBlock::for_conditions(conditions, &self.origin, line_number);
                    blocks.push(std::mem::replace(&mut current, next));
                }
                Line::Generic { keyword, value, .. } => current.store(keyword, &value, false),
            }
        }
        blocks.push(current);
        Ok(blocks)
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// A parsed ssh-style configuration: an ordered list of blocks.
///
/// Parsing is done once; the result is immutable (apart from explicit overrides) and may be
/// shared between threads, each doing their own lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshConfig {
    blocks: Vec<ConfigBlock>,
    has_overrides: bool,
}

static_assertions::assert_impl_all!(SshConfig: Send, Sync);

const OVERRIDES_ORIGIN: &str = "<overrides>";

impl SshConfig {
    /// Parses configuration text
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self {
            blocks: Parser::for_str(text).parse()?,
            has_overrides: false,
        })
    }

    /// Parses configuration from a stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self {
            blocks: Parser::for_reader(reader, "<stream>".into()).parse()?,
            has_overrides: false,
        })
    }

    /// Reads and parses a configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            blocks: Parser::for_path(path)?.parse()?,
            has_overrides: false,
        })
    }

    /// Adds the blocks of another configuration after ours, so they have lower priority.
    ///
    /// Overrides in `other` join ours. Where both set a single-valued option, ours wins.
    pub fn append(&mut self, mut other: SshConfig) {
        if other.has_overrides {
            let theirs = other.blocks.remove(0);
            if self.has_overrides {
                let ours = &mut self.blocks[0].settings;
                for (keyword, value) in theirs.settings {
                    match ours.entry(keyword) {
                        Entry::Vacant(e) => {
                            let _ = e.insert(value);
                        }
                        Entry::Occupied(mut e) => {
                            if let (Value::List(mine), Value::List(more)) = (e.get_mut(), value) {
                                mine.extend(more);
                            }
                        }
                    }
                }
            } else {
                self.blocks.insert(0, theirs);
                self.has_overrides = true;
            }
        }
        self.blocks.extend(other.blocks);
    }

    /// Sets an option that takes precedence over everything read from configuration text,
    /// like `ssh -o`.
    ///
    /// Repeating a single-valued option replaces it; list-valued options accumulate.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        let keyword = key.to_lowercase();
        if keyword.is_empty()
            || !keyword.chars().all(|c| c.is_alphanumeric() || c == '_')
            || keyword == "host"
            || keyword == "match"
        {
            return Err(Error::InvalidValue {
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }
        if !self.has_overrides {
            self.blocks.insert(0, ConfigBlock::global(OVERRIDES_ORIGIN));
            self.has_overrides = true;
        }
        self.blocks[0].store(keyword, value, true);
        Ok(())
    }

    /// The blocks, in priority order
    #[must_use]
    pub fn blocks(&self) -> &[ConfigBlock] {
        &self.blocks
    }

    /// All the patterns named on `Host` lines (including the implicit `*`)
    #[must_use]
    pub fn hostnames(&self) -> BTreeSet<String> {
        self.blocks
            .iter()
            .skip(usize::from(self.has_overrides))
            .flat_map(|b| b.host_patterns.iter().cloned())
            .collect()
    }

    /// Looks up the configuration for `host`, using the system resolver and shell
    pub fn lookup(&self, host: &str) -> Result<ResolvedConfig> {
        let identity = LocalIdentity::current();
        self.lookup_with(host, &LookupContext::system(&identity))
    }

    /// Looks up the configuration for `host` with explicitly provided capabilities
    pub fn lookup_with(&self, host: &str, context: &LookupContext<'_>) -> Result<ResolvedConfig> {
        lookup::resolve(&self.blocks, host, context)
    }
}

///////////////////////////////////////////////////////////////////////////////////////
