//! Top-level command-line arguments
// (c) 2024 Ross Younger

use clap::Parser;

/// Options that switch us into another mode i.e. which don't require a host argument
const MODE_OPTIONS: &[&str] = &["hosts"];

/// Splits `KEY=VALUE`, or `KEY VALUE` as ssh also accepts
fn parse_option(arg: &str) -> Result<(String, String), String> {
    let invalid = || format!("expected KEY=VALUE, found `{arg}`");
    let split = arg
        .find(|c: char| c == '=' || c.is_whitespace())
        .ok_or_else(invalid)?;
    let (key, rest) = arg.split_at(split);
    let rest = rest.trim_start();
    let value = rest.strip_prefix('=').unwrap_or(rest).trim();
    if key.is_empty() || value.is_empty() {
        return Err(invalid());
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version(env!("SSHCONF_VERSION_STRING")),
    about,
    before_help = "e.g.   sshconf -k hostname -k port my-server",
    infer_long_args(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CliArgs {
    // MODE SELECTION ======================================================================
    /// Lists the patterns of every `Host` block, instead of resolving a host
    #[arg(long, action, help_heading("Modes"), conflicts_with_all(["host", "key", "table"]))]
    pub(crate) hosts: bool,

    // CONFIGURATION =======================================================================
    /// Reads this configuration file instead of the user and system files
    #[arg(short('F'), long, value_name("FILE"), help_heading("Configuration"))]
    pub(crate) config_file: Option<String>,

    /// Sets an option, taking precedence over the configuration files.
    ///
    /// May be repeated, e.g. `-o Port=2222 -o User=admin`
    #[arg(
        short('o'),
        long("option"),
        value_name("KEY=VALUE"),
        value_parser = parse_option,
        help_heading("Configuration")
    )]
    pub(crate) options: Vec<(String, String)>,

    // OUTPUT ==============================================================================
    /// Outputs only this key. May be repeated.
    #[arg(short, long, value_name("KEY"), help_heading("Output"))]
    pub(crate) key: Vec<String>,

    /// Outputs a table instead of `key value` lines
    #[arg(long, action, help_heading("Output"))]
    pub(crate) table: bool,

    // DEBUG ===============================================================================
    /// Quiet mode: reports only errors
    #[arg(short, long, action, conflicts_with("debug"), help_heading("Debug"))]
    pub(crate) quiet: bool,

    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=sshconf=trace` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"))]
    pub(crate) debug: bool,

    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(short('l'), long, action, help_heading("Debug"), value_name("FILE"))]
    pub(crate) log_file: Option<String>,

    // POSITIONAL ARGUMENTS ================================================================
    /// The host to resolve the configuration for
    #[arg(conflicts_with_all(MODE_OPTIONS), required = true, value_name = "HOST")]
    pub(crate) host: Option<String>,
}

impl CliArgs {
    pub(crate) fn trace_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod test {
    use clap::Parser as _;

    use super::{parse_option, CliArgs};

    #[test]
    fn options() {
        assert_eq!(
            parse_option("Port=2222"),
            Ok(("Port".into(), "2222".into()))
        );
        assert_eq!(
            parse_option("ProxyCommand nc %h %p"),
            Ok(("ProxyCommand".into(), "nc %h %p".into()))
        );
        assert_eq!(
            parse_option("User = bob"),
            Ok(("User".into(), "bob".into()))
        );
        assert_eq!(
            parse_option("ProxyCommand ssh -o Foo=bar gw"),
            Ok(("ProxyCommand".into(), "ssh -o Foo=bar gw".into()))
        );
        assert!(parse_option("Port").is_err());
        assert!(parse_option("=2222").is_err());
    }

    #[test]
    fn parse_host() -> anyhow::Result<()> {
        let args = CliArgs::try_parse_from(["sshconf", "-o", "Port=1", "-k", "port", "web"])?;
        assert_eq!(args.host.as_deref(), Some("web"));
        assert_eq!(args.options, [("Port".to_string(), "1".to_string())]);
        assert_eq!(args.key, ["port"]);
        assert_eq!(args.trace_level(), "info");
        Ok(())
    }

    #[test]
    fn modes() -> anyhow::Result<()> {
        let args = CliArgs::try_parse_from(["sshconf", "--hosts"])?;
        assert!(args.hosts);
        assert!(CliArgs::try_parse_from(["sshconf"]).is_err());
        assert!(CliArgs::try_parse_from(["sshconf", "--hosts", "web"]).is_err());
        assert!(CliArgs::try_parse_from(["sshconf", "-d", "-q", "web"]).is_err());
        Ok(())
    }

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory as _;
        CliArgs::command().debug_assert();
    }
}
