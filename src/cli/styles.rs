//! CLI output styling
// (c) 2024 Ross Younger
//!
//! Print with anstream's `println!` / `eprintln!` macros, which strip the styling
//! when the output is not a terminal.

use anstyle::{AnsiColor, Color::Ansi, Style};
use clap::builder::styling::Styles;

pub(crate) const ERROR: Style = Style::new().bold().fg_color(Some(Ansi(AnsiColor::Red)));
pub(crate) const WARNING: Style = Style::new()
    .bold()
    .fg_color(Some(Ansi(AnsiColor::Yellow)));

/// Configuration keywords
pub(crate) const KEY: Style = Style::new().fg_color(Some(Ansi(AnsiColor::Cyan)));
/// Values that are not really values, e.g. `ProxyCommand none`
pub(crate) const MUTED: Style = Style::new().dimmed();

const CALL_OUT: Style = Style::new()
    .underline()
    .fg_color(Some(Ansi(AnsiColor::Yellow)));

pub(crate) const CLAP_STYLES: Styles = Styles::styled()
    .usage(CALL_OUT)
    .header(CALL_OUT)
    .literal(Style::new().bold())
    .invalid(WARNING)
    .error(ERROR)
    .valid(KEY.bold().underline())
    .placeholder(KEY);
