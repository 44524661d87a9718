//! Line parsing internals
// (c) 2024 Ross Younger

use anyhow::Result;

#[derive(Debug, PartialEq)]
/// A parsed line we read from an ssh config file
pub(super) enum Line {
    Empty,
    Host {
        line_number: usize,
        args: Vec<String>,
    },
    Match {
        line_number: usize,
        args: Vec<String>,
    },
    Generic {
        line_number: usize,
        keyword: String, /*lowercase!*/
        value: String,
    },
}

impl Line {
    /// Classifies a single line of input.
    ///
    /// `Host` and `Match` arguments are split here; generic values are kept verbatim,
    /// quote stripping is the parser's business.
    pub(super) fn parse(line: &str, line_number: usize) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Line::Empty);
        }
        let Some((keyword, value)) = split_keyword(line) else {
            anyhow::bail!("unparsable line {line}");
        };
        Ok(match keyword.as_str() {
            "host" => Line::Host {
                line_number,
                args: split_args(value)?,
            },
            "match" => Line::Match {
                line_number,
                args: split_args(value)?,
            },
            _ => Line::Generic {
                line_number,
                keyword,
                value: value.to_owned(),
            },
        })
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// Separates `Keyword value` or `Keyword = value` into a lowercased keyword and the remainder.
///
/// The keyword is a run of word characters. It must be followed by whitespace or by an `=`
/// (optionally surrounded by whitespace), and then by a non-empty value.
pub(super) fn split_keyword(line: &str) -> Option<(String, &str)> {
    let end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    let (keyword, rest) = line.split_at(end);
    let trimmed = rest.trim_start();
    let value = if let Some(after_eq) = trimmed.strip_prefix('=') {
        after_eq.trim_start()
    } else if trimmed.len() < rest.len() {
        trimmed
    } else {
        // neither whitespace nor '=' after the keyword
        return None;
    };
    if value.is_empty() {
        return None;
    }
    Some((keyword.to_lowercase(), value))
}

/// Splits a string into a list of arguments.
/// Arguments are delimited by whitespace, subject to quoting (single or double quotes), and simple escapes (\\, \", \').
pub(super) fn split_args(input: &str) -> Result<Vec<String>> {
    // We need to index over the characters of the input, but also need to be able to peek at the next token in case of escapes.
    let mut i = 0;
    let input: Vec<char> = input.chars().collect();
    let mut output = Vec::<String>::new();
    while i < input.len() {
        // Strip any leading whitespace
        if input[i] == ' ' || input[i] == '\t' {
            i += 1;
            continue;
        }
        if input[i] == '#' {
            break; // it's a comment, we're done
        }

        // We're at the start of a real token
        let mut current_arg = String::new();
        let mut quote_state: char = '\0';

        while i < input.len() {
            let ch = input[i];
            match (ch, quote_state) {
                ('\\', _) => {
                    // It might be an escape
                    match input.get(i + 1) {
                        Some(nn @ ('\'' | '\"' | '\\')) => {
                            current_arg.push(*nn);
                            i += 1;
                        }
                        Some(_) | None => current_arg.push(ch), // Ignore unrecognised escape
                    }
                }
                (' ' | '\t', '\0') => break,
                (q @ ('\'' | '\"'), '\0') => quote_state = q,
                (q1, q2) if q1 == q2 => quote_state = '\0',
                (c, _) => current_arg.push(c),
            }
            i += 1;
        }

        anyhow::ensure!(quote_state == '\0', "unterminated quote");
        output.push(current_arg);
        i += 1;
    }
    Ok(output)
}

///////////////////////////////////////////////////////////////////////////////////////
