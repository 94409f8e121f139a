#![forbid(unsafe_code)]

//! Demo script parsing.
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! push inbox
//! push thread-42
//! back
//! popuntil inbox
//! detach
//! push settings
//! attach tablet
//! ```

use crate::error::DemoError;

/// A single scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(String),
    Pop,
    /// System back: pops, or finishes the session at the root screen.
    Back,
    PopUntil(String),
    Replace(String),
    Clear,
    Attach(Option<String>),
    Detach,
    Show,
}

impl Command {
    /// Parse one line. `Ok(None)` for blanks and comments.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>, DemoError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next().map(str::to_string);
        if words.next().is_some() {
            return Err(script_error(line_no, format!("too many arguments in {line:?}")));
        }

        let command = match (verb.as_str(), arg) {
            ("push", Some(route)) => Self::Push(route),
            ("pop", None) => Self::Pop,
            ("back", None) => Self::Back,
            ("popuntil", Some(route)) => Self::PopUntil(route),
            ("replace", Some(route)) => Self::Replace(route),
            ("clear", None) => Self::Clear,
            ("attach", name) => Self::Attach(name),
            ("detach", None) => Self::Detach,
            ("show", None) => Self::Show,
            ("push" | "popuntil" | "replace", None) => {
                return Err(script_error(line_no, format!("{verb} needs a route")));
            }
            ("pop" | "back" | "clear" | "detach" | "show", Some(extra)) => {
                return Err(script_error(
                    line_no,
                    format!("{verb} takes no argument, got {extra:?}"),
                ));
            }
            (other, _) => {
                return Err(script_error(line_no, format!("unknown command {other:?}")));
            }
        };
        Ok(Some(command))
    }
}

/// Parse a whole script, numbering lines from 1.
pub fn parse_script<'a, I>(lines: I) -> Result<Vec<Command>, DemoError>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter_map(|(i, line)| Command::parse(i + 1, line).transpose())
        .collect()
}

fn script_error(line: usize, reason: String) -> DemoError {
    DemoError::Script { line, reason }
}
