//! Parser for action scripts.
//!
//! One action per line: the action name followed by its arguments.
//!
//! ```text
//! # log on
//! connect bigblue
//! wait InputField
//! string "logon user"   # typed at the cursor
//! enter
//! ascii 0 0 80
//! rows
//! ```
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].

use crate::actions::{ActionDef, Form, lookup};
use crate::error::Error;
use crate::response::Reply;
use crate::session::Session;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;

/// One parsed script line.
#[derive(Debug, PartialEq, Eq)]
pub struct Step {
    pub action: &'static ActionDef,
    pub args: Vec<String>,
    /// One-based line number in the script.
    pub line: usize,
}

impl Step {
    /// The command line this step sends, or the action name for derived actions.
    pub fn command(&self) -> String {
        self.action.command(&self.args)
    }

    pub async fn run(&self, session: &mut Session) -> Result<Reply, Error> {
        session.run(self.action, &self.args).await
    }
}

/// Parse a script from a string slice and return its steps.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # ...`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error if any line names an unknown action, passes arguments to
/// an action that takes none, or has an unclosed quoted string.
///
/// # Example
///
/// ```
/// use x3270_script::parse_str;
///
/// let steps = parse_str("connect bigblue\nstring \"hello world\"\nenter\n").unwrap();
/// assert_eq!(steps.len(), 3);
/// assert_eq!(steps[1].command(), "String(\"hello\\ world\")");
/// ```
pub fn parse_str(content: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        let step = parse_line(line, line_num + 1)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        steps.push(step);
    }
    Ok(steps)
}

/// Parse a script from a file and return its steps.
///
/// Reads the entire file into memory and delegates to [`parse_str`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the script is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Step>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

/// Resolve the action name of a single non-empty, non-comment line.
fn parse_line(line: &str, line_num: usize) -> Result<Step> {
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    let action = lookup(name).ok_or_else(|| anyhow!("Unknown action: {}", name))?;
    let args = match action.form {
        Form::Quoted => text_arg(rest)?,
        _ => split_args(rest)?,
    };
    if !args.is_empty() && !action.takes_args() {
        return Err(anyhow!("{} takes no arguments", action.name));
    }
    Ok(Step {
        action,
        args,
        line: line_num,
    })
}

/// Text for a quoted action: quoted strings as written, otherwise the rest of
/// the line verbatim.
fn text_arg(rest: &str) -> Result<Vec<String>> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(Vec::new())
    } else if rest.starts_with('"') {
        split_args(rest)
    } else {
        Ok(vec![rest.to_string()])
    }
}

/// Split arguments on whitespace or commas, keeping quoted strings whole.
fn split_args(s: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut chars = s.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() || ch == ',' {
            chars.next();
            continue;
        }
        if ch == '"' {
            let mut escaped = false;
            let mut end = None;
            chars.next();
            for (i, c) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    end = Some(i);
                    break;
                }
            }
            let end = end.ok_or_else(|| anyhow!("Unclosed quote in arguments"))?;
            args.push(parse_quoted_string(&s[start..=end])?);
            continue;
        }
        let mut end = s.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == ',' {
                end = i;
                break;
            }
            chars.next();
        }
        args.push(s[start..end].to_string());
    }
    Ok(args)
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
pub(crate) fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') {
        return Err(anyhow!("Expected string to start with '\"'"));
    }
    if !s.ends_with('"') {
        return Err(anyhow!("Expected string to end with '\"'"));
    }
    let mut out = String::new();
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_string() {
        assert_eq!(parse_quoted_string("\"hello\"").unwrap(), "hello");
        assert_eq!(
            parse_quoted_string("\"hello world\"").unwrap(),
            "hello world"
        );
        assert_eq!(
            parse_quoted_string("\"hello\\nworld\"").unwrap(),
            "hello\nworld"
        );
        assert_eq!(parse_quoted_string(r#""a\\n""#).unwrap(), "a\\n");
        assert!(parse_quoted_string("\"").is_err());
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("").unwrap(), Vec::<String>::new());
        assert_eq!(split_args("0 0 80").unwrap(), ["0", "0", "80"]);
        assert_eq!(split_args("5,10").unwrap(), ["5", "10"]);
        assert_eq!(
            split_args(r#""hello, world" x"#).unwrap(),
            ["hello, world", "x"]
        );
        assert_eq!(split_args(r#""say \"hi\"""#).unwrap(), [r#"say "hi""#]);
        assert!(split_args("\"unclosed").is_err());
    }

    #[test]
    fn test_parse_str() {
        let steps = parse_str("connect bigblue\nwait InputField\nstring \"user\"\nenter\n").unwrap();
        assert_eq!(steps.len(), 4);
        let commands: Vec<String> = steps.iter().map(Step::command).collect();
        assert_eq!(
            commands,
            ["Connect(bigblue)", "Wait(InputField)", "String(\"user\")", "Enter"]
        );
    }

    #[test]
    fn test_parse_names_ignore_case() {
        let steps = parse_str("ERASEEOF\nmovecursor 3 4\nPf 12\n").unwrap();
        assert_eq!(steps[0].action.name, "EraseEOF");
        assert_eq!(steps[1].command(), "MoveCursor(3,4)");
        assert_eq!(steps[2].command(), "PF(12)");
    }

    #[test]
    fn test_parse_line_numbers() {
        let steps = parse_str("# header\n\nenter\n  tab\n").unwrap();
        assert_eq!(steps[0].line, 3);
        assert_eq!(steps[1].line, 4);
    }

    #[test]
    fn test_parse_derived_actions() {
        let steps = parse_str("rows\ncols\nstatus\nquit\n").unwrap();
        let names: Vec<&str> = steps.iter().map(|s| s.action.name).collect();
        assert_eq!(names, ["Rows", "Cols", "Status", "Quit"]);
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = format!("{:#}", parse_str("frobnicate now").err().unwrap());
        assert!(err.contains("Unknown action"), "got: {err}");
        assert!(err.contains("line 1"), "got: {err}");
    }

    #[test]
    fn test_parse_args_to_bare_action() {
        assert!(parse_str("enter now").is_err());
    }

    #[test]
    fn test_parse_unclosed_quote() {
        assert!(parse_str("string \"unclosed").is_err());
    }

    #[test]
    fn test_strip_inline_comments() {
        assert_eq!(strip_inline_comment("enter # submit"), "enter");
        assert_eq!(
            strip_inline_comment("string \"#hashtag\""),
            "string \"#hashtag\""
        );
        assert_eq!(
            strip_inline_comment("string \"test#1\" # comment"),
            "string \"test#1\""
        );
    }

    #[test]
    fn test_parse_text_keeps_commas() {
        let steps = parse_str("string a,b\nstring two  words\nstring \"x, y\"").unwrap();
        assert_eq!(steps[0].args, ["a,b"]);
        assert_eq!(steps[0].command(), "String(\"a,b\")");
        assert_eq!(steps[1].args, ["two  words"]);
        assert_eq!(steps[2].args, ["x, y"]);
        assert_eq!(steps[2].command(), "String(\"x,\\ y\")");
    }

    #[test]
    fn test_parse_comments_only() {
        assert_eq!(parse_str("# c1\n# c2\n").unwrap().len(), 0);
    }
}
