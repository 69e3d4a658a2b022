//! Formatting of command arguments into the companion's text syntax.

/// Join arguments with commas, in order, without escaping them.
///
/// # Example
///
/// ```
/// use x3270_script::encode::join;
///
/// assert_eq!(join(["0", "0", "80"]), "0,0,80");
/// assert_eq!(join(Vec::<String>::new()), "");
/// ```
pub fn join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(arg.as_ref());
    }
    out
}

/// Wrap free-form text in double quotes so it survives as a single argument.
///
/// Newline, carriage return, space and double quote are backslash-escaped;
/// every other character passes through unchanged.
///
/// # Example
///
/// ```
/// use x3270_script::encode::quote;
///
/// assert_eq!(quote("say \"hi\""), r#""say\ \"hi\"""#);
/// ```
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' ' => out.push_str("\\ "),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
