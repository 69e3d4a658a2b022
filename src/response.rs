//! Incremental parsing of companion responses.
//!
//! The companion answers every command with zero or more lines followed by a
//! terminator line, `ok` or `error`:
//!
//! ```text
//! data: 24
//! data: 80
//! U F U C(host) I 2 24 80 0 0 0x0 -
//! ok
//! ```
//!
//! [`ResponseReader`] is fed raw output chunks and yields one [`Response`] per
//! terminator. Bytes after a terminator stay buffered for the next response.

use std::fmt;

const DATA_PREFIX: &str = "data:";

/// A single classified output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `data: <text>`; holds the text after the prefix.
    Data(String),
    /// Any other non-terminator line, such as the status line.
    Other(String),
    /// The `ok` terminator.
    Ok,
    /// The `error` terminator.
    Error,
}

impl Line {
    /// Classify one line with its line ending already removed.
    pub fn classify(text: &str) -> Self {
        match text {
            "ok" => Line::Ok,
            "error" => Line::Error,
            _ => match text.strip_prefix(DATA_PREFIX) {
                Some(rest) => Line::Data(rest.strip_prefix(' ').unwrap_or(rest).to_string()),
                None => Line::Other(text.to_string()),
            },
        }
    }
}

/// How a response ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error,
}

/// One complete response, up to and including its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    lines: Vec<Line>,
    outcome: Outcome,
    raw: String,
}

impl Response {
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }

    /// Every line before the terminator, in receipt order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The raw text as received, terminator included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Texts of the `data:` lines in receipt order.
    pub fn data(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Data(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// The decoded result of a successful command.
    pub fn reply(&self) -> Reply {
        Reply::from_data(self.data().map(str::to_string).collect())
    }

    /// All lines before the terminator as they were received, joined by `\n`.
    pub fn payload(&self) -> String {
        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match line {
                Line::Data(text) => lines.push(format!("{DATA_PREFIX} {text}")),
                Line::Other(text) => lines.push(text.clone()),
                Line::Ok | Line::Error => {}
            }
        }
        lines.join("\n")
    }

    /// The diagnostic carried by an `error` response.
    ///
    /// Data lines win when present; otherwise the first plain line is used.
    /// Returns `None` when the terminator had nothing in front of it.
    pub fn error_message(&self) -> Option<String> {
        let data: Vec<&str> = self.data().collect();
        if !data.is_empty() {
            return Some(data.join("\n"));
        }
        self.lines.iter().find_map(|line| match line {
            Line::Other(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
    }
}

/// Decoded result of one command; the shape follows the number of data lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No data lines.
    Empty,
    /// Exactly one data line.
    Scalar(String),
    /// Two or more data lines, in receipt order.
    List(Vec<String>),
}

impl Reply {
    pub fn from_data(mut data: Vec<String>) -> Self {
        match data.len() {
            0 => Reply::Empty,
            1 => Reply::Scalar(data.remove(0)),
            _ => Reply::List(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Reply::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// The data lines regardless of shape.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Reply::Empty => Vec::new(),
            Reply::Scalar(text) => vec![text.as_str()],
            Reply::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        match self {
            Reply::Empty => Vec::new(),
            Reply::Scalar(text) => vec![text],
            Reply::List(items) => items,
        }
    }

    /// Each data line split on whitespace: a list of lists.
    pub fn fields(&self) -> Vec<Vec<String>> {
        self.lines()
            .into_iter()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Empty => Ok(()),
            Reply::Scalar(text) => f.write_str(text),
            Reply::List(items) => f.write_str(&items.join("\n")),
        }
    }
}

/// Accumulates output chunks and splits them into responses.
#[derive(Debug, Default)]
pub struct ResponseReader {
    pending: Vec<u8>,
    lines: Vec<Line>,
    raw: String,
}

impl ResponseReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw output.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Consume complete lines until a terminator is found.
    ///
    /// Returns `None` when more output is needed; lines read so far are kept.
    pub fn next_response(&mut self) -> Option<Response> {
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let bytes: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&bytes);
            self.raw.push_str(&text);

            let line = text.trim_end_matches(['\n', '\r']);
            tracing::trace!(line, "companion");
            let outcome = match Line::classify(line) {
                Line::Ok => Outcome::Ok,
                Line::Error => Outcome::Error,
                other => {
                    self.lines.push(other);
                    continue;
                }
            };
            return Some(Response {
                lines: std::mem::take(&mut self.lines),
                outcome,
                raw: std::mem::take(&mut self.raw),
            });
        }
        None
    }

    /// Whether a partial response is buffered.
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty() || !self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> Response {
        let mut reader = ResponseReader::new();
        reader.feed(text.as_bytes());
        reader.next_response().unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(Line::classify("ok"), Line::Ok);
        assert_eq!(Line::classify("error"), Line::Error);
        assert_eq!(Line::classify("data: 24"), Line::Data("24".into()));
        assert_eq!(Line::classify("data:"), Line::Data(String::new()));
        assert_eq!(Line::classify("data:  two"), Line::Data(" two".into()));
        assert_eq!(Line::classify("okay"), Line::Other("okay".into()));
        assert_eq!(Line::classify(" data: x"), Line::Other(" data: x".into()));
    }

    #[test]
    fn test_zero_data_lines() {
        let resp = parse_one("ok\r\n");
        assert!(resp.is_ok());
        assert_eq!(resp.reply(), Reply::Empty);
    }

    #[test]
    fn test_one_data_line() {
        let resp = parse_one("data: hello world\r\nU F U C(host) I 2 24 80 0 0 0x0 -\r\nok\r\n");
        assert_eq!(resp.reply(), Reply::Scalar("hello world".into()));
    }

    #[test]
    fn test_many_data_lines() {
        let resp = parse_one("data: 24\r\ndata: 80\r\nok\r\n");
        assert_eq!(resp.reply(), Reply::List(vec!["24".into(), "80".into()]));
    }

    #[test]
    fn test_data_count_drives_shape() {
        for k in 0..5 {
            let mut text = String::new();
            for i in 0..k {
                text.push_str(&format!("data: item{i}\r\n"));
            }
            text.push_str("ok\r\n");
            let reply = parse_one(&text).reply();
            let expected: Vec<String> = (0..k).map(|i| format!("item{i}")).collect();
            assert_eq!(reply.clone().into_lines(), expected);
            match k {
                0 => assert!(reply.is_empty()),
                1 => assert_eq!(reply.as_scalar(), Some("item0")),
                _ => assert!(matches!(reply, Reply::List(ref v) if v.len() == k)),
            }
        }
    }

    #[test]
    fn test_error_message_from_plain_line() {
        let resp = parse_one("Field not found\r\nerror\r\n");
        assert_eq!(resp.outcome(), Outcome::Error);
        assert_eq!(resp.error_message().as_deref(), Some("Field not found"));
    }

    #[test]
    fn test_error_message_prefers_data() {
        let resp = parse_one("data: Keyboard locked\r\nL U U C(host) I 2 24 80 0 0 0x0 -\r\nerror\r\n");
        assert_eq!(resp.error_message().as_deref(), Some("Keyboard locked"));
    }

    #[test]
    fn test_bare_error_has_no_message() {
        let resp = parse_one("error\r\n");
        assert_eq!(resp.error_message(), None);
        assert_eq!(resp.raw(), "error\r\n");
    }

    #[test]
    fn test_split_across_chunks() {
        let mut reader = ResponseReader::new();
        reader.feed(b"data: 2");
        assert!(reader.next_response().is_none());
        reader.feed(b"4\r\nda");
        assert!(reader.next_response().is_none());
        assert!(reader.has_partial());
        reader.feed(b"ta: 80\r\no");
        assert!(reader.next_response().is_none());
        reader.feed(b"k\r\n");
        let resp = reader.next_response().unwrap();
        assert_eq!(resp.reply(), Reply::List(vec!["24".into(), "80".into()]));
        assert!(!reader.has_partial());
    }

    #[test]
    fn test_back_to_back_responses() {
        let mut reader = ResponseReader::new();
        reader.feed(b"data: a\nok\nx\nerror\n");
        assert_eq!(reader.next_response().unwrap().reply(), Reply::Scalar("a".into()));
        let second = reader.next_response().unwrap();
        assert_eq!(second.outcome(), Outcome::Error);
        assert_eq!(second.raw(), "x\nerror\n");
        assert!(reader.next_response().is_none());
    }

    #[test]
    fn test_payload_without_terminator() {
        let resp = parse_one("U F U N N 4 24 80 0 0 0x0 -\r\nok\r\n");
        assert_eq!(resp.payload(), "U F U N N 4 24 80 0 0 0x0 -");
    }

    #[test]
    fn test_reply_fields_and_display() {
        let reply = Reply::List(vec!["a b".into(), "c".into()]);
        assert_eq!(reply.fields(), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(reply.to_string(), "a b\nc");
        assert_eq!(Reply::Empty.to_string(), "");
    }
}
