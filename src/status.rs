//! The companion's twelve-field status line.

use crate::error::Error;

/// Field index of the screen row count.
pub const ROWS_FIELD: usize = 6;
/// Field index of the screen column count.
pub const COLS_FIELD: usize = 7;

const FIELD_COUNT: usize = 12;

/// Decoded status line, e.g. `U F U C(bigblue) I 4 43 80 0 0 0x0 0.041`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// `U` unlocked, `L` locked, `E` error.
    pub keyboard: String,
    /// `F` formatted, `U` unformatted.
    pub formatting: String,
    /// `P` protected, `U` unprotected.
    pub protection: String,
    /// `C(host)` connected, `N` not connected.
    pub connection: String,
    pub emulator_mode: String,
    pub model: String,
    pub rows: u32,
    pub cols: u32,
    pub cursor_row: u32,
    pub cursor_col: u32,
    pub window_id: String,
    pub exec_time: String,
}

impl StatusLine {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < FIELD_COUNT {
            return Err(Error::MalformedStatus(text.to_string()));
        }
        let number = |i: usize| {
            fields[i]
                .parse::<u32>()
                .map_err(|_| Error::MalformedStatus(text.to_string()))
        };
        Ok(Self {
            keyboard: fields[0].to_string(),
            formatting: fields[1].to_string(),
            protection: fields[2].to_string(),
            connection: fields[3].to_string(),
            emulator_mode: fields[4].to_string(),
            model: fields[5].to_string(),
            rows: number(ROWS_FIELD)?,
            cols: number(COLS_FIELD)?,
            cursor_row: number(8)?,
            cursor_col: number(9)?,
            window_id: fields[10].to_string(),
            exec_time: fields[11].to_string(),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection.starts_with('C')
    }

    /// Host name inside `C(...)`, if connected.
    pub fn host(&self) -> Option<&str> {
        self.connection
            .strip_prefix("C(")
            .and_then(|rest| rest.strip_suffix(')'))
    }
}

/// Return whitespace-separated field `index` of a status line.
pub fn field(text: &str, index: usize) -> Result<&str, Error> {
    text.split_whitespace()
        .nth(index)
        .ok_or_else(|| Error::MalformedStatus(text.to_string()))
}
