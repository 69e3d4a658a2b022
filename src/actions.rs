//! The companion's action set and how each action's command line is formed.
//!
//! Every action is a row in [`ACTIONS`]. Rust callers normally use the typed
//! methods on [`Session`](crate::Session); scripts and dynamic callers go
//! through [`lookup`] and [`Session::action`](crate::Session::action).

use crate::encode::{join, quote};
use crate::status::{COLS_FIELD, ROWS_FIELD};

/// How an action's arguments are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `Name`; arguments are not accepted.
    Bare,
    /// `Name(a,b,c)`; arguments passed through unescaped.
    Joined,
    /// `Name("text")`; all arguments form one quoted text.
    Quoted,
    /// The bare-terminator status query.
    Status,
    /// One field of the status line.
    StatusField(usize),
    /// `Quit`, after which the companion exits.
    Quit,
}

/// One named action.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionDef {
    pub name: &'static str,
    pub form: Form,
}

impl ActionDef {
    const fn new(name: &'static str, form: Form) -> Self {
        Self { name, form }
    }

    /// Whether the action's command line carries arguments.
    pub fn takes_args(&self) -> bool {
        matches!(self.form, Form::Joined | Form::Quoted)
    }

    /// Render the command line for `args`.
    ///
    /// `Bare` forms ignore arguments; `Quoted` joins multiple arguments with
    /// spaces before quoting them.
    pub fn command<S: AsRef<str>>(&self, args: &[S]) -> String {
        match self.form {
            Form::Joined => format!("{}({})", self.name, join(args)),
            Form::Quoted => {
                let text: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
                format!("{}({})", self.name, quote(&text.join(" ")))
            }
            Form::Bare | Form::Quit | Form::Status | Form::StatusField(_) => {
                self.name.to_string()
            }
        }
    }
}

use Form::{Bare, Joined, Quoted};

pub static ACTIONS: &[ActionDef] = &[
    ActionDef::new("Ascii", Joined),
    ActionDef::new("AsciiField", Bare),
    ActionDef::new("Attn", Bare),
    ActionDef::new("BackSpace", Bare),
    ActionDef::new("BackTab", Bare),
    ActionDef::new("CircumNot", Bare),
    ActionDef::new("Clear", Bare),
    ActionDef::new("CloseScript", Joined),
    ActionDef::new("Cols", Form::StatusField(COLS_FIELD)),
    ActionDef::new("Connect", Joined),
    ActionDef::new("CursorSelect", Bare),
    ActionDef::new("Delete", Bare),
    ActionDef::new("DeleteField", Bare),
    ActionDef::new("DeleteWord", Bare),
    ActionDef::new("Disconnect", Bare),
    ActionDef::new("Down", Bare),
    ActionDef::new("Dup", Bare),
    ActionDef::new("Ebcdic", Joined),
    ActionDef::new("EbcdicField", Bare),
    ActionDef::new("Enter", Bare),
    ActionDef::new("Erase", Bare),
    ActionDef::new("EraseEOF", Bare),
    ActionDef::new("EraseInput", Bare),
    ActionDef::new("Execute", Quoted),
    ActionDef::new("FieldEnd", Bare),
    ActionDef::new("FieldExit", Bare),
    ActionDef::new("FieldMark", Bare),
    ActionDef::new("Flip", Bare),
    ActionDef::new("HexString", Joined),
    ActionDef::new("Home", Bare),
    ActionDef::new("Info", Quoted),
    ActionDef::new("Insert", Bare),
    ActionDef::new("Interrupt", Bare),
    ActionDef::new("Key", Joined),
    ActionDef::new("Keymap", Joined),
    ActionDef::new("Left", Bare),
    ActionDef::new("Left2", Bare),
    ActionDef::new("Macro", Joined),
    ActionDef::new("MonoCase", Bare),
    ActionDef::new("MoveCursor", Joined),
    ActionDef::new("Newline", Bare),
    ActionDef::new("NextWord", Bare),
    ActionDef::new("PA", Joined),
    ActionDef::new("PF", Joined),
    ActionDef::new("PreviousWord", Bare),
    ActionDef::new("Quit", Form::Quit),
    ActionDef::new("Reset", Bare),
    ActionDef::new("Right", Bare),
    ActionDef::new("Right2", Bare),
    ActionDef::new("Rows", Form::StatusField(ROWS_FIELD)),
    ActionDef::new("Snap", Joined),
    ActionDef::new("Status", Form::Status),
    ActionDef::new("String", Quoted),
    ActionDef::new("SysReq", Bare),
    ActionDef::new("Tab", Bare),
    ActionDef::new("TemporaryKeymap", Joined),
    ActionDef::new("Toggle", Joined),
    ActionDef::new("ToggleInsert", Bare),
    ActionDef::new("ToggleReverse", Bare),
    ActionDef::new("Transfer", Joined),
    ActionDef::new("Up", Bare),
    ActionDef::new("Wait", Joined),
];

/// Find an action by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<&'static ActionDef> {
    ACTIONS.iter().find(|def| def.name.eq_ignore_ascii_case(name))
}
