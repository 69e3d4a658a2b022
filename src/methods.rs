//! Typed methods on [`Session`], one per companion action.
//!
//! Each method formats its command line through the action registry, so the
//! command text is identical to what a script line of the same action sends.

use crate::error::Error;
use crate::response::Reply;
use crate::session::Session;

macro_rules! bare_actions {
    ($($(#[$doc:meta])* $method:ident => $name:literal,)*) => {
        impl Session {
            $(
                $(#[$doc])*
                pub async fn $method(&mut self) -> Result<Reply, Error> {
                    self.action($name, &[]).await
                }
            )*
        }
    };
}

macro_rules! joined_actions {
    ($($(#[$doc:meta])* $method:ident => $name:literal,)*) => {
        impl Session {
            $(
                $(#[$doc])*
                pub async fn $method<S: ToString>(&mut self, args: &[S]) -> Result<Reply, Error> {
                    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                    self.action($name, &args).await
                }
            )*
        }
    };
}

macro_rules! quoted_actions {
    ($($(#[$doc:meta])* $method:ident => $name:literal,)*) => {
        impl Session {
            $(
                $(#[$doc])*
                pub async fn $method(&mut self, text: &str) -> Result<Reply, Error> {
                    self.action($name, &[text.to_string()]).await
                }
            )*
        }
    };
}

bare_actions! {
    /// Field contents at the cursor, as text.
    ascii_field => "AsciiField",
    attn => "Attn",
    backspace => "BackSpace",
    backtab => "BackTab",
    circum_not => "CircumNot",
    clear => "Clear",
    cursor_select => "CursorSelect",
    delete => "Delete",
    delete_field => "DeleteField",
    delete_word => "DeleteWord",
    disconnect => "Disconnect",
    down => "Down",
    dup => "Dup",
    ebcdic_field => "EbcdicField",
    enter => "Enter",
    erase => "Erase",
    erase_eof => "EraseEOF",
    erase_input => "EraseInput",
    field_end => "FieldEnd",
    field_exit => "FieldExit",
    field_mark => "FieldMark",
    flip => "Flip",
    home => "Home",
    insert => "Insert",
    interrupt => "Interrupt",
    left => "Left",
    left2 => "Left2",
    monocase => "MonoCase",
    newline => "Newline",
    next_word => "NextWord",
    previous_word => "PreviousWord",
    reset => "Reset",
    right => "Right",
    right2 => "Right2",
    sys_req => "SysReq",
    tab => "Tab",
    toggle_insert => "ToggleInsert",
    toggle_reverse => "ToggleReverse",
    up => "Up",
}

joined_actions! {
    /// Screen text: none, `[length]`, `[row, col, length]`,
    /// `[row, col, rows, cols]`.
    ascii => "Ascii",
    close_script => "CloseScript",
    connect_with => "Connect",
    /// Screen contents as EBCDIC hex, with the same arguments as `ascii`.
    ebcdic => "Ebcdic",
    hex_string => "HexString",
    key => "Key",
    keymap => "Keymap",
    run_macro => "Macro",
    /// Move the cursor to a zero-based `[row, col]`.
    move_cursor => "MoveCursor",
    snap => "Snap",
    temporary_keymap => "TemporaryKeymap",
    toggle => "Toggle",
    /// File transfer; arguments are `keyword=value` pairs.
    transfer => "Transfer",
    /// Block until a condition such as `InputField` or `Output` holds.
    wait => "Wait",
}

quoted_actions! {
    /// Type `text` at the cursor.
    string => "String",
    /// Show `text` in the emulator's informational area.
    info => "Info",
    execute_shell => "Execute",
}

impl Session {
    /// Connect to `host` (`[lu@]host[:port]`).
    pub async fn connect(&mut self, host: &str) -> Result<Reply, Error> {
        self.action("Connect", &[host.to_string()]).await
    }

    /// Program attention key `n`.
    pub async fn pa(&mut self, n: u8) -> Result<Reply, Error> {
        self.action("PA", &[n.to_string()]).await
    }

    /// Program function key `n`.
    pub async fn pf(&mut self, n: u8) -> Result<Reply, Error> {
        self.action("PF", &[n.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::{ACTIONS, Form};
    use crate::response::Reply;
    use crate::session::Session;
    use crate::testing::SharedWriter;
    use std::io::Cursor;

    fn scripted(responses: &str) -> (Session, SharedWriter) {
        let writer = SharedWriter::default();
        let mut session = Session::new();
        session
            .attach(Cursor::new(responses.as_bytes().to_vec()), writer.clone())
            .unwrap();
        (session, writer)
    }

    #[tokio::test]
    async fn test_typed_methods_format_commands() {
        let (mut session, writer) = scripted(&"ok\n".repeat(7));
        session.connect("bigblue:23").await.unwrap();
        session.string("logon user").await.unwrap();
        session.enter().await.unwrap();
        session.pf(3).await.unwrap();
        session.move_cursor(&[5, 10]).await.unwrap();
        session.ascii::<&str>(&[]).await.unwrap();
        session.erase_eof().await.unwrap();
        assert_eq!(
            writer.contents(),
            "Connect(bigblue:23)\nString(\"logon\\ user\")\nEnter\nPF(3)\nMoveCursor(5,10)\nAscii()\nEraseEOF\n"
        );
    }

    #[tokio::test]
    async fn test_ascii_returns_rows() {
        let (mut session, _) = scripted("data: line one\ndata: line two\nU F U C(h) I 2 24 80 0 0 0x0 -\nok\n");
        let reply = session.ascii(&[0, 0, 2, 80]).await.unwrap();
        assert_eq!(reply, Reply::List(vec!["line one".into(), "line two".into()]));
    }

    #[test]
    fn test_registry_has_every_form() {
        assert!(ACTIONS.iter().any(|d| d.form == Form::Bare));
        assert!(ACTIONS.iter().any(|d| d.form == Form::Joined));
        assert!(ACTIONS.iter().any(|d| d.form == Form::Quoted));
        assert!(ACTIONS.len() >= 60);
    }
}
