//! # x3270-script
//!
//! A command/response driver for the x3270 scripting protocol.
//!
//! The crate spawns a companion emulator (`s3270`, or `x3270if -i` when
//! running as a child script of a live x3270 session), writes one action per
//! line to its input and decodes the reply that follows:
//!
//! ```text
//! -> Ascii(0,0,2,8)
//! <- data: READY
//! <- data: LOGON
//! <- U F U C(bigblue) I 4 24 80 1 0 0x0 0.012
//! <- ok
//! ```
//!
//! The number of `data:` lines decides the shape of the [`Reply`]: none is
//! [`Reply::Empty`], one is [`Reply::Scalar`], more is [`Reply::List`]. An
//! `error` terminator becomes [`Error::Protocol`] and leaves the session
//! usable; output that ends before any terminator becomes
//! [`Error::ProcessDied`] and ends the session.
//!
//! ## Quick start
//!
//! ```no_run
//! use x3270_script::{Session, StartOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new();
//!     session.start(&StartOptions::new().option("-model").option("3279-2"))?;
//!
//!     session.connect("bigblue").await?;
//!     session.wait(&["InputField"]).await?;
//!     session.string("logon guest").await?;
//!     session.enter().await?;
//!
//!     let screen = session.ascii::<&str>(&[]).await?;
//!     println!("{screen}");
//!     println!("{} rows x {} cols", session.rows().await?, session.cols().await?);
//!
//!     session.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing the companion
//!
//! With no program, or when the first token is an option, the companion is
//! picked automatically: `x3270if -i` if `X3270INPUT` is set in the
//! environment, otherwise `s3270` with the given options. See
//! [`companion::select_companion`].
//!
//! ## Scripts
//!
//! [`parse_str`] and [`parse_file`] read one action per line
//! (`string "hello"`, `pf 3`, `ascii 0 0 80`) into [`Step`]s that run against
//! a session. The `x3270-script` binary is a thin runner around them.
//!
//! ## Timeouts
//!
//! Calls wait as long as the companion takes. Wrap a call in
//! `tokio::time::timeout` to bound it.

pub mod actions;
pub mod companion;
pub mod encode;
pub(crate) mod engine;
pub mod error;
mod methods;
pub mod parser;
pub(crate) mod pty;
pub(crate) mod pty_reader;
pub mod response;
pub mod session;
pub mod status;

#[cfg(test)]
mod testing;

pub use actions::{ACTIONS, ActionDef, Form};
pub use error::{Error, ErrorKind};
pub use parser::{Step, parse_file, parse_str};
pub use response::{Reply, Response};
pub use session::{Session, StartOptions};
pub use status::StatusLine;
