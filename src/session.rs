//! [`Session`]: one logical connection to a companion process.

use crate::actions::{self, ActionDef, Form};
use crate::companion::{self, ProgramChoice};
use crate::engine::Engine;
use crate::error::Error;
use crate::pty::PtySession;
use crate::pty_reader::{TranscriptHandler, spawn_reader};
use crate::response::Reply;
use crate::status::{self, StatusLine};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

/// What to launch and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Keep the companion alive when the controlling terminal hangs up.
    pub no_hangup: bool,
    /// Program to run; chosen automatically when absent.
    pub program: Option<String>,
    /// Options passed to the program.
    pub options: Vec<String>,
}

impl StartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_hangup(mut self, no_hangup: bool) -> Self {
        self.no_hangup = no_hangup;
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Resolve the program to launch given whether the child marker is set.
    pub fn resolve(&self, child_marker_present: bool) -> ProgramChoice {
        let tokens: Vec<String> = self
            .program
            .iter()
            .cloned()
            .chain(self.options.iter().cloned())
            .collect();
        companion::select_companion(child_marker_present, &tokens)
    }
}

/// A connection to one companion process.
///
/// A session starts out idle. [`start`](Self::start) spawns the companion;
/// the session stays alive until the companion's output ends or
/// [`quit`](Self::quit) is called. Starting an alive session is an error,
/// and every command on a session that is not alive fails with
/// [`Error::NotStarted`] without touching any process.
pub struct Session {
    engine: Option<Engine>,
    verbose: Arc<AtomicBool>,
    transcript: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            engine: None,
            verbose: Arc::new(AtomicBool::new(false)),
            transcript: Arc::new(Mutex::new(Box::new(io::stderr()))),
        }
    }

    /// Spawn the companion, returning its process id when the platform has one.
    pub fn start(&mut self, options: &StartOptions) -> Result<Option<u32>, Error> {
        if self.is_alive() {
            return Err(Error::AlreadyStarted);
        }

        let choice = options.resolve(companion::child_marker_present());
        let (pty, writer, reader) =
            PtySession::spawn(&choice, options.no_hangup).map_err(|source| Error::Spawn {
                program: choice.program.clone(),
                source: source.into(),
            })?;
        let pid = pty.pid();
        tracing::info!(
            program = %choice.program,
            args = ?choice.args,
            mode = ?choice.mode,
            ?pid,
            "started companion"
        );

        let output_rx = spawn_reader(reader, self.transcript());
        self.engine = Some(Engine::new(Some(pty), writer, output_rx));
        Ok(pid)
    }

    /// Drive a companion whose output and input are already connected.
    pub fn attach<R, W>(&mut self, reader: R, writer: W) -> Result<(), Error>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        if self.is_alive() {
            return Err(Error::AlreadyStarted);
        }
        let output_rx = spawn_reader(reader, self.transcript());
        self.engine = Some(Engine::new(None, Box::new(writer), output_rx));
        Ok(())
    }

    fn transcript(&self) -> TranscriptHandler {
        let verbose = self.verbose.clone();
        let sink = self.transcript.clone();
        Arc::new(move |data: &[u8]| {
            if !verbose.load(Ordering::Relaxed) {
                return;
            }
            if let Ok(mut sink) = sink.lock() {
                let _ = sink.write_all(data);
                let _ = sink.flush();
            }
        })
    }

    /// Send the verbose transcript to `sink` instead of stderr. Takes effect
    /// immediately, including for a companion that is already running.
    pub fn set_transcript<W: Write + Send + 'static>(&self, sink: W) {
        if let Ok(mut current) = self.transcript.lock() {
            *current = Box::new(sink);
        }
    }

    /// Echo the companion's raw output to the transcript sink (stderr by
    /// default) while `level` is non-zero.
    pub fn set_verbose(&self, level: u8) {
        self.verbose.store(level > 0, Ordering::Relaxed);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    pub fn is_alive(&self) -> bool {
        self.engine.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.engine.as_ref().and_then(Engine::pid)
    }

    fn engine(&mut self) -> Result<&mut Engine, Error> {
        self.engine.as_mut().ok_or(Error::NotStarted)
    }

    /// Drop the engine after a transport failure so later calls fail fast.
    fn check<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::warn!(error = %err, "companion lost");
                if let Some(mut engine) = self.engine.take() {
                    engine.shutdown();
                }
            }
        }
        result
    }

    /// Send one command line and decode the response.
    pub async fn execute(&mut self, command: &str) -> Result<Reply, Error> {
        let result = self.engine()?.execute(command).await;
        self.check(result)
    }

    /// Query the status line: the response payload with the terminator removed.
    pub async fn status(&mut self) -> Result<String, Error> {
        let result = self.engine()?.status().await;
        self.check(result)
    }

    /// Query and decode the status line.
    pub async fn status_line(&mut self) -> Result<StatusLine, Error> {
        let payload = self.status().await?;
        StatusLine::parse(payload.lines().last().unwrap_or_default())
    }

    /// Field `index` of the status line.
    pub async fn status_field(&mut self, index: usize) -> Result<String, Error> {
        let payload = self.status().await?;
        let line = payload.lines().last().unwrap_or_default();
        status::field(line, index).map(str::to_string)
    }

    pub async fn rows(&mut self) -> Result<String, Error> {
        self.status_field(status::ROWS_FIELD).await
    }

    pub async fn cols(&mut self) -> Result<String, Error> {
        self.status_field(status::COLS_FIELD).await
    }

    /// Send `Quit` and wait for the companion to exit.
    ///
    /// The companion normally closes its output instead of answering, so end
    /// of stream counts as success here.
    pub async fn quit(&mut self) -> Result<Reply, Error> {
        let mut engine = self.engine.take().ok_or(Error::NotStarted)?;
        let reply = match engine.execute("Quit").await {
            Ok(reply) => reply,
            Err(Error::ProcessDied) => Reply::Empty,
            Err(Error::Protocol(message)) => {
                self.engine = Some(engine);
                return Err(Error::Protocol(message));
            }
            Err(err) => {
                engine.shutdown();
                return Err(err);
            }
        };
        engine.wait_for_exit().await;
        tracing::info!("companion quit");
        Ok(reply)
    }

    /// Run `def` with `args`.
    pub async fn run(&mut self, def: &ActionDef, args: &[String]) -> Result<Reply, Error> {
        match def.form {
            Form::Status => self.status().await.map(Reply::Scalar),
            Form::StatusField(index) => self.status_field(index).await.map(Reply::Scalar),
            Form::Quit => self.quit().await,
            Form::Bare | Form::Joined | Form::Quoted => self.execute(&def.command(args)).await,
        }
    }

    /// Run the action called `name`, or send `name` verbatim if it is not a
    /// known action.
    pub async fn action(&mut self, name: &str, args: &[String]) -> Result<Reply, Error> {
        match actions::lookup(name) {
            Some(def) => self.run(def, args).await,
            None if args.is_empty() => self.execute(name).await,
            None => {
                let command = format!("{name}({})", crate::encode::join(args));
                self.execute(&command).await
            }
        }
    }
}
