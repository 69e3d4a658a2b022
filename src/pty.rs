use crate::companion::ProgramChoice;
use anyhow::{Context, Result};
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};

/// Wraps the program so it ignores SIGHUP; the disposition survives `exec`.
const NO_HANGUP_SCRIPT: &str = "trap '' HUP; exec \"$@\"";

/// Manages a companion running inside a PTY
pub struct PtySession {
    #[allow(dead_code)]
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
}

impl PtySession {
    /// Spawn the chosen program in a PTY with echo and line editing off,
    /// returning the session, its stdin writer and its output reader
    pub fn spawn(
        choice: &ProgramChoice,
        no_hangup: bool,
    ) -> Result<(Self, Box<dyn Write + Send>, Box<dyn Read + Send>)> {
        let pty_system = portable_pty::native_pty_system();

        let pty_size = PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system
            .openpty(pty_size)
            .context("Failed to open PTY")?;

        #[cfg(unix)]
        raw_input(&*pair.master).context("Failed to configure PTY line discipline")?;

        let cmd = build_command(choice, no_hangup);

        let child = pair
            .slave
            .spawn_command(cmd)
            .context("Failed to spawn command")?;

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let session = PtySession {
            master: pair.master,
            child,
        };

        Ok((session, writer, reader))
    }

    /// OS process id of the companion
    pub fn pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Check if the child process is still running
    pub fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Wait for the child process to exit
    pub fn wait(&mut self) -> Result<()> {
        self.child.wait()?;
        Ok(())
    }

    /// Terminate the child process
    pub fn kill(&mut self) -> Result<()> {
        self.child.kill()?;
        Ok(())
    }
}

fn build_command(choice: &ProgramChoice, no_hangup: bool) -> CommandBuilder {
    if no_hangup {
        let mut cmd = CommandBuilder::new("sh");
        cmd.args(["-c", NO_HANGUP_SCRIPT, "sh"]);
        cmd.arg(&choice.program);
        cmd.args(&choice.args);
        cmd
    } else {
        let mut cmd = CommandBuilder::new(&choice.program);
        cmd.args(&choice.args);
        cmd
    }
}

/// Clear ECHO so commands are not reflected back into responses, and ICANON
/// so the line discipline does not cap a command at MAX_CANON bytes.
#[cfg(unix)]
fn raw_input(master: &(dyn MasterPty + Send)) -> Result<()> {
    use nix::sys::termios::{LocalFlags, SetArg, SpecialCharacterIndices, tcgetattr, tcsetattr};

    let Some(fd) = master.as_raw_fd() else {
        return Ok(());
    };
    let mut termios = tcgetattr(fd)?;
    termios.local_flags.remove(LocalFlags::ECHO | LocalFlags::ICANON);
    termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
    tcsetattr(fd, SetArg::TCSANOW, &termios)?;
    Ok(())
}
