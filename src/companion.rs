//! Choosing which companion program to launch.

/// Environment variable set when running as a child script of a live host session.
pub const CHILD_MARKER_ENV: &str = "X3270INPUT";

/// Companion used when a host session is already running.
pub const CHILD_OF_HOST_PROGRAM: &str = "x3270if";
/// Companion used otherwise: a headless emulator.
pub const HEADLESS_PROGRAM: &str = "s3270";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionMode {
    /// `x3270if -i`, attached to the session that launched this script.
    ChildOfHost,
    /// A fresh `s3270` emulator.
    HeadlessPeer,
    /// A program named by the caller.
    Explicit,
}

/// The resolved program and argument list to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramChoice {
    pub mode: CompanionMode,
    pub program: String,
    pub args: Vec<String>,
}

/// Pick the companion from the caller's tokens (program followed by options).
///
/// An empty token list, or one whose first token is an option (`-...`),
/// selects a companion automatically. Emulator options are forwarded to the
/// headless peer; `x3270if -i` takes none.
pub fn select_companion(child_marker_present: bool, tokens: &[String]) -> ProgramChoice {
    match tokens.split_first() {
        Some((program, args)) if !program.starts_with('-') => ProgramChoice {
            mode: CompanionMode::Explicit,
            program: program.clone(),
            args: args.to_vec(),
        },
        _ if child_marker_present => ProgramChoice {
            mode: CompanionMode::ChildOfHost,
            program: CHILD_OF_HOST_PROGRAM.to_string(),
            args: vec!["-i".to_string()],
        },
        _ => ProgramChoice {
            mode: CompanionMode::HeadlessPeer,
            program: HEADLESS_PROGRAM.to_string(),
            args: tokens.to_vec(),
        },
    }
}

/// Whether the child marker is set in this process's environment.
pub fn child_marker_present() -> bool {
    std::env::var_os(CHILD_MARKER_ENV).is_some()
}
