use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use tracing_subscriber::EnvFilter;
use x3270_script::{Session, StartOptions, Step, parse_file, parse_str};

#[derive(Parser, Debug)]
#[command(
    name = "x3270-script",
    about = "Run an action script against an x3270 scripting companion",
    version
)]
struct Args {
    /// Path to the script file; read from stdin when omitted
    #[arg(short, long)]
    script: Option<String>,

    /// Keep the companion running if the terminal hangs up
    #[arg(long)]
    nohup: bool,

    /// Echo companion output to stderr; repeat for debug logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Companion program; chosen from the environment when omitted
    #[arg(short, long, env = "X3270_SCRIPT_PROGRAM")]
    program: Option<String>,

    /// Options passed to the companion
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    options: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let steps = match &args.script {
        Some(path) => parse_file(path)
            .with_context(|| format!("Failed to parse script file: {}", path))?,
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read script from stdin")?;
            parse_str(&content).context("Failed to parse script from stdin")?
        }
    };

    let options = StartOptions {
        no_hangup: args.nohup,
        program: args.program.clone(),
        options: args.options.clone(),
    };

    let mut session = Session::new();
    session.set_verbose(args.verbose);
    session.start(&options).context("Failed to start companion")?;

    let outcome = run_steps(&mut session, &steps).await;

    if session.is_alive() {
        if let Err(err) = session.quit().await {
            tracing::warn!(error = %err, "quit failed");
        }
    }

    outcome
}

async fn run_steps(session: &mut Session, steps: &[Step]) -> Result<()> {
    for step in steps {
        let reply = step
            .run(session)
            .await
            .with_context(|| format!("line {}: {} failed", step.line, step.command()))?;
        if !reply.is_empty() {
            println!("{reply}");
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 1 { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
