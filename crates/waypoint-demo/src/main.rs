#![forbid(unsafe_code)]

//! Drives a Waypoint router through a scripted navigation session and prints
//! every reconciliation.
//!
//! ```text
//! waypoint-demo -c "push inbox" -c "push thread" -c back -c show
//! waypoint-demo session.txt --transition fade --reduced-motion
//! ```

mod error;
mod script;
mod session;
mod surface;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use waypoint_core::{RouterConfig, TransitionConfig, TransitionKind};

use crate::error::DemoError;
use crate::script::parse_script;
use crate::session::{Flow, Session};

/// Scripted navigation walkthrough.
#[derive(Parser, Debug)]
#[command(name = "waypoint-demo")]
#[command(about = "Replay a navigation script against a Waypoint router")]
#[command(version)]
struct Args {
    /// Script file, one command per line (reads stdin when omitted and no
    /// `--command` is given)
    #[arg(value_name = "PATH")]
    script: Option<PathBuf>,

    /// Inline command; may be repeated
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Initial screens, bottom to top
    #[arg(short, long = "initial", value_name = "ROUTE", default_values_t = [String::from("home")])]
    initial: Vec<String>,

    /// Name of the window attached on start
    #[arg(short, long, default_value = "main")]
    window: String,

    /// Do not attach a window on start
    #[arg(long)]
    start_detached: bool,

    /// Transition handed to the patcher
    #[arg(short, long, value_enum, default_value_t = TransitionArg::Slide)]
    transition: TransitionArg,

    /// Transition duration in milliseconds
    #[arg(long, value_name = "MS")]
    duration_ms: Option<u64>,

    /// Force reduced motion (otherwise read from WAYPOINT_REDUCED_MOTION)
    #[arg(long)]
    reduced_motion: bool,

    /// Debug-level router logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransitionArg {
    None,
    Fade,
    Slide,
    Scale,
}

impl From<TransitionArg> for TransitionKind {
    fn from(arg: TransitionArg) -> Self {
        match arg {
            TransitionArg::None => Self::None,
            TransitionArg::Fade => Self::Fade,
            TransitionArg::Slide => Self::Slide,
            TransitionArg::Scale => Self::Scale,
        }
    }
}

impl Args {
    fn transition(&self) -> TransitionConfig {
        self.transition_over(TransitionConfig::from_env())
    }

    /// Apply the command-line overrides on top of `base`.
    fn transition_over(&self, base: TransitionConfig) -> TransitionConfig {
        let mut transition = base;
        transition.kind = self.transition.into();
        if let Some(ms) = self.duration_ms {
            transition = transition.with_duration(std::time::Duration::from_millis(ms));
        }
        if self.reduced_motion {
            transition = transition.with_reduced_motion(true);
        }
        transition
    }

    /// Inline commands win over a script file; stdin is the fallback.
    fn script_source(&self) -> ScriptSource<'_> {
        if !self.commands.is_empty() {
            return ScriptSource::Inline(self.commands.join("\n"));
        }
        match &self.script {
            Some(path) => ScriptSource::File(path.as_path()),
            None => ScriptSource::Stdin,
        }
    }

    fn script_text(&self) -> Result<String, DemoError> {
        match self.script_source() {
            ScriptSource::Inline(text) => Ok(text),
            ScriptSource::File(path) => Ok(std::fs::read_to_string(path)?),
            ScriptSource::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ScriptSource<'a> {
    Inline(String),
    File(&'a Path),
    Stdin,
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("waypoint_core=debug,waypoint_demo=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), DemoError> {
    let commands = parse_script(args.script_text()?.lines())?;
    let config = RouterConfig::new()
        .with_initial_routes(args.initial.iter().cloned())
        .with_transition(args.transition());

    let mut session = Session::new(config, args.window.clone());
    if !args.start_detached {
        session.start()?;
    }
    print_lines(session.take_output());

    for command in &commands {
        let flow = session.apply(command)?;
        print_lines(session.take_output());
        match flow {
            Flow::Continue => {}
            Flow::Finished => break,
        }
    }

    info!(cards = session.cards_built(), "session finished");
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "demo session failed");
            eprintln!("waypoint-demo: {err}");
            ExitCode::FAILURE
        }
    }
}
