use clap::{Parser, Subcommand, ValueEnum};
use kubb_practice::{
    config::{ConfigStore, FileConfigStore},
    history::{export_csv, summarize},
    modes::PitchPhase,
    store::{SessionStore, SqliteSessionStore},
    watch::{serialize, NoopTransport},
    PracticeController, PracticeSession, RecordOutcome, SessionType, ThrowInput,
};
use std::{
    error::Error,
    fs::File,
    io::{self, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

type Controller = PracticeController<SqliteSessionStore, NoopTransport>;

/// kubb practice sessions from the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Record kubb practice throws for 8 Meter, Around the Pitch and Inkast Blast drills, track rounds and targets, and export your history."
)]
pub struct Cli {
    /// session database to use instead of the default location
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// start a new practice session
    Start {
        #[clap(short, long, value_enum, default_value_t = Mode::Standard)]
        mode: Mode,

        /// batons to throw (8 Meter) or kubbs to knock down (Inkast Blast)
        #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..=10_000))]
        target: Option<u32>,

        /// throw budget (Around the Pitch) or field kubbs per round (Inkast Blast)
        #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..=1_000))]
        budget: Option<u32>,
    },
    /// record one throw
    Throw {
        #[clap(value_enum)]
        outcome: Outcome,

        /// kubbs knocked down by this baton (Inkast Blast)
        #[clap(short, long)]
        kubbs: Option<u32>,
    },
    /// close the current round and open the next
    NextRound,
    /// clear the current round (Around the Pitch: restart the pitch)
    ResetRound,
    Pause,
    Resume,
    /// finish the session once its target is reached
    Complete,
    /// discard the active session
    Abandon,
    /// show the active session
    Status {
        /// print the watch display state as JSON
        #[clap(long)]
        json: bool,
    },
    /// list past sessions
    History,
    /// write all sessions to a CSV file
    Export { path: PathBuf },
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Mode {
    Standard,
    AroundThePitch,
    InkastBlast,
}

impl From<Mode> for SessionType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Standard => SessionType::Standard,
            Mode::AroundThePitch => SessionType::AroundThePitch,
            Mode::InkastBlast => SessionType::InkastBlast,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Outcome {
    Hit,
    Miss,
}

impl Outcome {
    fn to_input(self, kubbs: Option<u32>) -> ThrowInput {
        match (kubbs, self) {
            (Some(count), _) => ThrowInput::kubbs(count),
            (None, Outcome::Hit) => ThrowInput::hit(),
            (None, Outcome::Miss) => ThrowInput::miss(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli, &mut io::stdout())
}

fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), Box<dyn Error>> {
    let config = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default()
        .load();
    let store = match &cli.db {
        Some(path) => SqliteSessionStore::open(path)?,
        None => SqliteSessionStore::open_default()?,
    };
    let mut controller = Controller::new(store, NoopTransport).with_watch_sync(config.watch_sync);
    controller.resume()?;

    match cli.command {
        Command::Start {
            mode,
            target,
            budget,
        } => {
            let session_type = SessionType::from(mode);
            let (default_target, default_score) = config.targets_for(session_type);
            let target = match session_type {
                SessionType::AroundThePitch => default_target,
                _ => target.unwrap_or(default_target),
            };
            let score = budget.or(default_score);
            let session = controller.start_session(session_type, target, score)?;
            writeln!(out, "Started {} ({})", session.session_type.title(), session.id)?;
            print_status(out, session)?;
        }
        Command::Throw { outcome, kubbs } => {
            match controller.record_throw(outcome.to_input(kubbs))? {
                Some(recorded) => print_outcome(out, &recorded)?,
                None => writeln!(out, "Throw not recorded: session is not accepting throws")?,
            }
        }
        Command::NextRound => report(out, controller.start_next_round()?, "Next round started")?,
        Command::ResetRound => report(out, controller.reset_current_round()?, "Round reset")?,
        Command::Pause => report(out, controller.pause_session()?, "Session paused")?,
        Command::Resume => report(out, controller.resume_session()?, "Session resumed")?,
        Command::Complete => {
            if controller.complete_session()? {
                writeln!(out, "Session complete")?;
            } else {
                writeln!(out, "Target not reached yet")?;
            }
        }
        Command::Abandon => {
            controller.abandon_session()?;
            writeln!(out, "Session abandoned")?;
        }
        Command::Status { json } => match controller.session() {
            Some(session) if json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&serialize(session))?)?
            }
            Some(session) => print_status(out, session)?,
            None => writeln!(out, "No active session")?,
        },
        Command::History => print_history(out, &controller)?,
        Command::Export { path } => {
            let sessions = controller.store().get_all_sessions()?;
            export_csv(&sessions, File::create(&path)?)?;
            writeln!(out, "Exported {} sessions to {}", sessions.len(), path.display())?;
        }
    }

    Ok(())
}

fn report<W: Write>(out: &mut W, changed: bool, message: &str) -> io::Result<()> {
    if changed {
        writeln!(out, "{message}")
    } else {
        writeln!(out, "Nothing to do")
    }
}

fn print_outcome<W: Write>(out: &mut W, outcome: &RecordOutcome) -> io::Result<()> {
    let result = if outcome.record.is_hit { "hit" } else { "miss" };
    let mut line = format!(
        "Round {}: {} ({})",
        outcome.round_number, result, outcome.record.throw_type
    );
    if let Some(baseline) = outcome.record.baseline_number {
        line.push_str(&format!(" on baseline {baseline}"));
    }
    if let Some(kubbs) = outcome.record.kubbs_hit {
        line.push_str(&format!(", {kubbs} kubbs down"));
    }
    writeln!(out, "{line}")?;
    if outcome.round_completed {
        writeln!(out, "Round {} complete", outcome.round_number)?;
    }
    if outcome.baseline_clear && outcome.round_completed {
        writeln!(out, "Baseline clear!")?;
    }
    if outcome.target_reached {
        writeln!(out, "Target reached, run `complete` to finish")?;
    }
    Ok(())
}

fn print_status<W: Write>(out: &mut W, session: &PracticeSession) -> io::Result<()> {
    let state = if session.is_complete {
        "complete"
    } else if session.is_paused {
        "paused"
    } else {
        "active"
    };
    writeln!(out, "{} [{}]", session.session_type.title(), state)?;
    for item in serialize(session).context_items {
        writeln!(out, "  {:<10} {}", item.label, item.value)?;
    }

    if let Some(board) = session.pitch_board() {
        for baseline in 1..=2u8 {
            let row: String = board.kubbs[usize::from(baseline - 1)]
                .iter()
                .map(|down| if *down { 'x' } else { 'o' })
                .collect();
            writeln!(out, "  baseline {baseline} {row}")?;
        }
        let king = match board.phase() {
            PitchPhase::Cleared => "down",
            PitchPhase::ThrowingKing => "in play",
            PitchPhase::ThrowingBaseline(_) => "standing",
        };
        writeln!(out, "  king       {king}")?;
    }
    Ok(())
}

fn print_history<W: Write>(out: &mut W, controller: &Controller) -> Result<(), Box<dyn Error>> {
    let sessions = controller.store().get_all_sessions()?;
    if sessions.is_empty() {
        writeln!(out, "No sessions yet")?;
        return Ok(());
    }
    for summary in summarize(&sessions) {
        writeln!(
            out,
            "{}  {:<16} {:>3} batons {:>3.0}% {}",
            summary.started.format("%Y-%m-%d %H:%M"),
            summary.session_type.title(),
            summary.batons,
            summary.accuracy,
            if summary.complete { "done" } else { "open" }
        )?;
    }
    Ok(())
}
