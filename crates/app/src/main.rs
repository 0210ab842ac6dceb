use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use exam_core::model::{ExamSession, SessionCommand, TimeBand};
use services::sessions::band_label;
use services::{AppServices, Clock, ExamConfig, ExamFlowError, ResultView};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDuration { raw: String },
    InvalidAutosave { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDuration { raw } => {
                write!(f, "invalid --duration-minutes value: {raw}")
            }
            ArgsError::InvalidAutosave { raw } => {
                write!(f, "invalid --autosave-secs value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Exam,
    Result,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "exam" => Some(Self::Exam),
            "result" => Some(Self::Result),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: Option<String>,
    config: ExamConfig,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EXAM_DB_URL")
            .ok()
            .map(normalize_sqlite_url);
        let mut duration_minutes = std::env::var("EXAM_DURATION_MINUTES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(ExamConfig::DEFAULT_DURATION_MINUTES);
        let mut autosave_secs = ExamConfig::DEFAULT_AUTOSAVE_SECS;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--duration-minutes" => {
                    let value = require_value(args, "--duration-minutes")?;
                    duration_minutes = value
                        .parse()
                        .ok()
                        .filter(|minutes| *minutes > 0)
                        .ok_or(ArgsError::InvalidDuration { raw: value })?;
                }
                "--autosave-secs" => {
                    let value = require_value(args, "--autosave-secs")?;
                    autosave_secs = value
                        .parse()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or(ArgsError::InvalidAutosave { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let config = ExamConfig::new(duration_minutes, autosave_secs).map_err(|_| {
            ArgsError::InvalidDuration {
                raw: duration_minutes.to_string(),
            }
        })?;
        Ok(Self { db_url, config })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- exam   [--db <sqlite_url>] [--duration-minutes <m>] [--autosave-secs <s>]");
    eprintln!("  cargo run -p app -- result [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  in-memory storage unless --db is given");
    eprintln!("  --duration-minutes {}", ExamConfig::DEFAULT_DURATION_MINUTES);
    eprintln!("  --autosave-secs {}", ExamConfig::DEFAULT_AUTOSAVE_SECS);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DB_URL, EXAM_DURATION_MINUTES");
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: sit the exam when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Exam,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Exam,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup, keeping this in the binary glue so
    // core/services stay backend-agnostic.
    let services = match parsed.db_url.as_deref() {
        Some(db_url) => {
            prepare_sqlite_file(db_url)?;
            AppServices::new_sqlite(db_url, Clock::default_clock(), parsed.config).await?
        }
        None => AppServices::new_in_memory(Clock::default_clock(), parsed.config),
    };

    match cmd {
        Command::Exam => run_exam(&services).await,
        Command::Result => show_result(&services).await,
        Command::Reset => {
            services.exam_flow().reset().await?;
            println!("session cleared; the next `exam` run starts fresh");
            Ok(())
        }
    }
}

enum LineOutcome {
    Redraw,
    Submit,
    Quit,
    Noop,
}

fn print_commands() {
    println!("Commands: answer <1-based choice> | mark | next | prev | goto <n> | status | submit | quit");
}

fn render_question(session: &ExamSession) {
    let question = session.current_question();
    let state = session.current_state();
    let marked = if state.marked { "  [marked]" } else { "" };
    println!();
    println!(
        "Question {}/{}{marked}",
        session.current_index() + 1,
        session.total()
    );
    println!("{}", question.desc());
    for (i, choice) in question.choices().iter().enumerate() {
        let selected = if state.answer == Some(i) { "*" } else { " " };
        println!("  {selected} {}) {choice}", question.choice_label(i));
    }
    println!("{} unanswered", session.unanswered_count());
}

fn handle_line(session: &mut ExamSession, line: &str) -> LineOutcome {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return LineOutcome::Noop;
    };

    let command = match word {
        "answer" | "a" => match parts.next().and_then(|v| v.parse::<usize>().ok()) {
            // answers are typed 1-based, matching the printed labels
            Some(n) if n > 0 => SessionCommand::SelectChoice(n - 1),
            _ => {
                eprintln!("usage: answer <1-based choice>");
                return LineOutcome::Noop;
            }
        },
        "mark" | "m" => SessionCommand::ToggleMark,
        "next" | "n" => SessionCommand::Next,
        "prev" | "p" => SessionCommand::Previous,
        "goto" | "g" => match parts.next().and_then(|v| v.parse::<usize>().ok()) {
            Some(n) if n > 0 => SessionCommand::JumpTo(n - 1),
            _ => {
                eprintln!("usage: goto <1-based question number>");
                return LineOutcome::Noop;
            }
        },
        "status" | "s" => return LineOutcome::Redraw,
        "submit" => return LineOutcome::Submit,
        "quit" | "q" => return LineOutcome::Quit,
        "help" | "h" | "?" => {
            print_commands();
            return LineOutcome::Noop;
        }
        other => {
            eprintln!("unknown command: {other} (try `help`)");
            return LineOutcome::Noop;
        }
    };

    if let Err(err) = session.apply(command) {
        eprintln!("{err}");
        return LineOutcome::Noop;
    }
    LineOutcome::Redraw
}

async fn run_exam(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let flow = services.exam_flow();
    let clock_service = services.clock_service();

    let mut attempt = match flow.start_or_resume().await {
        Ok(attempt) => attempt,
        Err(ExamFlowError::AlreadySubmitted) => {
            eprintln!("this exam was already submitted; showing the result");
            return show_result(services).await;
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(name) = flow.store().user_name().await? {
        println!("Good luck, {name}!");
    }
    let first_tick = clock_service.tick(&attempt.clock);
    println!("Time remaining: {}", first_tick.display);
    print_commands();
    render_question(&attempt.session);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut autosave =
        tokio::time::interval(Duration::from_secs(flow.config().autosave_secs()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_band = first_tick.band;

    let submitted = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let tick = clock_service.tick(&attempt.clock);
                if tick.expired {
                    println!();
                    println!("Time is up.");
                    break true;
                }
                // announce the countdown only when urgency changes
                if tick.band != last_band {
                    last_band = tick.band;
                    if tick.band != TimeBand::Nominal {
                        println!("Time remaining: {} ({})", tick.display, band_label(tick.band));
                    }
                }
            }
            _ = autosave.tick() => {
                flow.autosave(&attempt.session).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: park the attempt, the deadline keeps running
                    flow.autosave(&attempt.session).await?;
                    break false;
                };
                match handle_line(&mut attempt.session, line.trim()) {
                    LineOutcome::Redraw => {
                        let tick = clock_service.tick(&attempt.clock);
                        println!("Time remaining: {}", tick.display);
                        render_question(&attempt.session);
                    }
                    LineOutcome::Submit => break true,
                    LineOutcome::Quit => {
                        flow.autosave(&attempt.session).await?;
                        break false;
                    }
                    LineOutcome::Noop => {}
                }
            }
        }
    };

    if submitted {
        let report = flow.finalize(&mut attempt).await?;
        render_report(&ResultView::from_report(&report));
    } else {
        println!("progress saved; run `exam` again to resume");
    }
    Ok(())
}

async fn show_result(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let Some(report) = services.exam_flow().report().await? else {
        println!("no result yet; run `exam` first");
        return Ok(());
    };
    render_report(&ResultView::from_report(&report));
    Ok(())
}

fn render_report(view: &ResultView) {
    println!();
    match &view.student_name {
        Some(name) => println!("Result for {name}"),
        None => println!("Result"),
    }
    println!(
        "  {} / {} correct ({}%), {}",
        view.correct, view.total, view.percent, view.label
    );
    println!("  time taken: {}", view.time_taken);
    println!();
    for (i, detail) in view.details.iter().enumerate() {
        let verdict = if detail.is_correct { "ok" } else { "x " };
        let yours = detail
            .user_answer
            .map_or_else(|| "-".to_string(), |a| a.to_string());
        let key = detail
            .correct_answer
            .map_or_else(|| "-".to_string(), |a| a.to_string());
        println!("  {verdict} Q{:>2}: yours {yours}, key {key}", i + 1);
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
