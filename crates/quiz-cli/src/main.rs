//! Quiz CLI
//!
//! Main entry point for running a timed quiz in the terminal.

mod terminal;

use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::Parser;
use quiz_engine::{QuestionBank, QuizConfig, QuizSession, Resolution, SessionSnapshot};
use quiz_report::{
    json::JsonGenerator, MarkdownGenerator, QuestionInput, QuestionResult, ReportGenerator,
    ReportInput,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalDisplay;

/// Name used in reports for the built-in question bank.
const SAMPLE_QUIZ_NAME: &str = "Cricket (built-in)";

/// Buffered answer lines between the stdin reader and the session.
const ANSWER_BUFFER: usize = 16;

/// Quiz - Timed Multiple-Choice Quiz
///
/// Presents each question with a countdown. Answer before it reaches zero,
/// or the quiz moves on without you.
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the question bank JSON file (default: built-in cricket quiz)
    #[arg(value_name = "BANK")]
    bank: Option<String>,

    /// Path to configuration file (default: quiz.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Seconds allowed per question
    #[arg(short, long, value_name = "N")]
    seconds: Option<u32>,

    /// Output directory for reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Skip writing reports when the quiz ends
    #[arg(long)]
    no_report: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, bank = ?args.bank, "Starting quiz");

    match run_quiz(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs one quiz from configuration to reports.
async fn run_quiz(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(ref bank) = args.bank {
        config.bank.clone_from(bank);
    }
    if let Some(seconds) = args.seconds {
        config.question_seconds = seconds;
    }
    if let Some(ref output_dir) = args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    if args.no_report {
        config.write_report = false;
    }

    // Re-validate after overrides
    config.validate()?;

    let (bank, quiz_name) = load_bank(&config, args.bank.is_some())?;
    print_intro(&quiz_name, &bank, &config);

    let display = TerminalDisplay::new();
    let mut answers = spawn_stdin_reader(display.on_screen());
    let session = QuizSession::from_config(&config, Arc::new(display))?;
    let mut stdin_open = true;

    session.begin(bank.clone())?;

    loop {
        tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                session.shutdown();
                println!();
                println!("Quiz interrupted.");
                return Ok(());
            }
            () = session.finished() => {
                break;
            }
            line = answers.recv(), if stdin_open => {
                match line {
                    Some((ordinal, line)) => handle_answer(&session, &bank, ordinal, &line),
                    None => {
                        tracing::debug!("stdin closed, remaining questions will time out");
                        stdin_open = false;
                    }
                }
            }
        }
    }

    let snapshot = session.snapshot();
    print_summary(&snapshot);

    if config.write_report {
        generate_reports(&snapshot, &bank, &quiz_name, &config)?;
    }

    Ok(())
}

/// Loads configuration from the given path or the current directory.
fn load_config(config_path: Option<&str>) -> anyhow::Result<QuizConfig> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Ok(QuizConfig::load_from_file(path)?)
        }
        None => Ok(QuizConfig::load()?),
    }
}

/// Loads the configured bank, or the built-in one.
///
/// A bank named on the command line must exist. The configured default is
/// optional and falls back to the built-in quiz when absent.
fn load_bank(config: &QuizConfig, explicit: bool) -> anyhow::Result<(QuestionBank, String)> {
    let path = Path::new(&config.bank);
    if !explicit && !path.exists() {
        tracing::info!(bank = %config.bank, "No question bank found, using the built-in quiz");
        return Ok((QuestionBank::sample(), SAMPLE_QUIZ_NAME.to_string()));
    }

    tracing::info!(bank = %config.bank, "Loading question bank");
    let bank = QuestionBank::load(path)?;
    let name = path.file_stem().map_or_else(
        || config.bank.clone(),
        |s| s.to_string_lossy().to_string(),
    );
    Ok((bank, name))
}

/// Forwards stdin lines to the async side, each tagged with the ordinal of
/// the question that was on screen when the line was read.
///
/// The reader runs on a plain thread because a blocking stdin read would
/// otherwise keep the runtime from shutting down.
fn spawn_stdin_reader(on_screen: Arc<AtomicUsize>) -> mpsc::Receiver<(usize, String)> {
    let (tx, rx) = mpsc::channel(ANSWER_BUFFER);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let ordinal = on_screen.load(Ordering::SeqCst);
            if tx.blocking_send((ordinal, line)).is_err() {
                break;
            }
        }
    });
    rx
}

/// Parses a 1-based option number typed by the user into a zero-based index.
///
/// Returns `None` for anything that is not a number. `0` maps to an index no
/// question has, so it counts as a wrong answer.
fn parse_answer(input: &str) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    Some(number.checked_sub(1).unwrap_or(usize::MAX))
}

/// Applies a typed answer to the question that was on screen when it was
/// read. If that question has moved on since, the answer is dropped.
fn handle_answer(session: &QuizSession, bank: &QuestionBank, ordinal: usize, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let Some(question) = ordinal.checked_sub(1).and_then(|i| bank.get(i)) else {
        return;
    };

    match parse_answer(line) {
        Some(selected) => {
            if !session.submit_to(question.ordinal() - 1, selected) {
                tracing::debug!(ordinal = question.ordinal(), "Answer arrived too late");
            }
        }
        None => {
            println!(
                "\nPlease enter a number between 1 and {}.",
                question.options().len()
            );
        }
    }
}

fn print_intro(quiz_name: &str, bank: &QuestionBank, config: &QuizConfig) {
    println!("Quiz: {quiz_name}");
    println!("  Questions: {}", bank.len());
    println!("  Time per question: {}s", config.question_seconds);
    if config.write_report {
        println!("  Reports: {}", config.output_dir);
    }
}

fn print_summary(snapshot: &SessionSnapshot) {
    let (mut correct, mut wrong, mut timed_out) = (0, 0, 0);
    for outcome in &snapshot.outcomes {
        match outcome.resolution {
            Resolution::Answered { correct: true, .. } => correct += 1,
            Resolution::Answered { correct: false, .. } => wrong += 1,
            Resolution::TimedOut => timed_out += 1,
        }
    }
    println!("  Correct: {correct}, wrong: {wrong}, timed out: {timed_out}");
}

/// Writes Markdown and JSON reports for a finished session.
fn generate_reports(
    snapshot: &SessionSnapshot,
    bank: &QuestionBank,
    quiz_name: &str,
    config: &QuizConfig,
) -> anyhow::Result<()> {
    println!();
    println!("Generating reports...");

    let input = create_report_input(snapshot, bank, quiz_name, config.question_seconds);
    let report = ReportGenerator::new(input).generate()?;

    let output_dir = Path::new(&config.output_dir);
    std::fs::create_dir_all(output_dir)?;

    let markdown = MarkdownGenerator::new(&report).generate();
    let md_path = output_dir.join("quiz-report.md");
    std::fs::write(&md_path, markdown)?;
    println!("  Markdown report: {}", md_path.display());

    let json_path = output_dir.join("quiz-report.json");
    JsonGenerator::new(&report).write_to_file(&json_path, true)?;
    println!("  JSON report: {}", json_path.display());

    tracing::info!(
        markdown = %md_path.display(),
        json = %json_path.display(),
        "Reports written"
    );
    Ok(())
}

/// Creates a `ReportInput` from a session snapshot.
fn create_report_input(
    snapshot: &SessionSnapshot,
    bank: &QuestionBank,
    quiz_name: &str,
    question_seconds: u32,
) -> ReportInput {
    let questions = snapshot
        .outcomes
        .iter()
        .filter_map(|outcome| {
            let question = bank.get(outcome.ordinal.checked_sub(1)?)?;
            let (result, selected_answer) = match outcome.resolution {
                Resolution::Answered { selected, correct } => (
                    if correct {
                        QuestionResult::Correct
                    } else {
                        QuestionResult::Incorrect
                    },
                    question.options().get(selected).cloned(),
                ),
                Resolution::TimedOut => (QuestionResult::TimedOut, None),
            };
            Some(QuestionInput {
                ordinal: outcome.ordinal,
                prompt: question.prompt().to_string(),
                correct_answer: question.correct_option().unwrap_or_default().to_string(),
                selected_answer,
                result,
                remaining_seconds: outcome.remaining_seconds,
            })
        })
        .collect();

    ReportInput {
        quiz_name: quiz_name.to_string(),
        started_at: snapshot.started_at,
        finished_at: snapshot.finished_at,
        question_seconds,
        questions,
    }
}
