use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use clefquiz::assets::{DirectoryResolver, ImageResolver};
use clefquiz::bank::{self, BankFormat};
use clefquiz::config::{check_duration_preset, MAX_LEDGER_LINES};
use clefquiz::{
    spawn_session, Clef, DirectoryLoader, DriverOptions, EmbeddedLoader, NoteBank, NoteBankLoader,
    NoteName, Phase, QuizError, QuizSettings, SessionOutcome, SessionSnapshot,
};

#[derive(Parser)]
#[command(name = "clefquiz", about = "Timed note-reading quiz", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a session in the terminal
    Play {
        /// treble, bass, alto or tenor
        #[arg(long)]
        clef: Option<String>,
        /// Directory holding <clef>.json / <clef>.yaml banks (default: embedded banks)
        #[arg(long)]
        bank_dir: Option<PathBuf>,
        /// YAML settings file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Session length in seconds: 30, 60 or 120
        #[arg(long, value_parser = parse_seconds)]
        seconds: Option<u32>,
        /// Number of answer choices
        #[arg(long)]
        choices: Option<usize>,
        /// Only show notes needing at most this many ledger lines (0-3)
        #[arg(long)]
        ledger_lines: Option<u8>,
        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,
        /// Directory the note images live in
        #[arg(long, default_value = "images")]
        assets: PathBuf,
    },

    /// Validate a note bank file
    CheckBank {
        path: PathBuf,
        #[arg(long, default_value = "treble")]
        clef: String,
    },

    /// List the embedded note banks
    Banks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            clef,
            bank_dir,
            config,
            seconds,
            choices,
            ledger_lines,
            seed,
            assets,
        } => {
            let mut settings = match &config {
                Some(path) => load_settings(path)?,
                None => QuizSettings::default(),
            };
            if clef.is_some() {
                settings.clef = clef;
            }
            if bank_dir.is_some() {
                settings.bank_dir = bank_dir;
            }
            if let Some(seconds) = seconds {
                settings.session.session_seconds = seconds;
            }
            if let Some(choices) = choices {
                settings.session.choice_count = choices;
            }
            if let Some(max) = ledger_lines {
                settings.session.max_ledger_lines = max;
            }
            play(settings, seed, &assets).await
        }
        Command::CheckBank { path, clef } => check_bank(&path, &clef),
        Command::Banks => {
            for name in bank::embedded_bank_names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn parse_seconds(s: &str) -> Result<u32, String> {
    let seconds: u32 = s.parse().map_err(|e| format!("{}", e))?;
    check_duration_preset(seconds).map_err(|e| e.to_string())
}

fn load_settings(path: &Path) -> anyhow::Result<QuizSettings> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Error reading settings '{}'", path.display()))?;
    QuizSettings::from_yaml(&source)
        .with_context(|| format!("Invalid settings in '{}'", path.display()))
}

fn check_bank(path: &Path, clef: &str) -> anyhow::Result<()> {
    let clef = Clef::parse(clef)?;
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(BankFormat::from_extension)
        .with_context(|| format!("Unknown bank format for '{}'", path.display()))?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("Error reading bank '{}'", path.display()))?;
    let bank = NoteBank::parse(clef, &source, format)?;

    let notes: Vec<&str> = bank.notes().iter().map(NoteName::as_str).collect();
    println!(
        "{}: {} notes ({}), {} images",
        path.display(),
        bank.len(),
        notes.join(" "),
        bank.image_count()
    );
    for max in 0..=MAX_LEDGER_LINES {
        println!("  within {} ledger lines: {}", max, bank.images_within(max));
    }
    Ok(())
}

async fn play(settings: QuizSettings, seed: Option<u64>, assets: &Path) -> anyhow::Result<()> {
    settings.validate()?;
    let clef = settings.clef()?;
    let loader: Arc<dyn NoteBankLoader> = match &settings.bank_dir {
        Some(dir) => Arc::new(DirectoryLoader::new(dir)),
        None => Arc::new(EmbeddedLoader),
    };
    let resolver = DirectoryResolver::new(assets);

    let options = DriverOptions {
        seed,
        ..DriverOptions::default()
    };
    let handle = spawn_session(loader, clef, settings.session, options)?;
    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = TerminalView::default();

    println!("Name each note. Type the letter and press enter (r retries a failed bank load).");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                view.render(&snapshot, clef, &resolver);
                if snapshot.phase == Phase::Finished {
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(text) = line.context("Error reading stdin")? else {
                    handle.cancel().await;
                    break;
                };
                let text = text.trim();
                if text.eq_ignore_ascii_case("r") {
                    handle.reload().await?;
                    continue;
                }
                let label = match NoteName::parse_label(text) {
                    Ok(label) => label,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                let expected = view.current_answer();
                match handle.submit(label).await {
                    Ok(snapshot) => {
                        match expected {
                            Some(answer) if answer == label => println!("  correct"),
                            Some(answer) => println!("  wrong, it was {}", answer),
                            None => {}
                        }
                        view.render(&snapshot, clef, &resolver);
                    }
                    Err(QuizError::InvalidPhase { phase, .. }) => {
                        println!("  not accepting answers while {}", phase);
                    }
                    Err(QuizError::DriverClosed) => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    match handle.finished().await? {
        SessionOutcome::Completed(summary) => {
            println!();
            println!(
                "Time! Score {} / {} ({:.0}% accuracy) in {}s on {} clef, up to {} ledger lines",
                summary.score,
                summary.total_questions,
                summary.accuracy_percentage,
                summary.duration_seconds,
                summary.clef,
                summary.max_ledger_lines
            );
            Ok(())
        }
        SessionOutcome::Cancelled => {
            println!("Session cancelled");
            Ok(())
        }
        SessionOutcome::Aborted(e) => bail!("Session stopped: {}", e),
    }
}

/// Tracks what has already been printed so each update only prints news
#[derive(Default)]
struct TerminalView {
    phase: Option<Phase>,
    countdown: Option<u32>,
    answered: Option<usize>,
    load_error: Option<String>,
    answer: Option<NoteName>,
}

impl TerminalView {
    fn current_answer(&self) -> Option<NoteName> {
        self.answer
    }

    fn render(&mut self, snapshot: &SessionSnapshot, clef: Clef, resolver: &dyn ImageResolver) {
        if snapshot.load_error != self.load_error {
            if let Some(error) = &snapshot.load_error {
                eprintln!("{}", error);
            }
            self.load_error = snapshot.load_error.clone();
        }

        match snapshot.phase {
            Phase::Countdown if self.countdown != Some(snapshot.countdown) => {
                println!("Starting in {}...", snapshot.countdown);
                self.countdown = Some(snapshot.countdown);
            }
            Phase::Active if self.answered != Some(snapshot.answered) || self.phase != Some(Phase::Active) => {
                if let Some(question) = &snapshot.question {
                    let choices: Vec<&str> = question.answers.iter().map(NoteName::as_str).collect();
                    println!(
                        "[{:>3}s | score {}] {}  ->  {}",
                        snapshot.timer,
                        snapshot.score,
                        resolver.resolve(clef, &question.img),
                        choices.join(" / ")
                    );
                    self.answer = Some(question.correct_answer);
                }
                self.answered = Some(snapshot.answered);
            }
            _ => {}
        }
        self.phase = Some(snapshot.phase);
    }
}
