//! Session driver
//!
//! Runs one [`QuizSession`] on a tokio task. The task is the only owner of
//! the session, so every call is serialized without a lock:
//!
//! - a single `tokio::time::interval` calls [`QuizSession::tick`] once per period
//! - answers and control messages arrive over an `mpsc` channel
//! - every new snapshot is published on a `watch` channel for read-only subscribers
//!
//! The bank is loaded in the background when the driver starts. If loading
//! fails the session stays in Pending, the error shows up in the snapshot's
//! `load_error`, and the host may call [`SessionHandle::reload`].
//!
//! The task ends when the session finishes, when the host cancels it, or when
//! every [`SessionHandle`] is dropped.

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::auth::SessionGate;
use crate::config::SessionConfig;
use crate::error::QuizError;
use crate::loader::NoteBankLoader;
use crate::model::{Clef, NoteEntry, NoteName};
use crate::session::{QuizSession, SessionSnapshot, SessionSummary};

/// Driver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Time between ticks; one second for a real session
    pub period: Duration,
    /// Seed for reproducible question order
    pub seed: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// How a driven session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The timer ran out
    Completed(SessionSummary),
    /// The host cancelled or dropped the session
    Cancelled,
    /// The engine returned an error from `tick`
    Aborted(QuizError),
}

#[derive(Debug)]
enum Command {
    Submit(NoteName, oneshot::Sender<Result<SessionSnapshot, QuizError>>),
    Reload,
    Cancel,
}

/// Host-side handle to a running session
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Submit an answer and wait for the resulting snapshot.
    ///
    /// # Errors
    /// - whatever [`QuizSession::submit_answer`] returns
    /// - [`QuizError::DriverClosed`] if the session has already ended
    pub async fn submit(&self, label: NoteName) -> Result<SessionSnapshot, QuizError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Submit(label, reply))
            .await
            .map_err(|_| QuizError::DriverClosed)?;
        response.await.map_err(|_| QuizError::DriverClosed)?
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Read-only subscription to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Retry loading the bank. Ignored once a bank is attached.
    pub async fn reload(&self) -> Result<(), QuizError> {
        self.commands
            .send(Command::Reload)
            .await
            .map_err(|_| QuizError::DriverClosed)
    }

    /// Stop the session. Has no effect if it already ended.
    pub async fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel).await;
    }

    /// Wait for the session to end.
    pub async fn finished(self) -> Result<SessionOutcome, QuizError> {
        let SessionHandle { commands, task, .. } = self;
        // Keep the command channel open so the driver does not read our
        // waiting as a dropped handle.
        let outcome = task.await.map_err(|_| QuizError::DriverClosed);
        drop(commands);
        outcome
    }
}

/// Start a session driver on the current tokio runtime.
///
/// # Errors
/// - [`QuizError::InvalidConfig`] / [`QuizError::InsufficientChoices`] for a bad config
pub fn spawn_session<L>(
    loader: Arc<L>,
    clef: Clef,
    config: SessionConfig,
    options: DriverOptions,
) -> Result<SessionHandle, QuizError>
where
    L: NoteBankLoader + ?Sized + 'static,
{
    let mut session = QuizSession::awaiting_bank(clef, config)?;
    if let Some(seed) = options.seed {
        session = session.with_seed(seed);
    }

    let (command_tx, command_rx) = mpsc::channel(16);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    info!(
        "starting {} session: {}s countdown, {}s timer, {} choices, up to {} ledger lines",
        clef,
        config.countdown_seconds,
        config.session_seconds,
        config.choice_count,
        config.max_ledger_lines
    );
    let task = tokio::spawn(drive(session, loader, options.period, command_rx, snapshot_tx));

    Ok(SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    })
}

/// Start a session only if the gate authorizes the caller.
///
/// The gate is consulted once, before the session is built.
pub fn spawn_gated_session<G, L>(
    gate: &G,
    loader: Arc<L>,
    clef: Clef,
    config: SessionConfig,
    options: DriverOptions,
) -> Result<SessionHandle, QuizError>
where
    G: SessionGate + ?Sized,
    L: NoteBankLoader + ?Sized + 'static,
{
    if !gate.is_authorized() {
        return Err(QuizError::Unauthorized);
    }
    spawn_session(loader, clef, config, options)
}

fn start_load<L>(loader: &Arc<L>, clef: Clef, results: &mpsc::Sender<Result<Vec<NoteEntry>, QuizError>>)
where
    L: NoteBankLoader + ?Sized + 'static,
{
    let loader = Arc::clone(loader);
    let results = results.clone();
    tokio::spawn(async move {
        let result = loader.load(clef).await;
        let _ = results.send(result).await;
    });
}

async fn drive<L>(
    mut session: QuizSession,
    loader: Arc<L>,
    period: Duration,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> SessionOutcome
where
    L: NoteBankLoader + ?Sized + 'static,
{
    let clef = session.clef();
    let (load_tx, mut load_rx) = mpsc::channel(1);
    start_load(&loader, clef, &load_tx);

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match session.tick() {
                    Ok(snapshot) => {
                        snapshots.send_replace(snapshot);
                    }
                    Err(e) => {
                        error!("{} session stopped: {}", clef, e);
                        return SessionOutcome::Aborted(e);
                    }
                }
                if let Some(summary) = session.summary() {
                    info!(
                        "{} session finished: score {} ({} answered)",
                        clef, summary.score, summary.total_questions
                    );
                    return SessionOutcome::Completed(summary);
                }
            }

            Some(result) = load_rx.recv() => {
                let loaded = result.and_then(|entries| session.load_bank(entries));
                if let Err(e) = loaded {
                    warn!("{} bank unavailable: {}", clef, e);
                    session.record_load_failure(e);
                }
                snapshots.send_replace(session.snapshot());
            }

            command = commands.recv() => {
                match command {
                    Some(Command::Submit(label, reply)) => {
                        let result = session.submit_answer(label);
                        if let Ok(snapshot) = &result {
                            snapshots.send_replace(snapshot.clone());
                        }
                        let _ = reply.send(result);
                    }
                    Some(Command::Reload) => {
                        if !session.has_bank() {
                            info!("retrying {} bank load", clef);
                            start_load(&loader, clef, &load_tx);
                        }
                    }
                    Some(Command::Cancel) | None => {
                        info!("{} session cancelled in {}", clef, session.phase());
                        return SessionOutcome::Cancelled;
                    }
                }
            }
        }
    }
}
