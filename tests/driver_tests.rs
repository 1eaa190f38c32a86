//! Driver tests
//!
//! Run on a paused tokio clock, so a 60 second session takes no wall time.

#![cfg(feature = "runtime")]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clefquiz::auth::{AuthContext, Identity, StaticGate};
use clefquiz::loader::StaticLoader;
use clefquiz::{
    spawn_gated_session, spawn_session, Clef, DriverOptions, EmbeddedLoader, NoteBankLoader,
    NoteEntry, NoteName, Phase, QuizError, SessionConfig, SessionOutcome,
};

fn options(seed: u64) -> DriverOptions {
    DriverOptions {
        seed: Some(seed),
        ..DriverOptions::default()
    }
}

/// Fails the first `failures` loads, then serves a one-note bank
struct FlakyLoader {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyLoader {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NoteBankLoader for FlakyLoader {
    async fn load(&self, clef: Clef) -> Result<Vec<NoteEntry>, QuizError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(QuizError::LoadError {
                clef,
                message: "network unreachable".to_string(),
            });
        }
        Ok(vec![NoteEntry::new(NoteName::G, ["G4.png"])])
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_runs_to_completion() {
    let handle = spawn_session(
        Arc::new(EmbeddedLoader),
        Clef::Treble,
        SessionConfig::new(2, 5, 4),
        options(1),
    )
    .unwrap();

    match handle.finished().await.unwrap() {
        SessionOutcome::Completed(summary) => {
            assert_eq!(summary.clef, Clef::Treble);
            assert_eq!(summary.duration_seconds, 5);
            assert_eq!(summary.total_questions, 0);
            assert_eq!(summary.accuracy_percentage, 0.0);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_during_active_phase() {
    let handle = spawn_session(
        Arc::new(EmbeddedLoader),
        Clef::Bass,
        SessionConfig::new(3, 60, 4),
        options(7),
    )
    .unwrap();

    let mut updates = handle.subscribe();
    let correct = {
        let snapshot = updates.wait_for(|s| s.phase == Phase::Active).await.unwrap();
        assert_eq!(snapshot.timer, 60);
        snapshot.question.as_ref().unwrap().correct_answer
    };

    let snapshot = handle.submit(correct).await.unwrap();
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.answered, 1);
    assert_eq!(handle.snapshot().score, 1);

    let wrong = NoteName::ALL
        .into_iter()
        .find(|n| Some(*n) != snapshot.question.as_ref().map(|q| q.correct_answer))
        .unwrap();
    let snapshot = handle.submit(wrong).await.unwrap();
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.answered, 2);

    handle.cancel().await;
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_submit_while_pending_is_rejected() {
    let loader = StaticLoader::new().with_bank(Clef::Treble, vec![NoteEntry::new(NoteName::C, ["C4.png"])]);
    let handle = spawn_session(
        Arc::new(loader),
        Clef::Treble,
        SessionConfig::new(3, 60, 2),
        options(3),
    )
    .unwrap();

    let err = handle.submit(NoteName::C).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidPhase { .. }));
    assert_eq!(handle.snapshot().score, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_stays_pending_until_reload() {
    let loader = Arc::new(FlakyLoader::new(1));
    let handle = spawn_session(
        Arc::clone(&loader),
        Clef::Treble,
        SessionConfig::new(1, 30, 2),
        options(11),
    )
    .unwrap();

    let mut updates = handle.subscribe();
    let message = {
        let snapshot = updates.wait_for(|s| s.load_error.is_some()).await.unwrap();
        snapshot.load_error.clone().unwrap()
    };
    assert!(message.contains("network unreachable"));

    // Ticks keep arriving but the session has nothing to play
    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Pending);
    assert_eq!(snapshot.countdown, 1);
    assert_eq!(snapshot.timer, 30);

    handle.reload().await.unwrap();
    let snapshot = updates.wait_for(|s| s.phase == Phase::Active).await.unwrap().clone();
    assert_eq!(snapshot.load_error, None);
    assert_eq!(snapshot.question.unwrap().correct_answer, NoteName::G);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_empty_bank_load_reported() {
    let loader = StaticLoader::new().with_bank(Clef::Bass, Vec::new());
    let handle = spawn_session(
        Arc::new(loader),
        Clef::Bass,
        SessionConfig::default(),
        options(0),
    )
    .unwrap();

    let mut updates = handle.subscribe();
    let snapshot = updates.wait_for(|s| s.load_error.is_some()).await.unwrap().clone();
    assert_eq!(snapshot.phase, Phase::Pending);
    assert!(snapshot.load_error.unwrap().contains("empty"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start() {
    let handle = spawn_session(
        Arc::new(EmbeddedLoader),
        Clef::Treble,
        SessionConfig::default(),
        options(5),
    )
    .unwrap();
    handle.cancel().await;
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_submit_after_finish_reports_closed_driver() {
    let handle = spawn_session(
        Arc::new(EmbeddedLoader),
        Clef::Treble,
        SessionConfig::new(0, 2, 3),
        options(9),
    )
    .unwrap();

    let mut updates = handle.subscribe();
    updates.wait_for(|s| s.phase == Phase::Finished).await.unwrap();

    let err = handle.submit(NoteName::A).await.unwrap_err();
    assert_eq!(err, QuizError::DriverClosed);
    assert!(matches!(handle.finished().await.unwrap(), SessionOutcome::Completed(_)));
}

#[tokio::test]
async fn test_invalid_config_rejected_before_spawn() {
    let err = spawn_session(
        Arc::new(EmbeddedLoader),
        Clef::Treble,
        SessionConfig::new(3, 60, 1),
        DriverOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, QuizError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_gate_rejects_signed_out_user() {
    let err = spawn_gated_session(
        &StaticGate(false),
        Arc::new(EmbeddedLoader),
        Clef::Treble,
        SessionConfig::default(),
        DriverOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, QuizError::Unauthorized);

    let auth = AuthContext::new();
    assert!(spawn_gated_session(
        &auth,
        Arc::new(EmbeddedLoader),
        Clef::Bass,
        SessionConfig::default(),
        DriverOptions::default(),
    )
    .is_err());

    auth.sign_in(Identity::new("student-1")).unwrap();
    let handle = spawn_gated_session(
        &auth,
        Arc::new(EmbeddedLoader),
        Clef::Bass,
        SessionConfig::default(),
        DriverOptions::default(),
    )
    .unwrap();
    handle.cancel().await;
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Cancelled);
}
