//! # Session Module
//!
//! The quiz session engine: owns the note bank, asks questions, keeps score
//! and counts down the clock.
//!
//! ## Sub-modules
//! - `types` - Phase, SessionSnapshot, AnswerRecord, SessionSummary
//! - `engine` - The [`QuizSession`] state machine
//!
//! ## Phases
//! ```text
//! Pending ──(bank attached, tick)──▶ Countdown ──(countdown hits 0)──▶ Active ──(timer hits 0)──▶ Finished
//! ```
//! - **Pending**: ticks are ignored until a bank is attached. The tick that
//!   sees the bank moves to Countdown; with a zero countdown it falls straight
//!   through to Active.
//! - **Countdown**: each tick takes one second off the countdown.
//! - **Active**: the first question is drawn on entry. Each tick takes one
//!   second off the timer; the tick that brings it to exactly 0 finishes the
//!   session, so a 60 second session has 60 Active ticks.
//! - **Finished**: terminal. The current question is cleared and every further
//!   call is a no-op or an `InvalidPhase` error.
//!
//! There is no reset. A new round is a new [`QuizSession`].
//!
//! ## Example
//! ```rust
//! use clefquiz::{Clef, NoteBank, NoteEntry, NoteName, Phase, QuizSession, SessionConfig};
//!
//! let bank = NoteBank::new(
//!     Clef::Treble,
//!     vec![
//!         NoteEntry::new(NoteName::A, ["img1"]),
//!         NoteEntry::new(NoteName::B, ["img2"]),
//!     ],
//! )?;
//! let mut session = QuizSession::new(bank, SessionConfig::new(0, 1, 2))?;
//!
//! let snapshot = session.tick()?;
//! assert_eq!(snapshot.phase, Phase::Active);
//!
//! let correct = snapshot.question.unwrap().correct_answer;
//! let snapshot = session.submit_answer(correct)?;
//! assert_eq!(snapshot.score, 1);
//!
//! assert_eq!(session.tick()?.phase, Phase::Finished);
//! # Ok::<(), clefquiz::QuizError>(())
//! ```

mod engine;
mod types;


pub use engine::QuizSession;
pub use types::{AnswerRecord, Phase, SessionSnapshot, SessionSummary};
