//! Session state type definitions
//!
//! Everything the presentation layer sees of a session is one of these
//! values. They are plain data: hosts read them, they never write back.

use serde::Serialize;
use std::fmt;

use crate::model::{Clef, NoteName};
use crate::question::Question;

/// Session phase
///
/// `Pending -> Countdown -> Active -> Finished`, strictly in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the note bank
    Pending,
    /// Counting down before the first question
    Countdown,
    /// Questions are being asked and the timer runs
    Active,
    /// Timer expired; terminal
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Countdown => "countdown",
            Phase::Active => "active",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted answer
///
/// # Fields
/// - `question_number`: 1-based position of the question in the session
/// - `note_image`: image that was shown
/// - `correct_note`: label the image depicts
/// - `user_answer`: label that was submitted
/// - `elapsed_seconds`: seconds of the Active phase used up when the answer arrived
/// - `time_taken_seconds`: seconds between the question being shown and answered
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_number: usize,
    pub note_image: String,
    pub correct_note: NoteName,
    pub user_answer: NoteName,
    pub is_correct: bool,
    pub elapsed_seconds: u32,
    pub time_taken_seconds: u32,
}

/// Read-only view of a session, produced after every mutating call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub countdown: u32,
    pub timer: u32,
    pub score: u32,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// Final result of a finished session
///
/// `accuracy_percentage` is `correct_answers / total_questions * 100`, or 0
/// when nothing was answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub clef: Clef,
    pub duration_seconds: u32,
    pub max_ledger_lines: u8,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy_percentage: f64,
}

impl SessionSummary {
    pub(crate) fn from_answers(
        clef: Clef,
        duration_seconds: u32,
        max_ledger_lines: u8,
        score: u32,
        answers: &[AnswerRecord],
    ) -> Self {
        let total_questions = answers.len();
        let correct_answers = answers.iter().filter(|a| a.is_correct).count();
        let accuracy_percentage = if total_questions == 0 {
            0.0
        } else {
            correct_answers as f64 / total_questions as f64 * 100.0
        };
        Self {
            clef,
            duration_seconds,
            max_ledger_lines,
            score,
            total_questions,
            correct_answers,
            accuracy_percentage,
        }
    }
}
