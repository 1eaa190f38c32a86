//! Quiz session state machine
//!
//! [`QuizSession`] is synchronous and single-owner: it starts no timers and
//! takes no locks. A host calls [`QuizSession::tick`] once per second and
//! forwards answers to [`QuizSession::submit_answer`]; every call returns a
//! fresh [`SessionSnapshot`].

use log::debug;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::bank::NoteBank;
use crate::config::SessionConfig;
use crate::error::QuizError;
use crate::model::{Clef, NoteEntry, NoteName};
use crate::question::{generate_question, Question};

use super::types::{AnswerRecord, Phase, SessionSnapshot, SessionSummary};

#[derive(Debug, Clone)]
pub struct QuizSession {
    clef: Clef,
    config: SessionConfig,
    bank: Option<NoteBank>,
    phase: Phase,
    countdown: u32,
    timer: u32,
    score: u32,
    question: Option<Question>,
    // Timer reading when the current question was shown
    shown_at: u32,
    answers: Vec<AnswerRecord>,
    load_error: Option<String>,
    rng: Pcg32,
}

impl QuizSession {
    /// Create a session with a loaded bank, in phase Pending.
    ///
    /// # Errors
    /// - [`QuizError::InvalidConfig`] / [`QuizError::InsufficientChoices`] for a bad config
    /// - [`QuizError::InvalidBank`] if no image fits within the ledger limit
    pub fn new(bank: NoteBank, config: SessionConfig) -> Result<Self, QuizError> {
        let mut session = Self::awaiting_bank(bank.clef(), config)?;
        bank.check_ledger_limit(config.max_ledger_lines)?;
        session.bank = Some(bank);
        Ok(session)
    }

    /// Create a Pending session whose bank is still being loaded.
    ///
    /// The session stays in Pending, ignoring ticks, until
    /// [`load_bank`](Self::load_bank) succeeds.
    pub fn awaiting_bank(clef: Clef, config: SessionConfig) -> Result<Self, QuizError> {
        config.validate()?;
        Ok(Self {
            clef,
            config,
            bank: None,
            phase: Phase::Pending,
            countdown: config.countdown_seconds,
            timer: config.session_seconds,
            score: 0,
            question: None,
            shown_at: config.session_seconds,
            answers: Vec::new(),
            load_error: None,
            rng: Pcg32::from_entropy(),
        })
    }

    /// Replace the random source with a seeded one, for reproducible sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Attach the result of a successful bank load.
    ///
    /// # Errors
    /// - [`QuizError::InvalidBank`] if `entries` is empty, no image fits within the
    ///   ledger limit, or a bank is already attached; the session is left unchanged
    pub fn load_bank(&mut self, entries: Vec<NoteEntry>) -> Result<SessionSnapshot, QuizError> {
        if self.bank.is_some() {
            return Err(QuizError::InvalidBank(format!(
                "{} note bank is already loaded",
                self.clef
            )));
        }
        let bank = NoteBank::new(self.clef, entries)?;
        bank.check_ledger_limit(self.config.max_ledger_lines)?;
        debug!("{} bank loaded with {} notes", self.clef, bank.len());
        self.bank = Some(bank);
        self.load_error = None;
        Ok(self.snapshot())
    }

    /// Note a failed bank load. The session stays in Pending and the error is
    /// handed back so the host can report it or retry.
    pub fn record_load_failure(&mut self, error: QuizError) -> QuizError {
        if self.bank.is_none() {
            self.load_error = Some(error.to_string());
        }
        error
    }

    /// Advance the session by one second.
    pub fn tick(&mut self) -> Result<SessionSnapshot, QuizError> {
        match self.phase {
            Phase::Pending => {
                if self.bank.is_some() {
                    self.enter(Phase::Countdown);
                    if self.countdown == 0 {
                        self.enter_active()?;
                    }
                }
            }
            Phase::Countdown => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.enter_active()?;
                }
            }
            Phase::Active => {
                self.timer = self.timer.saturating_sub(1);
                if self.timer == 0 {
                    self.question = None;
                    self.enter(Phase::Finished);
                }
            }
            Phase::Finished => {}
        }
        Ok(self.snapshot())
    }

    /// Answer the current question and move on to a new one.
    ///
    /// Scores one point when `label` is the correct answer. A new question
    /// replaces the current one whether or not the answer was right.
    ///
    /// # Errors
    /// - [`QuizError::InvalidPhase`] outside the Active phase; nothing changes
    pub fn submit_answer(&mut self, label: NoteName) -> Result<SessionSnapshot, QuizError> {
        let question = match (&self.phase, &self.question) {
            (Phase::Active, Some(question)) => question,
            _ => {
                return Err(QuizError::InvalidPhase {
                    phase: self.phase,
                    operation: "submit an answer",
                })
            }
        };

        let is_correct = question.is_correct(label);
        let record = AnswerRecord {
            question_number: self.answers.len() + 1,
            note_image: question.img.clone(),
            correct_note: question.correct_answer,
            user_answer: label,
            is_correct,
            elapsed_seconds: self.config.session_seconds - self.timer,
            time_taken_seconds: self.shown_at.saturating_sub(self.timer),
        };
        debug!(
            "question {}: answered {} for {} ({})",
            record.question_number,
            label,
            record.correct_note,
            if is_correct { "correct" } else { "wrong" }
        );

        // Draw the replacement first so a failure leaves the session untouched
        let bank = self.bank.as_ref().ok_or_else(|| QuizError::InvalidPhase {
            phase: self.phase,
            operation: "submit an answer",
        })?;
        let next = generate_question(
            bank,
            self.config.choice_count,
            self.config.max_ledger_lines,
            &mut self.rng,
        )?;

        if is_correct {
            self.score += 1;
        }
        self.answers.push(record);
        self.question = Some(next);
        self.shown_at = self.timer;
        Ok(self.snapshot())
    }

    /// Replace the current question without answering it.
    ///
    /// # Errors
    /// - [`QuizError::InvalidPhase`] outside the Active phase
    pub fn next_question(&mut self) -> Result<&Question, QuizError> {
        if self.phase != Phase::Active {
            return Err(QuizError::InvalidPhase {
                phase: self.phase,
                operation: "generate a question",
            });
        }
        self.refresh_question()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            countdown: self.countdown,
            timer: self.timer,
            score: self.score,
            answered: self.answers.len(),
            question: self.question.clone(),
            load_error: self.load_error.clone(),
        }
    }

    /// Final result, available once the session is Finished.
    pub fn summary(&self) -> Option<SessionSummary> {
        if self.phase != Phase::Finished {
            return None;
        }
        Some(SessionSummary::from_answers(
            self.clef,
            self.config.session_seconds,
            self.config.max_ledger_lines,
            self.score,
            &self.answers,
        ))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn clef(&self) -> Clef {
        self.clef
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bank(&self) -> Option<&NoteBank> {
        self.bank.as_ref()
    }

    pub fn has_bank(&self) -> bool {
        self.bank.is_some()
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{} session: {} -> {}", self.clef, self.phase, phase);
        self.phase = phase;
    }

    fn enter_active(&mut self) -> Result<(), QuizError> {
        self.enter(Phase::Active);
        self.refresh_question()?;
        Ok(())
    }

    fn refresh_question(&mut self) -> Result<&Question, QuizError> {
        let bank = self.bank.as_ref().ok_or_else(|| QuizError::InvalidPhase {
            phase: self.phase,
            operation: "generate a question",
        })?;
        let question = generate_question(
            bank,
            self.config.choice_count,
            self.config.max_ledger_lines,
            &mut self.rng,
        )?;
        self.shown_at = self.timer;
        Ok(self.question.insert(question))
    }
}
