//! Multiple-choice question generation
//!
//! A question shows one image from the bank and offers `choice_count` labels:
//! the correct one plus distinct distractors drawn from the rest of the
//! alphabet, in shuffled order. Only images needing at most
//! `max_ledger_lines` ledger lines are shown.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::bank::NoteBank;
use crate::error::QuizError;
use crate::model::{NoteEntry, NoteName};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub img: String,
    pub correct_answer: NoteName,
    pub answers: Vec<NoteName>,
}

impl Question {
    pub fn is_correct(&self, label: NoteName) -> bool {
        self.correct_answer == label
    }
}

/// Generate a question from the bank.
///
/// # Errors
/// - [`QuizError::InvalidBank`] when no image fits within `max_ledger_lines`
/// - [`QuizError::InsufficientChoices`] when the alphabet minus the correct
///   label has fewer than `choice_count - 1` members
pub fn generate_question<R: Rng + ?Sized>(
    bank: &NoteBank,
    choice_count: usize,
    max_ledger_lines: u8,
    rng: &mut R,
) -> Result<Question, QuizError> {
    bank.check_ledger_limit(max_ledger_lines)?;

    let eligible: Vec<(&NoteEntry, Vec<&String>)> = bank
        .entries()
        .iter()
        .filter_map(|entry| {
            let imgs: Vec<&String> = entry
                .imgs
                .iter()
                .filter(|img| bank.ledger_lines(img) <= max_ledger_lines)
                .collect();
            (!imgs.is_empty()).then_some((entry, imgs))
        })
        .collect();
    let (entry, imgs) = eligible
        .choose(rng)
        .ok_or_else(|| QuizError::InvalidBank("note bank is empty".to_string()))?;
    let img = *imgs
        .choose(rng)
        .ok_or_else(|| QuizError::InvalidBank(format!("no images for {}", entry.note)))?;
    let correct_answer = entry.note;

    let pool: Vec<NoteName> = NoteName::ALL
        .iter()
        .copied()
        .filter(|name| *name != correct_answer)
        .collect();
    let wanted = choice_count.saturating_sub(1);
    if wanted > pool.len() {
        return Err(QuizError::InsufficientChoices {
            requested: choice_count,
            available: pool.len(),
        });
    }

    let mut answers: Vec<NoteName> = pool.choose_multiple(rng, wanted).copied().collect();
    answers.push(correct_answer);
    answers.shuffle(rng);

    Ok(Question {
        img: img.clone(),
        correct_answer,
        answers,
    })
}
