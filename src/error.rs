//! # Error Types
//!
//! This module defines all error types for the quiz engine and its hosts.
//!
//! ## Error Types
//! - `InvalidBank` - Empty note bank, or an entry with no images (fatal to construction)
//! - `InsufficientChoices` - Choice count larger than the label alphabet allows (fatal)
//! - `InvalidPhase` - Operation attempted in the wrong phase (recoverable, no state change)
//! - `LoadError` - The note bank loader failed (recoverable by retry, session stays Pending)
//! - `InvalidConfig` - Malformed settings (choice count below 2, unknown clef, bad YAML)
//! - `InvalidLabel` - A submitted answer that is not a note name
//! - `Unauthorized` - The session gate rejected the caller
//! - `DriverClosed` - The session driver task is gone
//!
//! ## Usage
//! ```rust
//! use clefquiz::{NoteBank, QuizError, QuizSession, SessionConfig};
//!
//! match NoteBank::new(clefquiz::Clef::Treble, vec![]) {
//!     Err(QuizError::InvalidBank(message)) => eprintln!("Bank rejected: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//!     Ok(bank) => {
//!         let _session = QuizSession::new(bank, SessionConfig::default());
//!     }
//! }
//! ```

use thiserror::Error;

use crate::model::Clef;
use crate::session::Phase;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuizError {
    /// The note bank cannot be used to generate questions.
    ///
    /// # Example
    /// ```
    /// # use clefquiz::QuizError;
    /// let err = QuizError::InvalidBank("note bank is empty".to_string());
    /// assert_eq!(err.to_string(), "Invalid note bank: note bank is empty");
    /// ```
    #[error("Invalid note bank: {0}")]
    InvalidBank(String),

    /// The incorrect-answer pool is smaller than `choice_count - 1`.
    ///
    /// # Example
    /// ```
    /// # use clefquiz::QuizError;
    /// let err = QuizError::InsufficientChoices { requested: 9, available: 6 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Insufficient choices: 9 answers requested but only 6 incorrect labels available"
    /// );
    /// ```
    #[error("Insufficient choices: {requested} answers requested but only {available} incorrect labels available")]
    InsufficientChoices { requested: usize, available: usize },

    /// An operation was attempted outside the phase that allows it.
    #[error("Cannot {operation} while session is {phase}")]
    InvalidPhase {
        phase: Phase,
        operation: &'static str,
    },

    /// The note bank loader failed for a clef.
    #[error("Failed to load {clef} note bank: {message}")]
    LoadError { clef: Clef, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid answer label: {0}")]
    InvalidLabel(String),

    #[error("Not authorized to start a session")]
    Unauthorized,

    #[error("Session driver has stopped")]
    DriverClosed,
}
