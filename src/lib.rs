pub mod assets;
pub mod bank;
pub mod config;
pub mod error;
pub mod model;
pub mod question;
pub mod session;

#[cfg(feature = "runtime")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod driver;
#[cfg(feature = "runtime")]
pub mod loader;

pub use assets::{ImageResolver, UrlResolver};
pub use bank::NoteBank;
pub use config::{QuizSettings, SessionConfig};
pub use error::*;
pub use model::*;
pub use question::{generate_question, Question};
pub use session::*;

#[cfg(feature = "runtime")]
pub use driver::{spawn_gated_session, spawn_session, DriverOptions, SessionHandle, SessionOutcome};
#[cfg(feature = "runtime")]
pub use loader::{DirectoryLoader, EmbeddedLoader, NoteBankLoader};

/// Start a session on the embedded bank for a clef.
/// This is the quickest way to get a playable session.
pub fn start_session(clef: Clef, config: SessionConfig) -> Result<QuizSession, QuizError> {
    let bank = bank::embedded(clef)?;
    QuizSession::new(bank, config)
}

/// Start a session from bank source text.
pub fn start_session_from_source(
    clef: Clef,
    source: &str,
    format: bank::BankFormat,
    config: SessionConfig,
) -> Result<QuizSession, QuizError> {
    let bank = NoteBank::parse(clef, source, format)?;
    QuizSession::new(bank, config)
}
