//! # Session Configuration
//!
//! [`SessionConfig`] carries the three knobs of a quiz session. It can be
//! built in code or read from YAML:
//!
//! ```yaml
//! countdown-seconds: 3
//! session-seconds: 60
//! choice-count: 4
//! max-ledger-lines: 2
//! ```
//!
//! [`QuizSettings`] is the CLI settings file: a session config plus the clef
//! and an optional bank directory. Unlike a bare [`SessionConfig`], its
//! session length must be one of [`DURATION_PRESETS`].
//!
//! ```yaml
//! clef: bass
//! bank-dir: ./banks
//! session:
//!   session-seconds: 30
//! ```

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::QuizError;
use crate::model::{Clef, NoteName};

/// Session lengths offered by the quiz menu, in seconds
pub const DURATION_PRESETS: [u32; 3] = [30, 60, 120];

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 3;
pub const DEFAULT_SESSION_SECONDS: u32 = 60;
pub const DEFAULT_CHOICE_COUNT: usize = 4;

/// Most ledger lines a session may allow; also the default
pub const MAX_LEDGER_LINES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SessionConfig {
    pub countdown_seconds: u32,
    pub session_seconds: u32,
    pub choice_count: usize,
    /// Only images needing at most this many ledger lines are asked
    pub max_ledger_lines: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            session_seconds: DEFAULT_SESSION_SECONDS,
            choice_count: DEFAULT_CHOICE_COUNT,
            max_ledger_lines: MAX_LEDGER_LINES,
        }
    }
}

impl SessionConfig {
    pub fn new(countdown_seconds: u32, session_seconds: u32, choice_count: usize) -> Self {
        Self {
            countdown_seconds,
            session_seconds,
            choice_count,
            max_ledger_lines: MAX_LEDGER_LINES,
        }
    }

    pub fn with_max_ledger_lines(mut self, max_ledger_lines: u8) -> Self {
        self.max_ledger_lines = max_ledger_lines;
        self
    }

    /// Parse a YAML config; missing keys take their defaults.
    pub fn from_yaml(source: &str) -> Result<Self, QuizError> {
        // An empty document deserializes to unit, not to a struct
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SessionConfig =
            serde_yaml::from_str(source).map_err(|e| QuizError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the choice count against the label alphabet and the ledger
    /// limit against [`MAX_LEDGER_LINES`].
    ///
    /// # Errors
    /// - [`QuizError::InvalidConfig`] when `choice_count < 2` or
    ///   `max_ledger_lines > 3`
    /// - [`QuizError::InsufficientChoices`] when `choice_count - 1` exceeds the
    ///   number of incorrect labels available for any question
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.choice_count < 2 {
            return Err(QuizError::InvalidConfig(format!(
                "choice-count must be at least 2, got {}",
                self.choice_count
            )));
        }
        if self.max_ledger_lines > MAX_LEDGER_LINES {
            return Err(QuizError::InvalidConfig(format!(
                "max-ledger-lines must be between 0 and {}, got {}",
                MAX_LEDGER_LINES, self.max_ledger_lines
            )));
        }
        let available = NoteName::ALL.len() - 1;
        if self.choice_count - 1 > available {
            return Err(QuizError::InsufficientChoices {
                requested: self.choice_count,
                available,
            });
        }
        Ok(())
    }
}

/// Settings file for the command-line host
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct QuizSettings {
    pub clef: Option<String>,
    pub bank_dir: Option<PathBuf>,
    pub session: SessionConfig,
}

impl QuizSettings {
    pub fn from_yaml(source: &str) -> Result<Self, QuizError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: QuizSettings =
            serde_yaml::from_str(source).map_err(|e| QuizError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the session config, the clef name and the session length.
    ///
    /// # Errors
    /// - [`QuizError::InvalidConfig`] when `session-seconds` is not one of
    ///   [`DURATION_PRESETS`] or the clef is unknown
    pub fn validate(&self) -> Result<(), QuizError> {
        self.session.validate()?;
        check_duration_preset(self.session.session_seconds)?;
        self.clef()?;
        Ok(())
    }

    /// The configured clef, treble when unset.
    pub fn clef(&self) -> Result<Clef, QuizError> {
        match &self.clef {
            Some(name) => Clef::parse(name),
            None => Ok(Clef::default()),
        }
    }
}

/// Accept only the session lengths offered by the quiz menu.
pub fn check_duration_preset(seconds: u32) -> Result<u32, QuizError> {
    if DURATION_PRESETS.contains(&seconds) {
        Ok(seconds)
    } else {
        Err(QuizError::InvalidConfig(format!(
            "session-seconds must be one of {:?}, got {}",
            DURATION_PRESETS, seconds
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.countdown_seconds, 3);
        assert_eq!(config.session_seconds, 60);
        assert_eq!(config.choice_count, 4);
        assert_eq!(config.max_ledger_lines, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_config() {
        let config = SessionConfig::from_yaml("session-seconds: 30\nchoice-count: 3\n").unwrap();
        assert_eq!(config, SessionConfig::new(3, 30, 3));
    }

    #[test]
    fn test_yaml_empty_config() {
        assert_eq!(SessionConfig::from_yaml("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_yaml_unknown_key() {
        let result = SessionConfig::from_yaml("staff-size: 2\n");
        assert!(matches!(result, Err(QuizError::InvalidConfig(_))));
    }

    #[test]
    fn test_choice_count_bounds() {
        assert!(matches!(
            SessionConfig::new(0, 10, 1).validate(),
            Err(QuizError::InvalidConfig(_))
        ));
        assert!(SessionConfig::new(0, 10, 7).validate().is_ok());
        assert_eq!(
            SessionConfig::new(0, 10, 8).validate(),
            Err(QuizError::InsufficientChoices {
                requested: 8,
                available: 6
            })
        );
    }

    #[test]
    fn test_ledger_line_bounds() {
        let config = SessionConfig::from_yaml("max-ledger-lines: 1\n").unwrap();
        assert_eq!(config.max_ledger_lines, 1);
        assert_eq!(config.session_seconds, 60);

        assert!(SessionConfig::from_yaml("max-ledger-lines: 0\n").is_ok());
        assert!(SessionConfig::default().with_max_ledger_lines(3).validate().is_ok());
        assert!(matches!(
            SessionConfig::from_yaml("max-ledger-lines: 4\n"),
            Err(QuizError::InvalidConfig(_))
        ));
        assert!(matches!(
            SessionConfig::default().with_max_ledger_lines(9).validate(),
            Err(QuizError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bare_config_allows_any_length() {
        let config = SessionConfig::from_yaml("session-seconds: 45\n").unwrap();
        assert_eq!(config.session_seconds, 45);
    }

    #[test]
    fn test_settings_require_duration_preset() {
        let result = QuizSettings::from_yaml("session:\n  session-seconds: 45\n");
        assert!(matches!(result, Err(QuizError::InvalidConfig(_))));
        for seconds in DURATION_PRESETS {
            let source = format!("session:\n  session-seconds: {}\n", seconds);
            assert!(QuizSettings::from_yaml(&source).is_ok());
        }
        assert_eq!(check_duration_preset(30), Ok(30));
    }

    #[test]
    fn test_settings_file() {
        let source = "clef: bass\nbank-dir: ./banks\nsession:\n  session-seconds: 120\n";
        let settings = QuizSettings::from_yaml(source).unwrap();
        assert_eq!(settings.clef().unwrap(), Clef::Bass);
        assert_eq!(settings.bank_dir, Some(PathBuf::from("./banks")));
        assert_eq!(settings.session.session_seconds, 120);
        assert_eq!(settings.session.choice_count, 4);
    }

    #[test]
    fn test_settings_unknown_clef() {
        let result = QuizSettings::from_yaml("clef: soprano\n");
        assert!(matches!(result, Err(QuizError::InvalidConfig(_))));
    }
}
