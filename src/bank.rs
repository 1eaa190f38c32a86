//! # Note Bank
//!
//! A validated, immutable set of [`NoteEntry`] values for one clef.
//!
//! ## Formats
//! Banks are plain lists of entries. JSON uses the same shape the web client
//! shipped with:
//! ```json
//! [{ "note": "A", "imgs": ["A4.png", "A5.png"] }, { "note": "B", "imgs": ["B4.png"] }]
//! ```
//! YAML is the same list:
//! ```yaml
//! - note: A
//!   imgs: [A4.png, A5.png]
//! - note: B
//!   imgs: [B4.png]
//! ```
//!
//! ## Invariants
//! - A bank has at least one entry.
//! - Every entry has at least one image.

use crate::error::QuizError;
use crate::model::{Clef, NoteEntry, NoteName, Pitch};

/// Bank file formats understood by [`NoteBank::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Yaml,
}

impl BankFormat {
    /// Pick a format from a file extension ("json", "yaml", "yml")
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(BankFormat::Json),
            "yaml" | "yml" => Some(BankFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteBank {
    clef: Clef,
    entries: Vec<NoteEntry>,
}

impl NoteBank {
    /// Build a bank, rejecting empty banks and entries without images.
    pub fn new(clef: Clef, entries: Vec<NoteEntry>) -> Result<Self, QuizError> {
        if entries.is_empty() {
            return Err(QuizError::InvalidBank(format!("{} note bank is empty", clef)));
        }
        if let Some(entry) = entries.iter().find(|e| e.imgs.is_empty()) {
            return Err(QuizError::InvalidBank(format!(
                "{} note bank has no images for {}",
                clef, entry.note
            )));
        }
        Ok(Self { clef, entries })
    }

    /// Parse bank source text in the given format.
    pub fn parse(clef: Clef, source: &str, format: BankFormat) -> Result<Self, QuizError> {
        let entries = parse_entries(source, format)?;
        Self::new(clef, entries)
    }

    pub fn from_json(clef: Clef, source: &str) -> Result<Self, QuizError> {
        Self::parse(clef, source, BankFormat::Json)
    }

    pub fn from_yaml(clef: Clef, source: &str) -> Result<Self, QuizError> {
        Self::parse(clef, source, BankFormat::Yaml)
    }

    pub fn clef(&self) -> Clef {
        self.clef
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of images across all entries
    pub fn image_count(&self) -> usize {
        self.entries.iter().map(|e| e.imgs.len()).sum()
    }

    /// Ledger lines an image needs on this bank's clef.
    ///
    /// Images whose identifier carries no pitch ("img1") count as on the staff.
    pub fn ledger_lines(&self, image_id: &str) -> u8 {
        Pitch::from_image_id(image_id).map_or(0, |pitch| self.clef.ledger_lines(pitch))
    }

    /// Number of images needing at most `max_ledger_lines` ledger lines
    pub fn images_within(&self, max_ledger_lines: u8) -> usize {
        self.entries
            .iter()
            .flat_map(|e| e.imgs.iter())
            .filter(|img| self.ledger_lines(img) <= max_ledger_lines)
            .count()
    }

    /// Fail with [`QuizError::InvalidBank`] when no image fits within
    /// `max_ledger_lines`.
    pub fn check_ledger_limit(&self, max_ledger_lines: u8) -> Result<(), QuizError> {
        if self.images_within(max_ledger_lines) == 0 {
            return Err(QuizError::InvalidBank(format!(
                "{} note bank has no images within {} ledger lines",
                self.clef, max_ledger_lines
            )));
        }
        Ok(())
    }

    /// Distinct note names present in the bank, in scale order
    pub fn notes(&self) -> Vec<NoteName> {
        NoteName::ALL
            .iter()
            .copied()
            .filter(|name| self.entries.iter().any(|e| e.note == *name))
            .collect()
    }
}

/// Parse a list of entries without validating it as a bank.
///
/// Loaders use this so that an empty list reaches the engine and is rejected
/// there with [`QuizError::InvalidBank`], instead of failing as a load error.
pub fn parse_entries(source: &str, format: BankFormat) -> Result<Vec<NoteEntry>, QuizError> {
    match format {
        BankFormat::Json => serde_json::from_str(source)
            .map_err(|e| QuizError::InvalidBank(format!("malformed JSON bank: {}", e))),
        BankFormat::Yaml => serde_yaml::from_str(source)
            .map_err(|e| QuizError::InvalidBank(format!("malformed YAML bank: {}", e))),
    }
}

/// Names of the banks compiled into the binary (e.g. "treble.yaml")
pub fn embedded_bank_names() -> Vec<&'static str> {
    clefquiz_banks::list_banks()
}

/// Load the embedded bank for a clef.
pub fn embedded(clef: Clef) -> Result<NoteBank, QuizError> {
    embedded_entries(clef).and_then(|entries| NoteBank::new(clef, entries))
}

/// Raw entries of the embedded bank for a clef.
pub fn embedded_entries(clef: Clef) -> Result<Vec<NoteEntry>, QuizError> {
    let file = format!("{}.yaml", clef.as_str());
    let source = clefquiz_banks::get_bank(&file).ok_or_else(|| QuizError::LoadError {
        clef,
        message: format!("no embedded bank named {}", file),
    })?;
    parse_entries(source, BankFormat::Yaml).map_err(|e| QuizError::LoadError {
        clef,
        message: e.to_string(),
    })
}
