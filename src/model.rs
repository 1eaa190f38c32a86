//! # Note Model
//!
//! Value types shared by the bank, the question generator and the session engine.
//!
//! ## Type Hierarchy
//! ```text
//! NoteBank (bank.rs)
//!   ├── clef: Clef (treble | bass | alto | tenor)
//!   └── Vec<NoteEntry>
//!         ├── note: NoteName (C D E F G A B)
//!         └── imgs: Vec<String> (image identifiers, e.g. "A4.png")
//! ```
//!
//! ## Label Alphabet
//! Answer labels are always drawn from all seven natural note names
//! ([`NoteName::ALL`]), not only from the names present in a bank. A bank that
//! only contains `A` and `B` still produces distractors like `F` or `C`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QuizError;

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// The full label alphabet, in scale order.
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    /// Parse a note name like "A" or "g".
    ///
    /// Octave-qualified names from older banks ("A4", "c5") are accepted and the
    /// octave is dropped, since the quiz only asks for the letter.
    pub fn from_str(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let name = match chars.next()?.to_ascii_uppercase() {
            'C' => NoteName::C,
            'D' => NoteName::D,
            'E' => NoteName::E,
            'F' => NoteName::F,
            'G' => NoteName::G,
            'A' => NoteName::A,
            'B' => NoteName::B,
            _ => return None,
        };
        if chars.all(|c| c.is_ascii_digit()) {
            Some(name)
        } else {
            None
        }
    }

    /// Parse a submitted answer, rejecting anything that is not a note name.
    pub fn parse_label(s: &str) -> Result<Self, QuizError> {
        Self::from_str(s).ok_or_else(|| QuizError::InvalidLabel(s.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clef types a bank can be drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    pub const ALL: [Clef; 4] = [Clef::Treble, Clef::Bass, Clef::Alto, Clef::Tenor];

    /// Parse a clef name like "treble" or "Bass"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "treble" => Some(Clef::Treble),
            "bass" => Some(Clef::Bass),
            "alto" => Some(Clef::Alto),
            "tenor" => Some(Clef::Tenor),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, QuizError> {
        Self::from_str(s).ok_or_else(|| QuizError::InvalidConfig(format!("Unknown clef: {}", s)))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
            Clef::Alto => "alto",
            Clef::Tenor => "tenor",
        }
    }

    /// Bottom and top staff lines
    pub fn staff_lines(&self) -> (Pitch, Pitch) {
        match self {
            Clef::Treble => (Pitch::new(NoteName::E, 4), Pitch::new(NoteName::F, 5)),
            Clef::Bass => (Pitch::new(NoteName::G, 2), Pitch::new(NoteName::A, 3)),
            Clef::Alto => (Pitch::new(NoteName::F, 3), Pitch::new(NoteName::G, 4)),
            Clef::Tenor => (Pitch::new(NoteName::D, 3), Pitch::new(NoteName::E, 4)),
        }
    }

    /// Ledger lines needed to draw `pitch` on this clef's staff.
    ///
    /// ```
    /// # use clefquiz::{Clef, NoteName, Pitch};
    /// assert_eq!(Clef::Treble.ledger_lines(Pitch::new(NoteName::C, 4)), 1);
    /// assert_eq!(Clef::Treble.ledger_lines(Pitch::new(NoteName::B, 3)), 1);
    /// assert_eq!(Clef::Treble.ledger_lines(Pitch::new(NoteName::G, 4)), 0);
    /// assert_eq!(Clef::Bass.ledger_lines(Pitch::new(NoteName::C, 4)), 1);
    /// ```
    pub fn ledger_lines(&self, pitch: Pitch) -> u8 {
        let (bottom, top) = self.staff_lines();
        let step = pitch.staff_step();
        // Ledger lines sit every second step beyond the outer staff lines
        let beyond = if step < bottom.staff_step() {
            bottom.staff_step() - step
        } else if step > top.staff_step() {
            step - top.staff_step()
        } else {
            0
        };
        u8::try_from(beyond / 2).unwrap_or(u8::MAX)
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note name with its octave, as in scientific pitch notation (C4 is middle C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub name: NoteName,
    pub octave: i8,
}

impl Pitch {
    pub fn new(name: NoteName, octave: i8) -> Self {
        Self { name, octave }
    }

    /// Read the pitch out of an image identifier such as "A4.png",
    /// "treble/C6.svg" or "G2-alt.png".
    ///
    /// Returns `None` when the file name does not start with a note letter
    /// followed by an octave digit.
    pub fn from_image_id(image_id: &str) -> Option<Self> {
        let file = image_id.rsplit('/').next()?;
        let mut chars = file.chars();
        let name = NoteName::from_str(&chars.next()?.to_string())?;
        let digits: String = chars.take_while(|c| c.is_ascii_digit()).collect();
        let octave = digits.parse::<i8>().ok()?;
        Some(Self::new(name, octave))
    }

    /// Position on the diatonic scale, counting lines and spaces from C0
    pub fn staff_step(&self) -> i32 {
        let degree = NoteName::ALL
            .iter()
            .position(|n| *n == self.name)
            .unwrap_or_default() as i32;
        i32::from(self.octave) * 7 + degree
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// A note label with the images that show it on the staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    #[serde(deserialize_with = "deserialize_note_name")]
    pub note: NoteName,
    pub imgs: Vec<String>,
}

impl NoteEntry {
    pub fn new<I, S>(note: NoteName, imgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            note,
            imgs: imgs.into_iter().map(Into::into).collect(),
        }
    }
}

// Bank files write labels as strings ("A", "A4"), so go through `from_str`
// rather than the derived variant-name matching.
fn deserialize_note_name<'de, D>(deserializer: D) -> Result<NoteName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NoteName::from_str(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid note name: {}", raw)))
}
