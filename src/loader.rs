//! Note bank loaders
//!
//! A loader fetches the raw entries for a clef. It does not validate them as
//! a bank: an empty list is a successful load that the session then rejects
//! with [`QuizError::InvalidBank`]. Any failure to fetch or parse is a
//! [`QuizError::LoadError`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::bank::{self, BankFormat};
use crate::error::QuizError;
use crate::model::{Clef, NoteEntry};

#[async_trait]
pub trait NoteBankLoader: Send + Sync {
    async fn load(&self, clef: Clef) -> Result<Vec<NoteEntry>, QuizError>;
}

/// Banks compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

#[async_trait]
impl NoteBankLoader for EmbeddedLoader {
    async fn load(&self, clef: Clef) -> Result<Vec<NoteEntry>, QuizError> {
        bank::embedded_entries(clef)
    }
}

/// Reads `<dir>/<clef>.json`, `<dir>/<clef>.yaml` or `<dir>/<clef>.yml`,
/// in that order.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn find_bank_file(&self, clef: Clef) -> Option<(PathBuf, BankFormat)> {
        for ext in ["json", "yaml", "yml"] {
            let path = self.dir.join(format!("{}.{}", clef.as_str(), ext));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let format = BankFormat::from_extension(ext)?;
                return Some((path, format));
            }
        }
        None
    }
}

#[async_trait]
impl NoteBankLoader for DirectoryLoader {
    async fn load(&self, clef: Clef) -> Result<Vec<NoteEntry>, QuizError> {
        let (path, format) = self.find_bank_file(clef).await.ok_or_else(|| {
            QuizError::LoadError {
                clef,
                message: format!("no {} bank in {}", clef, self.dir.display()),
            }
        })?;

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| QuizError::LoadError {
                clef,
                message: format!("failed to read {}: {}", path.display(), e),
            })?;

        bank::parse_entries(&source, format).map_err(|e| QuizError::LoadError {
            clef,
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Loader over a fixed set of entries, handy for hosts that already hold the
/// bank in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    entries: Vec<(Clef, Vec<NoteEntry>)>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bank(mut self, clef: Clef, entries: Vec<NoteEntry>) -> Self {
        self.entries.retain(|(c, _)| *c != clef);
        self.entries.push((clef, entries));
        self
    }
}

#[async_trait]
impl NoteBankLoader for StaticLoader {
    async fn load(&self, clef: Clef) -> Result<Vec<NoteEntry>, QuizError> {
        self.entries
            .iter()
            .find(|(c, _)| *c == clef)
            .map(|(_, entries)| entries.clone())
            .ok_or_else(|| QuizError::LoadError {
                clef,
                message: "no bank registered".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteName;

    #[tokio::test]
    async fn test_embedded_loader() {
        let entries = EmbeddedLoader.load(Clef::Bass).await.unwrap();
        assert_eq!(entries.len(), 7);
        assert!(EmbeddedLoader.load(Clef::Alto).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_loader_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("treble.json"),
            r#"[{"note": "E", "imgs": ["E4.png"]}]"#,
        )
        .unwrap();

        let loader = DirectoryLoader::new(dir.path());
        let entries = loader.load(Clef::Treble).await.unwrap();
        assert_eq!(entries, vec![NoteEntry::new(NoteName::E, ["E4.png"])]);
    }

    #[tokio::test]
    async fn test_directory_loader_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bass.yml"), "- note: G\n  imgs: [G2.png]\n").unwrap();

        let entries = DirectoryLoader::new(dir.path()).load(Clef::Bass).await.unwrap();
        assert_eq!(entries[0].note, NoteName::G);
    }

    #[tokio::test]
    async fn test_directory_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryLoader::new(dir.path()).load(Clef::Tenor).await.unwrap_err();
        assert!(matches!(err, QuizError::LoadError { clef: Clef::Tenor, .. }));
    }

    #[tokio::test]
    async fn test_directory_loader_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("treble.json"), "{not json").unwrap();
        let err = DirectoryLoader::new(dir.path()).load(Clef::Treble).await.unwrap_err();
        assert!(matches!(err, QuizError::LoadError { .. }));
    }

    #[tokio::test]
    async fn test_empty_file_is_a_successful_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("treble.json"), "[]").unwrap();
        let entries = DirectoryLoader::new(dir.path()).load(Clef::Treble).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_static_loader() {
        let loader = StaticLoader::new()
            .with_bank(Clef::Treble, vec![NoteEntry::new(NoteName::A, ["a"])])
            .with_bank(Clef::Treble, vec![NoteEntry::new(NoteName::B, ["b"])]);
        let entries = loader.load(Clef::Treble).await.unwrap();
        assert_eq!(entries[0].note, NoteName::B);
        assert!(loader.load(Clef::Bass).await.is_err());
    }
}
