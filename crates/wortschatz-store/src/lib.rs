//! Durable storage for the saved-word notebook.
//!
//! One JSON file holds the whole collection; every mutation rewrites it
//! synchronously. A slot that is absent, unreadable, or malformed loads
//! as an empty notebook, never as an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use wortschatz_types::{SavedWord, WordEntry, epoch_millis};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("\"{word}\" is already in the notebook")]
    Duplicate { word: String },

    #[error("failed to write the notebook: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode the notebook: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Single-writer, most-recent-first word store.
pub struct WordStore {
    path: PathBuf,
    words: Vec<SavedWord>,
}

impl WordStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let words = read_slot(&path);
        Self { path, words }
    }

    /// Current collection, most recently saved first.
    pub fn words(&self) -> &[SavedWord] {
        &self.words
    }

    /// Save a looked-up entry. Rejects words already present, compared
    /// case-insensitively, without touching storage.
    pub fn add(&mut self, entry: WordEntry) -> Result<SavedWord, StoreError> {
        let needle = entry.word.to_lowercase();
        if self
            .words
            .iter()
            .any(|w| w.entry.word.to_lowercase() == needle)
        {
            return Err(StoreError::Duplicate { word: entry.word });
        }

        let saved = SavedWord {
            id: Uuid::new_v4().to_string(),
            saved_at: epoch_millis(),
            entry,
        };
        self.words.insert(0, saved.clone());
        self.persist()?;
        Ok(saved)
    }

    /// Delete by id. An unknown id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.words.len();
        self.words.retain(|w| w.id != id);
        if self.words.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Replace the whole collection. The store does no merging; the caller
    /// is responsible for the new contents.
    pub fn replace_all(&mut self, words: Vec<SavedWord>) -> Result<(), StoreError> {
        self.words = words;
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.words)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Full rewrite through a sibling temp file so the slot is never
        // observed half-written.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_slot(path: &Path) -> Vec<SavedWord> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("unreadable word store {}: {e}", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str(&data) {
        Ok(words) => words,
        Err(e) => {
            tracing::warn!("malformed word store {}: {e}", path.display());
            Vec::new()
        }
    }
}
