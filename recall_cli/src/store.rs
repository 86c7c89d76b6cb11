//! Card collection persistence with file locking.
//!
//! The collection is a single JSON file holding every card plus the
//! collection's creation time (the origin of the Review day index). Loads
//! take a shared lock; saves write through an exclusively-locked temp file
//! and rename atomically. The exclusive lock also serializes concurrent
//! writers, which is what upholds the engine's one-answer-at-a-time
//! precondition for this orchestrator.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use recall_core::{Card, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A flashcard with its scheduling record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredCard {
    pub front: String,
    pub back: String,
    pub state: Card,
}

/// The on-disk card collection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cards: Vec<StoredCard>,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            cards: Vec::new(),
        }
    }
}

impl Collection {
    /// Find a card by unique id prefix
    pub fn find(&self, prefix: &str) -> Option<&StoredCard> {
        let prefix = prefix.to_lowercase();
        let mut matches = self
            .cards
            .iter()
            .filter(|c| c.state.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(card), None) => Some(card),
            _ => None,
        }
    }

    /// Find a card by unique id prefix, mutably
    pub fn find_mut(&mut self, prefix: &str) -> Option<&mut StoredCard> {
        let prefix = prefix.to_lowercase();
        let mut indices = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.state.id.to_string().starts_with(&prefix))
            .map(|(i, _)| i);
        match (indices.next(), indices.next()) {
            (Some(i), None) => self.cards.get_mut(i),
            _ => None,
        }
    }

    /// Add a new card, returning its id
    pub fn add_card(&mut self, front: String, back: String) -> Uuid {
        let id = Uuid::new_v4();
        let position = self.cards.len() as i64;
        self.cards.push(StoredCard {
            front,
            back,
            state: Card::new(id, position),
        });
        id
    }

    /// Load the collection from a file with shared locking
    ///
    /// Returns a fresh collection if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns a fresh one.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No collection file found, starting a new collection");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open collection {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock collection {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read collection {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<Collection>(&contents) {
            Ok(collection) => {
                tracing::debug!(
                    "Loaded {} cards from {:?}",
                    collection.cards.len(),
                    path
                );
                Ok(collection)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse collection {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the collection to a file with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "collection path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old collection file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} cards to {:?}", self.cards.len(), path);
        Ok(())
    }

    /// Load the collection, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Collection) -> Result<()>,
    {
        let mut collection = Self::load(path)?;
        f(&mut collection)?;
        collection.save(path)?;
        Ok(collection)
    }
}
