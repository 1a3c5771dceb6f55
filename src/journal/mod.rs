//! Quest journal: remembers visited locations and the best score
//!
//! Listens to quest events and persists to a JSON file between runs.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;
use crate::quest::QuestEvent;
use crate::questions::QuestionBank;

/// Best score across games
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub best_score: u32,
    pub total_games: u32,
}

impl ScoreRecord {
    /// Count a finished game. Returns true if it set a new best.
    pub fn record_score(&mut self, score: u32) -> bool {
        self.total_games += 1;
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestJournal {
    visited: AHashSet<String>,
    scores: ScoreRecord,
}

/// One line of the journal view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub name: String,
    pub visited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalSummary {
    pub tagged: usize,
    pub remaining: usize,
    pub entries: Vec<JournalEntry>,
}

impl QuestJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty journal
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No journal at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Fold one quest event into the journal
    ///
    /// Returns true when the event changed something worth saving.
    pub fn observe(&mut self, event: &QuestEvent) -> bool {
        match event {
            QuestEvent::LocationVisited { name, .. } => self.mark_visited(name),
            QuestEvent::QuestCompleted { final_score, .. } => {
                if self.scores.record_score(*final_score) {
                    tracing::info!("New best score: {}", final_score);
                }
                true
            }
            _ => false,
        }
    }

    pub fn mark_visited(&mut self, name: &str) -> bool {
        self.visited.insert(name.to_string())
    }

    pub fn has_visited(&self, name: &str) -> bool {
        self.visited.contains(name)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn scores(&self) -> ScoreRecord {
        self.scores
    }

    /// Every location in `bank`, sorted by name, with its visited flag
    pub fn summary(&self, bank: &QuestionBank) -> JournalSummary {
        let mut names: Vec<&str> = bank.questions().iter().map(|q| q.location_name()).collect();
        names.sort_unstable();
        names.dedup();

        let entries: Vec<JournalEntry> = names
            .into_iter()
            .map(|name| JournalEntry {
                name: name.to_string(),
                visited: self.has_visited(name),
            })
            .collect();
        let tagged = entries.iter().filter(|e| e.visited).count();

        JournalSummary {
            tagged,
            remaining: entries.len() - tagged,
            entries,
        }
    }
}
