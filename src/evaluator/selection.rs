//! Incremental puzzle input
//!
//! Word and connect puzzles are answered one tap at a time. These buffers
//! collect the taps until the answer is ready to judge.

use crate::core::error::{QuestError, Result};
use crate::questions::CONNECT_DOT_ORDER;

use super::CONNECT_DOTS_REQUIRED;

/// Letter tiles picked so far, tracked by tile position
///
/// Tracking positions rather than letters means deselecting one of two
/// equal letters removes exactly the tile that was tapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterSelection {
    tiles: Vec<char>,
    picked: Vec<usize>,
}

impl LetterSelection {
    pub fn new(tiles: Vec<char>) -> Self {
        Self {
            tiles,
            picked: Vec::new(),
        }
    }

    /// Select or deselect a tile. Returns whether it is now selected.
    pub fn toggle(&mut self, tile: usize) -> Result<bool> {
        if tile >= self.tiles.len() {
            return Err(QuestError::InvalidInput(format!(
                "tile {} out of range (0..{})",
                tile,
                self.tiles.len()
            )));
        }
        match self.picked.iter().position(|&t| t == tile) {
            Some(pos) => {
                self.picked.remove(pos);
                Ok(false)
            }
            None => {
                self.picked.push(tile);
                Ok(true)
            }
        }
    }

    pub fn is_selected(&self, tile: usize) -> bool {
        self.picked.contains(&tile)
    }

    /// Letters in the order they were picked
    pub fn word(&self) -> String {
        self.picked.iter().map(|&t| self.tiles[t]).collect()
    }

    pub fn tiles(&self) -> &[char] {
        &self.tiles
    }
}

/// Dots connected so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotSelection {
    picked: Vec<String>,
}

impl DotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect one more dot
    ///
    /// Returns the full sequence once the required number of dots is
    /// reached, `None` while more are needed.
    pub fn connect(&mut self, label: &str) -> Result<Option<Vec<String>>> {
        let label = label.trim();
        if !CONNECT_DOT_ORDER.contains(&label) {
            return Err(QuestError::InvalidInput(format!("no dot labelled '{}'", label)));
        }
        if self.is_complete() {
            return Err(QuestError::InvalidInput("all dots already connected".into()));
        }

        self.picked.push(label.to_string());
        if self.is_complete() {
            Ok(Some(self.picked.clone()))
        } else {
            Ok(None)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.picked.len() >= CONNECT_DOTS_REQUIRED
    }

    pub fn connected(&self) -> &[String] {
        &self.picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_in_pick_order() {
        let mut sel = LetterSelection::new("MOD".chars().collect());
        sel.toggle(2).unwrap();
        sel.toggle(1).unwrap();
        sel.toggle(0).unwrap();
        assert_eq!(sel.word(), "DOM");
    }

    #[test]
    fn test_deselect_removes_tapped_tile() {
        // two As; deselecting the second must keep the first
        let mut sel = LetterSelection::new("ABA".chars().collect());
        sel.toggle(0).unwrap();
        sel.toggle(1).unwrap();
        sel.toggle(2).unwrap();
        assert_eq!(sel.toggle(2).unwrap(), false);
        assert_eq!(sel.word(), "AB");
        assert!(sel.is_selected(0));
        assert!(!sel.is_selected(2));
    }

    #[test]
    fn test_tile_out_of_range() {
        let mut sel = LetterSelection::new(vec!['A']);
        assert!(matches!(sel.toggle(3), Err(QuestError::InvalidInput(_))));
    }

    #[test]
    fn test_dots_complete_at_four() {
        let mut sel = DotSelection::new();
        assert_eq!(sel.connect("1").unwrap(), None);
        assert_eq!(sel.connect("3").unwrap(), None);
        assert_eq!(sel.connect("2").unwrap(), None);
        let done = sel.connect("4").unwrap().expect("fourth dot completes");
        assert_eq!(done, vec!["1", "3", "2", "4"]);
        assert!(sel.connect("1").is_err());
    }

    #[test]
    fn test_unknown_dot_rejected() {
        let mut sel = DotSelection::new();
        assert!(sel.connect("5").is_err());
        assert!(sel.connected().is_empty());
    }
}
