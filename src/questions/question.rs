//! Typed question records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::{LatLng, QuestionId};

/// Multiple-choice slot label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    /// Fixed scan order used when resolving the correct label
    pub const ALL: [ChoiceLabel; 4] = [
        ChoiceLabel::A,
        ChoiceLabel::B,
        ChoiceLabel::C,
        ChoiceLabel::D,
    ];

    pub fn index(self) -> usize {
        match self {
            ChoiceLabel::A => 0,
            ChoiceLabel::B => 1,
            ChoiceLabel::C => 2,
            ChoiceLabel::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceLabel::A => "A",
            ChoiceLabel::B => "B",
            ChoiceLabel::C => "C",
            ChoiceLabel::D => "D",
        }
    }
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ChoiceLabel::A),
            "B" => Ok(ChoiceLabel::B),
            "C" => Ok(ChoiceLabel::C),
            "D" => Ok(ChoiceLabel::D),
            other => Err(format!("'{}' is not a choice label (A-D)", other)),
        }
    }
}

/// Which kind of puzzle a question is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    MultipleChoice,
    PictureMatch,
    WordPuzzle,
    ConnectPuzzle,
}

impl QuestionType {
    /// Parse the source's type column. Anything unknown is multiple choice.
    pub fn from_source(raw: &str) -> Self {
        match raw.trim() {
            "picture_match" => QuestionType::PictureMatch,
            "word_puzzle" => QuestionType::WordPuzzle,
            "connect_puzzle" => QuestionType::ConnectPuzzle,
            _ => QuestionType::MultipleChoice,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::PictureMatch => "picture-match",
            QuestionType::WordPuzzle => "word-puzzle",
            QuestionType::ConnectPuzzle => "connect-puzzle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub choices: [String; 4],
    pub correct: ChoiceLabel,
}

impl MultipleChoice {
    pub fn choice(&self, label: ChoiceLabel) -> &str {
        &self.choices[label.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureMatch {
    pub options: [String; 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPuzzle {
    pub scrambled_letters: String,
}

impl WordPuzzle {
    /// Letter tiles in display order
    pub fn tiles(&self) -> Vec<char> {
        self.scrambled_letters.chars().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectPuzzle {
    pub pieces: [String; 4],
    pub expected_order: Vec<String>,
}

/// Dot labels of the connect puzzle, in the order they must be joined
pub const CONNECT_DOT_ORDER: [&str; 4] = ["1", "2", "3", "4"];

impl ConnectPuzzle {
    pub fn new(pieces: [String; 4]) -> Self {
        Self {
            pieces,
            expected_order: CONNECT_DOT_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-type data. The variant *is* the question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    MultipleChoice(MultipleChoice),
    PictureMatch(PictureMatch),
    WordPuzzle(WordPuzzle),
    ConnectPuzzle(ConnectPuzzle),
}

/// One trivia question and the place it unlocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    /// Verbatim correct answer; doubles as the location name
    pub correct_answer_text: String,
    pub target: LatLng,
    pub is_commercial: bool,
    pub payload: Payload,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.payload {
            Payload::MultipleChoice(_) => QuestionType::MultipleChoice,
            Payload::PictureMatch(_) => QuestionType::PictureMatch,
            Payload::WordPuzzle(_) => QuestionType::WordPuzzle,
            Payload::ConnectPuzzle(_) => QuestionType::ConnectPuzzle,
        }
    }

    /// The label a player must produce: a choice letter for multiple
    /// choice, the answer text for everything else
    pub fn correct_answer_label(&self) -> &str {
        match &self.payload {
            Payload::MultipleChoice(mc) => mc.correct.as_str(),
            _ => &self.correct_answer_text,
        }
    }

    /// Name shown for the target location
    pub fn location_name(&self) -> &str {
        &self.correct_answer_text
    }
}
