//! Answer checking, one checker per puzzle type
//!
//! Each payload type implements [`AnswerCheck`] for the input it expects.
//! [`evaluate`] pairs the submitted [`Answer`] with the question's payload
//! and refuses pairs that do not belong together.

pub mod selection;

use serde::{Deserialize, Serialize};

use crate::core::error::{QuestError, Result};
use crate::questions::{
    ChoiceLabel, ConnectPuzzle, MultipleChoice, Payload, PictureMatch, Question, WordPuzzle,
};

pub use selection::{DotSelection, LetterSelection};

/// Dots a connect puzzle needs before it can be judged, no more and no fewer
pub const CONNECT_DOTS_REQUIRED: usize = 4;

/// What the player submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Choice(ChoiceLabel),
    Picture(String),
    /// Selected letter tiles, in selection order
    Letters(String),
    /// Connected dot labels, in connection order
    Dots(Vec<String>),
}

impl Answer {
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Choice(_) => "choice",
            Answer::Picture(_) => "picture",
            Answer::Letters(_) => "letters",
            Answer::Dots(_) => "dots",
        }
    }
}

/// Outcome of checking one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub score_delta: u32,
}

impl Verdict {
    fn scored(correct: bool, points: u32) -> Self {
        Self {
            correct,
            score_delta: if correct { points } else { 0 },
        }
    }
}

/// Correctness check for one payload type
pub trait AnswerCheck {
    type Input: ?Sized;

    fn is_correct(&self, input: &Self::Input, question: &Question) -> bool;
}

impl AnswerCheck for MultipleChoice {
    type Input = ChoiceLabel;

    fn is_correct(&self, input: &ChoiceLabel, _question: &Question) -> bool {
        *input == self.correct
    }
}

impl AnswerCheck for PictureMatch {
    type Input = str;

    fn is_correct(&self, input: &str, question: &Question) -> bool {
        input == question.correct_answer_text
    }
}

impl AnswerCheck for WordPuzzle {
    type Input = str;

    fn is_correct(&self, input: &str, question: &Question) -> bool {
        input.to_lowercase() == question.correct_answer_text.to_lowercase()
    }
}

impl AnswerCheck for ConnectPuzzle {
    type Input = [String];

    fn is_correct(&self, input: &[String], _question: &Question) -> bool {
        input == self.expected_order.as_slice()
    }
}

/// Judge `answer` against `question`, awarding `points` when correct
pub fn evaluate(question: &Question, answer: &Answer, points: u32) -> Result<Verdict> {
    let correct = match (&question.payload, answer) {
        (Payload::MultipleChoice(mc), Answer::Choice(label)) => mc.is_correct(label, question),
        (Payload::PictureMatch(pm), Answer::Picture(option)) => pm.is_correct(option, question),
        (Payload::WordPuzzle(wp), Answer::Letters(letters)) => wp.is_correct(letters, question),
        (Payload::ConnectPuzzle(cp), Answer::Dots(dots)) => {
            if dots.len() < CONNECT_DOTS_REQUIRED {
                return Err(QuestError::Incomplete(format!(
                    "{} of {} dots connected",
                    dots.len(),
                    CONNECT_DOTS_REQUIRED
                )));
            }
            if dots.len() > CONNECT_DOTS_REQUIRED {
                return Err(QuestError::InvalidInput(format!(
                    "{} dots connected, the puzzle has {}",
                    dots.len(),
                    CONNECT_DOTS_REQUIRED
                )));
            }
            cp.is_correct(dots, question)
        }
        (_, other) => {
            return Err(QuestError::AnswerMismatch {
                expected: question.question_type().to_string(),
                got: other.kind(),
            })
        }
    };

    Ok(Verdict::scored(correct, points))
}

impl Question {
    /// The answer that wins this question
    pub fn solution(&self) -> Answer {
        match &self.payload {
            Payload::MultipleChoice(mc) => Answer::Choice(mc.correct),
            Payload::PictureMatch(_) => Answer::Picture(self.correct_answer_text.clone()),
            Payload::WordPuzzle(_) => Answer::Letters(self.correct_answer_text.clone()),
            Payload::ConnectPuzzle(cp) => Answer::Dots(cp.expected_order.clone()),
        }
    }
}
