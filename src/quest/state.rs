//! Play session state

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{QuestionId, SessionId};

/// Where the quest currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestState {
    NotStarted,
    AwaitingAnswer,
    /// Verdict is on screen; the transition fires when the feedback timer does
    Feedback { correct: bool },
    AwaitingArrival,
    /// Arrived at a commercial location, discount on offer
    Reward,
    Victory,
    Defeat,
}

impl QuestState {
    pub fn is_finished(self) -> bool {
        matches!(self, QuestState::Victory | QuestState::Defeat)
    }
}

impl fmt::Display for QuestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestState::NotStarted => f.write_str("NotStarted"),
            QuestState::AwaitingAnswer => f.write_str("AwaitingAnswer"),
            QuestState::Feedback { correct: true } => f.write_str("Feedback(correct)"),
            QuestState::Feedback { correct: false } => f.write_str("Feedback(wrong)"),
            QuestState::AwaitingArrival => f.write_str("AwaitingArrival"),
            QuestState::Reward => f.write_str("Reward"),
            QuestState::Victory => f.write_str("Victory"),
            QuestState::Defeat => f.write_str("Defeat"),
        }
    }
}

/// One playthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    pub id: SessionId,
    /// Play order; ids point into the question bank
    pub order: Vec<QuestionId>,
    pub current_index: usize,
    pub score: u32,
    pub state: QuestState,
}

impl PlaySession {
    pub fn new(order: Vec<QuestionId>) -> Self {
        Self {
            id: SessionId::new(),
            order,
            current_index: 0,
            score: 0,
            state: QuestState::NotStarted,
        }
    }

    pub fn current_question(&self) -> Option<QuestionId> {
        self.order.get(self.current_index).copied()
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.current_index)
    }
}
