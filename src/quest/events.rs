//! Events emitted by the quest machine
//!
//! The presentation layer renders from these; the persistence layer listens
//! for `LocationVisited` and `QuestCompleted`.

use serde::{Deserialize, Serialize};

use crate::core::types::{LatLng, QuestionId, SessionId};
use crate::evaluator::Verdict;
use crate::questions::QuestionType;
use crate::quest::reward::RewardOffer;
use crate::sensors::SensorError;
use crate::tracker::ProximityReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestEvent {
    QuestionsShuffled { count: usize },
    QuestStarted { session: SessionId, total_questions: usize },
    QuestionPresented {
        index: usize,
        total: usize,
        question: QuestionId,
        question_type: QuestionType,
    },
    AnswerEvaluated { question: QuestionId, verdict: Verdict, score: u32 },
    ChallengeArmed { question: QuestionId, target: LatLng, location_name: String },
    Proximity(ProximityReport),
    Heading { relative_bearing_deg: f64 },
    SensorUnavailable { reason: SensorError },
    Arrived { question: QuestionId, bonus: u32, score: u32 },
    LocationVisited { session: SessionId, name: String },
    RewardOffered(RewardOffer),
    DiscountClaimed { code: String, bonus: u32, score: u32 },
    ChallengeSkipped { question: QuestionId },
    QuestCompleted { session: SessionId, final_score: u32 },
    Defeated { question: QuestionId, score: u32 },
    Retrying { question: QuestionId },
    Restarted,
}
