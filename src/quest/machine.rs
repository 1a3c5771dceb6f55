//! Quest state machine
//!
//! Owns the play session, the question bank, the geo-challenge tracker and
//! the play-order RNG. Every public operation either applies a transition
//! or returns `QuestError::IllegalTransition` with the state untouched.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

use crate::core::config::QuestConfig;
use crate::core::error::{QuestError, Result};
use crate::core::types::{HeadingSample, PositionFix, SessionId};
use crate::evaluator::{self, Answer, DotSelection, LetterSelection, Verdict};
use crate::questions::{Payload, Question, QuestionBank};
use crate::sensors::{HeadingSensor, LocationSensor};
use crate::tracker::{GeoChallengeTracker, TrackerSignal, TrackerStatus};

use super::events::QuestEvent;
use super::reward::ActiveReward;
use super::state::{PlaySession, QuestState};
use super::timer::{FeedbackTimer, PendingTransition};

/// Tap-by-tap input for the current puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleInput {
    None,
    Letters(LetterSelection),
    Dots(DotSelection),
}

pub struct QuestMachine {
    bank: QuestionBank,
    tracker: GeoChallengeTracker,
    config: QuestConfig,
    rng: ChaCha8Rng,
    session: PlaySession,
    timer: FeedbackTimer,
    clock: Duration,
    puzzle: PuzzleInput,
    reward: Option<ActiveReward>,
    events: Vec<QuestEvent>,
}

impl QuestMachine {
    pub fn new(
        bank: QuestionBank,
        location: Box<dyn LocationSensor>,
        heading: Option<Box<dyn HeadingSensor>>,
        config: QuestConfig,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let tracker = GeoChallengeTracker::new(location, heading, &config);
        let order = bank.shuffle(&mut rng);
        let count = order.len();

        Self {
            bank,
            tracker,
            config,
            rng,
            session: PlaySession::new(order),
            timer: FeedbackTimer::new(),
            clock: Duration::ZERO,
            puzzle: PuzzleInput::None,
            reward: None,
            events: vec![QuestEvent::QuestionsShuffled { count }],
        }
    }

    // === Queries ===

    pub fn state(&self) -> QuestState {
        self.session.state
    }

    pub fn session(&self) -> &PlaySession {
        &self.session
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session
            .current_question()
            .and_then(|id| self.bank.get(id))
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn tracker(&self) -> &GeoChallengeTracker {
        &self.tracker
    }

    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    pub fn puzzle(&self) -> &PuzzleInput {
        &self.puzzle
    }

    pub fn active_reward(&self) -> Option<&ActiveReward> {
        self.reward.as_ref()
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<QuestEvent> {
        std::mem::take(&mut self.events)
    }

    // === Player actions ===

    /// Begin the quest at question 0 of the current play order
    pub fn start(&mut self) -> Result<QuestState> {
        self.require("start", |s| s == QuestState::NotStarted)?;
        if self.bank.is_empty() {
            tracing::warn!("Cannot start: no questions loaded");
            return Err(QuestError::EmptyQuestionBank);
        }

        self.session.id = SessionId::new();
        self.session.score = 0;
        self.session.current_index = 0;
        self.session.state = QuestState::AwaitingAnswer;
        tracing::info!("Quest started with {} questions", self.session.total());
        self.emit(QuestEvent::QuestStarted {
            session: self.session.id,
            total_questions: self.session.total(),
        });
        self.present_question();

        Ok(self.state())
    }

    /// Judge an answer for the current question
    ///
    /// A mismatched answer kind is rejected without a verdict.
    pub fn submit_answer(&mut self, answer: Answer) -> Result<Verdict> {
        self.require("submit_answer", |s| s == QuestState::AwaitingAnswer)?;
        let question = self.question_or_err()?;
        let verdict = evaluator::evaluate(question, &answer, self.config.scoring.correct_answer)?;
        let question_id = question.id;

        self.session.score += verdict.score_delta;
        tracing::info!(
            "Answer to {} was {} (score {})",
            question_id,
            if verdict.correct { "correct" } else { "wrong" },
            self.session.score
        );
        self.emit(QuestEvent::AnswerEvaluated {
            question: question_id,
            verdict,
            score: self.session.score,
        });

        let transition = if verdict.correct {
            PendingTransition::BeginChallenge
        } else {
            PendingTransition::Defeat
        };
        let delay = self.config.timing.feedback_delay();
        if delay.is_zero() {
            self.fire(transition);
        } else {
            self.session.state = QuestState::Feedback { correct: verdict.correct };
            self.timer.arm(self.clock, delay, transition);
        }

        Ok(verdict)
    }

    /// Tap a letter tile of a word puzzle
    pub fn toggle_letter(&mut self, tile: usize) -> Result<bool> {
        self.require("toggle_letter", |s| s == QuestState::AwaitingAnswer)?;
        match &mut self.puzzle {
            PuzzleInput::Letters(selection) => selection.toggle(tile),
            _ => Err(self.mismatch("letters")),
        }
    }

    /// Submit the selected letters of a word puzzle
    pub fn submit_letters(&mut self) -> Result<Verdict> {
        self.require("submit_letters", |s| s == QuestState::AwaitingAnswer)?;
        let word = match &self.puzzle {
            PuzzleInput::Letters(selection) => selection.word(),
            _ => return Err(self.mismatch("letters")),
        };
        self.submit_answer(Answer::Letters(word))
    }

    /// Connect a dot; the fourth dot submits the sequence
    pub fn connect_dot(&mut self, label: &str) -> Result<Option<Verdict>> {
        self.require("connect_dot", |s| s == QuestState::AwaitingAnswer)?;
        let complete = match &mut self.puzzle {
            PuzzleInput::Dots(selection) => selection.connect(label)?,
            _ => return Err(self.mismatch("dots")),
        };
        match complete {
            Some(sequence) => self.submit_answer(Answer::Dots(sequence)).map(Some),
            None => Ok(None),
        }
    }

    /// Physical arrival at the current target
    pub fn on_arrived(&mut self) -> Result<QuestState> {
        self.require("on_arrived", |s| s == QuestState::AwaitingArrival)?;
        self.tracker.stop();

        let question = self.question_or_err()?;
        let question_id = question.id;
        let name = question.location_name().to_string();
        let commercial = question.is_commercial;

        let bonus = self.config.scoring.arrival_bonus;
        self.session.score += bonus;
        self.emit(QuestEvent::Arrived {
            question: question_id,
            bonus,
            score: self.session.score,
        });
        self.emit(QuestEvent::LocationVisited {
            session: self.session.id,
            name: name.clone(),
        });

        if commercial {
            let offer = self.config.rewards.offer_for(&name);
            tracing::info!("Reward offered at {}: {}", name, offer.code);
            self.emit(QuestEvent::RewardOffered(offer.clone()));
            self.reward = Some(ActiveReward { offer, claimed: false });
            self.session.state = QuestState::Reward;
        } else {
            self.advance();
        }

        Ok(self.state())
    }

    /// Give up on walking to the current target
    pub fn skip(&mut self) -> Result<QuestState> {
        self.require("skip", |s| s == QuestState::AwaitingArrival)?;
        self.tracker.stop();

        if let Some(id) = self.session.current_question() {
            tracing::info!("Challenge for {} skipped", id);
            self.emit(QuestEvent::ChallengeSkipped { question: id });
        }
        self.advance();

        Ok(self.state())
    }

    /// Claim the discount on offer. Pays out once per reward.
    pub fn claim_discount(&mut self) -> Result<u32> {
        self.require("claim_discount", |s| s == QuestState::Reward)?;
        let reward = match self.reward.as_mut() {
            Some(reward) if !reward.claimed => reward,
            Some(_) => {
                return Err(QuestError::InvalidInput("discount already claimed".into()));
            }
            None => {
                return Err(QuestError::IllegalTransition {
                    action: "claim_discount",
                    state: self.session.state.to_string(),
                });
            }
        };

        reward.claimed = true;
        let code = reward.offer.code.clone();
        let bonus = self.config.scoring.discount_claim;
        self.session.score += bonus;
        self.emit(QuestEvent::DiscountClaimed {
            code,
            bonus,
            score: self.session.score,
        });

        Ok(self.session.score)
    }

    /// Leave the reward screen and move on
    pub fn continue_quest(&mut self) -> Result<QuestState> {
        self.require("continue_quest", |s| s == QuestState::Reward)?;
        self.advance();
        Ok(self.state())
    }

    /// Try the question that was answered wrong again, score untouched
    pub fn retry(&mut self) -> Result<QuestState> {
        self.require("retry", |s| s == QuestState::Defeat)?;
        if let Some(id) = self.session.current_question() {
            self.emit(QuestEvent::Retrying { question: id });
        }
        self.session.state = QuestState::AwaitingAnswer;
        self.present_question();
        Ok(self.state())
    }

    /// Back to the start with a fresh play order. Valid from any state.
    pub fn restart(&mut self) -> QuestState {
        self.tracker.stop();
        self.timer.cancel();
        self.reward = None;
        self.puzzle = PuzzleInput::None;

        let order = self.bank.shuffle(&mut self.rng);
        let count = order.len();
        self.session = PlaySession::new(order);
        tracing::info!("Quest restarted");
        self.emit(QuestEvent::QuestionsShuffled { count });
        self.emit(QuestEvent::Restarted);

        self.state()
    }

    // === External events ===

    /// Advance the logical clock, firing the feedback timer if due
    pub fn advance_time(&mut self, elapsed: Duration) -> QuestState {
        self.clock += elapsed;
        if let Some(transition) = self.timer.poll(self.clock) {
            self.fire(transition);
        }
        self.poll();
        self.state()
    }

    /// Drain sensor readings from the tracker's subscriptions
    pub fn poll(&mut self) {
        if self.session.state != QuestState::AwaitingArrival {
            return;
        }
        for signal in self.tracker.poll() {
            self.handle_signal(signal);
        }
    }

    /// Push a position fix directly
    pub fn on_fix(&mut self, fix: PositionFix) {
        if self.session.state != QuestState::AwaitingArrival {
            tracing::debug!("Ignoring fix in state {}", self.session.state);
            return;
        }
        if let Some(signal) = self.tracker.on_fix(fix) {
            self.handle_signal(signal);
        }
    }

    /// Push a heading sample directly
    pub fn on_heading(&mut self, sample: HeadingSample) {
        if let Some(relative_bearing_deg) = self.tracker.on_heading(sample) {
            self.emit(QuestEvent::Heading { relative_bearing_deg });
        }
    }

    // === Internals ===

    fn handle_signal(&mut self, signal: TrackerSignal) {
        match signal {
            TrackerSignal::Progress(report) => self.emit(QuestEvent::Proximity(report)),
            TrackerSignal::Heading { relative_bearing_deg } => {
                self.emit(QuestEvent::Heading { relative_bearing_deg })
            }
            TrackerSignal::Unavailable(reason) => {
                self.emit(QuestEvent::SensorUnavailable { reason })
            }
            TrackerSignal::Arrived(report) => {
                self.emit(QuestEvent::Proximity(report));
                if let Err(e) = self.on_arrived() {
                    tracing::warn!("Arrival not applied: {}", e);
                }
            }
        }
    }

    fn fire(&mut self, transition: PendingTransition) {
        match transition {
            PendingTransition::BeginChallenge => self.begin_challenge(),
            PendingTransition::Defeat => {
                self.tracker.stop();
                self.session.state = QuestState::Defeat;
                if let Some(id) = self.session.current_question() {
                    tracing::info!("Quest lost on {} with score {}", id, self.session.score);
                    self.emit(QuestEvent::Defeated {
                        question: id,
                        score: self.session.score,
                    });
                }
            }
        }
    }

    fn begin_challenge(&mut self) {
        let (id, target, name) = match self.current_question() {
            Some(q) => (q.id, q.target, q.location_name().to_string()),
            None => return,
        };

        self.session.state = QuestState::AwaitingArrival;
        let status = self.tracker.start(target).clone();
        self.emit(QuestEvent::ChallengeArmed {
            question: id,
            target,
            location_name: name,
        });
        if let TrackerStatus::Unavailable(reason) = status {
            self.emit(QuestEvent::SensorUnavailable { reason });
        }
    }

    /// Next question, or victory after the last one
    fn advance(&mut self) {
        self.reward = None;
        self.session.current_index += 1;

        if self.session.current_index >= self.session.total() {
            self.tracker.stop();
            self.timer.cancel();
            self.puzzle = PuzzleInput::None;
            self.session.state = QuestState::Victory;
            tracing::info!("Quest complete with score {}", self.session.score);
            self.emit(QuestEvent::QuestCompleted {
                session: self.session.id,
                final_score: self.session.score,
            });
        } else {
            self.session.state = QuestState::AwaitingAnswer;
            self.present_question();
        }
    }

    fn present_question(&mut self) {
        let (id, question_type, puzzle) = match self.current_question() {
            Some(q) => {
                let puzzle = match &q.payload {
                    Payload::WordPuzzle(word) => {
                        PuzzleInput::Letters(LetterSelection::new(word.tiles()))
                    }
                    Payload::ConnectPuzzle(_) => PuzzleInput::Dots(DotSelection::new()),
                    _ => PuzzleInput::None,
                };
                (q.id, q.question_type(), puzzle)
            }
            None => return,
        };

        self.puzzle = puzzle;
        tracing::debug!(
            "Presenting question {} of {} ({})",
            self.session.current_index + 1,
            self.session.total(),
            id
        );
        self.emit(QuestEvent::QuestionPresented {
            index: self.session.current_index,
            total: self.session.total(),
            question: id,
            question_type,
        });
    }

    fn require(&self, action: &'static str, allowed: impl Fn(QuestState) -> bool) -> Result<()> {
        if allowed(self.session.state) {
            Ok(())
        } else {
            tracing::debug!("Ignoring {} in state {}", action, self.session.state);
            Err(QuestError::IllegalTransition {
                action,
                state: self.session.state.to_string(),
            })
        }
    }

    fn question_or_err(&self) -> Result<&Question> {
        self.current_question().ok_or(QuestError::EmptyQuestionBank)
    }

    fn mismatch(&self, got: &'static str) -> QuestError {
        QuestError::AnswerMismatch {
            expected: self
                .current_question()
                .map_or_else(|| "missing".to_string(), |q| q.question_type().to_string()),
            got,
        }
    }

    fn emit(&mut self, event: QuestEvent) {
        self.events.push(event);
    }
}

impl std::fmt::Debug for QuestMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestMachine")
            .field("session", &self.session)
            .field("tracker", &self.tracker)
            .field("clock", &self.clock)
            .finish()
    }
}
