//! The quest itself: play session, transitions, rewards and events

pub mod events;
pub mod machine;
pub mod reward;
pub mod state;
pub mod timer;

pub use events::QuestEvent;
pub use machine::{PuzzleInput, QuestMachine};
pub use reward::{ActiveReward, RewardOffer};
pub use state::{PlaySession, QuestState};
pub use timer::{FeedbackTimer, PendingTransition};
