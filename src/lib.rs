//! Geo Quest - location-based trivia quest engine
//!
//! Answer a question, walk to the place it names, collect the bonus.

pub mod core;
pub mod evaluator;
pub mod geodesy;
pub mod journal;
pub mod quest;
pub mod questions;
pub mod sensors;
pub mod tracker;
