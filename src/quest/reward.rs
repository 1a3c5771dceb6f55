//! Discounts shown at commercial locations

use serde::{Deserialize, Serialize};

use crate::core::config::RewardConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOffer {
    pub business: String,
    pub description: String,
    pub code: String,
}

impl RewardConfig {
    /// First rule whose pattern occurs in the business name, else the default
    pub fn offer_for(&self, business: &str) -> RewardOffer {
        let template = self
            .offers
            .iter()
            .find(|rule| business.contains(rule.matches.as_str()))
            .map(|rule| &rule.offer)
            .unwrap_or(&self.default);

        RewardOffer {
            business: business.to_string(),
            description: template.description.clone(),
            code: template.code.clone(),
        }
    }
}

/// Offer currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReward {
    pub offer: RewardOffer,
    pub claimed: bool,
}
