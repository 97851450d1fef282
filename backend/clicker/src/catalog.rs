//! # Catalog
//!
//! Static prize and effect configuration shared by every click.
//!
//! ## Prize Draw
//!
//! - One attempt gate, then the prizes are walked in listed order
//! - Each prize gets its own independent draw against `draw_probability`
//! - First success wins, the rest are never drawn
//!
//! This is not normalized weighted sampling, order in the list matters.
use std::sync::LazyLock;

use chrono::{DateTime, Utc};

use crate::{
    model::{ActiveEffect, EffectKind},
    random::RandomSource,
};

static STANDARD: LazyLock<Catalog> = LazyLock::new(Catalog::default);

#[derive(Clone, Debug, PartialEq)]
pub struct Prize {
    pub name: String,
    pub draw_probability: f64,
    pub point_bonus: u64,
}

impl Prize {
    pub fn new(name: &str, draw_probability: f64, point_bonus: u64) -> Self {
        Self {
            name: name.to_string(),
            draw_probability,
            point_bonus,
        }
    }
}

/// Initial state of an effect when it is granted.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectTemplate {
    DoublePoints { duration: u64 },
    LuckyCharm { remaining_clicks: u32 },
    PrizeMultiplier { remaining_clicks: u32, multiplier: f64 },
}

impl EffectTemplate {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectTemplate::DoublePoints { .. } => EffectKind::DoublePoints,
            EffectTemplate::LuckyCharm { .. } => EffectKind::LuckyCharm,
            EffectTemplate::PrizeMultiplier { .. } => EffectKind::PrizeMultiplier,
        }
    }

    pub fn instantiate(&self, now: DateTime<Utc>) -> ActiveEffect {
        match *self {
            EffectTemplate::DoublePoints { duration } => ActiveEffect::DoublePoints {
                start_time: now,
                duration,
            },
            EffectTemplate::LuckyCharm { remaining_clicks } => ActiveEffect::LuckyCharm {
                start_time: now,
                remaining_clicks,
            },
            EffectTemplate::PrizeMultiplier {
                remaining_clicks,
                multiplier,
            } => ActiveEffect::PrizeMultiplier {
                start_time: now,
                remaining_clicks,
                multiplier,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pub prizes: Vec<Prize>,
    pub effects: Vec<EffectTemplate>,
    /// Increment for draws below `base_high_chance`.
    pub base_high: u64,
    pub base_low: u64,
    pub base_high_chance: f64,
    pub prize_attempt_chance: f64,
    pub effect_chance: f64,
    pub max_active_effects: usize,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            prizes: vec![
                Prize::new("Golden Cookie", 0.30, 50),
                Prize::new("Treasure Chest", 0.05, 100),
                Prize::new("Mega Cookie", 0.05, 500),
            ],
            effects: vec![
                EffectTemplate::DoublePoints { duration: 30_000 },
                EffectTemplate::LuckyCharm {
                    remaining_clicks: 5,
                },
                EffectTemplate::PrizeMultiplier {
                    remaining_clicks: 10,
                    multiplier: 1.5,
                },
            ],
            // the likelier branch pays more, kept as the game shipped it
            base_high: 10,
            base_low: 1,
            base_high_chance: 0.5,
            prize_attempt_chance: 0.25,
            effect_chance: 0.10,
            max_active_effects: 2,
        }
    }
}

impl Catalog {
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn draw_base(&self, rng: &mut impl RandomSource) -> u64 {
        if rng.next_f64() < self.base_high_chance {
            self.base_high
        } else {
            self.base_low
        }
    }

    /// Returns `None` both when the attempt gate fails and when every prize misses.
    pub fn draw_prize(&self, rng: &mut impl RandomSource) -> Option<&Prize> {
        if rng.next_f64() >= self.prize_attempt_chance {
            return None;
        }

        self.prizes
            .iter()
            .find(|prize| rng.next_f64() < prize.draw_probability)
    }

    /// Picks uniformly among the configured effects.
    pub fn draw_effect(&self, rng: &mut impl RandomSource) -> Option<&EffectTemplate> {
        if self.effects.is_empty() {
            return None;
        }

        let index = (rng.next_f64() * self.effects.len() as f64) as usize;
        self.effects.get(index.min(self.effects.len() - 1))
    }
}
