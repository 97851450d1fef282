//! # Effect Engine
//!
//! Folds the active effects over a score increment.
//!
//! ## Rules
//!
//! - Double Points: x2 while `now - startTime < duration`, expires on time not clicks
//! - Lucky Charm: +10 per click, one use consumed
//! - Prize Multiplier: x`multiplier` per click, one use consumed
//!
//! Effects apply in stored order and each one sees the running value, so
//! Double Points then Lucky Charm on 10 gives 30, never 40.
//!
//! The click that spends the last use still gets the bonus, the effect is
//! dropped right after.
use chrono::{DateTime, Utc};

use crate::model::ActiveEffect;

pub const LUCKY_CHARM_BONUS: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    pub final_increment: f64,
    pub surviving: Vec<ActiveEffect>,
}

pub fn apply_effects(effects: &[ActiveEffect], base_increment: f64, now: DateTime<Utc>) -> Applied {
    let mut final_increment = base_increment;
    let mut surviving = Vec::with_capacity(effects.len());

    for effect in effects {
        match *effect {
            ActiveEffect::DoublePoints {
                start_time,
                duration,
            } => {
                let elapsed = (now - start_time).num_milliseconds();

                if elapsed < duration as i64 {
                    final_increment *= 2.0;
                    surviving.push(effect.clone());
                }
            }
            ActiveEffect::LuckyCharm {
                start_time,
                remaining_clicks,
            } => {
                if remaining_clicks == 0 {
                    continue;
                }

                final_increment += LUCKY_CHARM_BONUS;
                if remaining_clicks > 1 {
                    surviving.push(ActiveEffect::LuckyCharm {
                        start_time,
                        remaining_clicks: remaining_clicks - 1,
                    });
                }
            }
            ActiveEffect::PrizeMultiplier {
                start_time,
                remaining_clicks,
                multiplier,
            } => {
                if remaining_clicks == 0 {
                    continue;
                }

                final_increment *= multiplier;
                if remaining_clicks > 1 {
                    surviving.push(ActiveEffect::PrizeMultiplier {
                        start_time,
                        remaining_clicks: remaining_clicks - 1,
                        multiplier,
                    });
                }
            }
        }
    }

    Applied {
        final_increment,
        surviving,
    }
}
