//! # Click Resolver
//!
//! Turns one click into a record update and a response.
//!
//! ## Draw Order
//!
//! Draws are consumed in a fixed order so a scripted source replays a click exactly.
//!
//! 1. Base increment
//! 2. Prize attempt gate, then one draw per prize until the first hit
//! 3. Effect chance, always drawn
//! 4. Effect kind, only when the chance hit and the record is under the cap
//!
//! A kind that is already active grants nothing, the draw is still spent.
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    effects::apply_effects,
    model::{ClickDelta, ClickResult, EmptyStats, PrizeEntry, Stats, UserRecord},
    random::RandomSource,
    store::{StoreError, UserStore},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub delta: ClickDelta,
    /// Base plus prize bonus, what the client shows as the plain gain.
    pub score_increase: f64,
    /// Increment after every effect, before rounding.
    pub final_increment: f64,
}

impl Resolution {
    pub fn prize_name(&self) -> Option<&str> {
        self.delta.prize.as_ref().map(|prize| prize.name.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ClickResolver<'a> {
    catalog: &'a Catalog,
}

impl Default for ClickResolver<'static> {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl<'a> ClickResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Pure part of a click, `None` stands for a user with no record yet.
    pub fn resolve(
        &self,
        record: Option<&UserRecord>,
        rng: &mut impl RandomSource,
        now: DateTime<Utc>,
    ) -> Resolution {
        let mut effects = record
            .map(|record| record.active_effects.clone())
            .unwrap_or_default();

        let mut score_increase = self.catalog.draw_base(rng) as f64;

        let prize = self.catalog.draw_prize(rng).map(|prize| {
            score_increase += prize.point_bonus as f64;

            PrizeEntry {
                name: prize.name.clone(),
                timestamp: now,
            }
        });

        if rng.next_f64() < self.catalog.effect_chance
            && effects.len() < self.catalog.max_active_effects
        {
            if let Some(template) = self.catalog.draw_effect(rng) {
                let kind = template.kind();

                if effects.iter().all(|effect| effect.kind() != kind) {
                    info!("Granting {kind:?}");
                    effects.push(template.instantiate(now));
                }
            }
        }

        let applied = apply_effects(&effects, score_increase, now);

        Resolution {
            delta: ClickDelta {
                score: applied.final_increment.round() as u64,
                prize,
                active_effects: applied.surviving,
            },
            score_increase,
            final_increment: applied.final_increment,
        }
    }

    pub async fn resolve_click(
        &self,
        store: &dyn UserStore,
        user_id: &str,
        rng: &mut (impl RandomSource + Send),
        now: DateTime<Utc>,
    ) -> Result<ClickResult, StoreError> {
        let record = store.load(user_id).await?;
        let resolution = self.resolve(record.as_ref(), rng, now);

        if let Some(name) = resolution.prize_name() {
            info!("{user_id} won {name}");
        }

        let totals = store.apply_click(user_id, &resolution.delta).await?;

        debug!(
            "{user_id} click #{}: +{} ({} before effects)",
            totals.total_clicks, resolution.delta.score, resolution.score_increase
        );

        Ok(ClickResult {
            total_score: totals.total_score,
            total_clicks: totals.total_clicks,
            score_increase: resolution.score_increase,
            prize: resolution.delta.prize.map(|prize| prize.name),
            active_effects: totals.active_effects,
        })
    }
}

/// Read-only lookup, unknown users get zeroes and no record is created.
pub async fn stats(store: &dyn UserStore, user_id: &str) -> Result<Stats, StoreError> {
    Ok(match store.load(user_id).await? {
        Some(record) => Stats::Found(record),
        None => Stats::Unknown(EmptyStats::default()),
    })
}
