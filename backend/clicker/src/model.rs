//! # Records and Payloads
//!
//! Everything that crosses the storage or HTTP boundary.
//!
//! ## Wire Contract
//!
//! Field names are camelCase, the presentation layer reads them verbatim.
//!
//! - User record: `userId`, `totalScore`, `totalClicks`, `prizes`, `activeEffects`
//! - Prize entry: `name`, `timestamp` (RFC 3339)
//! - Active effect: tagged by `type` with one of `doublePoints`, `luckyCharm`, `prizeMultiplier`
//! - `startTime` is epoch milliseconds, `duration` is milliseconds
//!
//! The client derives the countdown for duration effects from `startTime + duration`,
//! nothing here ticks.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub total_score: u64,
    pub total_clicks: u64,
    #[serde(default)]
    pub prizes: Vec<PrizeEntry>,
    #[serde(default)]
    pub active_effects: Vec<ActiveEffect>,
}

impl UserRecord {
    /// Zeroed record for a user seen for the first time.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_score: 0,
            total_clicks: 0,
            prizes: Vec::new(),
            active_effects: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    DoublePoints,
    LuckyCharm,
    PrizeMultiplier,
}

/// Bonus effect embedded in a user record.
///
/// A persisted effect always has time or uses left, the engine prunes the rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActiveEffect {
    #[serde(rename_all = "camelCase")]
    DoublePoints {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        start_time: DateTime<Utc>,
        duration: u64,
    },
    #[serde(rename_all = "camelCase")]
    LuckyCharm {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        start_time: DateTime<Utc>,
        remaining_clicks: u32,
    },
    #[serde(rename_all = "camelCase")]
    PrizeMultiplier {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        start_time: DateTime<Utc>,
        remaining_clicks: u32,
        multiplier: f64,
    },
}

impl ActiveEffect {
    pub fn kind(&self) -> EffectKind {
        match self {
            ActiveEffect::DoublePoints { .. } => EffectKind::DoublePoints,
            ActiveEffect::LuckyCharm { .. } => EffectKind::LuckyCharm,
            ActiveEffect::PrizeMultiplier { .. } => EffectKind::PrizeMultiplier,
        }
    }
}

/// Everything a single click writes back to the record.
///
/// `totalClicks` always moves by one so it is not carried here.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickDelta {
    pub score: u64,
    pub prize: Option<PrizeEntry>,
    pub active_effects: Vec<ActiveEffect>,
}

/// Record state right after a click was persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Totals {
    pub total_score: u64,
    pub total_clicks: u64,
    pub active_effects: Vec<ActiveEffect>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResult {
    pub total_score: u64,
    pub total_clicks: u64,
    /// Base increment plus prize bonus, before effects and rounding.
    pub score_increase: f64,
    pub prize: Option<String>,
    pub active_effects: Vec<ActiveEffect>,
}

/// Stats lookup response, the full record or a zeroed placeholder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stats {
    Found(UserRecord),
    Unknown(EmptyStats),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStats {
    pub total_score: u64,
    pub total_clicks: u64,
    pub prize_count: u64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_effect_wire_format() {
        let start_time = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let effect = ActiveEffect::PrizeMultiplier {
            start_time,
            remaining_clicks: 10,
            multiplier: 1.5,
        };

        assert_eq!(
            serde_json::to_value(&effect).unwrap(),
            json!({
                "type": "prizeMultiplier",
                "startTime": 1_700_000_000_000i64,
                "remainingClicks": 10,
                "multiplier": 1.5,
            })
        );

        let double: ActiveEffect = serde_json::from_value(json!({
            "type": "doublePoints",
            "startTime": 1_700_000_000_000i64,
            "duration": 30000,
        }))
        .unwrap();
        assert_eq!(double.kind(), EffectKind::DoublePoints);
    }

    #[test]
    fn test_unknown_stats_shape() {
        let stats = Stats::Unknown(EmptyStats::default());

        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({ "totalScore": 0, "totalClicks": 0, "prizeCount": 0 })
        );
    }

    #[test]
    fn test_record_without_collections() {
        let record: UserRecord = serde_json::from_value(json!({
            "userId": "user_1",
            "totalScore": 12,
            "totalClicks": 3,
        }))
        .unwrap();

        assert!(record.prizes.is_empty());
        assert!(record.active_effects.is_empty());
    }
}
