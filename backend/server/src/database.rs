//! # Redis
//!
//! RAM database.
//!
//! Core purpose is to store player records and apply each click as one atomic update.
//!
//! ## Requirements
//!
//! - Fast lookups by user id
//! - Atomic increments for score and click counters
//! - Click update is all or nothing
//! - Lookups never create records
//!
//! ## Implementation
//!
//! - Redis hash per user: `cookie:user:{id}`
//!   - `userId`: string, written once with HSETNX
//!   - `totalScore`, `totalClicks`: integers, only ever moved with HINCRBY
//!   - `activeEffects`: JSON array, replaced on every click
//! - Redis list per user: `cookie:prizes:{id}`, one JSON prize entry per element, append only
//! - A click is one MULTI/EXEC pipeline, so concurrent first clicks converge on a single record
//! - The effect list has no version token, racing clicks from one user keep the last write
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use clicker::{
    model::{ActiveEffect, ClickDelta, PrizeEntry, Totals, UserRecord},
    store::{StoreError, UserStore},
};
use redis::{
    Client, Pipeline, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

pub const USER_PREFIX: &str = "cookie:user:";
pub const PRIZES_PREFIX: &str = "cookie:prizes:";

pub const FIELD_USER_ID: &str = "userId";
pub const FIELD_TOTAL_SCORE: &str = "totalScore";
pub const FIELD_TOTAL_CLICKS: &str = "totalClicks";
pub const FIELD_ACTIVE_EFFECTS: &str = "activeEffects";

pub async fn init_redis(redis_url: &str, timeout_ms: u64) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(timeout_ms));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, timeout_ms: u64) -> Result<Self, RedisError> {
        Ok(Self {
            connection: init_redis(redis_url, timeout_ms).await?,
        })
    }
}

#[async_trait]
impl UserStore for RedisStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut connection = self.connection.clone();

        let (fields, prizes): (HashMap<String, String>, Vec<String>) = redis::pipe()
            .hgetall(user_key(user_id))
            .lrange(prizes_key(user_id), 0, -1)
            .query_async(&mut connection)
            .await
            .map_err(backend)?;

        #[cfg(feature = "verbose")]
        tracing::info!("Loaded {user_id}: {fields:?}, {} prizes", prizes.len());

        if fields.is_empty() {
            return Ok(None);
        }

        parse_record(user_id, &fields, &prizes).map(Some)
    }

    async fn apply_click(&self, user_id: &str, delta: &ClickDelta) -> Result<Totals, StoreError> {
        let mut connection = self.connection.clone();
        let pipe = click_pipeline(user_id, delta)?;

        let (total_score, total_clicks): (u64, u64) =
            pipe.query_async(&mut connection).await.map_err(backend)?;

        Ok(Totals {
            total_score,
            total_clicks,
            active_effects: delta.active_effects.clone(),
        })
    }
}

/// MULTI/EXEC for one click. Only the two HINCRBY replies are kept: score, then clicks.
pub fn click_pipeline(user_id: &str, delta: &ClickDelta) -> Result<Pipeline, StoreError> {
    let key = user_key(user_id);
    let effects = serde_json::to_string(&delta.active_effects)?;

    let mut pipe = redis::pipe();
    pipe.atomic()
        .hset_nx(&key, FIELD_USER_ID, user_id)
        .ignore()
        .hincr(&key, FIELD_TOTAL_SCORE, delta.score)
        .hincr(&key, FIELD_TOTAL_CLICKS, 1)
        .hset(&key, FIELD_ACTIVE_EFFECTS, effects)
        .ignore();

    if let Some(prize) = &delta.prize {
        pipe.rpush(prizes_key(user_id), serde_json::to_string(prize)?)
            .ignore();
    }

    Ok(pipe)
}

fn user_key(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

fn prizes_key(user_id: &str) -> String {
    format!("{PRIZES_PREFIX}{user_id}")
}

fn backend(error: RedisError) -> StoreError {
    StoreError::Backend(Box::new(error))
}

fn parse_counter(fields: &HashMap<String, String>, field: &str) -> Result<u64, StoreError> {
    match fields.get(field) {
        Some(raw) => raw
            .parse()
            .map_err(|_| StoreError::Corrupted(format!("{field} is not a counter: {raw}"))),
        None => Ok(0),
    }
}

pub fn parse_record(
    user_id: &str,
    fields: &HashMap<String, String>,
    prizes: &[String],
) -> Result<UserRecord, StoreError> {
    let active_effects: Vec<ActiveEffect> = match fields.get(FIELD_ACTIVE_EFFECTS) {
        Some(raw) => serde_json::from_str(raw)?,
        None => Vec::new(),
    };

    let prizes = prizes
        .iter()
        .map(|raw| serde_json::from_str::<PrizeEntry>(raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UserRecord {
        user_id: fields
            .get(FIELD_USER_ID)
            .cloned()
            .unwrap_or_else(|| user_id.to_string()),
        total_score: parse_counter(fields, FIELD_TOTAL_SCORE)?,
        total_clicks: parse_counter(fields, FIELD_TOTAL_CLICKS)?,
        prizes,
        active_effects,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn packed(pipe: &Pipeline) -> String {
        String::from_utf8_lossy(&pipe.get_packed_pipeline()).into_owned()
    }

    fn command_count(packed: &str, command: &str) -> usize {
        packed.matches(&format!("\r\n{command}\r\n")).count()
    }

    fn delta(prize: Option<&str>) -> ClickDelta {
        ClickDelta {
            score: 61,
            prize: prize.map(|name| PrizeEntry {
                name: name.to_string(),
                timestamp: Utc.timestamp_millis_opt(0).unwrap(),
            }),
            active_effects: vec![ActiveEffect::LuckyCharm {
                start_time: Utc.timestamp_millis_opt(0).unwrap(),
                remaining_clicks: 4,
            }],
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_keys() {
        assert_eq!(user_key("user_1"), "cookie:user:user_1");
        assert_eq!(prizes_key("user_1"), "cookie:prizes:user_1");
    }

    #[test]
    fn test_click_pipeline_without_prize() {
        let commands = packed(&click_pipeline("user_1", &delta(None)).unwrap());

        assert!(commands.starts_with("*1\r\n$5\r\nMULTI\r\n"));
        assert!(commands.ends_with("*1\r\n$4\r\nEXEC\r\n"));
        assert_eq!(command_count(&commands, "HSETNX"), 1);
        assert_eq!(command_count(&commands, "HINCRBY"), 2);
        assert_eq!(command_count(&commands, "HSET"), 1);
        assert_eq!(command_count(&commands, "RPUSH"), 0);
        assert!(commands.contains("cookie:user:user_1"));
        assert!(commands.contains("\r\n61\r\n"));
        assert!(commands.contains(r#""remainingClicks":4"#));
        assert!(!commands.contains("cookie:prizes:"));
    }

    #[test]
    fn test_click_pipeline_with_prize() {
        let commands = packed(&click_pipeline("user_1", &delta(Some("Golden Cookie"))).unwrap());

        assert_eq!(command_count(&commands, "HINCRBY"), 2);
        assert_eq!(command_count(&commands, "RPUSH"), 1);
        assert!(commands.contains("cookie:prizes:user_1"));
        assert!(commands.contains(r#""name":"Golden Cookie""#));
        assert!(commands.ends_with("*1\r\n$4\r\nEXEC\r\n"));
    }

    #[test]
    fn test_parse_full_record() {
        let hash = fields(&[
            (FIELD_USER_ID, "user_1"),
            (FIELD_TOTAL_SCORE, "561"),
            (FIELD_TOTAL_CLICKS, "12"),
            (
                FIELD_ACTIVE_EFFECTS,
                r#"[{"type":"luckyCharm","startTime":1700000000000,"remainingClicks":3}]"#,
            ),
        ]);
        let prizes = vec![r#"{"name":"Mega Cookie","timestamp":"2024-11-02T10:00:00Z"}"#.to_string()];

        let record = parse_record("user_1", &hash, &prizes).unwrap();

        assert_eq!(record.total_score, 561);
        assert_eq!(record.total_clicks, 12);
        assert_eq!(record.prizes[0].name, "Mega Cookie");
        assert_eq!(record.active_effects.len(), 1);
    }

    #[test]
    fn test_parse_partial_record() {
        let hash = fields(&[(FIELD_TOTAL_CLICKS, "1")]);

        let record = parse_record("user_2", &hash, &[]).unwrap();

        assert_eq!(record.user_id, "user_2");
        assert_eq!(record.total_score, 0);
        assert!(record.active_effects.is_empty());
    }

    #[test]
    fn test_parse_corrupted_counter() {
        let hash = fields(&[(FIELD_TOTAL_SCORE, "lots")]);

        assert!(matches!(
            parse_record("user_3", &hash, &[]),
            Err(StoreError::Corrupted(_))
        ));
    }
}
