use std::sync::LazyLock;

use axum::http::HeaderValue;
use regex::Regex;
use tracing::warn;

use crate::error::AppError;

pub const MAX_USER_ID_LEN: usize = 128;

static USER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.:-]+$").expect("user id pattern"));

/// Rejects ids the core should never see. Ids are used verbatim, ownership is not checked.
pub fn validate_user_id(user_id: &str) -> Result<&str, AppError> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN || !USER_ID.is_match(user_id) {
        warn!("Rejected user id {user_id:?}");
        return Err(AppError::MalformedPayload);
    }

    Ok(user_id)
}

pub fn origin_headers(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter(|origin| {
            if origin.as_str() == "*" {
                warn!("Skipping wildcard origin");
                return false;
            }
            true
        })
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| {
                    warn!("Skipping invalid origin {origin}: {e}");
                })
                .ok()
        })
        .collect()
}
