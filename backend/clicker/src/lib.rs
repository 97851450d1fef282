//! # Clicker Core
//!
//! Scoring rules for the cookie clicker.
//!
//! Every click draws a base increment, maybe a prize, maybe a new bonus effect,
//! then runs the active effects over the increment and writes one update to
//! the player's record.
//!
//! ## Modules
//!
//! - [`catalog`]: prize and effect configuration, passed by reference
//! - [`effects`]: effect engine, pure
//! - [`resolver`]: click resolution and stats lookup
//! - [`store`]: storage contract and the in-memory store
//! - [`random`]: injectable uniform draws
//!
//!
//!
//! # Notes
//!
//! ## Base Increment
//! A draw below 0.5 pays 10 and anything else pays 1, so the common case is the
//! bigger reward.
//!
//! ## Concurrency
//! Counters are increments at the storage layer and stay correct when the same
//! user clicks twice at once. The effect list is replaced wholesale, so two racing
//! clicks can lose one effect update.
pub mod catalog;
pub mod effects;
pub mod model;
pub mod random;
pub mod resolver;
pub mod store;

pub use catalog::{Catalog, EffectTemplate, Prize};
pub use effects::{Applied, apply_effects};
pub use model::{ActiveEffect, ClickDelta, ClickResult, EffectKind, PrizeEntry, Stats, Totals, UserRecord};
pub use random::{RandomSource, ScriptedRandom};
pub use resolver::{ClickResolver, Resolution, stats};
pub use store::{MemoryStore, StoreError, UserStore};
