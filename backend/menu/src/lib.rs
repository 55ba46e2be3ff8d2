//! # Menu Core
//!
//! Everything between the Sodexo feed and the FiskEat API surface:
//! fetching the raw feed, normalizing it into the canonical menu document,
//! resolving which meal period is live, and the durable store of
//! diner-flagged items.
//!
//! The web layer in the `server` crate is a thin shell over this crate;
//! the `fetch` binary drives the same pipeline from the command line.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

pub mod fetch;
pub mod flags;
pub mod models;
pub mod transform;
pub mod units;
pub mod windows;

use fetch::SodexoClient;
use flags::FlagStore;
use models::MenuDocument;
use windows::MealSchedule;

/// Fetches and normalizes the menu for `date`, merged with the current
/// flag state. `None` covers both "nothing published" and an upstream
/// failure; callers get one shape for "no menu".
pub async fn menu_for_date(
    sodexo: &SodexoClient,
    flags: &FlagStore,
    schedule: &MealSchedule,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Option<MenuDocument> {
    let raw_meals = match sodexo.fetch(date).await {
        Ok(raw_meals) => raw_meals,
        Err(e) => {
            warn!("Menu fetch for {date} failed: {e}");
            return None;
        }
    };

    let meal_flags = flags.flags_for(date, now.date());
    transform::transform(raw_meals, date, now, &meal_flags, schedule)
}
