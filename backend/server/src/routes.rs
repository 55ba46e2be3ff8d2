use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Value, json};

use menu::{flags::DATE_FORMAT, models::canonical_id, transform::find_item};

use crate::{error::AppError, state::AppState};

pub async fn home_handler() -> Json<Value> {
    Json(json!({
        "message": "FiskEat API is running!",
        "version": "2.0.0",
        "description": "Dynamic menu fetching - no database required",
        "endpoints": {
            "menu_today": "/api/menu/today",
            "menu_by_date": "/api/menu/<date>",
            "food_item": "/api/food/<item_id>",
            "flag_item": "/api/flag"
        }
    }))
}

pub async fn todays_menu_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let now = Local::now().naive_local();
    menu_response(&state, now.date(), now).await
}

pub async fn menu_by_date_handler(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&date)?;
    menu_response(&state, date, Local::now().naive_local()).await
}

#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    #[serde(default)]
    pub date: Option<String>,
}

pub async fn food_item_handler(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Query(query): Query<FoodQuery>,
) -> Result<Json<Value>, AppError> {
    let now = Local::now().naive_local();
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => now.date(),
    };

    let document = menu::menu_for_date(&state.sodexo, &state.flags, &state.schedule, date, now)
        .await
        .ok_or(AppError::MenuUnavailable)?;

    let item = find_item(&document, &item_id)
        .ok_or_else(|| AppError::ItemNotFound { item_id: item_id.clone() })?;

    Ok(Json(json!({
        "success": true,
        "item_id": item_id,
        "food": item
    })))
}

/// Body of a flag toggle. `itemId` tolerates the same string-or-number
/// ambiguity as the upstream feed; `date`, when present, must be today.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
    pub item_id: Value,
    pub meal: String,
    pub flagged: bool,
    #[serde(default)]
    pub date: Option<String>,
}

pub async fn flag_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<Value>, AppError> {
    let date = request.date.as_deref().map(parse_date).transpose()?;
    let now = Local::now().naive_local();

    let outcome = state.flags.set_item_flag(
        &state.schedule,
        &canonical_id(&request.item_id),
        &request.meal,
        request.flagged,
        date,
        now,
    )?;

    Ok(Json(json!({
        "success": true,
        "itemId": outcome.item_id,
        "meal": outcome.meal,
        "isFlagged": outcome.is_flagged
    })))
}

pub async fn not_found_handler() -> AppError {
    AppError::EndpointNotFound
}

async fn menu_response(
    state: &AppState,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<Json<Value>, AppError> {
    let document = menu::menu_for_date(&state.sodexo, &state.flags, &state.schedule, date, now)
        .await
        .ok_or(AppError::MenuNotFound { date })?;

    Ok(Json(json!({
        "success": true,
        "date": document.date,
        "menu": document
    })))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| AppError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FlagRequest, parse_date};

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-08-07").is_ok());
        assert!(parse_date("invalid-date").is_err());
        assert!(parse_date("2026-13-40").is_err());
    }

    #[test]
    fn test_flag_request_accepts_numeric_id() {
        let request: FlagRequest =
            serde_json::from_value(json!({"itemId": 42, "meal": "Lunch", "flagged": true}))
                .unwrap();

        assert_eq!(request.item_id, json!(42));
        assert_eq!(request.date, None);
    }

    #[test]
    fn test_flag_request_with_date() {
        let request: FlagRequest = serde_json::from_value(json!({
            "itemId": "42",
            "meal": "lunch",
            "flagged": false,
            "date": "2026-08-07"
        }))
        .unwrap();

        assert_eq!(request.date.as_deref(), Some("2026-08-07"));
        assert!(!request.flagged);
    }

    #[test]
    fn test_flag_request_requires_item_id() {
        let missing = serde_json::from_value::<FlagRequest>(
            json!({"meal": "Lunch", "flagged": true}),
        );

        assert!(missing.is_err());
    }
}
