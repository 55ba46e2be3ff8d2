use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use menu::{flags::FlagError, windows::MealPeriod};
use serde_json::json;
use thiserror::Error;

/// Every way a request can fail, mapped onto one JSON error shape.
///
/// Upstream fetch problems never reach this type: they collapse into
/// `MenuNotFound`/`MenuUnavailable` before the handler returns, so callers
/// see a single shape for "no menu".
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No menu found for this date")]
    MenuNotFound { date: NaiveDate },

    #[error("Menu not available")]
    MenuUnavailable,

    #[error("Food item not found")]
    ItemNotFound { item_id: String },

    #[error("Invalid date format")]
    InvalidDate,

    #[error("Invalid meal name")]
    InvalidMeal { meal: String },

    #[error("Flags can only be changed on today's menu")]
    NotToday { date: NaiveDate },

    #[error("{meal} is not currently being served")]
    OutsideActiveWindow {
        meal: MealPeriod,
        active: Option<MealPeriod>,
    },

    #[error("Endpoint not found")]
    EndpointNotFound,

    #[error("Internal server error")]
    Storage(#[source] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MenuNotFound { date } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": self.to_string(),
                    "date": date,
                    "message": "Menu may not be available for this date."
                }),
            ),
            AppError::MenuUnavailable => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": self.to_string(),
                    "message": "Cannot fetch food item - menu is not available"
                }),
            ),
            AppError::ItemNotFound { item_id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": self.to_string(),
                    "item_id": item_id,
                    "message": "Item not found in today's menu"
                }),
            ),
            AppError::InvalidDate => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "message": "Date must be in YYYY-MM-DD format"
                }),
            ),
            AppError::InvalidMeal { meal } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "meal": meal,
                    "message": "Meal must be Breakfast, Lunch, or Dinner"
                }),
            ),
            AppError::NotToday { date } => (
                StatusCode::CONFLICT,
                json!({
                    "error": self.to_string(),
                    "date": date
                }),
            ),
            AppError::OutsideActiveWindow { active, .. } => (
                StatusCode::CONFLICT,
                json!({
                    "error": self.to_string(),
                    "activeMeal": active,
                    "message": "Items can only be flagged during their meal's serving window"
                }),
            ),
            AppError::EndpointNotFound => (
                StatusCode::NOT_FOUND,
                json!({"error": self.to_string()}),
            ),
            AppError::Storage(e) => {
                tracing::error!("Flag storage failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": self.to_string()}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<FlagError> for AppError {
    fn from(err: FlagError) -> Self {
        match err {
            FlagError::InvalidMeal(meal) => AppError::InvalidMeal { meal },
            FlagError::NotToday { date } => AppError::NotToday { date },
            FlagError::OutsideActiveWindow { meal, active } => {
                AppError::OutsideActiveWindow { meal, active }
            }
            FlagError::Storage(e) => AppError::Storage(e),
        }
    }
}
