//! Upstream and canonical menu shapes.
//!
//! The raw structs mirror the Sodexo feed field-for-field and default every
//! missing field, since the feed routinely omits pieces of the structure.
//! The canonical structs are what the API serves back out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::windows::MealPeriod;

fn missing_nutrient() -> Value {
    Value::String("N/A".to_string())
}

/// Item ids arrive as strings or numbers depending on the feed revision.
/// Everything downstream compares the string form, so normalize once here.
pub fn canonical_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMeal {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default)]
    pub menu_item_id: Value,
    #[serde(default)]
    pub formal_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub allergens: Vec<RawAllergen>,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default = "missing_nutrient")]
    pub calories: Value,
    #[serde(default = "missing_nutrient")]
    pub protein: Value,
    #[serde(default = "missing_nutrient")]
    pub fat: Value,
    #[serde(default = "missing_nutrient")]
    pub carbohydrates: Value,
    #[serde(default = "missing_nutrient")]
    pub sugar: Value,
    #[serde(default = "missing_nutrient")]
    pub sodium: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAllergen {
    #[serde(default)]
    pub name: String,
}

/// The normalized menu for one date, recomputed on every request so it
/// always reflects the latest flag state and clock.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuDocument {
    pub date: NaiveDate,
    pub meals: Vec<Meal>,
    #[serde(rename = "activeMeal", skip_serializing_if = "Option::is_none")]
    pub active_meal: Option<MealPeriod>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Meal {
    pub name: String,
    pub stations: Vec<Station>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Station {
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub ingredients: String,
    pub allergens: Vec<String>,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub nutrition: Nutrition,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Nutrition {
    pub calories: Value,
    pub protein: Value,
    pub fat: Value,
    pub carbohydrates: Value,
    pub sugar: Value,
    pub sodium: Value,
}
