//! Reshapes the raw Sodexo feed into the canonical menu document.
//!
//! Ordering of meals, stations and items follows the feed exactly. The
//! document is rebuilt on every request so it always carries the current
//! flag state and, for today's menu, the meal being served right now.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    flags::MealFlags,
    models::{Meal, MenuDocument, MenuItem, Nutrition, RawItem, RawMeal, Station, canonical_id},
    units::strip_units,
    windows::{MealPeriod, MealSchedule},
};

/// Builds the canonical document for `date`, or `None` when the feed has
/// nothing for it. Upstream failures are the caller's problem and collapse
/// into the same `None`.
pub fn transform(
    raw_meals: Vec<RawMeal>,
    date: NaiveDate,
    now: NaiveDateTime,
    flags: &MealFlags,
    schedule: &MealSchedule,
) -> Option<MenuDocument> {
    if raw_meals.is_empty() {
        return None;
    }

    let mut meals = Vec::with_capacity(raw_meals.len());
    for raw_meal in raw_meals {
        let flagged = MealPeriod::parse(&raw_meal.name).and_then(|period| flags.get(&period));

        let stations = raw_meal
            .groups
            .into_iter()
            .map(|group| Station {
                name: group.name,
                items: group
                    .items
                    .into_iter()
                    .map(|item| build_item(item, flagged))
                    .collect(),
            })
            .collect();

        meals.push(Meal {
            name: raw_meal.name,
            stations,
        });
    }

    // flags and the live meal only mean anything on today's menu
    let active_meal = (date == now.date())
        .then(|| schedule.active_period(now.time()))
        .flatten();

    Some(MenuDocument {
        date,
        meals,
        active_meal,
    })
}

fn build_item(raw: RawItem, flagged: Option<&BTreeSet<String>>) -> MenuItem {
    let id = canonical_id(&raw.menu_item_id);
    let is_flagged = flagged.is_some_and(|ids| ids.contains(&id));

    MenuItem {
        id,
        name: raw.formal_name,
        description: raw.description,
        ingredients: raw.ingredients,
        allergens: raw.allergens.into_iter().map(|allergen| allergen.name).collect(),
        is_vegan: raw.is_vegan,
        is_vegetarian: raw.is_vegetarian,
        nutrition: Nutrition {
            calories: strip_units(raw.calories),
            protein: strip_units(raw.protein),
            fat: strip_units(raw.fat),
            carbohydrates: strip_units(raw.carbohydrates),
            sugar: strip_units(raw.sugar),
            sodium: strip_units(raw.sodium),
        },
        is_flagged,
    }
}

/// First item whose id matches, walking meals, then stations, then items
/// in document order.
pub fn find_item<'a>(document: &'a MenuDocument, item_id: &str) -> Option<&'a MenuItem> {
    document
        .meals
        .iter()
        .flat_map(|meal| &meal.stations)
        .flat_map(|station| &station.items)
        .find(|item| item.id == item_id)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    use super::{find_item, transform};
    use crate::{
        flags::MealFlags,
        models::RawMeal,
        windows::{MealPeriod, MealSchedule},
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        date().and_hms_opt(hour, min, 0).unwrap()
    }

    fn sample_feed() -> Vec<RawMeal> {
        serde_json::from_value(json!([
            {
                "name": "Breakfast",
                "groups": [
                    {
                        "name": "Continental",
                        "items": [
                            {
                                "menuItemId": "12345",
                                "formalName": "Scrambled Eggs",
                                "description": "Fresh scrambled eggs",
                                "ingredients": "Eggs, milk, butter",
                                "allergens": [{"name": "Eggs"}, {"name": "Milk"}],
                                "isVegan": false,
                                "isVegetarian": true,
                                "calories": "250",
                                "protein": "15 g",
                                "fat": "20g",
                                "carbohydrates": "5",
                                "sugar": "1",
                                "sodium": "400 mg"
                            }
                        ]
                    }
                ]
            },
            {
                "name": "Lunch",
                "groups": [
                    {
                        "name": "Grill",
                        "items": [
                            {
                                "menuItemId": 42,
                                "formalName": "Grilled Chicken Breast",
                                "allergens": [],
                                "calories": 300
                            }
                        ]
                    }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_empty_feed_has_no_document() {
        let document = transform(
            Vec::new(),
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        );

        assert!(document.is_none());
    }

    #[test]
    fn test_feed_is_reshaped_in_order() {
        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        assert_eq!(document.date, date());
        assert_eq!(document.meals.len(), 2);
        assert_eq!(document.meals[0].name, "Breakfast");
        assert_eq!(document.meals[1].name, "Lunch");
        assert_eq!(document.meals[0].stations[0].name, "Continental");

        let eggs = &document.meals[0].stations[0].items[0];
        assert_eq!(eggs.id, "12345");
        assert_eq!(eggs.name, "Scrambled Eggs");
        assert_eq!(eggs.allergens, vec!["Eggs", "Milk"]);
        assert!(eggs.is_vegetarian);
        assert!(!eggs.is_flagged);
    }

    #[test]
    fn test_nutrition_units_are_stripped() {
        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        let eggs = &document.meals[0].stations[0].items[0];
        assert_eq!(eggs.nutrition.protein, json!("15"));
        assert_eq!(eggs.nutrition.fat, json!("20"));
        assert_eq!(eggs.nutrition.sodium, json!("400"));
        // numeric values pass through untouched
        let chicken = &document.meals[1].stations[0].items[0];
        assert_eq!(chicken.nutrition.calories, json!(300));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let feed: Vec<RawMeal> = serde_json::from_value(json!([
            {"name": "Dinner", "groups": [{"items": [{}]}]}
        ]))
        .unwrap();

        let document = transform(
            feed,
            date(),
            at(18, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        let item = &document.meals[0].stations[0].items[0];
        assert_eq!(document.meals[0].stations[0].name, "");
        assert_eq!(item.name, "");
        assert!(!item.is_vegan);
        assert_eq!(item.nutrition.calories, json!("N/A"));
    }

    #[test]
    fn test_flag_state_is_merged() {
        let flags: MealFlags =
            serde_json::from_value(json!({"Lunch": ["42"]})).unwrap();

        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &flags,
            &MealSchedule::default(),
        )
        .unwrap();

        // numeric upstream id matches its flagged string form
        let chicken = &document.meals[1].stations[0].items[0];
        assert_eq!(chicken.id, "42");
        assert!(chicken.is_flagged);

        let eggs = &document.meals[0].stations[0].items[0];
        assert!(!eggs.is_flagged);
    }

    #[test]
    fn test_flags_only_apply_to_their_meal() {
        let flags: MealFlags =
            serde_json::from_value(json!({"Breakfast": ["42"]})).unwrap();

        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &flags,
            &MealSchedule::default(),
        )
        .unwrap();

        assert!(!document.meals[1].stations[0].items[0].is_flagged);
    }

    #[test]
    fn test_active_meal_set_for_today() {
        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        assert_eq!(document.active_meal, Some(MealPeriod::Lunch));
    }

    #[test]
    fn test_active_meal_absent_for_other_dates() {
        let tomorrow = date().succ_opt().unwrap();

        let document = transform(
            sample_feed(),
            tomorrow,
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        assert_eq!(document.active_meal, None);
    }

    #[test]
    fn test_active_meal_absent_in_gap() {
        let document = transform(
            sample_feed(),
            date(),
            at(15, 30),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        assert_eq!(document.active_meal, None);
    }

    #[test]
    fn test_find_item_walks_in_document_order() {
        // two items that stringify to the same id: first in document order wins
        let feed: Vec<RawMeal> = serde_json::from_value(json!([
            {
                "name": "Breakfast",
                "groups": [
                    {"name": "Bakery", "items": [{"menuItemId": 42, "formalName": "Bagel"}]}
                ]
            },
            {
                "name": "Lunch",
                "groups": [
                    {"name": "Grill", "items": [{"menuItemId": "42", "formalName": "Burger"}]}
                ]
            }
        ]))
        .unwrap();

        let document = transform(
            feed,
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        let item = find_item(&document, "42").unwrap();
        assert_eq!(item.name, "Bagel");
    }

    #[test]
    fn test_find_item_missing() {
        let document = transform(
            sample_feed(),
            date(),
            at(11, 0),
            &MealFlags::new(),
            &MealSchedule::default(),
        )
        .unwrap();

        assert!(find_item(&document, "99999").is_none());
    }
}
