//! Meal periods and their serving windows.
//!
//! Flagging an item is only allowed while its meal is actually being
//! served, so the rest of the crate leans on this module to answer "which
//! meal is live right now". Windows are half-open `[start, end)` and may
//! wrap past midnight (`start > end`).

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// The fixed set of meal periods Sodexo publishes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealPeriod {
    /// Case-insensitive, whitespace-tolerant lookup of a free-text meal
    /// name. Unrecognized input is `None`, not an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One serving window. `start > end` means the window crosses midnight.
#[derive(Debug, Clone, Copy)]
pub struct MealWindow {
    pub period: MealPeriod,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl MealWindow {
    fn contains(&self, now: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= now && now < self.end
        } else {
            now >= self.start || now < self.end
        }
    }
}

/// The configured serving windows, checked in declaration order.
///
/// Well-formed configuration has no overlaps; if windows ever do overlap,
/// the first match wins.
#[derive(Debug, Clone)]
pub struct MealSchedule {
    windows: Vec<MealWindow>,
}

impl MealSchedule {
    pub fn new(windows: Vec<MealWindow>) -> Self {
        Self { windows }
    }

    /// The meal being served at `now`, or `None` during a gap.
    pub fn active_period(&self, now: NaiveTime) -> Option<MealPeriod> {
        self.windows
            .iter()
            .find(|window| window.contains(now))
            .map(|window| window.period)
    }

    /// Whether `raw_name` resolves to the meal being served at `now`.
    /// Names that do not resolve are never active.
    pub fn is_active(&self, raw_name: &str, now: NaiveTime) -> bool {
        MealPeriod::parse(raw_name)
            .is_some_and(|period| self.active_period(now) == Some(period))
    }
}

impl Default for MealSchedule {
    fn default() -> Self {
        let window = |period, (sh, sm), (eh, em)| MealWindow {
            period,
            start: NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
            end: NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
        };

        Self::new(vec![
            window(MealPeriod::Breakfast, (6, 0), (10, 30)),
            window(MealPeriod::Lunch, (10, 30), (15, 0)),
            window(MealPeriod::Dinner, (16, 30), (21, 0)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::{MealPeriod, MealSchedule, MealWindow};

    fn at(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(MealPeriod::parse("Breakfast"), Some(MealPeriod::Breakfast));
        assert_eq!(MealPeriod::parse("  lunch  "), Some(MealPeriod::Lunch));
        assert_eq!(MealPeriod::parse("DINNER"), Some(MealPeriod::Dinner));
        assert_eq!(MealPeriod::parse("brunch"), None);
        assert_eq!(MealPeriod::parse(""), None);
    }

    #[test]
    fn test_active_inside_windows() {
        let schedule = MealSchedule::default();

        assert_eq!(schedule.active_period(at(7, 0)), Some(MealPeriod::Breakfast));
        assert_eq!(schedule.active_period(at(11, 0)), Some(MealPeriod::Lunch));
        assert_eq!(schedule.active_period(at(18, 0)), Some(MealPeriod::Dinner));
    }

    #[test]
    fn test_half_open_boundaries() {
        let schedule = MealSchedule::default();

        // start is inclusive, end is exclusive
        assert_eq!(schedule.active_period(at(6, 0)), Some(MealPeriod::Breakfast));
        assert_eq!(schedule.active_period(at(10, 30)), Some(MealPeriod::Lunch));
        assert_eq!(schedule.active_period(at(21, 0)), None);
    }

    #[test]
    fn test_gaps_have_no_active_meal() {
        let schedule = MealSchedule::default();

        assert_eq!(schedule.active_period(at(15, 30)), None);
        assert_eq!(schedule.active_period(at(5, 59)), None);
        assert_eq!(schedule.active_period(at(23, 0)), None);
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let schedule = MealSchedule::new(vec![MealWindow {
            period: MealPeriod::Dinner,
            start: at(22, 0),
            end: at(5, 0),
        }]);

        assert_eq!(schedule.active_period(at(23, 30)), Some(MealPeriod::Dinner));
        assert_eq!(schedule.active_period(at(2, 0)), Some(MealPeriod::Dinner));
        assert_eq!(schedule.active_period(at(6, 0)), None);
        assert_eq!(schedule.active_period(at(5, 0)), None);
    }

    #[test]
    fn test_is_active() {
        let schedule = MealSchedule::default();

        assert!(schedule.is_active("lunch", at(11, 0)));
        assert!(!schedule.is_active("Breakfast", at(11, 0)));
        assert!(!schedule.is_active("second breakfast", at(7, 0)));
    }

    #[test]
    fn test_overlap_first_match_wins() {
        let schedule = MealSchedule::new(vec![
            MealWindow {
                period: MealPeriod::Breakfast,
                start: at(6, 0),
                end: at(12, 0),
            },
            MealWindow {
                period: MealPeriod::Lunch,
                start: at(10, 0),
                end: at(15, 0),
            },
        ]);

        assert_eq!(schedule.active_period(at(11, 0)), Some(MealPeriod::Breakfast));
    }
}
