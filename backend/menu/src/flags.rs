//! # Flag Store
//!
//! Durable record of which items diners have marked unavailable.
//!
//! ## Shape
//!
//! One JSON object: `YYYY-MM-DD` date keys, canonical meal-name keys under
//! each date, sorted arrays of item-id strings at the leaves. `BTreeMap`
//! and `BTreeSet` keep the on-disk form deterministic. Empty sets and
//! empty date entries are collapsed before every save, so the file never
//! contains empty containers.
//!
//! ## Expiry
//!
//! Flags only matter for the current day. Instead of a background sweep,
//! every load drops date keys older than today (and keys that are not
//! dates at all) and writes the pruned map back, which keeps the file
//! self-cleaning with no scheduled job.
//!
//! ## Locking
//!
//! The persisted file is the only shared mutable state in the service.
//! Every load-mutate-save cycle runs inside the store's mutex, so two
//! concurrent toggles (or a toggle racing a prune) cannot lose updates.
//! Storage itself is an injected handle, which lets tests swap the file
//! for an in-memory buffer.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::windows::{MealPeriod, MealSchedule};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub type MealFlags = BTreeMap<MealPeriod, BTreeSet<String>>;
pub type FlagMap = BTreeMap<String, MealFlags>;

#[derive(Error, Debug)]
pub enum FlagError {
    #[error("unrecognized meal name: {0:?}")]
    InvalidMeal(String),

    #[error("flags can only be changed on today's menu")]
    NotToday { date: NaiveDate },

    #[error("{meal} is not being served right now")]
    OutsideActiveWindow {
        meal: MealPeriod,
        active: Option<MealPeriod>,
    },

    #[error("flag storage: {0}")]
    Storage(#[from] io::Error),
}

/// Where the serialized flag map lives. Callers hold the store's lock
/// around every call, so implementations do not need their own
/// serialization beyond interior mutability.
pub trait FlagStorage: Send + Sync {
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, contents: &str) -> io::Result<()>;
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FlagStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        fs::write(&self.path, contents)
    }
}

/// In-memory storage double. Clones share the same buffer, so a test can
/// keep a handle for inspection after handing one to the store.
#[derive(Clone, Default)]
pub struct MemoryStorage(Arc<Mutex<Option<String>>>);

impl MemoryStorage {
    pub fn contents(&self) -> Option<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FlagStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub struct FlagOutcome {
    pub item_id: String,
    pub meal: MealPeriod,
    pub is_flagged: bool,
}

pub struct FlagStore {
    storage: Mutex<Box<dyn FlagStorage>>,
}

impl FlagStore {
    pub fn new(storage: impl FlagStorage + 'static) -> Self {
        Self {
            storage: Mutex::new(Box::new(storage)),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStorage::new(path))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn FlagStorage>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current flag map, pruned of anything older than `today`.
    pub fn load(&self, today: NaiveDate) -> FlagMap {
        let storage = self.lock();
        load_and_prune(&**storage, today)
    }

    pub fn save(&self, map: &FlagMap) -> io::Result<()> {
        let storage = self.lock();
        persist(&**storage, map)
    }

    /// Flagged sets for one date, for merging into a menu document.
    pub fn flags_for(&self, date: NaiveDate, today: NaiveDate) -> MealFlags {
        self.load(today)
            .remove(&date.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Adds or removes one item id under `(date, meal)` and persists the
    /// result. Returns whether the id ends up present.
    pub fn set_flag(
        &self,
        date: NaiveDate,
        raw_meal: &str,
        item_id: &str,
        flag: bool,
        today: NaiveDate,
    ) -> Result<bool, FlagError> {
        let meal = MealPeriod::parse(raw_meal)
            .ok_or_else(|| FlagError::InvalidMeal(raw_meal.to_string()))?;

        let storage = self.lock();
        let mut map = load_and_prune(&**storage, today);

        let date_key = date.format(DATE_FORMAT).to_string();
        let ids = map.entry(date_key.clone()).or_default().entry(meal).or_default();

        if flag {
            ids.insert(item_id.to_string());
        } else {
            ids.remove(item_id);
        }
        let is_flagged = ids.contains(item_id);

        if let Some(date_flags) = map.get_mut(&date_key) {
            if date_flags.get(&meal).is_some_and(BTreeSet::is_empty) {
                date_flags.remove(&meal);
            }
            if date_flags.is_empty() {
                map.remove(&date_key);
            }
        }

        persist(&**storage, &map)?;
        Ok(is_flagged)
    }

    /// The full flag-toggle operation the API exposes: the date (default
    /// today) must be today, the meal must resolve, and the meal must be
    /// the one being served at `now`.
    pub fn set_item_flag(
        &self,
        schedule: &MealSchedule,
        item_id: &str,
        raw_meal: &str,
        flag: bool,
        date: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Result<FlagOutcome, FlagError> {
        let today = now.date();
        let date = date.unwrap_or(today);
        if date != today {
            return Err(FlagError::NotToday { date });
        }

        let meal = MealPeriod::parse(raw_meal)
            .ok_or_else(|| FlagError::InvalidMeal(raw_meal.to_string()))?;

        let active = schedule.active_period(now.time());
        if active != Some(meal) {
            return Err(FlagError::OutsideActiveWindow { meal, active });
        }

        let is_flagged = self.set_flag(date, raw_meal, item_id, flag, today)?;
        Ok(FlagOutcome {
            item_id: item_id.to_string(),
            meal,
            is_flagged,
        })
    }
}

fn load_and_prune(storage: &dyn FlagStorage, today: NaiveDate) -> FlagMap {
    let contents = match storage.read() {
        Ok(Some(contents)) => contents,
        Ok(None) => return FlagMap::new(),
        Err(e) => {
            warn!("Failed to read flag store: {e}");
            return FlagMap::new();
        }
    };

    let parsed: BTreeMap<String, Value> = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Flag store is unreadable, starting empty: {e}");
            return FlagMap::new();
        }
    };

    let total = parsed.len();
    let mut map = FlagMap::new();

    for (date_key, value) in parsed {
        let current = NaiveDate::parse_from_str(&date_key, DATE_FORMAT)
            .is_ok_and(|date| date >= today);
        if !current {
            continue;
        }

        // an entry that no longer parses is dropped along with the stale dates
        if let Ok(meal_flags) = serde_json::from_value::<MealFlags>(value) {
            if !meal_flags.is_empty() {
                map.insert(date_key, meal_flags);
            }
        }
    }

    if map.len() != total {
        if let Err(e) = persist(storage, &map) {
            warn!("Failed to persist pruned flag store: {e}");
        }
    }

    map
}

fn persist(storage: &dyn FlagStorage, map: &FlagMap) -> io::Result<()> {
    let contents = serde_json::to_string_pretty(map).map_err(io::Error::from)?;
    storage.write(&contents)
}
