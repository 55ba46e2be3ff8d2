use std::sync::Arc;

use menu::{fetch::SodexoClient, flags::FlagStore, windows::MealSchedule};

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub sodexo: SodexoClient,
    pub flags: FlagStore,
    pub schedule: MealSchedule,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let sodexo = SodexoClient::new(
            &config.sodexo_api_key,
            &config.sodexo_location_id,
            &config.sodexo_site_id,
        );
        let flags = FlagStore::open(&config.flag_store_path);

        Arc::new(Self {
            config,
            sodexo,
            flags,
            schedule: MealSchedule::default(),
        })
    }
}
