use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub sodexo_api_key: String,
    pub sodexo_location_id: String,
    pub sodexo_site_id: String,
    pub flag_store_path: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5001"),
            sodexo_api_key: env::var("SODEXO_API_KEY").unwrap_or_else(|_| {
                warn!("SODEXO_API_KEY is not set, upstream menu requests will be rejected");
                String::new()
            }),
            sodexo_location_id: try_load("SODEXO_LOCATION_ID", "73110001"),
            sodexo_site_id: try_load("SODEXO_SITE_ID", "22135"),
            flag_store_path: try_load("FLAG_STORE_PATH", "flagged_items.json"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
