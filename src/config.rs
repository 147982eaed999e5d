// Application settings, loaded with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    // Root of categories.json, filters.json, listings.json and vehicles/
    pub data_dir: PathBuf,
    pub schemas_dir: PathBuf,
    pub static_dir: PathBuf,
    // Seller whose listings seed the demo workspace
    pub seller_name: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("data_dir", "data")?
            .set_default("schemas_dir", "schemas")?
            .set_default("static_dir", "static")?
            .set_default("seller_name", "Elite Motors KSA")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Environment overrides, e.g. APP__DATA_DIR=/srv/mazad/data
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn vehicles_dir(&self) -> PathBuf {
        self.data_dir.join("vehicles")
    }
}
