use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub catalog: Catalog,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Optional settings.toml, checked in the current directory and in
        // the crate directory for development
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let dev_path = PathBuf::from("reelfeed-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "reelfeed.db")?
            .set_default("catalog.api_url", "https://api.themoviedb.org/3")?
            .set_default("catalog.api_key", "")?;

        // Environment variables take priority over file and defaults
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(api_url) = std::env::var("TMDB_API_URL") {
            builder = builder.set_override("catalog.api_url", api_url)?;
        }
        if let Ok(api_key) = std::env::var("TMDB_API_KEY") {
            builder = builder.set_override("catalog.api_key", api_key)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
