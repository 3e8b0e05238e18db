//! Sample application configuration loaded by the demo binary.

use serde::{Deserialize, Serialize};

/// Application log level, decoded from its lower-case name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

crate::self_decoding!(LogLevel);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub ssl: bool,
}

crate::configurable!(DatabaseConfig {
    host(json = "host"),
    port(json = "port"),
    username(json = "username"),
    password(json = "password"),
    ssl(json = "ssl"),
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub level: LogLevel,
    pub database: DatabaseConfig,
    pub tags: Vec<String>,
    /// Path of a further configuration file, merged after all other sources.
    pub config: String,
}

crate::configurable!(AppConfig {
    name(json = "name"),
    host(json = "host"),
    port(json = "port"),
    debug(json = "debug"),
    level(json = "level"),
    database(json = "database", yaml = "db"),
    tags(json = "tags"),
    config(json = "config", layerconf = "file"),
});

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            debug: false,
            level: LogLevel::default(),
            database: DatabaseConfig::default(),
            tags: Vec::new(),
            config: String::new(),
        }
    }
}
